use super::commands::{build_encode_args, encoder_file_name};
use super::progress::parse_progress_line;
use crate::error::{EncodeError, Result};
use crate::job::{EncodePlan, Job};
use crate::process::StreamingProcess;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Encoder lines kept for error reports.
const RECENT_LINES: usize = 5;

/// How an encoder run ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeOutcome {
    Completed,
    Cancelled,
}

/// The SvtAv1EncApp executable.
#[derive(Debug, Clone)]
pub struct SvtEncoder {
    binary: PathBuf,
}

impl SvtEncoder {
    /// Find the encoder inside `dir`.
    pub fn locate(dir: &Path) -> Result<Self> {
        let binary = dir.join(encoder_file_name());
        if binary.is_file() {
            Ok(Self { binary })
        } else {
            Err(EncodeError::EncoderNotFound {
                binary: encoder_file_name(),
                dir: dir.to_path_buf(),
            })
        }
    }

    /// Encode the job's raw intermediate, reporting progress as it goes.
    ///
    /// A `true` on `cancel` (or the sender going away) kills the encoder.
    /// Nothing is cleaned up in that case.
    pub async fn encode<F>(
        &self,
        job: &Job,
        plan: &EncodePlan,
        cancel: &mut watch::Receiver<bool>,
        mut on_progress: F,
    ) -> Result<EncodeOutcome>
    where
        F: FnMut(u8),
    {
        let args = build_encode_args(
            &job.raw_path,
            &job.output,
            &job.quality,
            plan.resolution,
            plan.frame_rate,
        );
        info!(encoder = %self.binary.display(), ?args, "starting SVT-AV1");

        let mut process = StreamingProcess::spawn(self.binary.as_os_str(), &args)
            .map_err(|e| EncodeError::Encode(format!("{:#}", e)))?;

        let mut recent: VecDeque<String> = VecDeque::with_capacity(RECENT_LINES);
        let mut last_progress = None;

        loop {
            tokio::select! {
                line = process.next_line() => {
                    let Some(line) = line else { break };
                    debug!(target: "svt", "{}", line);
                    if let Some(progress) = parse_progress_line(&line) {
                        if last_progress != Some(progress) {
                            last_progress = Some(progress);
                            on_progress(progress);
                        }
                    }
                    if recent.len() == RECENT_LINES {
                        recent.pop_front();
                    }
                    recent.push_back(line);
                }
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("cancelling SVT-AV1");
                        if let Err(e) = process.kill().await {
                            warn!("failed to stop encoder: {:#}", e);
                        }
                        return Ok(EncodeOutcome::Cancelled);
                    }
                }
            }
        }

        let status = process
            .wait()
            .await
            .map_err(|e| EncodeError::Encode(format!("{:#}", e)))?;

        if status.success() {
            Ok(EncodeOutcome::Completed)
        } else {
            let tail = Vec::from(recent).join("\n");
            Err(EncodeError::Encode(format!(
                "{} exited with {}: {}",
                encoder_file_name(),
                status,
                tail
            )))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::resolution::Resolution;
    use std::os::unix::fs::PermissionsExt;
    use std::time::{Duration, Instant};

    fn install_encoder(dir: &Path, body: &str) {
        let path = dir.join(encoder_file_name());
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn sample(dir: &Path) -> (Job, EncodePlan) {
        let job = Job::new(dir.join("clip.mp4"), "23", Resolution::new(1920, 1080));
        let plan = EncodePlan {
            requested: job.requested,
            source: Resolution::new(1920, 1080),
            resolution: Resolution::new(1920, 1080),
            frame_rate: 30.0,
            source_bit_depth: 8,
        };
        (job, plan)
    }

    #[test]
    fn test_locate_missing_encoder() {
        let dir = tempfile::tempdir().unwrap();
        match SvtEncoder::locate(dir.path()) {
            Err(EncodeError::EncoderNotFound { binary, dir: d }) => {
                assert_eq!(binary, encoder_file_name());
                assert_eq!(d, dir.path());
            }
            other => panic!("expected EncoderNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_reports_progress() {
        let dir = tempfile::tempdir().unwrap();
        install_encoder(
            dir.path(),
            "echo 'Svt[info]: starting' >&2\nprintf 'Encoding frame 100\\rEncoding frame 530\\r'\necho 'Encoding frame 530'\necho 'SUMMARY done'",
        );
        let (job, plan) = sample(dir.path());
        let encoder = SvtEncoder::locate(dir.path()).unwrap();
        let (_tx, mut rx) = watch::channel(false);

        let mut seen = Vec::new();
        let outcome = tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(encoder.encode(&job, &plan, &mut rx, |p| seen.push(p)))
            .unwrap();

        assert_eq!(outcome, EncodeOutcome::Completed);
        assert!(seen.contains(&10));
        assert_eq!(seen.last(), Some(&53));
        assert_eq!(seen.iter().filter(|&&p| p == 53).count(), 1);
    }

    #[test]
    fn test_encoder_failure() {
        let dir = tempfile::tempdir().unwrap();
        install_encoder(dir.path(), "echo 'Error: invalid crf' >&2\nexit 2");
        let (job, plan) = sample(dir.path());
        let encoder = SvtEncoder::locate(dir.path()).unwrap();
        let (_tx, mut rx) = watch::channel(false);

        let result = tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(encoder.encode(&job, &plan, &mut rx, |_| {}));
        match result {
            Err(EncodeError::Encode(msg)) => assert!(msg.contains("invalid crf")),
            other => panic!("expected encode error, got {:?}", other),
        }
    }

    #[test]
    fn test_cancel_kills_encoder() {
        let dir = tempfile::tempdir().unwrap();
        install_encoder(
            dir.path(),
            "echo $$ > \"$(dirname \"$0\")/encoder.pid\"\necho 'Encoding frame 10'\nexec sleep 30",
        );
        let (job, plan) = sample(dir.path());
        let encoder = SvtEncoder::locate(dir.path()).unwrap();
        let (tx, mut rx) = watch::channel(false);

        let started = Instant::now();
        let outcome = tokio::runtime::Runtime::new().unwrap().block_on(async {
            let encode = encoder.encode(&job, &plan, &mut rx, |p| {
                if p == 1 {
                    tx.send_replace(true);
                }
            });
            tokio::time::timeout(Duration::from_secs(5), encode)
                .await
                .expect("encoder was not stopped")
        });
        assert_eq!(outcome.unwrap(), EncodeOutcome::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(5));

        let pid = std::fs::read_to_string(dir.path().join("encoder.pid")).unwrap();
        let alive = std::process::Command::new("sh")
            .args(["-c", &format!("kill -0 {} 2>/dev/null", pid.trim())])
            .status()
            .unwrap()
            .success();
        assert!(!alive, "encoder process {} still running", pid.trim());
    }
}
