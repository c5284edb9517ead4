use super::commands::*;
use super::probe::{parse_probe_output, ProbeResult};
use crate::config::ToolPaths;
use crate::error::{EncodeError, Result};
use crate::process::run_to_completion;
use crate::resolution::Resolution;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Lines of stderr quoted in error messages.
const STDERR_TAIL_LINES: usize = 5;

#[derive(Debug, Clone)]
pub struct FFmpegWrapper {
    ffmpeg_path: PathBuf,
    ffprobe_path: PathBuf,
}

impl FFmpegWrapper {
    pub fn from_tools(tools: &ToolPaths) -> Self {
        Self {
            ffmpeg_path: tools.ffmpeg.clone(),
            ffprobe_path: tools.ffprobe.clone(),
        }
    }

    /// Probe the first video stream of `input`
    pub async fn probe(&self, input: &Path) -> Result<ProbeResult> {
        let args = build_probe_args(input);
        debug!(tool = %self.ffprobe_path.display(), ?args, "running ffprobe");

        let output = run_to_completion(self.ffprobe_path.as_os_str(), &args)
            .await
            .map_err(|e| EncodeError::Probe(format!("{:#}", e)))?;

        if !output.status.success() {
            return Err(EncodeError::Probe(format!(
                "ffprobe exited with {}: {}",
                output.status,
                output.stderr_tail(STDERR_TAIL_LINES)
            )));
        }

        parse_probe_output(&output.stdout)
    }

    /// Convert `input` into a raw 10-bit intermediate at `output`, replacing
    /// any existing file.
    pub async fn convert_to_raw(
        &self,
        input: &Path,
        output: &Path,
        resolution: Resolution,
        frame_rate: f64,
    ) -> Result<()> {
        let args = build_raw_convert_args(input, output, resolution, frame_rate);
        info!(tool = %self.ffmpeg_path.display(), ?args, "running ffmpeg");

        let result = run_to_completion(self.ffmpeg_path.as_os_str(), &args)
            .await
            .map_err(|e| EncodeError::Conversion(format!("{:#}", e)))?;

        if result.status.success() {
            Ok(())
        } else {
            Err(EncodeError::Conversion(format!(
                "ffmpeg exited with {}: {}",
                result.status,
                result.stderr_tail(STDERR_TAIL_LINES)
            )))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn wrapper(dir: &Path, ffmpeg: &str, ffprobe: &str) -> FFmpegWrapper {
        let tools = ToolPaths::with_paths(
            write_script(dir, "ffmpeg", ffmpeg),
            write_script(dir, "ffprobe", ffprobe),
            dir.to_path_buf(),
        );
        FFmpegWrapper::from_tools(&tools)
    }

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        tokio::runtime::Runtime::new().unwrap().block_on(f)
    }

    #[test]
    fn test_probe_parses_tool_output() {
        let dir = tempfile::tempdir().unwrap();
        let ffmpeg = wrapper(
            dir.path(),
            "exit 0",
            r#"echo '{"streams":[{"width":1280,"height":720,"pix_fmt":"yuv420p10le","r_frame_rate":"60/1"}]}'"#,
        );
        let probe = block_on(ffmpeg.probe(Path::new("clip.mp4"))).unwrap();
        assert_eq!(probe.resolution(), Resolution::new(1280, 720));
        assert_eq!(probe.frame_rate(), Some(60.0));
        assert_eq!(probe.bit_depth(), 10);
    }

    #[test]
    fn test_probe_failure_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let ffmpeg = wrapper(dir.path(), "exit 0", "echo 'clip.mp4: No such file' >&2; exit 1");
        match block_on(ffmpeg.probe(Path::new("clip.mp4"))) {
            Err(EncodeError::Probe(msg)) => assert!(msg.contains("No such file")),
            other => panic!("expected probe error, got {:?}", other),
        }
    }

    #[test]
    fn test_convert_failure_is_conversion_error() {
        let dir = tempfile::tempdir().unwrap();
        let ffmpeg = wrapper(dir.path(), "echo 'Invalid data' >&2; exit 1", "exit 0");
        let result = block_on(ffmpeg.convert_to_raw(
            Path::new("clip.mp4"),
            &dir.path().join("clip.yuv"),
            Resolution::new(1920, 1080),
            30.0,
        ));
        match result {
            Err(EncodeError::Conversion(msg)) => assert!(msg.contains("Invalid data")),
            other => panic!("expected conversion error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_tool_is_reported_per_stage() {
        let tools = ToolPaths::with_paths(
            PathBuf::from("/nonexistent/ffmpeg"),
            PathBuf::from("/nonexistent/ffprobe"),
            PathBuf::from("/nonexistent"),
        );
        let ffmpeg = FFmpegWrapper::from_tools(&tools);
        assert!(matches!(
            block_on(ffmpeg.probe(Path::new("clip.mp4"))),
            Err(EncodeError::Probe(_))
        ));
        assert!(matches!(
            block_on(ffmpeg.convert_to_raw(
                Path::new("clip.mp4"),
                Path::new("clip.yuv"),
                Resolution::new(1920, 1080),
                30.0
            )),
            Err(EncodeError::Conversion(_))
        ));
    }
}
