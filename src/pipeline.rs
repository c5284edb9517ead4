//! Background encode pipeline: probe, fit resolution, convert to raw, encode.
//!
//! A job runs on one tokio task and reports back through an event channel.
//! The last event of every task is exactly one of `Finished`, `Failed` or
//! `Cancelled`.

use crate::config::ToolPaths;
use crate::error::{EncodeError, Result};
use crate::ffmpeg::{FFmpegWrapper, RAW_PIXEL_FORMAT};
use crate::job::{EncodePlan, Job};
use crate::svt::{EncodeOutcome, SvtEncoder};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Something the UI should know about a running job.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeEvent {
    Log(String),
    /// Approximate percentage, 0..=100
    Progress(u8),
    Finished(PathBuf),
    Failed(String),
    Cancelled,
}

impl EncodeEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EncodeEvent::Finished(_) | EncodeEvent::Failed(_) | EncodeEvent::Cancelled
        )
    }
}

/// Handle to a running job, owned by the UI.
pub struct EncodeTask {
    input: PathBuf,
    events: Receiver<EncodeEvent>,
    cancel: watch::Sender<bool>,
}

impl EncodeTask {
    pub fn input(&self) -> &PathBuf {
        &self.input
    }

    /// Ask the job to stop. The encoder is killed right away; a running
    /// probe or conversion finishes first and the encoder is never started.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_cancel_requested(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Next pending event without blocking.
    /// `Err(Disconnected)` means the task ended without a terminal event.
    pub fn try_next_event(&self) -> std::result::Result<EncodeEvent, TryRecvError> {
        self.events.try_recv()
    }

    #[cfg(test)]
    pub fn events(&self) -> &Receiver<EncodeEvent> {
        &self.events
    }
}

/// Starts jobs, one at a time.
#[derive(Clone)]
pub struct Pipeline {
    tools: ToolPaths,
    active: Arc<Mutex<Option<PathBuf>>>,
}

impl Pipeline {
    pub fn new(tools: ToolPaths) -> Self {
        Self {
            tools,
            active: Arc::new(Mutex::new(None)),
        }
    }

    #[cfg(test)]
    pub fn is_busy(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Spawn `job` on `runtime`. Fails with `Busy` if a job is still running.
    pub fn start(&self, runtime: &Handle, job: Job) -> Result<EncodeTask> {
        let slot = self.claim(&job)?;
        let (tx, rx) = crossbeam_channel::unbounded();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let tools = self.tools.clone();
        let input = job.input.clone();

        info!(job = %job.description(), "starting encode job");

        runtime.spawn(async move {
            let events = EventSink(tx);
            let terminal = match run_job(&tools, &job, &events, cancel_rx).await {
                Ok(JobOutcome::Finished(output)) => {
                    info!(output = %output.display(), "encode finished");
                    EncodeEvent::Finished(output)
                }
                Ok(JobOutcome::Cancelled) => {
                    info!("encode cancelled");
                    EncodeEvent::Cancelled
                }
                Err(e) => {
                    error!("encode failed: {}", e);
                    EncodeEvent::Failed(e.to_string())
                }
            };
            // Free the slot first so a UI reacting to the terminal event can
            // start the next job.
            drop(slot);
            events.send(terminal);
        });

        Ok(EncodeTask {
            input,
            events: rx,
            cancel: cancel_tx,
        })
    }

    fn claim(&self, job: &Job) -> Result<ActiveJob> {
        let mut active = self.active.lock();
        if let Some(ref running) = *active {
            return Err(EncodeError::Busy(running.clone()));
        }
        *active = Some(job.input.clone());
        Ok(ActiveJob(self.active.clone()))
    }
}

/// Clears the pipeline's active slot when dropped.
struct ActiveJob(Arc<Mutex<Option<PathBuf>>>);

impl Drop for ActiveJob {
    fn drop(&mut self) {
        *self.0.lock() = None;
    }
}

struct EventSink(Sender<EncodeEvent>);

impl EventSink {
    fn send(&self, event: EncodeEvent) {
        // The UI may have dropped its handle already.
        let _ = self.0.send(event);
    }

    fn log(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.send(EncodeEvent::Log(message));
    }
}

enum JobOutcome {
    Finished(PathBuf),
    Cancelled,
}

fn cancel_requested(cancel: &watch::Receiver<bool>) -> bool {
    *cancel.borrow()
}

async fn run_job(
    tools: &ToolPaths,
    job: &Job,
    events: &EventSink,
    mut cancel: watch::Receiver<bool>,
) -> Result<JobOutcome> {
    let ffmpeg = FFmpegWrapper::from_tools(tools);

    events.log(format!("Probing {}", job.input.display()));
    let probe = ffmpeg.probe(&job.input).await?;
    let plan = EncodePlan::from_probe(job, &probe)?;
    events.log(plan.source_summary());
    if plan.is_adjusted() {
        events.log(format!(
            "Resolution adjusted to {} (requested {})",
            plan.resolution, plan.requested
        ));
    }

    if cancel_requested(&cancel) {
        return Ok(JobOutcome::Cancelled);
    }

    events.log(format!(
        "Converting to {} {} @ {:.3} fps",
        RAW_PIXEL_FORMAT, plan.resolution, plan.frame_rate
    ));
    ffmpeg
        .convert_to_raw(&job.input, &job.raw_path, plan.resolution, plan.frame_rate)
        .await?;

    if cancel_requested(&cancel) {
        return Ok(JobOutcome::Cancelled);
    }

    let encoder_dir = tools
        .encoder_dir()
        .map_err(|e| EncodeError::Encode(format!("cannot determine program directory: {}", e)))?;
    let encoder = SvtEncoder::locate(&encoder_dir)?;

    events.log("Encoding with SVT-AV1...");
    let outcome = encoder
        .encode(job, &plan, &mut cancel, |progress| {
            events.send(EncodeEvent::Progress(progress))
        })
        .await?;

    if outcome == EncodeOutcome::Cancelled {
        return Ok(JobOutcome::Cancelled);
    }

    if let Err(e) = tokio::fs::remove_file(&job.raw_path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %job.raw_path.display(), "failed to remove intermediate: {}", e);
        }
    }

    Ok(JobOutcome::Finished(job.output.clone()))
}
