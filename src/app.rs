use crate::config::ToolPaths;
use crate::job::Job;
use crate::pipeline::{EncodeEvent, EncodeTask, Pipeline};
use crate::resolution::Resolution;
use crossbeam_channel::TryRecvError;
use eframe::egui;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::warn;

pub const DEFAULT_QUALITY: &str = "23";
pub const DEFAULT_RESOLUTION: &str = "1920x1080";

/// Extensions offered by the open dialog
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov"];

pub struct Av1EncoderApp {
    pub runtime: Runtime,
    pub pipeline: Pipeline,

    // Form
    pub input_file: Option<PathBuf>,
    pub quality: String,
    pub resolution: String,

    // Job state
    pub task: Option<EncodeTask>,
    pub progress: u8,
    pub log: Vec<String>,
    pub status_message: String,
}

impl Av1EncoderApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self::with_tools(ToolPaths::from_env())
    }

    pub fn with_tools(tools: ToolPaths) -> Self {
        Self {
            runtime: Runtime::new().expect("Failed to create Tokio runtime"),
            pipeline: Pipeline::new(tools),
            input_file: None,
            quality: DEFAULT_QUALITY.to_string(),
            resolution: DEFAULT_RESOLUTION.to_string(),
            task: None,
            progress: 0,
            log: Vec::new(),
            status_message: String::from("Ready"),
        }
    }

    pub fn is_encoding(&self) -> bool {
        self.task.is_some()
    }

    pub fn select_file(&mut self, path: PathBuf) {
        self.status_message = format!("File: {}", display_name(&path));
        self.input_file = Some(path);
    }

    pub fn file_label(&self) -> String {
        match self.input_file {
            Some(ref path) => format!("File: {}", display_name(path)),
            None => "No file selected".to_string(),
        }
    }

    /// Validate the form and start a job.
    pub fn start_encoding(&mut self) {
        if self.is_encoding() {
            self.append_log("An encode is already running.");
            return;
        }

        let job = match self.build_job() {
            Ok(job) => job,
            Err(message) => {
                self.append_log(message);
                return;
            }
        };

        match self.pipeline.start(self.runtime.handle(), job) {
            Ok(task) => {
                self.task = Some(task);
                self.progress = 0;
                self.status_message = "Encoding...".to_string();
                self.append_log("Encoding in progress...");
            }
            Err(e) => self.append_log(format!("Error: {}", e)),
        }
    }

    /// The job described by the form. Quality goes to the encoder untouched.
    fn build_job(&self) -> std::result::Result<Job, &'static str> {
        let input = self.input_file.clone().ok_or("Please select a video file.")?;
        let requested: Resolution = self
            .resolution
            .parse()
            .map_err(|_| "Invalid resolution. Expected WIDTHxHEIGHT (e.g. 1920x1080).")?;
        Ok(Job::new(input, self.quality.clone(), requested))
    }

    pub fn cancel_encoding(&mut self) {
        if let Some(ref task) = self.task {
            if !task.is_cancel_requested() {
                task.cancel();
                self.progress = 0;
                self.status_message = "Cancelling...".to_string();
                self.append_log("Cancelling encode...");
            }
        }
    }

    /// Drain events from the running job. Called every frame.
    pub fn poll_task(&mut self) {
        loop {
            let event = match self.task {
                Some(ref task) => task.try_next_event(),
                None => return,
            };

            match event {
                Ok(event) => self.apply_event(event),
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    warn!("encode task ended without reporting a result");
                    self.append_log("Error: encode task stopped unexpectedly");
                    self.finish_task("Failed");
                    return;
                }
            }
        }
    }

    fn apply_event(&mut self, event: EncodeEvent) {
        match event {
            EncodeEvent::Log(message) => self.append_log(message),
            EncodeEvent::Progress(progress) => self.progress = progress.min(100),
            EncodeEvent::Finished(output) => {
                self.progress = 100;
                self.append_log(format!("Encoding finished: {}", output.display()));
                self.finish_task("Done");
            }
            EncodeEvent::Failed(message) => {
                self.append_log(format!("Error: {}", message));
                self.finish_task("Failed");
            }
            EncodeEvent::Cancelled => {
                self.progress = 0;
                self.append_log("Encoding cancelled.");
                self.finish_task("Cancelled");
            }
        }
    }

    fn finish_task(&mut self, status: &str) {
        self.task = None;
        self.status_message = status.to_string();
    }

    pub fn append_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

impl eframe::App for Av1EncoderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_task();

        crate::ui::render_main_window(self, ctx);

        if self.is_encoding() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
