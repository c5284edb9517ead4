use crate::error::{EncodeError, Result};
use crate::ffmpeg::ProbeResult;
use crate::resolution::{fit_to_source, Resolution};
use std::path::{Path, PathBuf};

/// An encode request, fixed when the user presses start
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Raw intermediate, removed once the encode succeeds
    pub raw_path: PathBuf,
    /// Passed to the encoder as-is
    pub quality: String,
    pub requested: Resolution,
}

impl Job {
    pub fn new(input: PathBuf, quality: impl Into<String>, requested: Resolution) -> Self {
        Self {
            output: output_path_for(&input),
            raw_path: raw_path_for(&input),
            input,
            quality: quality.into(),
            requested,
        }
    }

    pub fn description(&self) -> String {
        format!(
            "{} -> {} ({}, crf {})",
            file_name(&self.input),
            file_name(&self.output),
            self.requested,
            self.quality
        )
    }
}

/// Everything derived from probing the source for one run
#[derive(Debug, Clone, PartialEq)]
pub struct EncodePlan {
    pub requested: Resolution,
    pub source: Resolution,
    /// Size actually used for conversion and encoding
    pub resolution: Resolution,
    pub frame_rate: f64,
    /// Informational only, the output is always 10-bit
    pub source_bit_depth: u8,
}

impl EncodePlan {
    pub const OUTPUT_BIT_DEPTH: u8 = 10;

    pub fn from_probe(job: &Job, probe: &ProbeResult) -> Result<Self> {
        let frame_rate = probe
            .frame_rate()
            .ok_or_else(|| EncodeError::Probe(format!("invalid frame rate: {}", probe.r_frame_rate)))?;
        let source = probe.resolution();
        let resolution = fit_to_source(job.requested, source)?;

        Ok(Self {
            requested: job.requested,
            source,
            resolution,
            frame_rate,
            source_bit_depth: probe.bit_depth(),
        })
    }

    /// Whether the requested size was replaced by the source size.
    pub fn is_adjusted(&self) -> bool {
        self.resolution != self.requested
    }

    pub fn source_summary(&self) -> String {
        format!(
            "Source: {}, {:.3} fps, {}-bit (output {}-bit)",
            self.source,
            self.frame_rate,
            self.source_bit_depth,
            Self::OUTPUT_BIT_DEPTH
        )
    }
}

/// `<dir>/<stem>_av1.ivf`
pub fn output_path_for(input: &Path) -> PathBuf {
    input.with_file_name(format!("{}_av1.ivf", stem(input)))
}

/// `<dir>/<stem>.yuv`, or `<dir>/<stem>.tmp.yuv` when the input itself is a `.yuv`
pub fn raw_path_for(input: &Path) -> PathBuf {
    let is_yuv = input
        .extension()
        .map(|e| e.eq_ignore_ascii_case("yuv"))
        .unwrap_or(false);
    if is_yuv {
        input.with_file_name(format!("{}.tmp.yuv", stem(input)))
    } else {
        input.with_file_name(format!("{}.yuv", stem(input)))
    }
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
