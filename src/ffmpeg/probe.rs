use crate::error::{EncodeError, Result};
use crate::resolution::Resolution;
use serde::Deserialize;

/// Metadata of the first video stream, as reported by ffprobe
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub width: u32,
    pub height: u32,
    pub pix_fmt: String,
    /// Rational expression such as `30/1` or `24000/1001`
    pub r_frame_rate: String,
}

impl ProbeResult {
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    pub fn frame_rate(&self) -> Option<f64> {
        parse_framerate(&self.r_frame_rate)
    }

    /// 10 for 10-bit little-endian pixel formats, 8 otherwise.
    pub fn bit_depth(&self) -> u8 {
        if self.pix_fmt.contains("10le") {
            10
        } else {
            8
        }
    }
}

#[derive(Debug, Deserialize)]
struct FFProbeOutput {
    #[serde(default)]
    streams: Vec<FFProbeStream>,
}

#[derive(Debug, Deserialize)]
struct FFProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    pix_fmt: Option<String>,
    r_frame_rate: Option<String>,
}

/// Parse the JSON printed by `ffprobe -of json -show_entries stream=...`.
pub fn parse_probe_output(json_str: &str) -> Result<ProbeResult> {
    let output: FFProbeOutput = serde_json::from_str(json_str)
        .map_err(|e| EncodeError::Probe(format!("failed to parse ffprobe output: {}", e)))?;

    let stream = output
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| EncodeError::Probe("no video stream found".to_string()))?;

    let missing = |field: &str| EncodeError::Probe(format!("ffprobe did not report {}", field));
    let result = ProbeResult {
        width: stream.width.ok_or_else(|| missing("width"))?,
        height: stream.height.ok_or_else(|| missing("height"))?,
        pix_fmt: stream.pix_fmt.ok_or_else(|| missing("pix_fmt"))?,
        r_frame_rate: stream.r_frame_rate.ok_or_else(|| missing("r_frame_rate"))?,
    };

    if result.frame_rate().is_none() {
        return Err(EncodeError::Probe(format!(
            "invalid frame rate: {}",
            result.r_frame_rate
        )));
    }

    Ok(result)
}

/// Parse `num/den` or a plain number into frames per second.
/// Returns `None` for anything that is not a positive finite rate.
pub fn parse_framerate(fps_str: &str) -> Option<f64> {
    let fps_str = fps_str.trim();
    let fps = match fps_str.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => fps_str.parse().ok()?,
    };

    (fps.is_finite() && fps > 0.0).then_some(fps)
}
