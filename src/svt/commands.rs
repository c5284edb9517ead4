use crate::resolution::Resolution;
use std::path::Path;

/// Name of the SVT-AV1 encoder executable, without platform suffix.
pub const ENCODER_BINARY: &str = "SvtAv1EncApp";

pub const PRESET: u8 = 3;
pub const KEYFRAME_INTERVAL: u32 = 240;
/// The raw intermediate is always 10-bit.
pub const INPUT_DEPTH: u8 = 10;

/// File name of the encoder on this platform.
pub fn encoder_file_name() -> String {
    format!("{}{}", ENCODER_BINARY, std::env::consts::EXE_SUFFIX)
}

/// Build SvtAv1EncApp arguments for a single-pass CRF encode of `raw_input`.
///
/// `quality` is passed through untouched. The frame rate is truncated to
/// an integer.
pub fn build_encode_args(
    raw_input: &Path,
    output: &Path,
    quality: &str,
    resolution: Resolution,
    frame_rate: f64,
) -> Vec<String> {
    vec![
        "-i".to_string(),
        raw_input.to_string_lossy().to_string(),
        "-b".to_string(),
        output.to_string_lossy().to_string(),
        "--preset".to_string(),
        PRESET.to_string(),
        "--crf".to_string(),
        quality.to_string(),
        "--film-grain".to_string(),
        "0".to_string(),
        "--film-grain-denoise".to_string(),
        "1".to_string(),
        "--enable-tpl-la".to_string(),
        "1".to_string(),
        "--lp".to_string(),
        "0".to_string(),
        "--enable-restoration".to_string(),
        "1".to_string(),
        "--scd".to_string(),
        "1".to_string(),
        "--keyint".to_string(),
        KEYFRAME_INTERVAL.to_string(),
        "--input-depth".to_string(),
        INPUT_DEPTH.to_string(),
        "--passes".to_string(),
        "1".to_string(),
        "--width".to_string(),
        resolution.width.to_string(),
        "--height".to_string(),
        resolution.height.to_string(),
        "--fps".to_string(),
        (frame_rate.trunc() as u32).to_string(),
    ]
}
