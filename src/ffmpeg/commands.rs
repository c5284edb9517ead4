use crate::resolution::Resolution;
use std::path::Path;

/// Pixel format of the raw intermediate; always 10-bit 4:2:0.
pub const RAW_PIXEL_FORMAT: &str = "yuv420p10le";

/// Build ffprobe arguments reading size, pixel format and frame rate of
/// the first video stream as JSON.
pub fn build_probe_args(input: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-select_streams".to_string(),
        "v:0".to_string(),
        "-show_entries".to_string(),
        "stream=width,height,pix_fmt,r_frame_rate".to_string(),
        "-of".to_string(),
        "json".to_string(),
        input.to_string_lossy().to_string(),
    ]
}

/// Build FFmpeg arguments converting `input` into raw 10-bit video
pub fn build_raw_convert_args(
    input: &Path,
    output: &Path,
    resolution: Resolution,
    frame_rate: f64,
) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-v".to_string(),
        "error".to_string(),
        "-i".to_string(),
        input.to_string_lossy().to_string(),
        "-pix_fmt".to_string(),
        RAW_PIXEL_FORMAT.to_string(),
        "-s".to_string(),
        resolution.to_string(),
        "-r".to_string(),
        frame_rate.to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        output.to_string_lossy().to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        let pos = args.iter().position(|a| a == flag)?;
        args.get(pos + 1).map(String::as_str)
    }

    #[test]
    fn test_probe_args() {
        let args = build_probe_args(&PathBuf::from("/videos/clip.mkv"));
        assert_eq!(value_after(&args, "-select_streams"), Some("v:0"));
        assert_eq!(
            value_after(&args, "-show_entries"),
            Some("stream=width,height,pix_fmt,r_frame_rate")
        );
        assert_eq!(value_after(&args, "-of"), Some("json"));
        assert_eq!(args.last().map(String::as_str), Some("/videos/clip.mkv"));
    }

    #[test]
    fn test_raw_convert_args() {
        let args = build_raw_convert_args(
            &PathBuf::from("/videos/clip.mp4"),
            &PathBuf::from("/videos/clip.yuv"),
            Resolution::new(1280, 720),
            24000.0 / 1001.0,
        );
        assert_eq!(args[0], "-y");
        assert_eq!(value_after(&args, "-i"), Some("/videos/clip.mp4"));
        assert_eq!(value_after(&args, "-pix_fmt"), Some("yuv420p10le"));
        assert_eq!(value_after(&args, "-s"), Some("1280x720"));
        assert!(value_after(&args, "-r").unwrap().starts_with("23.976"));
        assert_eq!(value_after(&args, "-f"), Some("rawvideo"));
        assert_eq!(args.last().map(String::as_str), Some("/videos/clip.yuv"));
    }

    #[test]
    fn test_integral_frame_rate_formatting() {
        let args = build_raw_convert_args(
            &PathBuf::from("in.mov"),
            &PathBuf::from("in.yuv"),
            Resolution::new(1920, 1080),
            30.0,
        );
        assert_eq!(value_after(&args, "-r"), Some("30"));
    }
}
