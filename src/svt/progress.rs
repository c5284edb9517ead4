/// Frame number reported on an encoder status line.
///
/// SvtAv1EncApp prints lines like `Encoding frame  530 1.42 kbps 12.3 fps`;
/// the number is the whitespace-separated token right after `frame`.
pub fn parse_frame_number(line: &str) -> Option<u64> {
    let mut tokens = line.split_whitespace();
    tokens.position(|t| t == "frame")?;
    tokens.next()?.parse().ok()
}

/// Approximate progress from an encoder line: one percent per ten frames,
/// capped at 100. The encoder is never told the total frame count.
pub fn parse_progress_line(line: &str) -> Option<u8> {
    let frame = parse_frame_number(line)?;
    Some((frame / 10).min(100) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_progress_line() {
        assert_eq!(parse_progress_line("frame 530 ..."), Some(53));
        assert_eq!(parse_progress_line("Encoding frame  530 1.42 kbps 12.30 fps"), Some(53));
        assert_eq!(parse_progress_line("Encoding frame 9"), Some(0));
    }

    #[test]
    fn test_progress_is_capped() {
        assert_eq!(parse_progress_line("Encoding frame 1000"), Some(100));
        assert_eq!(parse_progress_line("Encoding frame 123456"), Some(100));
    }

    #[test]
    fn test_lines_without_frame_number() {
        assert_eq!(parse_progress_line("SVT [version]: SVT-AV1 Encoder Lib v2.3.0"), None);
        assert_eq!(parse_progress_line("Encoding frame"), None);
        assert_eq!(parse_progress_line("Encoding frame abc"), None);
        assert_eq!(parse_progress_line("frames 120 done"), None);
        assert_eq!(parse_progress_line("frame -5"), None);
    }
}
