use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the ffmpeg executable.
pub const FFMPEG_ENV: &str = "AV1_FFMPEG";
/// Environment variable overriding the ffprobe executable.
pub const FFPROBE_ENV: &str = "AV1_FFPROBE";
/// Environment variable overriding the directory holding the encoder.
pub const ENCODER_DIR_ENV: &str = "AV1_ENCODER_DIR";

/// Locations of the external tools the pipeline drives.
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    /// `None` means "the directory of the running executable".
    pub encoder_dir: Option<PathBuf>,
}

impl ToolPaths {
    pub fn new() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            encoder_dir: None,
        }
    }

    pub fn with_paths(ffmpeg: PathBuf, ffprobe: PathBuf, encoder_dir: PathBuf) -> Self {
        Self {
            ffmpeg,
            ffprobe,
            encoder_dir: Some(encoder_dir),
        }
    }

    /// Defaults, overridden by `AV1_FFMPEG`, `AV1_FFPROBE` and `AV1_ENCODER_DIR`.
    pub fn from_env() -> Self {
        let mut paths = Self::new();
        if let Some(ffmpeg) = env::var_os(FFMPEG_ENV) {
            paths.ffmpeg = PathBuf::from(ffmpeg);
        }
        if let Some(ffprobe) = env::var_os(FFPROBE_ENV) {
            paths.ffprobe = PathBuf::from(ffprobe);
        }
        if let Some(dir) = env::var_os(ENCODER_DIR_ENV) {
            paths.encoder_dir = Some(PathBuf::from(dir));
        }
        paths
    }

    /// Directory searched for the encoder binary.
    pub fn encoder_dir(&self) -> std::io::Result<PathBuf> {
        if let Some(ref dir) = self.encoder_dir {
            return Ok(dir.clone());
        }
        let exe = env::current_exe()?;
        Ok(exe
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")))
    }
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let paths = ToolPaths::new();
        assert_eq!(paths.ffmpeg, PathBuf::from("ffmpeg"));
        assert_eq!(paths.ffprobe, PathBuf::from("ffprobe"));
        assert!(paths.encoder_dir.is_none());
    }

    #[test]
    fn test_encoder_dir_defaults_to_executable_dir() {
        let dir = ToolPaths::new().encoder_dir().unwrap();
        let exe = env::current_exe().unwrap();
        assert_eq!(Some(dir.as_path()), exe.parent());
    }

    #[test]
    fn test_explicit_encoder_dir() {
        let paths = ToolPaths::with_paths(
            PathBuf::from("/opt/ff/ffmpeg"),
            PathBuf::from("/opt/ff/ffprobe"),
            PathBuf::from("/opt/svt"),
        );
        assert_eq!(paths.encoder_dir().unwrap(), PathBuf::from("/opt/svt"));
    }
}
