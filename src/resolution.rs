use crate::error::{EncodeError, Result};
use std::fmt;
use std::str::FromStr;

/// A frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid resolution {0:?}, expected WIDTHxHEIGHT (e.g. 1920x1080)")]
pub struct ParseResolutionError(String);

impl FromStr for Resolution {
    type Err = ParseResolutionError;

    /// Accepts `WIDTHxHEIGHT`, case-insensitive, whitespace around numbers allowed.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || ParseResolutionError(s.to_string());
        let lower = s.trim().to_ascii_lowercase();
        let (w, h) = lower.split_once('x').ok_or_else(invalid)?;
        let width = w.trim().parse::<u32>().map_err(|_| invalid())?;
        let height = h.trim().parse::<u32>().map_err(|_| invalid())?;
        Ok(Self { width, height })
    }
}

/// Decide the output size for `requested` given the `source` size.
///
/// Anything wider or taller than twice the source is rejected. A request
/// larger than the source in both dimensions is clamped to the source.
/// A request larger in only one dimension is kept as is.
pub fn fit_to_source(requested: Resolution, source: Resolution) -> Result<Resolution> {
    let too_wide = u64::from(requested.width) > 2 * u64::from(source.width);
    let too_tall = u64::from(requested.height) > 2 * u64::from(source.height);
    if too_wide || too_tall {
        return Err(EncodeError::ExcessiveUpscale {
            source_size: source,
            requested,
        });
    }

    if requested.width > source.width && requested.height > source.height {
        return Ok(source);
    }

    Ok(requested)
}
