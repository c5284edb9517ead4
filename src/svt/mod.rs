mod commands;
mod encoder;
mod progress;

pub use commands::*;
pub use encoder::*;
pub use progress::*;
