mod commands;
mod probe;
mod wrapper;

pub use commands::*;
pub use probe::*;
pub use wrapper::*;
