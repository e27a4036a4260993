/// Centralized error handling for fnpipe
pub mod pipe;

pub use pipe::{PipeError, Result};
