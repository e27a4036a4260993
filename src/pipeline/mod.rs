// Pipeline module - buffers, modifiers, broadcast and the chain executor

pub mod broadcast;
pub mod buffer;
pub mod core;
pub mod params;
pub mod step;

// Re-export core types
pub use buffer::PipeBuffer;
pub use self::core::{FunctionPipe, pipe};
pub use params::{Modifier, StepParams, err, map_index, order, out};
pub use step::{PipeStep, SharedStep, StepResult, step_fn, sync_fn, value_fn};
