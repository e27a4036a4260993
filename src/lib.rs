//! fnpipe: composable async step pipelines.
//!
//! Steps are declared in order and exchange values through two indexed
//! buffers instead of hand-written future chains. Every produced value is
//! pushed into the output slot of one or more later steps, every failure
//! into the slot of a later handler, and each step is called with whatever
//! accumulated in its own slot.
//!
//! # Example
//!
//! ```
//! use fnpipe::{err, out, pipe, sync_fn, value_fn};
//! use serde_json::{Value, json};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let result = pipe(value_fn(|_| json!({"name": "Andy", "age": 18})), &[out([1, 2])])
//!     .pipe(value_fn(|args: Vec<Value>| args[0]["name"].clone()), &[])
//!     // called with (body, name)
//!     .pipe(sync_fn(|args| Ok(json!([args[1], args[0]["age"]]))), &[err([1])])
//!     .catch(value_fn(|_| json!("unreachable")), &[])
//!     .await;
//! assert_eq!(result.unwrap(), json!(["Andy", 18]));
//! # });
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod util;

pub use error::{PipeError, Result};
pub use pipeline::{
    FunctionPipe, Modifier, PipeStep, StepResult, err, map_index, order, out, pipe, step_fn,
    sync_fn, value_fn,
};
pub use util::args::{Arg, PLACEHOLDER, bind, bind_with, lazy, reorder, spread};
pub use util::collection::{for_each, map_each};
