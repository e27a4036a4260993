//! Constants for fnpipe

/// Routing offset used when a step declares no output/error routing
pub const DEFAULT_ROUTE: usize = 1;

/// Argument position broadcast by `pipe_map` when no `map_index` is given
pub const DEFAULT_MAP_INDEX: usize = 0;

/// Label reported for closures that do not carry a name
pub const ANONYMOUS_STEP: &str = "anonymous";

/// Label used in tracing output for pipelines created without a name
pub const DEFAULT_PIPELINE_NAME: &str = "pipe";
