// Pipeline core - chain building and sequential execution
use super::broadcast::{broadcast, broadcast_rows};
use super::buffer::PipeBuffer;
use super::params::{Modifier, StepParams};
use super::step::{PipeStep, SharedStep, StepResult};
use crate::config::constants::DEFAULT_PIPELINE_NAME;
use crate::error::{PipeError, Result};
use crate::util::args::{reorder, spread};
use futures::future::BoxFuture;
use serde_json::Value;
use std::future::IntoFuture;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkKind {
    Pipe,
    Map,
    Catch,
    CatchThen,
    CatchStop,
}

impl LinkKind {
    fn on_success_path(self) -> bool {
        matches!(self, Self::Pipe | Self::Map)
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pipe => "pipe",
            Self::Map => "pipe_map",
            Self::Catch => "catch",
            Self::CatchThen => "catch_then",
            Self::CatchStop => "catch_stop",
        }
    }
}

/// Deferred invocation recorded by a chain-building call.
///
/// `step_index` is the link's own step for pipe/map links and the last
/// declared step for handlers; `err_index` is the handler's own index, or the
/// last declared handler for pipe/map links.
struct Link {
    kind: LinkKind,
    step_index: usize,
    err_index: usize,
    step: SharedStep,
    params: StepParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settled {
    Resolved,
    Rejected,
}

/// A chain of steps wired together through indexed output/error buffers.
///
/// # Example
/// ```
/// use fnpipe::pipeline::{FunctionPipe, value_fn};
/// use serde_json::{Value, json};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let age = FunctionPipe::new(value_fn(|_| json!({"name": "Andy", "age": 18})), &[])
///     .pipe(value_fn(|args: Vec<Value>| json!(args[0]["age"].as_i64().unwrap_or(0) + 100)), &[])
///     .settle()
///     .await;
/// assert_eq!(age.unwrap(), json!(118));
/// # });
/// ```
pub struct FunctionPipe {
    name: String,
    step_count: usize,
    catch_count: usize,
    out: PipeBuffer,
    err: PipeBuffer,
    links: Vec<Link>,
    running: bool,
}

impl FunctionPipe {
    /// Create a pipeline whose first step is `step`
    pub fn new<S: PipeStep + 'static>(step: S, modifiers: &[Modifier]) -> Self {
        Self::named(DEFAULT_PIPELINE_NAME, step, modifiers)
    }

    /// Create a pipeline with a label used in log output
    pub fn named<S: PipeStep + 'static>(
        name: impl Into<String>,
        step: S,
        modifiers: &[Modifier],
    ) -> Self {
        let pipeline = Self {
            name: name.into(),
            step_count: 0,
            catch_count: 0,
            out: PipeBuffer::new("out"),
            err: PipeBuffer::new("err"),
            links: Vec::new(),
            running: true,
        };
        pipeline.pipe(step, modifiers)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of success-path steps declared so far
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Number of handlers declared so far
    pub fn catch_count(&self) -> usize {
        self.catch_count
    }

    /// Add a step fed from its own output slot
    pub fn pipe<S: PipeStep + 'static>(self, step: S, modifiers: &[Modifier]) -> Self {
        self.add_step(LinkKind::Pipe, step, modifiers)
    }

    /// Add a step whose first argument, an array, is spread into positional
    /// arguments
    pub fn pipe_spread<S: PipeStep + 'static>(self, step: S, modifiers: &[Modifier]) -> Self {
        self.pipe(spread(step), modifiers)
    }

    /// Add a step invoked once per row of the array arguments selected by
    /// `map_index` (position 0 by default). Resolves to the array of results.
    pub fn pipe_map<S: PipeStep + 'static>(self, step: S, modifiers: &[Modifier]) -> Self {
        self.add_step(LinkKind::Map, step, modifiers)
    }

    pub fn pipe_map_spread<S: PipeStep + 'static>(self, step: S, modifiers: &[Modifier]) -> Self {
        self.pipe_map(spread(step), modifiers)
    }

    /// Add a handler that recovers: its value feeds the next step and the
    /// chain continues on the success path.
    pub fn catch<S: PipeStep + 'static>(self, step: S, modifiers: &[Modifier]) -> Self {
        self.add_handler(LinkKind::Catch, step, modifiers)
    }

    /// Add a handler that transforms a failure but keeps the chain failed;
    /// its value is routed to later handlers.
    pub fn catch_then<S: PipeStep + 'static>(self, step: S, modifiers: &[Modifier]) -> Self {
        self.add_handler(LinkKind::CatchThen, step, modifiers)
    }

    /// Add a recovering handler after which nothing else runs
    pub fn catch_stop<S: PipeStep + 'static>(self, step: S, modifiers: &[Modifier]) -> Self {
        self.add_handler(LinkKind::CatchStop, step, modifiers)
    }

    fn add_step<S: PipeStep + 'static>(
        mut self,
        kind: LinkKind,
        step: S,
        modifiers: &[Modifier],
    ) -> Self {
        self.step_count += 1;
        let (step_index, err_index) = (self.step_count, self.catch_count);
        self.push_link(kind, step_index, err_index, step, modifiers);
        self
    }

    fn add_handler<S: PipeStep + 'static>(
        mut self,
        kind: LinkKind,
        step: S,
        modifiers: &[Modifier],
    ) -> Self {
        self.catch_count += 1;
        let (step_index, err_index) = (self.step_count, self.catch_count);
        self.push_link(kind, step_index, err_index, step, modifiers);
        self
    }

    fn push_link<S: PipeStep + 'static>(
        &mut self,
        kind: LinkKind,
        step_index: usize,
        err_index: usize,
        step: S,
        modifiers: &[Modifier],
    ) {
        let params = StepParams::classify(modifiers);
        let step: SharedStep = if params.order.is_empty() {
            Arc::new(step)
        } else {
            Arc::new(reorder(step, params.order.clone()))
        };
        debug!(
            "Pipeline '{}': declared {} '{}' (step {}, handler {}) {:?}",
            self.name,
            kind.label(),
            step.name(),
            step_index,
            err_index,
            params
        );
        self.links.push(Link {
            kind,
            step_index,
            err_index,
            step,
            params,
        });
    }

    /// Run the chain and return its settled value: the first value routed past
    /// the last step, or a [`PipeError::Rejected`] carrying the first reason
    /// routed past the last handler.
    pub async fn settle(mut self) -> Result<Value> {
        debug!(
            "Executing pipeline '{}' with {} steps and {} handlers",
            self.name, self.step_count, self.catch_count
        );

        let links = std::mem::take(&mut self.links);
        let mut state = Settled::Resolved;
        for link in &links {
            let applies = match state {
                Settled::Resolved => link.kind.on_success_path(),
                Settled::Rejected => !link.kind.on_success_path(),
            };
            if !applies {
                continue;
            }
            if !self.running {
                debug!(
                    "Pipeline '{}': stopped, {} '{}' is inert",
                    self.name,
                    link.kind.label(),
                    link.step.name()
                );
                // an inert link settles as an empty success
                state = Settled::Resolved;
                continue;
            }

            state = self.run_link(link).await;

            if link.kind == LinkKind::CatchStop {
                debug!("Pipeline '{}': stopped by handler {}", self.name, link.err_index);
                self.running = false;
            }
        }

        match state {
            Settled::Resolved => {
                let value = self
                    .out
                    .first(self.step_count + 1)
                    .cloned()
                    .unwrap_or(Value::Null);
                debug!("Pipeline '{}' resolved", self.name);
                Ok(value)
            }
            Settled::Rejected => {
                let reason = self
                    .err
                    .first(self.catch_count + 1)
                    .cloned()
                    .unwrap_or(Value::Null);
                debug!("Pipeline '{}' rejected: {}", self.name, reason);
                Err(PipeError::Rejected(reason))
            }
        }
    }

    async fn run_link(&mut self, link: &Link) -> Settled {
        debug!(
            "Pipeline '{}': running {} '{}' (step {}, handler {})",
            self.name,
            link.kind.label(),
            link.step.name(),
            link.step_index,
            link.err_index
        );

        match link.kind {
            LinkKind::Pipe => {
                let args = self.out.read(link.step_index);
                let result = link.step.call(args).await;
                self.route_step(link, result)
            }
            LinkKind::Map => {
                let args = self.out.read(link.step_index);
                let result = match broadcast_rows(&args, &link.params.map_index) {
                    Ok(rows) => broadcast(&*link.step, rows).await,
                    Err(message) => {
                        let err = PipeError::invalid_step_config(link.step_index, message);
                        warn!("Pipeline '{}': {}", self.name, err);
                        Err(err.to_reason())
                    }
                };
                self.route_step(link, result)
            }
            LinkKind::Catch | LinkKind::CatchStop => {
                let args = self.err.read(link.err_index);
                match link.step.call(args).await {
                    Ok(value) => {
                        self.out.push(link.step_index, &link.params.out, value);
                        Settled::Resolved
                    }
                    Err(reason) => {
                        self.err.push(link.err_index, &link.params.err, reason);
                        Settled::Rejected
                    }
                }
            }
            LinkKind::CatchThen => {
                let args = self.err.read(link.err_index);
                match link.step.call(args).await {
                    Ok(value) => self.err.push(link.err_index, &link.params.out, value),
                    Err(reason) => self.err.push(link.err_index, &link.params.err, reason),
                }
                Settled::Rejected
            }
        }
    }

    fn route_step(&mut self, link: &Link, result: StepResult) -> Settled {
        match result {
            Ok(value) => {
                self.out.push(link.step_index, &link.params.out, value);
                Settled::Resolved
            }
            Err(reason) => {
                debug!(
                    "Pipeline '{}': step {} '{}' failed: {}",
                    self.name,
                    link.step_index,
                    link.step.name(),
                    reason
                );
                self.err.push(link.err_index, &link.params.err, reason);
                Settled::Rejected
            }
        }
    }
}

impl IntoFuture for FunctionPipe {
    type Output = Result<Value>;
    type IntoFuture = BoxFuture<'static, Result<Value>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.settle())
    }
}

/// Start a pipeline with `step` as step 1
pub fn pipe<S: PipeStep + 'static>(step: S, modifiers: &[Modifier]) -> FunctionPipe {
    FunctionPipe::new(step, modifiers)
}
