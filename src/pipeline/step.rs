// Step callables - the opaque functions a pipeline invokes
use crate::config::constants::ANONYMOUS_STEP;
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Outcome of one step invocation: `Ok` resolves, `Err` rejects with a reason
pub type StepResult = std::result::Result<Value, Value>;

/// A callable the pipeline invokes with the positional arguments accumulated
/// in its buffer slot.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use fnpipe::pipeline::{PipeStep, StepResult};
/// use serde_json::{Value, json};
///
/// struct AddHundred;
///
/// #[async_trait]
/// impl PipeStep for AddHundred {
///     async fn call(&self, args: Vec<Value>) -> StepResult {
///         let age = args.first().and_then(Value::as_i64).ok_or(Value::Null)?;
///         Ok(json!(age + 100))
///     }
/// }
/// ```
#[async_trait]
pub trait PipeStep: Send + Sync {
    fn name(&self) -> String {
        ANONYMOUS_STEP.to_string()
    }

    async fn call(&self, args: Vec<Value>) -> StepResult;
}

/// Shared handle to a step, cloned into every wrapper that needs it
pub type SharedStep = Arc<dyn PipeStep>;

#[async_trait]
impl<S: PipeStep + ?Sized> PipeStep for Arc<S> {
    fn name(&self) -> String {
        (**self).name()
    }

    async fn call(&self, args: Vec<Value>) -> StepResult {
        (**self).call(args).await
    }
}

#[async_trait]
impl<S: PipeStep + ?Sized> PipeStep for Box<S> {
    fn name(&self) -> String {
        (**self).name()
    }

    async fn call(&self, args: Vec<Value>) -> StepResult {
        (**self).call(args).await
    }
}

/// Async closure adapter
pub struct FnStep<F> {
    name: String,
    func: F,
}

impl<F> FnStep<F> {
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl<F, Fut> PipeStep for FnStep<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = StepResult> + Send,
{
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn call(&self, args: Vec<Value>) -> StepResult {
        (self.func)(args).await
    }
}

/// Plain closure adapter. The immediate result is wrapped so that sync and
/// async steps settle the same way.
pub struct SyncStep<F> {
    name: String,
    func: F,
}

impl<F> SyncStep<F> {
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl<F> PipeStep for SyncStep<F>
where
    F: Fn(Vec<Value>) -> StepResult + Send + Sync,
{
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn call(&self, args: Vec<Value>) -> StepResult {
        (self.func)(args)
    }
}

/// Wrap an async closure as a step
pub fn step_fn<F, Fut>(func: F) -> FnStep<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = StepResult> + Send,
{
    FnStep {
        name: ANONYMOUS_STEP.to_string(),
        func,
    }
}

/// Wrap a synchronous closure that may fail
pub fn sync_fn<F>(func: F) -> SyncStep<F>
where
    F: Fn(Vec<Value>) -> StepResult + Send + Sync,
{
    SyncStep {
        name: ANONYMOUS_STEP.to_string(),
        func,
    }
}

/// Wrap a synchronous closure that always resolves
pub fn value_fn<F>(func: F) -> SyncStep<impl Fn(Vec<Value>) -> StepResult + Send + Sync>
where
    F: Fn(Vec<Value>) -> Value + Send + Sync,
{
    sync_fn(move |args| Ok(func(args)))
}
