//! Argument transformation helpers
//!
//! Wrappers that adapt a step's positional arguments before it runs:
//! permutation, array spreading, partial application and deferred calls.

use crate::pipeline::step::{PipeStep, StepResult};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Apply an argument permutation.
///
/// Position `i` receives `args[order[i]]` (`Null` when out of range);
/// arguments past the permutation length stay where they are.
pub fn rearrange(args: Vec<Value>, order: &[usize]) -> Vec<Value> {
    if order.is_empty() {
        return args;
    }
    let mut arranged = args.clone();
    for (slot, &source) in order.iter().enumerate().take(args.len()) {
        arranged[slot] = args.get(source).cloned().unwrap_or(Value::Null);
    }
    arranged
}

/// Expand a leading array into positional arguments.
///
/// A `Null` first argument expands to nothing, any other scalar is kept as a
/// single argument. Trailing arguments follow the expanded ones.
pub fn spread_args(args: Vec<Value>) -> Vec<Value> {
    let mut args = args.into_iter();
    let mut spread = match args.next() {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![other],
    };
    spread.extend(args);
    spread
}

/// Step wrapper that permutes arguments before calling the inner step
pub struct Reordered<S> {
    inner: S,
    order: Vec<usize>,
}

#[async_trait]
impl<S: PipeStep> PipeStep for Reordered<S> {
    fn name(&self) -> String {
        self.inner.name()
    }

    async fn call(&self, args: Vec<Value>) -> StepResult {
        self.inner.call(rearrange(args, &self.order)).await
    }
}

/// Reorder the arguments of `step`; `reorder(f, [2, 0, 1])` turns `(a, b, c)`
/// into `f(c, a, b)`.
pub fn reorder<S: PipeStep>(step: S, order: impl IntoIterator<Item = usize>) -> Reordered<S> {
    Reordered {
        inner: step,
        order: order.into_iter().collect(),
    }
}

/// Step wrapper that spreads a leading array argument
pub struct Spread<S> {
    inner: S,
}

#[async_trait]
impl<S: PipeStep> PipeStep for Spread<S> {
    fn name(&self) -> String {
        self.inner.name()
    }

    async fn call(&self, args: Vec<Value>) -> StepResult {
        self.inner.call(spread_args(args)).await
    }
}

pub fn spread<S: PipeStep>(step: S) -> Spread<S> {
    Spread { inner: step }
}

/// Function evaluated by a deferred call
pub type LazyFn = Arc<dyn Fn(Vec<Value>) -> Value + Send + Sync>;

/// A function and its arguments, evaluated only when the consuming step runs
#[derive(Clone)]
pub struct LazyCall {
    func: LazyFn,
    args: Vec<Value>,
}

impl LazyCall {
    pub fn call(&self) -> Value {
        (self.func)(self.args.clone())
    }
}

impl fmt::Debug for LazyCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyCall")
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// Argument slot of a bound step
#[derive(Debug, Clone)]
pub enum Arg {
    Value(Value),
    /// Evaluated right before the bound step is invoked
    Deferred(LazyCall),
    /// Filled by the next call-time argument
    Placeholder,
}

/// Shorthand for [`Arg::Placeholder`]
pub const PLACEHOLDER: Arg = Arg::Placeholder;

impl Arg {
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    /// Final value of this slot; unfilled placeholders become `Null`
    pub fn resolve(self) -> Value {
        match self {
            Self::Value(value) => value,
            Self::Deferred(call) => call.call(),
            Self::Placeholder => Value::Null,
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<LazyCall> for Arg {
    fn from(call: LazyCall) -> Self {
        Self::Deferred(call)
    }
}

/// Defer `func(args)` until the step holding it runs
pub fn lazy<F>(func: F, args: Vec<Value>) -> Arg
where
    F: Fn(Vec<Value>) -> Value + Send + Sync + 'static,
{
    Arg::Deferred(LazyCall {
        func: Arc::new(func),
        args,
    })
}

/// Resolution pass run immediately before invocation
pub fn resolve_args(args: Vec<Arg>) -> Vec<Value> {
    args.into_iter().map(Arg::resolve).collect()
}

/// Merge bound slots with call-time arguments: placeholders are filled left to
/// right, leftover call arguments are appended.
fn assemble(bound: &[Arg], call_args: Vec<Value>) -> Vec<Arg> {
    let mut call_args = call_args.into_iter();
    let mut assembled: Vec<Arg> = bound
        .iter()
        .map(|slot| match slot {
            Arg::Placeholder => call_args
                .next()
                .map(Arg::Value)
                .unwrap_or(Arg::Placeholder),
            other => other.clone(),
        })
        .collect();
    assembled.extend(call_args.map(Arg::Value));
    assembled
}

/// Step with some leading arguments fixed
pub struct Bound<S> {
    inner: S,
    args: Vec<Arg>,
}

#[async_trait]
impl<S: PipeStep> PipeStep for Bound<S> {
    fn name(&self) -> String {
        self.inner.name()
    }

    async fn call(&self, args: Vec<Value>) -> StepResult {
        let args = resolve_args(assemble(&self.args, args));
        self.inner.call(args).await
    }
}

/// Partially apply `step`. Deferred calls among the final arguments are
/// evaluated each time the bound step runs.
pub fn bind<S: PipeStep>(step: S, args: Vec<Arg>) -> Bound<S> {
    Bound { inner: step, args }
}

/// Async function bound to a context object and leading arguments
pub struct BoundWith<C, F> {
    context: Arc<C>,
    func: F,
    args: Vec<Arg>,
}

#[async_trait]
impl<C, F, Fut> PipeStep for BoundWith<C, F>
where
    C: Send + Sync,
    F: Fn(Arc<C>, Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = StepResult> + Send,
{
    async fn call(&self, args: Vec<Value>) -> StepResult {
        let args = resolve_args(assemble(&self.args, args));
        (self.func)(Arc::clone(&self.context), args).await
    }
}

/// Like [`bind`], with `func` also receiving a fixed context object
pub fn bind_with<C, F, Fut>(context: Arc<C>, func: F, args: Vec<Arg>) -> BoundWith<C, F>
where
    C: Send + Sync,
    F: Fn(Arc<C>, Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = StepResult> + Send,
{
    BoundWith {
        context,
        func,
        args,
    }
}
