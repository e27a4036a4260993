//! Collection adapters usable directly as pipe steps

use crate::pipeline::step::{PipeStep, StepResult};
use async_trait::async_trait;
use serde_json::{Value, json};

/// `(key, item)` pairs of an array (numeric keys) or object (string keys).
/// Anything else has no entries.
fn entries(items: &Value) -> Vec<(Value, &Value)> {
    match items {
        Value::Array(values) => values
            .iter()
            .enumerate()
            .map(|(index, item)| (json!(index), item))
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(key, item)| (Value::String(key.clone()), item))
            .collect(),
        _ => Vec::new(),
    }
}

pub struct MapEach<F> {
    func: F,
}

#[async_trait]
impl<F> PipeStep for MapEach<F>
where
    F: Fn(&Value, Value, &[Value]) -> Value + Send + Sync,
{
    async fn call(&self, args: Vec<Value>) -> StepResult {
        let Some((items, extra)) = args.split_first() else {
            return Ok(Value::Array(Vec::new()));
        };
        let mapped = entries(items)
            .into_iter()
            .map(|(key, item)| (self.func)(item, key, extra))
            .collect();
        Ok(Value::Array(mapped))
    }
}

/// Turn `f(item, key, extra)` into a step taking `(collection, ...extra)` and
/// resolving to the array of results.
pub fn map_each<F>(func: F) -> MapEach<F>
where
    F: Fn(&Value, Value, &[Value]) -> Value + Send + Sync,
{
    MapEach { func }
}

pub struct ForEach<F> {
    func: F,
}

#[async_trait]
impl<F> PipeStep for ForEach<F>
where
    F: Fn(&Value, Value, &[Value]) + Send + Sync,
{
    async fn call(&self, args: Vec<Value>) -> StepResult {
        let Some((items, extra)) = args.split_first() else {
            return Ok(Value::Null);
        };
        for (key, item) in entries(items) {
            (self.func)(item, key, extra);
        }
        Ok(items.clone())
    }
}

/// Like [`map_each`], but resolves to the original collection
pub fn for_each<F>(func: F) -> ForEach<F>
where
    F: Fn(&Value, Value, &[Value]) + Send + Sync,
{
    ForEach { func }
}
