// Step modifiers and the classifier that turns them into step parameters
use crate::config::constants::DEFAULT_MAP_INDEX;
use serde::{Deserialize, Serialize};

/// Trailing option accepted by every chain-building call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "values")]
pub enum Modifier {
    /// Argument permutation applied before invocation
    Order(Vec<usize>),
    /// Relative offsets of the steps receiving a produced value
    Out(Vec<usize>),
    /// Relative offsets of the handlers receiving a failure reason
    Err(Vec<usize>),
    /// Argument positions iterated row-wise by a map step
    MapIndex(Vec<usize>),
}

/// Reorder arguments: `order([2, 0, 1])` calls `f(c, a, b)` for `(a, b, c)`
pub fn order(positions: impl IntoIterator<Item = usize>) -> Modifier {
    Modifier::Order(positions.into_iter().collect())
}

/// Route the step's value to each `offset` steps ahead
pub fn out(offsets: impl IntoIterator<Item = usize>) -> Modifier {
    Modifier::Out(offsets.into_iter().collect())
}

/// Route the step's failure reason to each `offset` handlers ahead
pub fn err(offsets: impl IntoIterator<Item = usize>) -> Modifier {
    Modifier::Err(offsets.into_iter().collect())
}

/// Broadcast the given argument positions; empty means position 0
pub fn map_index(positions: impl IntoIterator<Item = usize>) -> Modifier {
    let mut positions: Vec<usize> = positions.into_iter().collect();
    if positions.is_empty() {
        positions.push(DEFAULT_MAP_INDEX);
    }
    Modifier::MapIndex(positions)
}

/// Classified modifiers of one step.
///
/// Routing lists stay empty when absent; the buffer substitutes the default
/// offset when it consumes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepParams {
    pub order: Vec<usize>,
    pub out: Vec<usize>,
    pub err: Vec<usize>,
    pub map_index: Vec<usize>,
}

impl Default for StepParams {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            out: Vec::new(),
            err: Vec::new(),
            map_index: vec![DEFAULT_MAP_INDEX],
        }
    }
}

impl StepParams {
    /// Sort modifiers by kind. The last modifier of a kind wins.
    pub fn classify(modifiers: &[Modifier]) -> Self {
        let mut params = Self::default();
        for modifier in modifiers {
            match modifier {
                Modifier::Order(order) => params.order = order.clone(),
                Modifier::Out(out) => params.out = out.clone(),
                Modifier::Err(err) => params.err = err.clone(),
                Modifier::MapIndex(map_index) => params.map_index = map_index.clone(),
            }
        }
        params
    }
}
