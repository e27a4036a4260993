// Indexed argument buffers shared by the success and failure paths
use crate::config::constants::DEFAULT_ROUTE;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::trace;

/// Maps a step (or handler) index to the arguments queued for it.
///
/// Slots are created on first push and keep values in push order, so a step
/// that receives values from several producers is called with several
/// positional arguments.
#[derive(Debug, Clone, Default)]
pub struct PipeBuffer {
    label: &'static str,
    slots: IndexMap<usize, Vec<Value>>,
}

impl PipeBuffer {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            slots: IndexMap::new(),
        }
    }

    /// Append `value` to `current + offset` for every routing offset.
    /// Empty routing means the next slot.
    pub fn push(&mut self, current: usize, routing: &[usize], value: Value) {
        let routing = if routing.is_empty() {
            &[DEFAULT_ROUTE][..]
        } else {
            routing
        };
        for offset in routing {
            let Some(target) = current.checked_add(*offset) else {
                trace!(
                    "{} buffer: slot {} offset {} overflows, dropped",
                    self.label, current, offset
                );
                continue;
            };
            trace!(
                "{} buffer: slot {} -> {} ({})",
                self.label, current, target, value
            );
            self.slots.entry(target).or_default().push(value.clone());
        }
    }

    /// Arguments accumulated for `index`; empty if nothing was routed there
    pub fn read(&self, index: usize) -> Vec<Value> {
        self.slots.get(&index).cloned().unwrap_or_default()
    }

    /// First value routed to `index`
    pub fn first(&self, index: usize) -> Option<&Value> {
        self.slots.get(&index).and_then(|values| values.first())
    }

    /// Number of slots written so far
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
