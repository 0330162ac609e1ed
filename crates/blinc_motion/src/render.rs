//! Render target bindings
//!
//! The host UI layer supplies a [`RenderTarget`]; the engine only ever calls
//! `write` on it. Implementations must not call back into the controller
//! that owns them.

use crate::value::AnimValue;
use std::cell::RefCell;
use std::rc::Rc;

/// Sink for animated property values
pub trait RenderTarget {
    fn write(&mut self, property: &str, value: &AnimValue);
}

impl<F> RenderTarget for F
where
    F: FnMut(&str, &AnimValue),
{
    fn write(&mut self, property: &str, value: &AnimValue) {
        self(property, value)
    }
}

/// Target that discards every write
#[derive(Clone, Copy, Debug, Default)]
pub struct NullTarget;

impl RenderTarget for NullTarget {
    fn write(&mut self, _property: &str, _value: &AnimValue) {}
}

/// Target that records writes for inspection (headless hosts and tests)
///
/// Clones share the same log, so one clone can be handed to a controller
/// while another is kept for reading.
#[derive(Clone, Debug, Default)]
pub struct RecordingTarget {
    writes: Rc<RefCell<Vec<(String, AnimValue)>>>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// All writes in order
    pub fn writes(&self) -> Vec<(String, AnimValue)> {
        self.writes.borrow().clone()
    }

    /// Most recent value written to `property`
    pub fn last(&self, property: &str) -> Option<AnimValue> {
        self.writes
            .borrow()
            .iter()
            .rev()
            .find(|(p, _)| p == property)
            .map(|(_, v)| *v)
    }

    /// Number of writes to `property`
    pub fn count(&self, property: &str) -> usize {
        self.writes
            .borrow()
            .iter()
            .filter(|(p, _)| p == property)
            .count()
    }

    pub fn len(&self) -> usize {
        self.writes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.writes.borrow_mut().clear();
    }
}

impl RenderTarget for RecordingTarget {
    fn write(&mut self, property: &str, value: &AnimValue) {
        self.writes
            .borrow_mut()
            .push((property.to_string(), *value));
    }
}
