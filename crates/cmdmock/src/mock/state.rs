//! Shared handler state.

use std::sync::{PoisonError, RwLock};

/// Single slot holding the state passed to every handler
///
/// The value is handed out by `Clone`; use an `Arc`-backed type when
/// handlers should mutate state that outlives one call.
#[derive(Debug)]
pub struct StateCell<S> {
    value: RwLock<Option<S>>,
}

impl<S> Default for StateCell<S> {
    fn default() -> Self {
        Self {
            value: RwLock::new(None),
        }
    }
}

impl<S: Clone> StateCell<S> {
    /// Create an empty cell
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current value
    pub fn set(&self, value: Option<S>) {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = value;
    }

    /// Current value
    #[must_use]
    pub fn get(&self) -> Option<S> {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reset to no state
    pub fn clear(&self) {
        self.set(None);
    }
}
