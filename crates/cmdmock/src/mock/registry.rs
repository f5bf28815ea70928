//! Handler Registry
//!
//! Maps exact command type identity to the handler producing its mocked
//! result. Lookups never consider names or related types.

use crate::result::{BoxError, MockError, MockResult};
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use std::any::TypeId;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

/// Future produced by a handler, already converted to JSON
pub type HandlerFuture = BoxFuture<'static, MockResult<Value>>;

/// Values a handler may resolve to
///
/// Implemented for `Result<T, E>` where `T: Serialize`. The error is kept
/// as-is inside [`MockError::Handler`]; the output is detached through JSON.
pub trait IntoHandlerResult {
    /// Convert into the JSON outcome of a handler
    fn into_handler_result(self) -> MockResult<Value>;
}

impl<T, E> IntoHandlerResult for Result<T, E>
where
    T: Serialize,
    E: Into<BoxError>,
{
    fn into_handler_result(self) -> MockResult<Value> {
        let output = self.map_err(|err| MockError::Handler(err.into()))?;
        Ok(serde_json::to_value(&output)?)
    }
}

/// Produces the mocked result for one command type
///
/// Implemented for every `Fn(Value, Option<S>) -> impl Future` whose output
/// implements [`IntoHandlerResult`].
pub trait Handler<S>: Send + Sync + 'static {
    /// Invoke the handler with the copied input and the current state
    fn call(&self, input: Value, state: Option<S>) -> HandlerFuture;
}

impl<S, F, Fut> Handler<S> for F
where
    F: Fn(Value, Option<S>) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoHandlerResult,
{
    fn call(&self, input: Value, state: Option<S>) -> HandlerFuture {
        let fut = self(input, state);
        Box::pin(async move { fut.await.into_handler_result() })
    }
}

/// Registered handlers keyed by command type
pub struct HandlerRegistry<S> {
    handlers: RwLock<HashMap<TypeId, Arc<dyn Handler<S>>>>,
}

impl<S> Default for HandlerRegistry<S> {
    fn default() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }
}

impl<S> std::fmt::Debug for HandlerRegistry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers_count", &self.len())
            .finish()
    }
}

impl<S> HandlerRegistry<S> {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `handler` for `command`, replacing any previous one
    pub fn register(&self, command: TypeId, handler: Arc<dyn Handler<S>>) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(command, handler);
    }

    /// Handler registered for exactly `command`
    #[must_use]
    pub fn lookup(&self, command: TypeId) -> Option<Arc<dyn Handler<S>>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&command)
            .cloned()
    }

    /// Whether a handler exists for `command`
    #[must_use]
    pub fn contains(&self, command: TypeId) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&command)
    }

    /// Number of registered command types
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
