//! Client and Command Contracts
//!
//! A client type exposes exactly one dispatch entry point; command types are
//! typed requests bound to one client. Entry points receive commands in
//! type-erased form so that a single function can serve every command of a
//! client.

use crate::result::{MockError, MockResult};
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use std::any::{Any, TypeId};
use std::future::Future;
use std::sync::Arc;

/// Future returned by every dispatch entry point
pub type DispatchFuture = BoxFuture<'static, MockResult<Value>>;

/// Completion callback receiving the same outcome as the returned future
pub type Callback = Box<dyn FnOnce(Result<&Value, &MockError>) + Send + 'static>;

/// A client type with a single dispatch entry point
pub trait Client: Send + Sync + 'static {
    /// Display name used in error messages
    const NAME: &'static str;
}

/// A typed request dispatched through its client's entry point
pub trait Command: Send + 'static {
    /// The only client this command can be sent through
    type Client: Client;
    /// Payload copied into call records and handed to handlers
    type Input: Serialize + ?Sized;
    /// Display name used in call records and error messages
    const NAME: &'static str;

    /// Borrow the command payload
    fn input(&self) -> &Self::Input;
}

/// Type-erased view of a [`Command`] as seen by an entry point
pub trait AnyCommand: Send {
    /// Exact type identity of the command
    fn command_type(&self) -> TypeId;
    /// Display name of the command
    fn command_name(&self) -> &'static str;
    /// Display name of the client the command belongs to
    fn client_name(&self) -> &'static str;
    /// Copy the payload into a detached JSON value
    fn input_json(&self) -> serde_json::Result<Value>;
    /// Recover the concrete command (downcast with `Box::<dyn Any>::downcast`)
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

impl<C: Command> AnyCommand for C {
    fn command_type(&self) -> TypeId {
        TypeId::of::<C>()
    }

    fn command_name(&self) -> &'static str {
        C::NAME
    }

    fn client_name(&self) -> &'static str {
        <C::Client as Client>::NAME
    }

    fn input_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self.input())
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

impl std::fmt::Debug for dyn AnyCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyCommand")
            .field("client", &self.client_name())
            .field("command", &self.command_name())
            .finish()
    }
}

type EntryFn = dyn Fn(Box<dyn AnyCommand>, Option<Callback>) -> DispatchFuture + Send + Sync;

/// A client's dispatch entry point
///
/// Cloning shares the same function; [`EntryPoint::ptr_eq`] tells whether two
/// handles refer to the same installation.
#[derive(Clone)]
pub struct EntryPoint {
    inner: Arc<EntryFn>,
}

impl std::fmt::Debug for EntryPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryPoint")
            .field("ptr", &Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

impl EntryPoint {
    /// Create an entry point that handles the callback itself
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Box<dyn AnyCommand>, Option<Callback>) -> DispatchFuture + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Create an entry point from an async function
    ///
    /// The callback, when supplied, is invoked once the returned future
    /// completes.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(Box<dyn AnyCommand>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = MockResult<Value>> + Send + 'static,
    {
        Self::new(move |command, callback| {
            let fut = f(command);
            Box::pin(async move { complete(fut.await, callback) })
        })
    }

    /// Invoke the entry point
    pub fn call(&self, command: Box<dyn AnyCommand>, callback: Option<Callback>) -> DispatchFuture {
        (self.inner)(command, callback)
    }

    /// Whether both handles point at the same function
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Hand `outcome` to `callback`, if any, and return it
pub fn complete(outcome: MockResult<Value>, callback: Option<Callback>) -> MockResult<Value> {
    if let Some(callback) = callback {
        callback(outcome.as_ref());
    }
    outcome
}
