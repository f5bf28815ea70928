//! Client Mocking
//!
//! A [`ClientMock`] intercepts every command sent to one client type, routes
//! it to the handler registered for the command's exact type, and records the
//! outcome.
//!
//! ## Example
//!
//! ```rust,ignore
//! use cmdmock::{ClientMock, DispatchTable};
//!
//! let table = Arc::new(DispatchTable::new());
//! table.register::<Accounts>(native_entry_point());
//!
//! let mock = ClientMock::<Accounts>::new(&table)?;
//! mock.on_sync::<DescribeAccount, _>(|_input, _state| {
//!     Ok::<_, Infallible>(json!({ "Account": "X" }))
//! });
//!
//! let out = table.client::<Accounts>().send(DescribeAccount::default()).await?;
//! assert_eq!(out["$metadata"]["httpStatusCode"], 200);
//!
//! mock.destroy();
//! ```

mod dispatcher;
pub mod normalize;
pub mod recorder;
pub mod registry;
pub mod state;

pub use normalize::{is_falsy, REQUEST_ID_FIELD, STATUS_CODE_FIELD};
pub use recorder::{CallRecord, CallRecorder};
pub use registry::{Handler, HandlerFuture, HandlerRegistry, IntoHandlerResult};
pub use state::StateCell;

use crate::client::{Client, Command};
use crate::config::MockConfig;
use crate::interceptor::Interceptor;
use crate::result::{BoxError, MockError, MockResult};
use crate::table::DispatchTable;
use dispatcher::Dispatcher;
use serde_json::Value;
use std::any::TypeId;
use std::convert::Infallible;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// Mock bound to client type `C`, with handler state of type `S`
pub struct ClientMock<C: Client, S = Value>
where
    S: Clone + Send + Sync + 'static,
{
    dispatcher: Arc<Dispatcher<S>>,
    interceptor: Interceptor,
    _client: PhantomData<fn() -> C>,
}

impl<C, S> std::fmt::Debug for ClientMock<C, S>
where
    C: Client,
    S: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientMock")
            .field("client", &C::NAME)
            .field("handlers_count", &self.dispatcher.registry.len())
            .field("calls_count", &self.dispatcher.recorder.len())
            .field("installed", &self.interceptor.is_installed())
            .finish()
    }
}

impl<C, S> ClientMock<C, S>
where
    C: Client,
    S: Clone + Send + Sync + 'static,
{
    /// Intercept client `C` in `table` with the default config
    pub fn new(table: &Arc<DispatchTable>) -> MockResult<Self> {
        Self::with_config(table, MockConfig::default())
    }

    /// Intercept client `C` in `table`
    ///
    /// Fails with [`MockError::NoEntryPoint`] when `C` is not registered.
    pub fn with_config(table: &Arc<DispatchTable>, config: MockConfig) -> MockResult<Self> {
        let dispatcher = Arc::new(Dispatcher::new(C::NAME, config));
        let interceptor = Interceptor::install::<C>(table, dispatcher.entry_point())?;
        Ok(Self {
            dispatcher,
            interceptor,
            _client: PhantomData,
        })
    }

    /// Register `handler` for commands of exactly type `Cmd`
    ///
    /// Replaces any handler previously registered for `Cmd`.
    pub fn on<Cmd, Fut>(
        &self,
        handler: impl Fn(Value, Option<S>) -> Fut + Send + Sync + 'static,
    ) -> &Self
    where
        Cmd: Command<Client = C>,
        Fut: Future + Send + 'static,
        Fut::Output: IntoHandlerResult,
    {
        tracing::debug!(client = C::NAME, command = Cmd::NAME, "registering mock handler");
        self.dispatcher
            .registry
            .register(TypeId::of::<Cmd>(), Arc::new(handler));
        self
    }

    /// Register a synchronous handler for `Cmd`
    ///
    /// Dispatch stays asynchronous for callers.
    pub fn on_sync<Cmd, R>(
        &self,
        handler: impl Fn(Value, Option<S>) -> R + Send + Sync + 'static,
    ) -> &Self
    where
        Cmd: Command<Client = C>,
        R: IntoHandlerResult + Send + 'static,
    {
        self.on::<Cmd, _>(move |input: Value, state: Option<S>| {
            std::future::ready(handler(input, state))
        })
    }

    /// Always answer `Cmd` with `value`
    pub fn resolves<Cmd>(&self, value: Value) -> &Self
    where
        Cmd: Command<Client = C>,
    {
        self.on_sync::<Cmd, _>(move |_, _| Ok::<_, Infallible>(value.clone()))
    }

    /// Always fail `Cmd` with `message`
    pub fn rejects<Cmd>(&self, message: &str) -> &Self
    where
        Cmd: Command<Client = C>,
    {
        let message = message.to_string();
        self.on_sync::<Cmd, _>(move |_, _| Err::<Value, BoxError>(message.clone().into()))
    }

    /// Replace the state handed to handlers
    pub fn set_state(&self, state: Option<S>) {
        self.dispatcher.state.set(state);
    }

    /// Current handler state
    #[must_use]
    pub fn state(&self) -> Option<S> {
        self.dispatcher.state.get()
    }

    /// Calls recorded so far, in completion order
    #[must_use]
    pub fn calls(&self) -> Vec<CallRecord> {
        self.dispatcher.recorder.snapshot()
    }

    /// Clear state and call log, returning the log as it was
    pub fn reset(&self) -> Vec<CallRecord> {
        self.dispatcher.state.clear();
        self.dispatcher.recorder.drain()
    }

    /// Restore the client's original entry point
    ///
    /// Calls already in flight still complete and are still recorded. Later
    /// calls on the client no longer reach this mock. Calling again does
    /// nothing.
    pub fn destroy(&self) {
        self.interceptor.restore();
    }

    /// Whether this mock still intercepts the client
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.interceptor.is_installed()
    }

    /// Whether a handler is registered for `Cmd`
    #[must_use]
    pub fn handles<Cmd>(&self) -> bool
    where
        Cmd: Command<Client = C>,
    {
        self.dispatcher.registry.contains(TypeId::of::<Cmd>())
    }

    /// Config this mock was built with
    #[must_use]
    pub fn config(&self) -> &MockConfig {
        &self.dispatcher.config
    }

    // =========================================================================
    // Call inspection
    // =========================================================================

    /// Recorded calls of exactly command type `Cmd`
    ///
    /// Commands of other types sharing `Cmd`'s display name are not included.
    #[must_use]
    pub fn calls_of<Cmd>(&self) -> Vec<CallRecord>
    where
        Cmd: Command<Client = C>,
    {
        self.dispatcher.recorder.snapshot_of(TypeId::of::<Cmd>())
    }

    /// Number of recorded calls
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.dispatcher.recorder.len()
    }

    /// Assert `Cmd` was dispatched at least once
    pub fn assert_called<Cmd>(&self) -> MockResult<()>
    where
        Cmd: Command<Client = C>,
    {
        if self.calls_of::<Cmd>().is_empty() {
            return Err(MockError::AssertionFailed {
                message: format!(
                    "Expected \"{}.{}\" to be called, but it was not",
                    C::NAME,
                    Cmd::NAME
                ),
            });
        }
        Ok(())
    }

    /// Assert `Cmd` was dispatched exactly `times` times
    pub fn assert_called_times<Cmd>(&self, times: usize) -> MockResult<()>
    where
        Cmd: Command<Client = C>,
    {
        let found = self.calls_of::<Cmd>().len();
        if found != times {
            return Err(MockError::AssertionFailed {
                message: format!(
                    "Expected {} calls of \"{}.{}\", but found {}",
                    times,
                    C::NAME,
                    Cmd::NAME,
                    found
                ),
            });
        }
        Ok(())
    }

    /// Assert `Cmd` was never dispatched
    pub fn assert_not_called<Cmd>(&self) -> MockResult<()>
    where
        Cmd: Command<Client = C>,
    {
        let found = self.calls_of::<Cmd>().len();
        if found != 0 {
            return Err(MockError::AssertionFailed {
                message: format!(
                    "Expected no calls of \"{}.{}\", but found {}",
                    C::NAME,
                    Cmd::NAME,
                    found
                ),
            });
        }
        Ok(())
    }
}
