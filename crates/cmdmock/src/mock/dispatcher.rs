//! Dispatcher
//!
//! Entry point installed in place of a client's native one. Every call:
//!
//! 1. copies the command input (lossy JSON round trip) before suspending
//! 2. spawns the rest onto the tokio runtime, so dispatch is never
//!    synchronous from the caller's point of view, even when the copy failed
//! 3. resolves the handler by exact command type and reads the state once
//! 4. normalizes the result and records exactly one outcome, panics included
//! 5. delivers the outcome to the returned future and the optional callback
//!
//! Only a call made outside any runtime settles synchronously.

use super::normalize::normalize;
use super::recorder::CallRecorder;
use super::registry::HandlerRegistry;
use super::state::StateCell;
use crate::client::{complete, AnyCommand, Callback, DispatchFuture, EntryPoint};
use crate::config::MockConfig;
use crate::result::{MockError, MockResult};
use futures::FutureExt;
use serde_json::Value;
use std::any::{Any, TypeId};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Components owned by one mock instance, shared with in-flight calls
pub(crate) struct Dispatcher<S> {
    pub(crate) client_name: &'static str,
    pub(crate) config: MockConfig,
    pub(crate) registry: HandlerRegistry<S>,
    pub(crate) state: StateCell<S>,
    pub(crate) recorder: CallRecorder,
}

impl<S> std::fmt::Debug for Dispatcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("client", &self.client_name)
            .field("handlers", &self.registry)
            .field("recorder", &self.recorder)
            .finish_non_exhaustive()
    }
}

impl<S> Dispatcher<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(client_name: &'static str, config: MockConfig) -> Self {
        Self {
            client_name,
            config,
            registry: HandlerRegistry::new(),
            state: StateCell::new(),
            recorder: CallRecorder::new(),
        }
    }

    /// Entry point routing every call into this dispatcher
    pub(crate) fn entry_point(self: &Arc<Self>) -> EntryPoint {
        let dispatcher = Arc::clone(self);
        EntryPoint::new(move |command, callback| dispatcher.dispatch(command, callback))
    }

    pub(crate) fn dispatch(
        self: &Arc<Self>,
        command: Box<dyn AnyCommand>,
        callback: Option<Callback>,
    ) -> DispatchFuture {
        let command_type = command.command_type();
        let command_name = command.command_name();
        tracing::trace!(
            client = self.client_name,
            command = command_name,
            "dispatching command"
        );

        let copied = command.input_json();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            let (input, err) = match copied {
                Ok(input) => (
                    input,
                    MockError::NoRuntime {
                        client: self.client_name.to_string(),
                        command: command_name.to_string(),
                    },
                ),
                Err(err) => (Value::Null, err.into()),
            };
            return self.settle_now(command_type, command_name, input, err, callback);
        };

        let task = runtime.spawn(Arc::clone(self).run(command_type, command_name, copied, callback));

        let client_name = self.client_name;
        Box::pin(async move {
            task.await.unwrap_or_else(|err| {
                let message = match err.try_into_panic() {
                    Ok(payload) => panic_message(payload.as_ref()),
                    Err(err) => err.to_string(),
                };
                Err(MockError::Dispatch {
                    client: client_name.to_string(),
                    command: command_name.to_string(),
                    message,
                })
            })
        })
    }

    /// Body of one deferred call: resolve, record exactly once, deliver
    async fn run(
        self: Arc<Self>,
        command_type: TypeId,
        command_name: &'static str,
        copied: serde_json::Result<Value>,
        callback: Option<Callback>,
    ) -> MockResult<Value> {
        let input = match copied {
            Ok(input) => input,
            Err(err) => {
                self.recorder
                    .record(command_type, command_name, Value::Null, false);
                return complete(Err(err.into()), callback);
            }
        };

        let resolved = AssertUnwindSafe(self.resolve(command_type, command_name, input.clone()))
            .catch_unwind()
            .await;
        let outcome = match resolved {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!(
                    client = self.client_name,
                    command = command_name,
                    %message,
                    "mock handler panicked"
                );
                if !self.config.catch_panics {
                    self.recorder.record(command_type, command_name, input, false);
                    let _ = complete(
                        Err(MockError::Dispatch {
                            client: self.client_name.to_string(),
                            command: command_name.to_string(),
                            message,
                        }),
                        callback,
                    );
                    std::panic::resume_unwind(payload);
                }
                Err(MockError::HandlerPanicked {
                    client: self.client_name.to_string(),
                    command: command_name.to_string(),
                    message,
                })
            }
        };

        self.recorder
            .record(command_type, command_name, input, outcome.is_ok());
        complete(outcome, callback)
    }

    async fn resolve(
        &self,
        command_type: TypeId,
        command_name: &'static str,
        input: Value,
    ) -> MockResult<Value> {
        let Some(handler) = self.registry.lookup(command_type) else {
            tracing::warn!(
                client = self.client_name,
                command = command_name,
                "no mock registered for command"
            );
            return Err(MockError::UnmappedCommand {
                client: self.client_name.to_string(),
                command: command_name.to_string(),
            });
        };

        let state = self.state.get();
        let output = handler.call(input, state).await?;
        normalize(output, &self.config, self.client_name, command_name)
    }

    /// Record and deliver an outcome when no runtime can defer it
    fn settle_now(
        &self,
        command_type: TypeId,
        command_name: &'static str,
        input: Value,
        err: MockError,
        callback: Option<Callback>,
    ) -> DispatchFuture {
        self.recorder.record(command_type, command_name, input, false);
        let outcome = complete(Err(err), callback);
        Box::pin(std::future::ready(outcome))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_default()
}
