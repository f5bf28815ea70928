//! Dispatch Table
//!
//! Explicit registration table of client entry points, keyed by client type
//! identity. Client handles resolve their entry point on every send, so an
//! interception installed or restored on the table is observed by handles
//! created before it.

use crate::client::{complete, Callback, Client, Command, DispatchFuture, EntryPoint};
use crate::result::MockError;
use std::any::TypeId;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock};

/// Entry points of every registered client type
#[derive(Debug, Default)]
pub struct DispatchTable {
    slots: RwLock<HashMap<TypeId, EntryPoint>>,
}

impl DispatchTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the native entry point of client `C`
    ///
    /// Returns the entry point previously registered for `C`.
    pub fn register<C: Client>(&self, entry: EntryPoint) -> Option<EntryPoint> {
        tracing::debug!(client = C::NAME, "registering entry point");
        self.write().insert(TypeId::of::<C>(), entry)
    }

    /// Remove the entry point of client `C`
    pub fn unregister<C: Client>(&self) -> Option<EntryPoint> {
        self.write().remove(&TypeId::of::<C>())
    }

    /// Current entry point of client `C`
    #[must_use]
    pub fn entry_point<C: Client>(&self) -> Option<EntryPoint> {
        self.read().get(&TypeId::of::<C>()).cloned()
    }

    /// Whether client `C` exposes an entry point
    #[must_use]
    pub fn is_registered<C: Client>(&self) -> bool {
        self.read().contains_key(&TypeId::of::<C>())
    }

    /// Number of registered client types
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no client type is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Create a handle that sends commands of client `C` through this table
    #[must_use]
    pub fn client<C: Client>(self: &Arc<Self>) -> ClientHandle<C> {
        ClientHandle {
            table: Arc::clone(self),
            _client: PhantomData,
        }
    }

    /// Swap the entry point of `client`, only when one is present
    ///
    /// Read and replace happen under one write lock.
    pub(crate) fn replace_existing(
        &self,
        client: TypeId,
        entry: EntryPoint,
    ) -> Option<EntryPoint> {
        let mut slots = self.write();
        let slot = slots.get_mut(&client)?;
        Some(std::mem::replace(slot, entry))
    }

    /// Write `entry` for `client` unconditionally
    pub(crate) fn restore(&self, client: TypeId, entry: EntryPoint) {
        self.write().insert(client, entry);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<TypeId, EntryPoint>> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<TypeId, EntryPoint>> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Caller-side handle for client `C`
pub struct ClientHandle<C: Client> {
    table: Arc<DispatchTable>,
    _client: PhantomData<fn() -> C>,
}

impl<C: Client> Clone for ClientHandle<C> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            _client: PhantomData,
        }
    }
}

impl<C: Client> std::fmt::Debug for ClientHandle<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHandle")
            .field("client", &C::NAME)
            .finish()
    }
}

impl<C: Client> ClientHandle<C> {
    /// Send a command and await its outcome
    pub fn send<Cmd>(&self, command: Cmd) -> DispatchFuture
    where
        Cmd: Command<Client = C>,
    {
        self.dispatch(command, None)
    }

    /// Send a command, delivering the outcome to `callback` as well
    pub fn send_with_callback<Cmd, F>(&self, command: Cmd, callback: F) -> DispatchFuture
    where
        Cmd: Command<Client = C>,
        F: FnOnce(Result<&serde_json::Value, &MockError>) + Send + 'static,
    {
        self.dispatch(command, Some(Box::new(callback)))
    }

    fn dispatch<Cmd>(&self, command: Cmd, callback: Option<Callback>) -> DispatchFuture
    where
        Cmd: Command<Client = C>,
    {
        match self.table.entry_point::<C>() {
            Some(entry) => entry.call(Box::new(command), callback),
            None => {
                let outcome = complete(
                    Err(MockError::NoEntryPoint {
                        client: C::NAME.to_string(),
                    }),
                    callback,
                );
                Box::pin(std::future::ready(outcome))
            }
        }
    }
}
