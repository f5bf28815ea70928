//! Interceptor Installation
//!
//! Captures a client type's entry point and swaps in a replacement. Restoring
//! writes back the exact captured entry point, so no trace of the replacement
//! remains in the dispatch path.

use crate::client::{Client, EntryPoint};
use crate::result::{MockError, MockResult};
use crate::table::DispatchTable;
use std::any::TypeId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Restore handle for one installed replacement
#[derive(Debug)]
pub struct Interceptor {
    table: Arc<DispatchTable>,
    client: TypeId,
    client_name: &'static str,
    original: EntryPoint,
    installed: AtomicBool,
}

impl Interceptor {
    /// Replace the entry point of client `C` with `replacement`
    ///
    /// Fails when `C` has no entry point registered in `table`.
    pub fn install<C: Client>(
        table: &Arc<DispatchTable>,
        replacement: EntryPoint,
    ) -> MockResult<Self> {
        let client = TypeId::of::<C>();
        let original = table
            .replace_existing(client, replacement)
            .ok_or_else(|| MockError::NoEntryPoint {
                client: C::NAME.to_string(),
            })?;
        tracing::debug!(client = C::NAME, "installed command interceptor");
        Ok(Self {
            table: Arc::clone(table),
            client,
            client_name: C::NAME,
            original,
            installed: AtomicBool::new(true),
        })
    }

    /// Write the captured entry point back
    ///
    /// Returns `false` when already restored.
    pub fn restore(&self) -> bool {
        if !self.installed.swap(false, Ordering::AcqRel) {
            return false;
        }
        self.table.restore(self.client, self.original.clone());
        tracing::debug!(client = self.client_name, "restored original entry point");
        true
    }

    /// Whether the replacement is still installed
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::Acquire)
    }

    /// Entry point captured at installation
    #[must_use]
    pub const fn original(&self) -> &EntryPoint {
        &self.original
    }
}
