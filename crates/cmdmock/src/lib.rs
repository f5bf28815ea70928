//! cmdmock: Command-Dispatch Interception for Tests
//!
//! Clients in the command pattern expose one entry point that accepts typed
//! command objects. `cmdmock` swaps that entry point for a mock which routes
//! each command, by its exact type, to a handler supplied by the test, and
//! records every call.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      CMDMOCK Architecture                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Client     │    │ Dispatch   │    │ ClientMock │            │
//! │   │ Handle     │───►│ Table      │───►│ Dispatcher │            │
//! │   │ send(cmd)  │    │ (TypeId)   │    │            │            │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │                                             │                   │
//! │                     ┌────────────┐    ┌─────▼──────┐            │
//! │                     │ Call       │◄───│ Handler    │            │
//! │                     │ Recorder   │    │ Registry   │            │
//! │                     └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use cmdmock::{Client, ClientMock, Command, DispatchTable};
//!
//! #[derive(Client)]
//! struct Organizations;
//!
//! #[derive(Command)]
//! #[command(client = Organizations)]
//! struct DescribeAccount {
//!     #[command(input)]
//!     input: serde_json::Value,
//! }
//!
//! let table = Arc::new(DispatchTable::new());
//! table.register::<Organizations>(native_entry_point());
//!
//! let mock = ClientMock::<Organizations>::new(&table)?;
//! mock.resolves::<DescribeAccount>(json!({ "Account": "X" }));
//!
//! let out = table
//!     .client::<Organizations>()
//!     .send(DescribeAccount { input: json!({}) })
//!     .await?;
//! assert_eq!(out["Account"], "X");
//! mock.assert_called_times::<DescribeAccount>(1)?;
//! mock.destroy();
//! ```

#![warn(missing_docs)]

/// Client and command contracts, entry points
pub mod client;

/// Mock configuration
pub mod config;

/// Entry point replacement and restoration
pub mod interceptor;

/// Client mocks, handlers, and call records
pub mod mock;

/// Error types
pub mod result;

/// Per-client entry point registry
pub mod table;

/// Test log output
pub mod tracing_support;

pub use client::{complete, AnyCommand, Callback, Client, Command, DispatchFuture, EntryPoint};
pub use config::MockConfig;
pub use interceptor::Interceptor;
pub use mock::{CallRecord, ClientMock, Handler, IntoHandlerResult};
pub use result::{BoxError, MockError, MockResult};
pub use table::{ClientHandle, DispatchTable};
pub use tracing_support::init_test_tracing;

#[cfg(feature = "derive")]
pub use cmdmock_derive::{Client, Command};

/// Common imports for tests
pub mod prelude {
    pub use crate::client::{Client, Command};
    pub use crate::mock::{CallRecord, ClientMock};
    pub use crate::result::{MockError, MockResult};
    pub use crate::table::DispatchTable;
    #[cfg(feature = "derive")]
    pub use cmdmock_derive::{Client, Command};
}
