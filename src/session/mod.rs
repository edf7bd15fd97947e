//! Session module - wallet connection lifecycle
//!
//! # Architecture
//!
//! ```text
//! UI layer (widget / host)
//!     │  connect(), disconnect(), refresh(), subscribe()
//!     ▼
//! WalletSession ── SessionState { Disconnected | Connecting | Connected(Connection) }
//!     │  request(method, params)          ▲
//!     ▼                                    │ accountsChanged / chainChanged
//! WalletProvider (injected wallet, mock) ──┘  (dispatched via LocalSpawn)
//! ```
//!
//! # State machine
//!
//! | From | Trigger | To |
//! |------|---------|----|
//! | Disconnected | `connect()` | Connecting |
//! | Connecting | success | Connected |
//! | Connecting | failure | Disconnected (previous state on `RequestPending`) |
//! | Connected | `disconnect()` / empty `accountsChanged` | Disconnected |
//! | Connected | `refresh()` / events | Connected |

mod config;
mod error;
mod provider;
#[allow(clippy::module_inception)]
mod session;
mod state;

pub use config::{NetworkEntry, SessionConfig};
pub use error::{ErrorKind, ProviderRpcError, SessionError, SessionResult};
pub use provider::{
    EventHandler, EventKind, ProviderCapabilities, ProviderEvent, SubscriptionId, WalletProvider,
};
pub use session::{ListenerId, WalletSession};
pub use state::{Connection, SessionSnapshot, SessionState, SessionStatus};
