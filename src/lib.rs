//! wallet-session: browser wallet connection. One session, explicit consent.
//!
//! # Architecture
//!
//! ```text
//! WalletWidget (wasm, page bindings)
//!   │
//!   ├── WalletSession
//!   │     ├── SessionState: Disconnected | Connecting | Connected(account, chain, balance)
//!   │     ├── observers (snapshot after every mutation)
//!   │     └── provider subscriptions (accountsChanged, chainChanged; attached once)
//!   │
//!   └── WalletProvider (trait)
//!         └── InjectedProvider (window.ethereum)
//! ```
//!
//! # Operations
//!
//! | Operation | Method | Description |
//! |-----------|--------|-------------|
//! | connect | `session.connect()` | Prompt for account permission, load chain + balance |
//! | disconnect | `session.disconnect()` | Clear local connection state |
//! | refresh | `session.refresh()` | Re-read chain + balance |
//! | subscribe | `session.subscribe(f)` | Receive a snapshot after every change |
//! | close | `session.close()` | Disconnect and drop provider subscriptions |
//!
//! # Features
//!
//! - `native` - tracing-subscriber log output on stderr for host embedders and tests
//! - `wasm` - browser provider, task spawner, DOM widget, tracing to the devtools console
//!
//! # Usage
//!
//! ```ignore
//! use wallet_session::{SessionConfig, WalletSession};
//!
//! let session = WalletSession::with_config(Some(provider), spawner, SessionConfig::default());
//! session.subscribe(|snapshot| render(snapshot));
//!
//! let snapshot = session.connect().await?;
//! assert_eq!(snapshot.network.as_deref(), Some("Ethereum Mainnet"));
//! ```

// =============================================================================
// Shared modules (compile everywhere)
// =============================================================================
pub mod core;
pub mod session;

// =============================================================================
// Log output (stderr on native, devtools console on wasm)
// =============================================================================
#[cfg(any(feature = "native", feature = "wasm"))]
pub mod logging;

// =============================================================================
// WASM-only modules (browser, wasm-bindgen)
// =============================================================================
#[cfg(feature = "wasm")]
pub mod wasm;

// =============================================================================
// Re-exports: Shared
// =============================================================================
pub use alloy_primitives::U256;
pub use crate::core::chains::NetworkTable;
pub use crate::core::notice::{Notice, NoticeLevel};
pub use crate::core::widget::{ElementIds, WidgetConfig};
pub use session::{
    Connection, ErrorKind, EventHandler, EventKind, ListenerId, NetworkEntry, ProviderCapabilities,
    ProviderEvent, ProviderRpcError, SessionConfig, SessionError, SessionResult, SessionSnapshot,
    SessionState, SessionStatus, SubscriptionId, WalletProvider, WalletSession,
};

// =============================================================================
// Re-exports: Native
// =============================================================================
#[cfg(feature = "native")]
pub use logging::init_logging;

// =============================================================================
// Re-exports: WASM
// =============================================================================
#[cfg(feature = "wasm")]
pub use wasm::{BrowserSpawner, InjectedProvider, WalletWidget};
