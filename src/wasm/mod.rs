//! WASM module: the session wired into a browser page
//!
//! Provides WalletWidget for pages with an injected wallet (`window.ethereum`):
//! - InjectedProvider: EIP-1193 object behind the WalletProvider trait
//! - BrowserSpawner: provider events run on the page's microtask queue
//! - WalletWidget: buttons, status alert and info panel bound via web-sys
//!
//! Architecture:
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         WalletWidget (JS API)           │
//! │  connect, disconnect, refresh, snapshot │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │            WalletSession                │
//! │  status / account / chain / balance     │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │          InjectedProvider               │
//! │  request(), on(), removeListener()      │
//! └─────────────────────────────────────────┘
//! ```

mod provider;
mod spawner;
mod widget;

pub use provider::InjectedProvider;
pub use spawner::BrowserSpawner;
pub use widget::WalletWidget;

use wasm_bindgen::prelude::*;

/// Runs on module load: panics and session logs go to the devtools console.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    crate::logging::init_console_logging();
}
