//! Session view state and the snapshot handed to the UI.

use alloy_primitives::U256;
use serde::Serialize;

use super::config::SessionConfig;
use crate::core::chains::NetworkTable;
use crate::core::units;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Disconnected => "disconnected",
            SessionStatus::Connecting => "connecting",
            SessionStatus::Connected => "connected",
        }
    }
}

/// Everything known about a live connection. Only exists while connected,
/// so account, chain and balance are always present together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub account: String,
    pub chain_id: String,
    pub balance_wei: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    Connected(Connection),
}

impl SessionState {
    pub fn status(&self) -> SessionStatus {
        match self {
            SessionState::Disconnected => SessionStatus::Disconnected,
            SessionState::Connecting => SessionStatus::Connecting,
            SessionState::Connected(_) => SessionStatus::Connected,
        }
    }

    pub fn connection(&self) -> Option<&Connection> {
        match self {
            SessionState::Connected(c) => Some(c),
            _ => None,
        }
    }
}

/// Full render-ready view of the session, delivered after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub account: Option<String>,
    pub chain_id: Option<String>,
    /// Display name of the network
    pub network: Option<String>,
    /// Raw balance in base units, decimal
    pub balance_wei: Option<String>,
    /// Rounded display balance, e.g. `1.5000 ETH`
    pub balance: Option<String>,
}

impl SessionSnapshot {
    pub fn build(state: &SessionState, networks: &NetworkTable, config: &SessionConfig) -> Self {
        let status = state.status();
        match state.connection() {
            Some(c) => Self {
                status,
                account: Some(c.account.clone()),
                chain_id: Some(c.chain_id.clone()),
                network: Some(networks.name_for(&c.chain_id)),
                balance_wei: Some(c.balance_wei.to_string()),
                balance: Some(display_balance(c.balance_wei, config)),
            },
            None => Self {
                status,
                account: None,
                chain_id: None,
                network: None,
                balance_wei: None,
                balance: None,
            },
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status == SessionStatus::Connected
    }
}

/// Rounded balance; base units when `config.decimals` is out of range.
fn display_balance(balance_wei: U256, config: &SessionConfig) -> String {
    units::format_balance(balance_wei, config.decimals, config.display_places, &config.currency_symbol)
        .unwrap_or_else(|err| {
            tracing::warn!(decimals = config.decimals, error = %err, "cannot scale balance");
            format!("{} (base units)", balance_wei)
        })
}
