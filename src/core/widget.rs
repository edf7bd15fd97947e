//! Page binding configuration for the browser widget.
//!
//! Defaults match the stock page markup; a page with other ids passes a
//! partial object and keeps the rest.

use serde::{Deserialize, Serialize};

use crate::session::SessionConfig;

/// DOM element ids the widget binds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementIds {
    pub connect_button: String,
    pub disconnect_button: String,
    pub copy_button: String,
    /// Alert container; its class list carries the notice level
    pub status: String,
    pub status_message: String,
    /// Panel shown only while connected
    pub wallet_info: String,
    pub wallet_address: String,
    pub network_name: String,
    pub balance: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            connect_button: "connectWallet".into(),
            disconnect_button: "disconnectWallet".into(),
            copy_button: "copyAddressBtn".into(),
            status: "connectionStatus".into(),
            status_message: "statusMessage".into(),
            wallet_info: "walletInfo".into(),
            wallet_address: "walletAddress".into(),
            network_name: "networkName".into(),
            balance: "ethBalance".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WidgetConfig {
    pub elements: ElementIds,
    /// Base class of the alert; the level is appended as `<base>-<level>`
    pub alert_class: String,
    pub hidden_class: String,
    pub success_hide_ms: u32,
    /// Wallet installation guide shown when no provider is injected
    pub install_url: String,
    pub session: SessionConfig,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            elements: ElementIds::default(),
            alert_class: "alert".into(),
            hidden_class: "d-none".into(),
            success_hide_ms: 4000,
            install_url: "https://metamask.io/download/".into(),
            session: SessionConfig::default(),
        }
    }
}

impl WidgetConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Full class attribute for the alert at `level`, e.g. `alert alert-info`.
    pub fn alert_class_for(&self, level: &str) -> String {
        format!("{} {}-{}", self.alert_class, self.alert_class, level)
    }
}
