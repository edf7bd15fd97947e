//! WalletProvider: the seam between the session and an external wallet.
//!
//! Anything that speaks Ethereum JSON-RPC over an object (an injected browser
//! extension, a connector, a test double) implements this trait. Optional
//! behaviour is advertised through [`ProviderCapabilities`] rather than probed
//! on every call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::rc::Rc;

use super::error::ProviderRpcError;
use crate::core::rpc::events;

/// Events a provider can notify about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    AccountsChanged,
    ChainChanged,
}

impl EventKind {
    pub const ALL: [EventKind; 2] = [EventKind::AccountsChanged, EventKind::ChainChanged];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::AccountsChanged => events::ACCOUNTS_CHANGED,
            EventKind::ChainChanged => events::CHAIN_CHANGED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// Ordered authorized accounts; empty means access was withdrawn.
    AccountsChanged(Vec<String>),
    /// Hex chain id.
    ChainChanged(String),
}

impl ProviderEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ProviderEvent::AccountsChanged(_) => EventKind::AccountsChanged,
            ProviderEvent::ChainChanged(_) => EventKind::ChainChanged,
        }
    }

    /// Decode a raw event payload.
    pub fn decode(kind: EventKind, payload: Value) -> Result<Self, ProviderRpcError> {
        match kind {
            EventKind::AccountsChanged => {
                let accounts: Vec<String> = serde_json::from_value(payload)?;
                Ok(ProviderEvent::AccountsChanged(accounts))
            }
            EventKind::ChainChanged => match payload {
                Value::String(id) => Ok(ProviderEvent::ChainChanged(id)),
                // Some legacy providers emit the numeric id.
                Value::Number(n) => n
                    .as_u64()
                    .map(|id| ProviderEvent::ChainChanged(format!("{:#x}", id)))
                    .ok_or_else(|| ProviderRpcError::invalid_response(format!("bad chain id {}", n))),
                other => Err(ProviderRpcError::invalid_response(format!("bad chain id {}", other))),
            },
        }
    }
}

/// Optional provider features, checked once when the session is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProviderCapabilities {
    /// Supports `on` / `removeListener` for provider events
    pub events: bool,
    /// Exposes a transport-level `disconnect`
    pub disconnect: bool,
}

impl ProviderCapabilities {
    pub fn full() -> Self {
        Self { events: true, disconnect: true }
    }
}

/// Handle returned by [`WalletProvider::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

pub type EventHandler = Rc<dyn Fn(ProviderEvent)>;

#[async_trait(?Send)]
pub trait WalletProvider {
    /// Send a JSON-RPC request.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError>;

    fn capabilities(&self) -> ProviderCapabilities;

    /// Register `handler` for `kind`. Only called when `capabilities().events`.
    fn subscribe(&self, kind: EventKind, handler: EventHandler) -> Result<SubscriptionId, ProviderRpcError> {
        let _ = handler;
        Err(ProviderRpcError::unsupported(kind.as_str()))
    }

    fn unsubscribe(&self, _id: SubscriptionId) {}

    /// Close the transport. Only called when `capabilities().disconnect`.
    async fn disconnect(&self) -> Result<(), ProviderRpcError> {
        Ok(())
    }
}
