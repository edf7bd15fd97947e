//! Session configuration - passed from the embedding page.

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::chains::NetworkTable;
use crate::core::units::{DISPLAY_PLACES, MAX_DECIMALS, NATIVE_DECIMALS};

/// Extra or overriding network name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEntry {
    pub chain_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    pub currency_symbol: String,
    #[serde(deserialize_with = "decimals")]
    pub decimals: u8,
    pub display_places: u8,
    pub networks: Vec<NetworkEntry>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "ETH".into(),
            decimals: NATIVE_DECIMALS,
            display_places: DISPLAY_PLACES,
            networks: Vec::new(),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }

    pub fn with_display_places(mut self, places: u8) -> Self {
        self.display_places = places;
        self
    }

    pub fn with_network(mut self, chain_id: impl Into<String>, name: impl Into<String>) -> Self {
        self.networks.push(NetworkEntry { chain_id: chain_id.into(), name: name.into() });
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn network_table(&self) -> NetworkTable {
        self.networks
            .iter()
            .fold(NetworkTable::new(), |table, entry| table.with_network(&entry.chain_id, entry.name.clone()))
    }
}

fn decimals<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = u8::deserialize(deserializer)?;
    if value > MAX_DECIMALS {
        return Err(serde::de::Error::custom(format!(
            "decimals must be at most {}, got {}",
            MAX_DECIMALS, value
        )));
    }
    Ok(value)
}
