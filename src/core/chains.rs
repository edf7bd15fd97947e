//! Chain id -> human-readable network name.

use std::collections::HashMap;

/// Built-in networks, keyed by numeric chain id.
const KNOWN_NETWORKS: &[(u64, &str)] = &[
    (0x1, "Ethereum Mainnet"),
    (0x5, "Goerli Testnet"),
    (0xaa36a7, "Sepolia Testnet"),
    (0x4268, "Holesky Testnet"),
    (0xa, "OP Mainnet"),
    (0x38, "BNB Smart Chain"),
    (0x61, "BNB Smart Chain Testnet"),
    (0x64, "Gnosis"),
    (0x89, "Polygon Mainnet"),
    (0x13882, "Polygon Amoy Testnet"),
    (0xfa, "Fantom Opera"),
    (0x144, "zkSync Era"),
    (0x2105, "Base"),
    (0x14a34, "Base Sepolia"),
    (0xa4b1, "Arbitrum One"),
    (0x66eee, "Arbitrum Sepolia"),
    (0xa86a, "Avalanche C-Chain"),
    (0xe708, "Linea"),
];

/// Parse a hex chain id (`"0x89"`) into its numeric value.
pub fn parse_chain_id(raw: &str) -> Option<u64> {
    let digits = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X"))?;
    u64::from_str_radix(digits, 16).ok()
}

/// Lookup table from chain id to display name, with per-deployment overrides.
#[derive(Debug, Clone, Default)]
pub struct NetworkTable {
    overrides: HashMap<u64, String>,
}

impl NetworkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a network name. Ids that are not valid hex are ignored.
    pub fn with_network(mut self, chain_id: &str, name: impl Into<String>) -> Self {
        match parse_chain_id(chain_id) {
            Some(id) => {
                self.overrides.insert(id, name.into());
            }
            None => tracing::warn!(chain_id, "ignoring network override with non-hex chain id"),
        }
        self
    }

    pub fn lookup(&self, chain_id: &str) -> Option<&str> {
        let id = parse_chain_id(chain_id)?;
        if let Some(name) = self.overrides.get(&id) {
            return Some(name.as_str());
        }
        KNOWN_NETWORKS
            .iter()
            .find(|(known, _)| *known == id)
            .map(|(_, name)| *name)
    }

    /// Display name; unrecognized ids render as `Unknown Network (<raw id>)`.
    pub fn name_for(&self, chain_id: &str) -> String {
        match self.lookup(chain_id) {
            Some(name) => name.to_string(),
            None => format!("Unknown Network ({})", chain_id),
        }
    }
}
