//! Provider protocol constants
//!
//! Centralized registry for every JSON-RPC method, event name and error code
//! the session speaks to the wallet provider.

/// JSON-RPC methods
pub mod methods {
    pub const REQUEST_PERMISSIONS: &str = "wallet_requestPermissions";
    pub const ACCOUNTS: &str = "eth_accounts";
    pub const CHAIN_ID: &str = "eth_chainId";
    pub const GET_BALANCE: &str = "eth_getBalance";

    /// Permission scope granting account access
    pub const ACCOUNTS_SCOPE: &str = "eth_accounts";
    /// Block tag for balance queries
    pub const LATEST: &str = "latest";
}

/// Provider event names
pub mod events {
    pub const ACCOUNTS_CHANGED: &str = "accountsChanged";
    pub const CHAIN_CHANGED: &str = "chainChanged";
}

/// Provider error codes (EIP-1193 / JSON-RPC)
pub mod codes {
    /// User rejected the request
    pub const USER_REJECTED: i64 = 4001;
    /// Provider does not support the method
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    /// A request of the same type is already awaiting the user
    pub const REQUEST_PENDING: i64 = -32002;
    /// Internal error; also used for undecodable provider replies
    pub const INTERNAL: i64 = -32603;
}
