//! Base-unit quantities: parsing provider replies, formatting for display.
//!
//! Display rounding is half-up at a fixed number of places. It is a
//! presentation policy only; the rounded string must never feed a transaction.

use alloy_primitives::utils::{self, Unit, UnitsError};
use alloy_primitives::U256;
use serde_json::Value;
use thiserror::Error;

/// Decimals of the native currency (wei -> ether)
pub const NATIVE_DECIMALS: u8 = 18;
/// Places shown in the balance display
pub const DISPLAY_PLACES: u8 = 4;
/// Largest decimals a U256 amount can be scaled by
pub const MAX_DECIMALS: u8 = 77;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("quantity is not a string or integer: {0}")]
    NotAQuantity(String),
    #[error("invalid hex quantity '{0}'")]
    InvalidHex(String),
}

/// Parse a JSON-RPC quantity (`"0x..."` hex string, or a plain integer).
pub fn parse_quantity(value: &Value) -> Result<U256, QuantityError> {
    match value {
        Value::String(s) => {
            let lower = s.to_ascii_lowercase();
            match lower.strip_prefix("0x") {
                None => Err(QuantityError::InvalidHex(s.clone())),
                Some("") => Ok(U256::ZERO),
                Some(_) => lower.parse::<U256>().map_err(|_| QuantityError::InvalidHex(s.clone())),
            }
        }
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| QuantityError::NotAQuantity(n.to_string())),
        other => Err(QuantityError::NotAQuantity(other.to_string())),
    }
}

fn unit(decimals: u8) -> Result<Unit, UnitsError> {
    Unit::new(decimals).ok_or_else(|| UnitsError::InvalidUnit(decimals.to_string()))
}

/// Scale `value` down by `10^decimals`, rounded half-up to `places`.
///
/// Fails when `decimals` exceeds [`MAX_DECIMALS`].
pub fn format_units(value: U256, decimals: u8, places: u8) -> Result<String, UnitsError> {
    let places = places.min(decimals);
    let step = unit(decimals)?;
    let step = unit(step.get() - places)?.wei();

    let mut scaled = value / step;
    let rem = value % step;
    if !rem.is_zero() && rem >= step - rem {
        scaled = scaled.saturating_add(U256::from(1u8));
    }
    if places == 0 {
        return Ok(scaled.to_string());
    }
    utils::format_units(scaled, places)
}

/// Display string for a native balance, e.g. `"1.5000 ETH"`.
pub fn format_balance(value: U256, decimals: u8, places: u8, symbol: &str) -> Result<String, UnitsError> {
    Ok(format!("{} {}", format_units(value, decimals, places)?, symbol))
}
