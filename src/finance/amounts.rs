//! Money parsing for request bodies.
//!
//! Amounts arrive either as JSON numbers or as decimal strings ("1500.00",
//! "1500,00"). Anything else parses to `None`.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Largest amount a `DECIMAL(10,2)` column holds
pub const MAX_AMOUNT: Decimal = dec!(99999999.99);

/// Largest percentage a `DECIMAL(5,2)` column holds
pub const MAX_RATE: Decimal = dec!(999.99);

/// Decimal places kept for money and rates
pub const AMOUNT_SCALE: u32 = 2;

/// Whether `amount` fits the money columns in magnitude
pub fn within_limit(amount: Decimal) -> bool {
    amount.abs() <= MAX_AMOUNT
}

/// Whether `amount` needs more than two decimal places
pub fn has_excess_scale(amount: Decimal) -> bool {
    amount.normalize().scale() > AMOUNT_SCALE
}

/// Pull `amount` into `[-MAX_AMOUNT, MAX_AMOUNT]`
pub fn clamp_amount(amount: Decimal) -> Decimal {
    amount.clamp(-MAX_AMOUNT, MAX_AMOUNT)
}

/// Parse a JSON value into a decimal amount
pub fn parse_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_str(&trimmed.replace(',', ".")))
                .ok()
        }
        _ => None,
    }
}

/// `deserialize_with` helper: invalid or missing amounts become `None`
pub fn lenient<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_amount))
}

/// `deserialize_with` helper for flags sent as booleans or "true"/"false"
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => match s.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        Some(Value::Number(n)) => n.as_i64().map(|v| v != 0),
        _ => None,
    })
}
