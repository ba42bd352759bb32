//! Property model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Property from the `properties` table
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    pub address: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub owner: String,
    pub owner_document: String,
    pub rent_value: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated input for inserting or replacing a property
#[derive(Debug, Clone)]
pub struct NewProperty {
    pub address: String,
    pub property_type: PropertyType,
    pub owner: String,
    pub owner_document: String,
    pub rent_value: Decimal,
    pub description: Option<String>,
}

/// Kinds of property the landlord can register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Apartment,
    House,
    Commercial,
    Land,
}

impl PropertyType {
    pub const ALL: [PropertyType; 4] = [
        PropertyType::Apartment,
        PropertyType::House,
        PropertyType::Commercial,
        PropertyType::Land,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Apartment => "apartamento",
            PropertyType::House => "casa",
            PropertyType::Commercial => "comercial",
            PropertyType::Land => "terreno",
        }
    }

    pub fn from_str(s: &str) -> Option<PropertyType> {
        match s.trim().to_lowercase().as_str() {
            "apartamento" | "apartment" => Some(PropertyType::Apartment),
            "casa" | "house" => Some(PropertyType::House),
            "comercial" | "commercial" => Some(PropertyType::Commercial),
            "terreno" | "land" => Some(PropertyType::Land),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_type_accepts_portuguese_and_english() {
        assert_eq!(PropertyType::from_str("casa"), Some(PropertyType::House));
        assert_eq!(PropertyType::from_str("Commercial"), Some(PropertyType::Commercial));
        assert_eq!(PropertyType::from_str("castelo"), None);
    }

    #[test]
    fn property_type_round_trips_storage_name() {
        for kind in PropertyType::ALL {
            assert_eq!(PropertyType::from_str(kind.as_str()), Some(kind));
        }
    }
}
