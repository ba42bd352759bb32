//! Lease contract model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::Property;

/// Contract from the `contracts` table
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: Uuid,
    pub property_id: Uuid,
    pub tenant: String,
    pub tenant_document: String,
    pub tenant_email: Option<String>,
    pub tenant_phone: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rent_value: Decimal,
    pub due_day: i32,
    pub status: String,
    pub admin_fee_percent: Option<Decimal>,
    pub adjustment_index: Option<String>,
    pub adjustment_percent: Option<Decimal>,
    pub next_adjustment_date: Option<NaiveDate>,
    pub document_url: Option<String>,
    pub tenant_type: String,
    pub rent_base_value: Option<Decimal>,
    pub iptu_value: Decimal,
    pub condominium_value: Decimal,
    pub iptu_reimbursable: bool,
    pub condominium_reimbursable: bool,
    pub iva_ibs_subject: bool,
    pub iva_ibs_rate: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Contract {
    pub fn tenant_type(&self) -> TenantType {
        TenantType::from_str(&self.tenant_type)
    }

    pub fn is_active(&self) -> bool {
        ContractStatus::from_str(&self.status) == Some(ContractStatus::Active)
    }
}

/// Validated input for inserting or replacing a contract
#[derive(Debug, Clone)]
pub struct NewContract {
    pub property_id: Uuid,
    pub tenant: String,
    pub tenant_document: String,
    pub tenant_email: Option<String>,
    pub tenant_phone: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rent_value: Decimal,
    pub due_day: i32,
    pub status: ContractStatus,
    pub admin_fee_percent: Option<Decimal>,
    pub adjustment_index: Option<String>,
    pub adjustment_percent: Option<Decimal>,
    pub next_adjustment_date: Option<NaiveDate>,
    pub document_url: Option<String>,
    pub tenant_type: TenantType,
    pub rent_base_value: Option<Decimal>,
    pub iptu_value: Decimal,
    pub condominium_value: Decimal,
    pub iptu_reimbursable: bool,
    pub condominium_reimbursable: bool,
    pub iva_ibs_subject: bool,
    pub iva_ibs_rate: Decimal,
}

/// Contract joined with its property
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractWithProperty {
    #[serde(flatten)]
    pub contract: Contract,
    pub property: Option<Property>,
}

/// Lease lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractStatus {
    Active,
    Expired,
    Cancelled,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Active => "active",
            ContractStatus::Expired => "expired",
            ContractStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<ContractStatus> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(ContractStatus::Active),
            "expired" => Some(ContractStatus::Expired),
            "cancelled" => Some(ContractStatus::Cancelled),
            _ => None,
        }
    }
}

/// Tenant legal type: pessoa física (individual) or pessoa jurídica (entity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TenantType {
    #[default]
    #[serde(rename = "pf")]
    Individual,
    #[serde(rename = "pj")]
    Entity,
}

impl TenantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantType::Individual => "pf",
            TenantType::Entity => "pj",
        }
    }

    /// Anything other than an explicit entity marker is treated as an individual
    pub fn from_str(s: &str) -> TenantType {
        match s.trim().to_lowercase().as_str() {
            "pj" | "entity" => TenantType::Entity,
            _ => TenantType::Individual,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TenantType::Individual => "Pessoa Física",
            TenantType::Entity => "Pessoa Jurídica",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_type_defaults_to_individual() {
        assert_eq!(TenantType::from_str("pj"), TenantType::Entity);
        assert_eq!(TenantType::from_str("PF"), TenantType::Individual);
        assert_eq!(TenantType::from_str(""), TenantType::Individual);
        assert_eq!(TenantType::from_str("other"), TenantType::Individual);
    }

    #[test]
    fn contract_status_parsing() {
        assert_eq!(ContractStatus::from_str("active"), Some(ContractStatus::Active));
        assert_eq!(ContractStatus::from_str("Cancelled"), Some(ContractStatus::Cancelled));
        assert_eq!(ContractStatus::from_str("paused"), None);
    }
}
