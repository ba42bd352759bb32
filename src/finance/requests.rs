//! Request DTOs for tax endpoints.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::TenantType;

use super::amounts::{lenient, lenient_bool, within_limit, MAX_RATE};
use super::calculators::TaxInput;

/// Request to calculate a tax breakdown.
///
/// Every field is optional; invalid, missing or out-of-range amounts count as zero.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateTaxesRequest {
    #[serde(default, deserialize_with = "lenient")]
    pub rent_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    pub iptu_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    pub condominium_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub iptu_reimbursable: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub condominium_reimbursable: Option<bool>,
    #[serde(default)]
    pub tenant_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub iva_ibs_subject: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub iva_ibs_rate: Option<Decimal>,
}

fn amount_or_zero(value: Option<Decimal>) -> Decimal {
    value.filter(|v| within_limit(*v)).unwrap_or_default()
}

impl From<CalculateTaxesRequest> for TaxInput {
    fn from(req: CalculateTaxesRequest) -> Self {
        TaxInput {
            rent: amount_or_zero(req.rent_amount),
            iptu: amount_or_zero(req.iptu_amount),
            condominium: amount_or_zero(req.condominium_amount),
            iptu_reimbursable: req.iptu_reimbursable.unwrap_or(false),
            condominium_reimbursable: req.condominium_reimbursable.unwrap_or(false),
            tenant_type: req
                .tenant_type
                .as_deref()
                .map(TenantType::from_str)
                .unwrap_or_default(),
            iva_ibs_subject: req.iva_ibs_subject.unwrap_or(true),
            iva_ibs_rate: req
                .iva_ibs_rate
                .filter(|r| r.abs() <= MAX_RATE)
                .unwrap_or_default(),
        }
    }
}

/// Query for the annual summary
#[derive(Debug, Deserialize)]
pub struct AnnualSummaryQuery {
    #[serde(default)]
    pub year: Option<i32>,
}
