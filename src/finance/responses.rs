//! Response DTOs for tax endpoints.

use rust_decimal::Decimal;
use serde::Serialize;

use super::annual::{AnnualSummary, MonthlyIncome};
use super::calculators::{IrpfEstimate, TaxBreakdown};

/// Response for a tax breakdown
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdownResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub gross_income: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub rent_income: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub reimbursements: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub taxable_income: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub ir_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub ir_deduction: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub ir_value: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub iva_ibs_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub iva_ibs_value: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub net_income: Decimal,
}

impl From<TaxBreakdown> for TaxBreakdownResponse {
    fn from(b: TaxBreakdown) -> Self {
        Self {
            gross_income: b.gross_income,
            rent_income: b.rent_income,
            reimbursements: b.reimbursements,
            taxable_income: b.taxable_income,
            ir_rate: b.ir_rate,
            ir_deduction: b.ir_deduction,
            ir_value: b.ir_value,
            iva_ibs_rate: b.iva_ibs_rate,
            iva_ibs_value: b.iva_ibs_value,
            net_income: b.net_income,
        }
    }
}

/// IRPF estimate in responses
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrpfEstimateResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub tax: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub effective_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub bracket_rate: Decimal,
}

impl From<IrpfEstimate> for IrpfEstimateResponse {
    fn from(e: IrpfEstimate) -> Self {
        Self {
            tax: e.tax,
            effective_rate: e.effective_rate,
            bracket_rate: e.bracket_rate,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyIncomeResponse {
    pub month: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    pub irpf: IrpfEstimateResponse,
}

impl From<MonthlyIncome> for MonthlyIncomeResponse {
    fn from(m: MonthlyIncome) -> Self {
        Self {
            month: m.month,
            total: m.total,
            irpf: m.irpf.into(),
        }
    }
}

/// Response for the annual summary
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualSummaryResponse {
    pub year: i32,
    #[serde(with = "rust_decimal::serde::str")]
    pub annual_total: Decimal,
    pub months_with_income: usize,
    #[serde(with = "rust_decimal::serde::str")]
    pub average_monthly: Decimal,
    pub monthly_estimate: IrpfEstimateResponse,
    #[serde(with = "rust_decimal::serde::str")]
    pub annual_tax: Decimal,
    pub months: Vec<MonthlyIncomeResponse>,
}

impl From<AnnualSummary> for AnnualSummaryResponse {
    fn from(s: AnnualSummary) -> Self {
        Self {
            year: s.year,
            annual_total: s.annual_total,
            months_with_income: s.months_with_income,
            average_monthly: s.average_monthly,
            monthly_estimate: s.monthly_estimate.into(),
            annual_tax: s.annual_tax,
            months: s.months.into_iter().map(Into::into).collect(),
        }
    }
}
