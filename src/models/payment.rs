//! Rent payment model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

pub use crate::finance::status::PaymentStatus;

use super::{Contract, Property};

/// Payment from the `payments` table
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub contract_id: Uuid,
    /// `YYYY-MM`
    pub reference_month: String,
    pub due_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub value: Decimal,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub rent_amount: Option<Decimal>,
    pub iptu_amount: Decimal,
    pub condominium_amount: Decimal,
    pub other_charges: Decimal,
    pub ir_value: Decimal,
    pub iva_ibs_value: Decimal,
    pub receipt_type: String,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn status(&self, today: NaiveDate) -> PaymentStatus {
        PaymentStatus::derive(self.due_date, self.payment_date, today)
    }

    pub fn is_paid(&self) -> bool {
        self.payment_date.is_some()
    }

    /// Year component of the reference month
    pub fn reference_year(&self) -> Option<i32> {
        self.reference_month.split('-').next()?.parse().ok()
    }
}

/// Validated input for inserting or replacing a payment.
///
/// `ir_value` and `iva_ibs_value` are filled in from the contract before saving.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub contract_id: Uuid,
    pub reference_month: String,
    pub due_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub value: Decimal,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub rent_amount: Option<Decimal>,
    pub iptu_amount: Decimal,
    pub condominium_amount: Decimal,
    pub other_charges: Decimal,
    pub ir_value: Decimal,
    pub iva_ibs_value: Decimal,
    pub receipt_type: String,
}

/// Payment with derived status and its contract/property, as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    #[serde(flatten)]
    pub payment: Payment,
    pub status: PaymentStatus,
    pub contract: Option<Contract>,
    pub property: Option<Property>,
}

impl PaymentView {
    pub fn new(
        payment: Payment,
        contract: Option<Contract>,
        property: Option<Property>,
        today: NaiveDate,
    ) -> Self {
        Self {
            status: payment.status(today),
            payment,
            contract,
            property,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures;
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn reference_year_parses_prefix() {
        let p = fixtures::payment("2025-03", "2025-03-05", None, dec!(100));
        assert_eq!(p.reference_year(), Some(2025));

        let bad = fixtures::payment("março", "2025-03-05", None, dec!(100));
        assert_eq!(bad.reference_year(), None);
    }

    #[test]
    fn view_serializes_derived_status_and_flattened_fields() {
        let p = fixtures::payment("2025-03", "2025-03-05", None, dec!(100));
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let view = PaymentView::new(p, None, None, today);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "overdue");
        assert_eq!(json["referenceMonth"], "2025-03");
        assert_eq!(json["value"], "100");
        assert!(json["contract"].is_null());
    }
}
