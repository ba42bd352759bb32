//! Dashboard aggregation

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::{Contract, Payment, PaymentView, Property};

/// How far ahead unpaid payments count as upcoming
pub const UPCOMING_WINDOW_DAYS: i64 = 30;
pub const UPCOMING_LIMIT: usize = 6;

/// Metrics shown on the landlord's dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_properties: usize,
    pub active_contracts: usize,
    pub received_this_month: Decimal,
    pub pending_this_month: Decimal,
    pub upcoming_payments: Vec<PaymentView>,
}

impl DashboardMetrics {
    /// Aggregate metrics for `today` from full table snapshots
    pub fn build(
        properties: &[Property],
        contracts: &[Contract],
        payments: &[Payment],
        today: NaiveDate,
    ) -> Self {
        let current_month = format!("{}-{:02}", today.year(), today.month());

        let mut received_this_month = Decimal::ZERO;
        let mut pending_this_month = Decimal::ZERO;
        for payment in payments.iter().filter(|p| p.reference_month == current_month) {
            if payment.is_paid() {
                received_this_month += payment.value;
            } else {
                pending_this_month += payment.value;
            }
        }

        let contracts_by_id: HashMap<Uuid, &Contract> = contracts.iter().map(|c| (c.id, c)).collect();
        let properties_by_id: HashMap<Uuid, &Property> =
            properties.iter().map(|p| (p.id, p)).collect();

        let window_end = today + Duration::days(UPCOMING_WINDOW_DAYS);
        let mut upcoming: Vec<&Payment> = payments
            .iter()
            .filter(|p| !p.is_paid() && p.due_date >= today && p.due_date <= window_end)
            .collect();
        upcoming.sort_by_key(|p| p.due_date);

        let upcoming_payments = upcoming
            .into_iter()
            .take(UPCOMING_LIMIT)
            .map(|payment| {
                let contract = contracts_by_id.get(&payment.contract_id).map(|c| (*c).clone());
                let property = contract
                    .as_ref()
                    .and_then(|c| properties_by_id.get(&c.property_id))
                    .map(|p| (*p).clone());
                PaymentView::new(payment.clone(), contract, property, today)
            })
            .collect();

        Self {
            total_properties: properties.len(),
            active_contracts: contracts.iter().filter(|c| c.is_active()).count(),
            received_this_month,
            pending_this_month,
            upcoming_payments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payment::fixtures;
    use crate::models::PaymentStatus;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[test]
    fn test_counts_and_monthly_totals() {
        let property = fixtures::property();
        let active = fixtures::contract(property.id, "active");
        let cancelled = fixtures::contract(property.id, "cancelled");

        let payments = vec![
            fixtures::payment("2025-03", "2025-03-05", Some("2025-03-05"), dec!(2500)),
            fixtures::payment("2025-03", "2025-03-20", None, dec!(3500)),
            fixtures::payment("2025-03", "2025-03-01", None, dec!(1000)),
            // Other months are ignored for the totals
            fixtures::payment("2025-02", "2025-02-05", Some("2025-02-05"), dec!(9999)),
        ];

        let metrics = DashboardMetrics::build(&[property], &[active, cancelled], &payments, today());

        assert_eq!(metrics.total_properties, 1);
        assert_eq!(metrics.active_contracts, 1);
        assert_eq!(metrics.received_this_month, dec!(2500));
        assert_eq!(metrics.pending_this_month, dec!(4500));
    }

    #[test]
    fn test_upcoming_window_and_order() {
        let payments = vec![
            fixtures::payment("2025-04", "2025-04-09", None, dec!(1)), // day 30: included
            fixtures::payment("2025-04", "2025-04-10", None, dec!(2)), // day 31: excluded
            fixtures::payment("2025-03", "2025-03-10", None, dec!(3)), // today: included
            fixtures::payment("2025-03", "2025-03-09", None, dec!(4)), // overdue: excluded
            fixtures::payment("2025-03", "2025-03-15", Some("2025-03-01"), dec!(5)), // paid: excluded
        ];

        let metrics = DashboardMetrics::build(&[], &[], &payments, today());
        let values: Vec<Decimal> = metrics
            .upcoming_payments
            .iter()
            .map(|v| v.payment.value)
            .collect();

        assert_eq!(values, vec![dec!(3), dec!(1)]);
        assert!(metrics
            .upcoming_payments
            .iter()
            .all(|v| v.status == PaymentStatus::Pending));
    }

    #[test]
    fn test_upcoming_capped_and_joined() {
        let property = fixtures::property();
        let contract = fixtures::contract(property.id, "active");

        let payments: Vec<Payment> = (11..=20)
            .map(|day| {
                let mut p = fixtures::payment("2025-03", &format!("2025-03-{}", day), None, dec!(10));
                p.contract_id = contract.id;
                p
            })
            .collect();

        let metrics = DashboardMetrics::build(
            std::slice::from_ref(&property),
            std::slice::from_ref(&contract),
            &payments,
            today(),
        );

        assert_eq!(metrics.upcoming_payments.len(), UPCOMING_LIMIT);
        let first = &metrics.upcoming_payments[0];
        assert_eq!(first.payment.due_date, NaiveDate::from_ymd_opt(2025, 3, 11).unwrap());
        assert_eq!(first.contract.as_ref().map(|c| c.id), Some(contract.id));
        assert_eq!(first.property.as_ref().map(|p| p.id), Some(property.id));
    }
}
