//! Annual rental income summary.
//!
//! Groups paid payments of a year by reference month and estimates the
//! monthly Carnê-Leão due on the average monthly income.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::Payment;

use super::calculators::{monthly_irpf, round_money, IrpfEstimate};

/// Income received for one reference month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyIncome {
    /// `YYYY-MM`
    pub month: String,
    pub total: Decimal,
    pub irpf: IrpfEstimate,
}

/// Result of the annual summary
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualSummary {
    pub year: i32,
    pub annual_total: Decimal,
    pub months_with_income: usize,
    pub average_monthly: Decimal,
    pub monthly_estimate: IrpfEstimate,
    pub annual_tax: Decimal,
    /// Newest month first
    pub months: Vec<MonthlyIncome>,
}

/// Summarise paid payments whose reference month falls in `year`
pub fn summarize_year(payments: &[Payment], year: i32) -> AnnualSummary {
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    for payment in payments
        .iter()
        .filter(|p| p.is_paid() && p.reference_year() == Some(year))
    {
        *totals.entry(payment.reference_month.as_str()).or_insert(Decimal::ZERO) += payment.value;
    }

    let annual_total: Decimal = totals.values().copied().sum();
    let months_with_income = totals.len();
    let average_monthly = if months_with_income > 0 {
        round_money(annual_total / Decimal::from(months_with_income), 2)
    } else {
        Decimal::ZERO
    };

    let monthly_estimate = monthly_irpf(average_monthly);

    let months = totals
        .into_iter()
        .rev()
        .map(|(month, total)| MonthlyIncome {
            month: month.to_string(),
            total,
            irpf: monthly_irpf(total),
        })
        .collect();

    AnnualSummary {
        year,
        annual_total,
        months_with_income,
        average_monthly,
        annual_tax: monthly_estimate.tax * Decimal::from(12),
        monthly_estimate,
        months,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payment::fixtures::payment;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_year() {
        let summary = summarize_year(&[], 2025);
        assert_eq!(summary.annual_total, dec!(0));
        assert_eq!(summary.months_with_income, 0);
        assert_eq!(summary.average_monthly, dec!(0));
        assert_eq!(summary.annual_tax, dec!(0));
        assert!(summary.months.is_empty());
    }

    #[test]
    fn test_groups_paid_payments_by_month() {
        let payments = vec![
            payment("2025-01", "2025-01-05", Some("2025-01-05"), dec!(2500)),
            payment("2025-01", "2025-01-10", Some("2025-01-10"), dec!(3500)),
            payment("2025-02", "2025-02-05", Some("2025-02-06"), dec!(2000)),
            // Unpaid and other years are ignored
            payment("2025-03", "2025-03-05", None, dec!(2500)),
            payment("2024-12", "2024-12-05", Some("2024-12-05"), dec!(7000)),
        ];

        let summary = summarize_year(&payments, 2025);

        assert_eq!(summary.annual_total, dec!(8000));
        assert_eq!(summary.months_with_income, 2);
        assert_eq!(summary.average_monthly, dec!(4000));
        let months: Vec<&str> = summary.months.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2025-02", "2025-01"]);
        assert_eq!(summary.months[1].total, dec!(6000));
    }

    #[test]
    fn test_annual_tax_is_twelve_monthly_estimates() {
        // Average 4000 -> 22.5% - 662.77 = 237.23 per month
        let payments = vec![
            payment("2025-01", "2025-01-05", Some("2025-01-05"), dec!(4000)),
            payment("2025-02", "2025-02-05", Some("2025-02-05"), dec!(4000)),
        ];

        let summary = summarize_year(&payments, 2025);

        assert_eq!(summary.monthly_estimate.tax, dec!(237.23));
        assert_eq!(summary.monthly_estimate.bracket_rate, dec!(22.5));
        assert_eq!(summary.annual_tax, dec!(2846.76));
    }
}
