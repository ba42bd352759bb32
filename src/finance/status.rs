//! Payment status derivation.
//!
//! Status is never stored; it is a function of the due date, the optional
//! payment date and the current day.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Overdue,
}

impl PaymentStatus {
    /// Paid when a payment date exists; overdue once the due date has passed; pending otherwise.
    pub fn derive(due_date: NaiveDate, payment_date: Option<NaiveDate>, today: NaiveDate) -> Self {
        if payment_date.is_some() {
            PaymentStatus::Paid
        } else if due_date < today {
            PaymentStatus::Overdue
        } else {
            PaymentStatus::Pending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Overdue => "overdue",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Pago",
            PaymentStatus::Pending => "Pendente",
            PaymentStatus::Overdue => "Atrasado",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn paid_when_payment_date_present() {
        // Even a late payment is paid
        let status = PaymentStatus::derive(d("2025-01-10"), Some(d("2025-02-01")), d("2025-03-01"));
        assert_eq!(status, PaymentStatus::Paid);
    }

    #[test]
    fn overdue_after_due_date() {
        let status = PaymentStatus::derive(d("2025-01-10"), None, d("2025-01-11"));
        assert_eq!(status, PaymentStatus::Overdue);
    }

    #[test]
    fn pending_on_due_date() {
        let status = PaymentStatus::derive(d("2025-01-10"), None, d("2025-01-10"));
        assert_eq!(status, PaymentStatus::Pending);
    }

    #[test]
    fn pending_before_due_date() {
        let status = PaymentStatus::derive(d("2025-01-10"), None, d("2024-12-20"));
        assert_eq!(status, PaymentStatus::Pending);
        assert_eq!(status.as_str(), "pending");
    }
}
