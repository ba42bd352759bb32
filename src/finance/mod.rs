//! Rental finance module.
//!
//! Tax estimates for rent payments (IR brackets, reimbursable charges,
//! IVA/IBS), payment status derivation and the annual income summary.

pub mod amounts;
pub mod annual;
pub mod calculators;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod status;

// Re-export commonly used items
pub use annual::{summarize_year, AnnualSummary};
pub use calculators::{calculate_taxes, monthly_irpf, round_money, TaxBreakdown, TaxInput};
pub use routes::router;
pub use status::PaymentStatus;
