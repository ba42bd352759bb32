//! Database models and derived views

pub mod contract;
pub mod dashboard;
pub mod payment;
pub mod property;
pub mod user;

pub use contract::{Contract, ContractStatus, ContractWithProperty, NewContract, TenantType};
pub use dashboard::DashboardMetrics;
pub use payment::{NewPayment, Payment, PaymentStatus, PaymentView};
pub use property::{NewProperty, Property, PropertyType};
pub use user::{SessionUser, User, UserResponse};
