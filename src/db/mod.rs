//! Database queries

pub mod contracts;
pub mod payments;
pub mod properties;
pub mod users;

pub use contracts::*;
pub use payments::*;
pub use properties::*;
pub use users::*;
