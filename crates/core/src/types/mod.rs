//! Type-safe wrappers for domain values.

pub mod email;
pub mod id;
pub mod order;

pub use email::{Email, EmailError};
pub use id::*;
pub use order::{ORDER_NUMBER_SEQUENCE, OrderNumber};
