//! Customer-facing order numbers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Name of the database sequence that feeds `orders.number`.
pub const ORDER_NUMBER_SEQUENCE: &str = "order_number_seq";

/// Sequential, human-readable order number.
///
/// Assigned by PostgreSQL from [`ORDER_NUMBER_SEQUENCE`] when a row is
/// inserted without an explicit number. Numbers start at 1 and increase
/// strictly in assignment order; a rolled-back insert leaves a gap.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
#[serde(transparent)]
pub struct OrderNumber(i32);

impl OrderNumber {
    /// First value handed out by a fresh sequence.
    pub const FIRST: Self = Self(1);

    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
