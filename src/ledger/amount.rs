use serde::{Deserialize, Serialize};

use crate::Error;

/// A strictly positive amount of money in minor currency units (e.g. cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

impl Amount {
    /// Create an amount from a number of minor currency units.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] if `value` is zero or negative.
    pub fn new(value: i64) -> Result<Self, Error> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(Error::InvalidAmount)
        }
    }

    /// The amount in minor currency units.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Amount {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}
