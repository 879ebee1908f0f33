use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde_with::DeserializeFromStr;

use std::{
    fmt::{Debug, Display},
    str::FromStr,
};

/// Represents an amount of money in USD currency.
///
/// The amount is stored as an exact decimal, so sums and products of prices
/// never drift the way binary floating point does. The [`Display`]
/// implementation formats it as dollars to 2 decimal places.
#[derive(Clone, Copy, Default, DeserializeFromStr, Eq, PartialEq, Ord, PartialOrd)]
pub struct Usd(Decimal);

impl Usd {
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    #[must_use]
    pub fn amount(self) -> Decimal {
        self.0
    }

    /// Adds `rhs`, returning `None` if the result would overflow.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Multiplies by `qty`, returning `None` if the result would overflow.
    #[must_use]
    pub fn checked_mul(self, qty: Decimal) -> Option<Self> {
        self.0.checked_mul(qty).map(Self)
    }

    /// Returns the amount as `f64`, for handing to a spreadsheet cell.
    #[must_use]
    pub fn to_f64(self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

impl Debug for Usd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Usd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl FromStr for Usd {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let digits = s.trim().replace(['$', ','], "");
        Ok(Self(Decimal::from_str(&digits)?))
    }
}
