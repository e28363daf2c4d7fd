use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A euro amount. Keeps the full precision of its inputs; rounding to cents
/// only happens when the value is rendered.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Money(Decimal);

impl Money {
    pub fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn amount(self) -> Decimal {
        self.0
    }

    /// Commercial rounding to two decimal places (half away from zero).
    pub fn rounded(self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// `None` when the sum leaves the range of `Decimal`.
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// The amount with exactly two decimals and no currency suffix.
    pub fn format_plain(self) -> String {
        format!("{:.2}", self.rounded())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} EUR", self.format_plain())
    }
}
