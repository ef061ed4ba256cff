use crate::error::FinanceError;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Number of decimal places kept for currency values.
pub const CENTS: u32 = 2;

/// Largest amount a single transaction, movement or goal may carry.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

/// A signed monetary value (balances, totals, differences).
///
/// Wraps `rust_decimal::Decimal` so aggregation never goes through floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub Decimal);

/// A strictly positive monetary amount, as carried by transactions and movements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, FinanceError> {
        if value <= Decimal::ZERO {
            Err(FinanceError::validation("Amount must be positive"))
        } else if value > MAX_AMOUNT {
            Err(FinanceError::validation(format!(
                "Amount cannot exceed {MAX_AMOUNT}"
            )))
        } else {
            Ok(Self(value))
        }
    }

    /// Parses user input, accepting either `,` or `.` as the decimal separator.
    pub fn parse(input: &str) -> Result<Self, FinanceError> {
        let normalized = input.trim().replace(',', ".");
        let value: Decimal = normalized
            .parse()
            .map_err(|_| FinanceError::validation("Amount must be a valid number"))?;
        Self::new(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = FinanceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Money {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Clamps negative values to zero.
    pub fn non_negative(self) -> Self {
        self.max(Self::ZERO)
    }

    /// Rounds half away from zero to whole cents.
    pub fn round_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(CENTS, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// `self` as a share of `whole`, scaled by `factor` (e.g. `0.3` for 30%).
    pub fn exceeds_share_of(&self, whole: Money, factor: Decimal) -> bool {
        self.0 > whole.0 * factor
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_arithmetic() {
        let m1 = Money::new(dec!(10.0));
        let m2 = Money::new(dec!(5.0));
        assert_eq!(m1 + m2, Money::new(dec!(15.0)));
        assert_eq!(m1 - m2, Money::new(dec!(5.0)));
        assert_eq!(vec![m1, m2].into_iter().sum::<Money>(), Money::new(dec!(15)));
    }

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0.0)),
            Err(FinanceError::ValidationError(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-1.0)),
            Err(FinanceError::ValidationError(_))
        ));
    }

    #[test]
    fn test_amount_parse_accepts_comma() {
        assert_eq!(Amount::parse("12,50").unwrap().value(), dec!(12.50));
        assert_eq!(Amount::parse(" 7.25 ").unwrap().value(), dec!(7.25));
        assert!(Amount::parse("abc").is_err());
        assert!(Amount::parse("0").is_err());
    }

    #[test]
    fn test_amount_upper_bound() {
        assert_eq!(Amount::new(MAX_AMOUNT).unwrap().value(), MAX_AMOUNT);
        assert!(matches!(
            Amount::new(MAX_AMOUNT + dec!(0.01)),
            Err(FinanceError::ValidationError(_))
        ));
        assert!(Amount::parse("79228162514264337593543950335").is_err());
        assert!(serde_json::from_str::<Amount>("1e20").is_err());
    }

    #[test]
    fn test_sum_of_many_max_amounts_fits() {
        let total: Money = std::iter::repeat_n(Money::from(Amount::new(MAX_AMOUNT).unwrap()), 10_000)
            .sum();
        assert_eq!(total.value(), MAX_AMOUNT * dec!(10000));
    }

    #[test]
    fn test_round_cents_and_clamp() {
        assert_eq!(Money::new(dec!(3.335)).round_cents(), Money::new(dec!(3.34)));
        assert_eq!(Money::new(dec!(-4)).non_negative(), Money::ZERO);
    }

    #[test]
    fn test_amount_deserialize_rejects_non_positive() {
        let ok: Amount = serde_json::from_str("12.5").unwrap();
        assert_eq!(ok.value(), dec!(12.5));
        assert!(serde_json::from_str::<Amount>("0").is_err());
    }
}
