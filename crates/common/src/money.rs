use serde::{Deserialize, Serialize};

/// Money amount represented in minor units (cents) to avoid floating
/// point issues in price and refund arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from a whole major-unit value.
    pub fn from_major(major: i64) -> Self {
        Self { cents: major * 100 }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the major-unit portion (whole number).
    pub fn major(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after major units).
    pub fn minor_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents * quantity as i64,
        }
    }

    /// Returns the given percentage of this amount, rounded to the
    /// nearest cent (half away from zero).
    ///
    /// Used for refund computation: a 30% cancellation fee retains
    /// `amount.percentage(70)` for the traveler.
    pub fn percentage(&self, percent: u8) -> Money {
        let scaled = self.cents as i128 * percent as i128;
        let rounded = if scaled >= 0 {
            (scaled + 50) / 100
        } else {
            (scaled - 50) / 100
        };
        Money {
            cents: rounded as i64,
        }
    }

    /// Saturating subtraction that never goes below zero.
    pub fn saturating_sub(&self, other: Money) -> Money {
        Money {
            cents: (self.cents - other.cents).max(0),
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-{}.{:02}", self.major().abs(), self.minor_part())
        } else {
            write!(f, "{}.{:02}", self.major(), self.minor_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents - rhs.cents,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents += rhs.cents;
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.cents -= rhs.cents;
    }
}

/// ISO 4217 currency code carried alongside every amount.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    /// Creates a currency from a code, uppercased.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    /// US dollars, the platform default.
    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::usd()
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_cents() {
        let money = Money::from_cents(1234);
        assert_eq!(money.cents(), 1234);
        assert_eq!(money.major(), 12);
        assert_eq!(money.minor_part(), 34);
    }

    #[test]
    fn test_money_from_major() {
        let money = Money::from_major(50);
        assert_eq!(money.cents(), 5000);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(1234).to_string(), "12.34");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-12.34");
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.multiply(3).cents(), 3000);
    }

    #[test]
    fn test_percentage_rounds_to_nearest_cent() {
        // 50% of $0.33 = 16.5 cents, rounds up to 17
        assert_eq!(Money::from_cents(33).percentage(50).cents(), 17);
        // 70% of $199.99 = 13999.3 cents, rounds down
        assert_eq!(Money::from_cents(19999).percentage(70).cents(), 13999);
        assert_eq!(Money::from_cents(10000).percentage(100).cents(), 10000);
        assert_eq!(Money::from_cents(10000).percentage(0).cents(), 0);
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        let a = Money::from_cents(100);
        let b = Money::from_cents(250);
        assert_eq!(a.saturating_sub(b), Money::zero());
        assert_eq!(b.saturating_sub(a).cents(), 150);
    }

    #[test]
    fn test_currency_uppercases() {
        assert_eq!(Currency::new("eur").as_str(), "EUR");
        assert_eq!(Currency::default().as_str(), "USD");
    }

    #[test]
    fn test_money_serialization() {
        let money = Money::from_cents(4200);
        let json = serde_json::to_string(&money).unwrap();
        let deserialized: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(money, deserialized);
    }
}
