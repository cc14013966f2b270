//! # Money Module
//!
//! Monetary values as integer centavos.
//!
//! ## Why Integer Money?
//! ```text
//! In floating point:  0.1 + 0.2 = 0.30000000000000004
//! In integer cents:   10 + 20 = 30
//! ```
//! Every monetary value in the system is an `i64` count of centavos. The
//! database, the calculations, and the API all use centavos; only display
//! formatting converts to reais.
//!
//! ## Usage
//! ```rust
//! use vitrine_core::money::Money;
//!
//! let price = Money::from_cents(10_000); // R$ 100,00
//! let total = price * 2;
//! assert_eq!(total.cents(), 20_000);
//! assert_eq!(total.to_string(), "R$ 200,00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in centavos (hundredths of a real).
///
/// - **i64 (signed)**: negative values represent refunds and shortfalls
/// - **Single-field tuple struct**: zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ```rust
    /// use vitrine_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // R$ 10,99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-real portion.
    #[inline]
    pub const fn reais(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavo portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies by a quantity.
    ///
    /// ```rust
    /// use vitrine_core::money::Money;
    ///
    /// let unit = Money::from_cents(299);
    /// assert_eq!(unit.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Applies a percentage expressed in basis points, rounding half up.
    ///
    /// 1 basis point = 0.01%, so 450 bps = 4.5%. The formula is
    /// `(amount · bps + 5000) / 10000` with an i128 intermediate so large
    /// balances cannot overflow.
    ///
    /// ```rust
    /// use vitrine_core::money::Money;
    ///
    /// let balance = Money::from_cents(10_000); // R$ 100,00
    /// assert_eq!(balance.apply_bps(450).cents(), 450); // 4.5% => R$ 4,50
    /// ```
    pub fn apply_bps(&self, bps: i64) -> Money {
        let cents = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// Divides into `parts` equal shares, rounding half up.
    ///
    /// Used for per-installment values. The caller decides what to do with
    /// the rounding residue; spec-wise the quoted installment value is the
    /// rounded share.
    pub fn divide_rounded(&self, parts: i64) -> Money {
        if parts <= 0 {
            return *self;
        }
        let half = parts / 2;
        Money::from_cents((self.0 + half) / parts)
    }
}

// =============================================================================
// Formatting
// =============================================================================

/// Formats centavos as a BRL string: `R$ 1.234,56`.
///
/// Thousands are separated by dots, decimals by a comma; negatives carry a
/// leading minus sign before the currency symbol.
///
/// ```rust
/// use vitrine_core::money::format_brl;
///
/// assert_eq!(format_brl(123_456), "R$ 1.234,56");
/// assert_eq!(format_brl(-550), "-R$ 5,50");
/// ```
pub fn format_brl(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.abs();
    let reais = abs / 100;
    let centavos = abs % 100;

    // Group the integer part in threes from the right.
    let digits = reais.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - offset) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    format!("{}R$ {},{:02}", sign, grouped, centavos)
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_brl(self.0))
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.reais(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(0), "R$ 0,00");
        assert_eq!(format_brl(500), "R$ 5,00");
        assert_eq!(format_brl(1099), "R$ 10,99");
        assert_eq!(format_brl(123_456), "R$ 1.234,56");
        assert_eq!(format_brl(100_000_000), "R$ 1.000.000,00");
        assert_eq!(format_brl(-550), "-R$ 5,50");
    }

    #[test]
    fn test_display_matches_format() {
        assert_eq!(Money::from_cents(123_456).to_string(), "R$ 1.234,56");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
    }

    #[test]
    fn test_apply_bps_rounds_half_up() {
        // R$ 100,00 at 4.55% = R$ 4,55
        assert_eq!(Money::from_cents(10_000).apply_bps(455).cents(), 455);
        // 1050 * 333 bps = 34.965 centavos => 35
        assert_eq!(Money::from_cents(1050).apply_bps(333).cents(), 35);
        // zero rate, zero fee
        assert_eq!(Money::from_cents(10_000).apply_bps(0).cents(), 0);
    }

    #[test]
    fn test_divide_rounded() {
        // R$ 100,00 over 3 installments: 3333.33.. => 3333
        assert_eq!(Money::from_cents(10_000).divide_rounded(3).cents(), 3333);
        // R$ 1,00 over 8: 12.5 => 13 (half up)
        assert_eq!(Money::from_cents(100).divide_rounded(8).cents(), 13);
        // guard against nonsense part counts
        assert_eq!(Money::from_cents(100).divide_rounded(0).cents(), 100);
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_cents(1).is_positive());
        assert!(Money::from_cents(-1).is_negative());
        assert_eq!(Money::from_cents(-550).abs().cents(), 550);
    }
}
