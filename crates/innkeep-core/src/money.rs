//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A 3-night stay at $99.99 with a 20% weekend surcharge:                 │
//! │    99.99 × 1.2 = 119.988 → must round exactly once, half-up            │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Basis Points                             │
//! │    9999 cents × 12000 bps = 119_988_000 (exact, in 1/10000 cents)       │
//! │    Round once at the end: 11999 cents = $119.99                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding
//! Every computed amount (surcharged subtotal, discount, each tax line) is
//! rounded to cents with round-half-up (ties away from zero).
//!
//! ## Usage
//! ```rust
//! use innkeep_core::money::Money;
//!
//! let nightly = Money::from_cents(10000); // $100.00
//! let two_nights = nightly * 2;           // $200.00
//! assert_eq!(two_nights.cents(), 20000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Rate;

/// Number of basis points in 1 (100%).
pub const BPS_SCALE: i64 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds and adjustments
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  Room.base_rate ──► Pricing (per night, peak surcharge) ──► Subtotal   │
/// │                                                                         │
/// │  Subtotal ──► Discount ──► Net ──► State/County/City tax + Resort fee  │
/// │                                         │                               │
/// │                                         ▼                               │
/// │                                    Grand total ──► Refund (≤ total)    │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use innkeep_core::money::Money;
    ///
    /// let rate = Money::from_cents(12999); // Represents $129.99
    /// assert_eq!(rate.cents(), 12999);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// ## Example
    /// ```rust
    /// use innkeep_core::money::Money;
    ///
    /// let rate = Money::from_major_minor(149, 50); // $149.50
    /// assert_eq!(rate.cents(), 14950);
    ///
    /// let negative = Money::from_major_minor(-5, 50); // -$5.50
    /// assert_eq!(negative.cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Creates Money from an amount expressed in ten-thousandths of a cent,
    /// rounding half-up to whole cents.
    ///
    /// This is the single rounding point for amounts accumulated with
    /// basis-point multipliers (see [`Money::scaled_by`]). Results outside
    /// the `i64` range saturate instead of wrapping.
    ///
    /// ## Example
    /// ```rust
    /// use innkeep_core::money::Money;
    ///
    /// // 119.988 cents-per-10000 units → $119.99
    /// assert_eq!(Money::from_scaled(119_988_000).cents(), 11999);
    /// ```
    pub fn from_scaled(scaled: i128) -> Self {
        let cents = div_round_half_up(scaled, BPS_SCALE as i128);
        match i64::try_from(cents) {
            Ok(cents) => Money(cents),
            Err(_) if cents < 0 => Money(i64::MIN),
            Err(_) => Money(i64::MAX),
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    ///
    /// ## Example
    /// ```rust
    /// use innkeep_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).dollars(), 10);
    /// assert_eq!(Money::from_cents(-550).dollars(), -5);
    /// ```
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns the amount multiplied by a rate, unrounded, in ten-thousandths
    /// of a cent.
    ///
    /// Use this to accumulate several multiplied amounts and round once with
    /// [`Money::from_scaled`].
    #[inline]
    pub fn scaled_by(&self, rate: Rate) -> i128 {
        self.0 as i128 * rate.bps() as i128
    }

    /// Applies a rate and rounds the result to cents, half-up.
    ///
    /// Used for each tax line, the resort fee, percentage discounts and
    /// service charges.
    ///
    /// ## Example
    /// ```rust
    /// use innkeep_core::money::Money;
    /// use innkeep_core::types::Rate;
    ///
    /// let net = Money::from_cents(10000);  // $100.00
    /// let county = Rate::from_bps(575);    // 5.75%
    /// assert_eq!(net.apply_rate(county).cents(), 575);
    ///
    /// // $10.00 × 8.25% = $0.825 → $0.83 (half-up)
    /// assert_eq!(Money::from_cents(1000).apply_rate(Rate::from_bps(825)).cents(), 83);
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        Money::from_scaled(self.scaled_by(rate))
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    /// Multiplies money by a count (nights, quantity).
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Integer division rounding ties away from zero (`RoundingMode.HALF_UP`).
pub(crate) fn div_round_half_up(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;

    if remainder.abs() * 2 >= denominator.abs() {
        quotient + numerator.signum() * denominator.signum()
    } else {
        quotient
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
