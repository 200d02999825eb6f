//! # Pricing Engine
//!
//! Turns a room's base nightly rate and a stay into a quoted subtotal.
//!
//! ## Calculation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Room 101, base $100.00, Thu Jan 4 → Sun Jan 7 (3 nights)              │
//! │                                                                         │
//! │  Thu Jan 4   base        100.00 × 1.00  = 1_000_000 (cents × bps)      │
//! │  Fri Jan 5   peak        100.00 × 1.20  = 1_200_000                    │
//! │  Sat Jan 6   peak        100.00 × 1.20  = 1_200_000                    │
//! │                                          ─────────                      │
//! │  exact sum                                3_400_000                     │
//! │  round once (half-up, /10000)  ─────────► 34000 cents = $340.00        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A night is peak when the night *starts* on a peak weekday, so Friday and
//! Saturday nights are surcharged and Sunday night is not.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::stay::StayRange;
use crate::types::{Rate, Room};
use crate::DEFAULT_PEAK_MULTIPLIER_BPS;

// =============================================================================
// Rules
// =============================================================================

/// Date-dependent surcharge rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRules {
    /// Weekdays whose night is charged at the peak multiplier.
    pub peak_days: Vec<Weekday>,

    /// Multiplier applied to peak nights (12000 bps = 1.20×).
    pub peak_multiplier: Rate,
}

impl Default for PricingRules {
    fn default() -> Self {
        PricingRules {
            peak_days: vec![Weekday::Fri, Weekday::Sat],
            peak_multiplier: Rate::from_bps(DEFAULT_PEAK_MULTIPLIER_BPS),
        }
    }
}

impl PricingRules {
    pub fn is_peak(&self, night: NaiveDate) -> bool {
        self.peak_days.contains(&night.weekday())
    }

    /// Multiplier for the night starting on `night`.
    pub fn multiplier_for(&self, night: NaiveDate) -> Rate {
        if self.is_peak(night) {
            self.peak_multiplier
        } else {
            Rate::one()
        }
    }
}

// =============================================================================
// Quote
// =============================================================================

/// One priced night.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NightCharge {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub is_peak: bool,
    pub multiplier: Rate,
    /// Nightly amount rounded for display. The subtotal is not the sum of
    /// these; it is rounded once from the exact amounts.
    pub amount: Money,
}

/// An immutable price for a room and stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceQuote {
    pub room_id: String,
    #[ts(as = "String")]
    pub check_in: NaiveDate,
    #[ts(as = "String")]
    pub check_out: NaiveDate,
    pub nights: Vec<NightCharge>,
    pub subtotal: Money,
}

impl PriceQuote {
    pub fn night_count(&self) -> usize {
        self.nights.len()
    }
}

/// Prices a validated stay.
pub fn quote_stay(room: &Room, stay: &StayRange, rules: &PricingRules) -> PriceQuote {
    let base = room.base_rate();

    let mut exact_total: i128 = 0;
    let nights: Vec<NightCharge> = stay
        .night_dates()
        .map(|date| {
            let multiplier = rules.multiplier_for(date);
            let exact = base.scaled_by(multiplier);
            exact_total += exact;

            NightCharge {
                date,
                is_peak: rules.is_peak(date),
                multiplier,
                amount: Money::from_scaled(exact),
            }
        })
        .collect();

    PriceQuote {
        room_id: room.id.clone(),
        check_in: stay.check_in(),
        check_out: stay.check_out(),
        nights,
        subtotal: Money::from_scaled(exact_total),
    }
}

/// Prices a stay given raw dates.
///
/// ## Errors
/// `CoreError::InvalidRange` if `check_out <= check_in`.
///
/// ## Example
/// ```rust,ignore
/// let quote = quote(&room, check_in, check_out, &PricingRules::default())?;
/// assert_eq!(quote.subtotal, Money::from_cents(24000)); // Fri + Sat at $100
/// ```
pub fn quote(
    room: &Room,
    check_in: NaiveDate,
    check_out: NaiveDate,
    rules: &PricingRules,
) -> CoreResult<PriceQuote> {
    let stay = StayRange::new(check_in, check_out)?;
    Ok(quote_stay(room, &stay, rules))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::types::{RoomStatus, RoomType};

    fn room(base_cents: i64) -> Room {
        Room {
            id: "room-101".to_string(),
            room_number: "101".to_string(),
            room_type: RoomType::Double,
            base_rate_cents: base_cents,
            status: RoomStatus::Available,
        }
    }

    // January 2024: Mon 1st, Fri 5th, Sat 6th, Sun 7th
    fn jan(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_weekday_nights_at_base_rate() {
        let q = quote(&room(10000), jan(1), jan(3), &PricingRules::default()).unwrap();
        assert_eq!(q.night_count(), 2);
        assert!(q.nights.iter().all(|n| !n.is_peak));
        assert_eq!(q.subtotal.cents(), 20000);
    }

    #[test]
    fn test_friday_and_saturday_are_peak() {
        let q = quote(&room(10000), jan(5), jan(7), &PricingRules::default()).unwrap();
        assert!(q.nights.iter().all(|n| n.is_peak));
        assert_eq!(q.subtotal.cents(), 24000);
    }

    #[test]
    fn test_sunday_night_is_not_peak() {
        let q = quote(&room(10000), jan(7), jan(8), &PricingRules::default()).unwrap();
        assert!(!q.nights[0].is_peak);
        assert_eq!(q.subtotal.cents(), 10000);
    }

    #[test]
    fn test_single_friday_rounds_half_up() {
        // 99.99 × 1.20 = 119.988 → 119.99
        let q = quote(&room(9999), jan(5), jan(6), &PricingRules::default()).unwrap();
        assert_eq!(q.subtotal.cents(), 11999);
    }

    #[test]
    fn test_subtotal_rounded_once_after_summation() {
        // Fri + Sat at $33.33: exact 39.996 each, 79.992 total → 79.99
        let q = quote(&room(3333), jan(5), jan(7), &PricingRules::default()).unwrap();
        assert_eq!(q.subtotal.cents(), 7999);
        // Display amounts per night are rounded individually
        assert_eq!(q.nights[0].amount.cents(), 4000);
    }

    #[test]
    fn test_invalid_range() {
        let err = quote(&room(10000), jan(5), jan(5), &PricingRules::default()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRange { .. }));
    }

    #[test]
    fn test_empty_stay_quotes_zero() {
        let stay = StayRange::allow_empty(jan(5), jan(5)).unwrap();
        let q = quote_stay(&room(10000), &stay, &PricingRules::default());
        assert!(q.nights.is_empty());
        assert!(q.subtotal.is_zero());
    }

    #[test]
    fn test_custom_rules() {
        let rules = PricingRules {
            peak_days: vec![Weekday::Mon],
            peak_multiplier: Rate::from_bps(15_000),
        };
        let q = quote(&room(10000), jan(1), jan(3), &rules).unwrap();
        assert_eq!(q.subtotal.cents(), 25000);
    }
}
