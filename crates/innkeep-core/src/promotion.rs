//! # Promotion Validation
//!
//! Pure validity rules and discount math for promo codes. Redemption (the
//! atomic usage increment) happens in the store.
//!
//! ## Validity
//! ```text
//!   active  &&  valid_from <= date <= valid_until  &&  (max_uses unset || current_uses < max_uses)
//! ```
//!
//! ## Discount
//! ```text
//!   Percentage(1000 bps) on $250.00  → $25.00   (rounded half-up)
//!   FixedAmount($50.00)  on $30.00   → $30.00   (capped at subtotal)
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Discount, MembershipType, Promotion};

impl Promotion {
    /// Whether the usage cap has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.max_uses.map_or(false, |max| self.current_uses >= max)
    }

    /// Whether `date` falls inside the inclusive validity window.
    pub fn is_within_window(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && date <= self.valid_until
    }

    /// Whether the code can be redeemed on `date`.
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.is_active && self.is_within_window(date) && !self.is_exhausted()
    }

    /// Whether a stay of `nights` satisfies the minimum stay.
    ///
    /// An unknown night count is accepted.
    pub fn allows_stay(&self, nights: Option<u32>) -> bool {
        match (self.min_stay_nights, nights) {
            (Some(min), Some(n)) => n >= min,
            _ => true,
        }
    }

    /// Discount this promotion takes off `subtotal`.
    ///
    /// Never negative and never more than the subtotal.
    pub fn discount_for(&self, subtotal: Money) -> Money {
        if !subtotal.is_positive() {
            return Money::zero();
        }

        match self.discount {
            Discount::Percentage(rate) => subtotal.apply_rate(rate).min(subtotal),
            Discount::FixedAmount(amount) => amount.min(subtotal).max(Money::zero()),
        }
    }
}

/// Keeps `promotion` only if it is valid on `date`.
pub fn validate_promotion(promotion: Option<Promotion>, date: NaiveDate) -> Option<Promotion> {
    promotion.filter(|p| p.is_valid_on(date))
}

/// What a promo code would do to an amount, without redeeming it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PromotionPreview {
    pub code: String,
    pub valid: bool,
    pub discount: Money,
    pub description: Option<String>,
    pub membership: Option<MembershipType>,
}

impl PromotionPreview {
    /// Preview for a code that does not resolve to a usable promotion.
    pub fn invalid(code: impl Into<String>) -> Self {
        PromotionPreview {
            code: code.into(),
            valid: false,
            discount: Money::zero(),
            description: None,
            membership: None,
        }
    }
}

/// Builds a preview of `promotion` against `amount` on `date`.
pub fn preview(
    code: &str,
    promotion: Option<&Promotion>,
    amount: Money,
    date: NaiveDate,
) -> PromotionPreview {
    match promotion {
        Some(p) if p.is_valid_on(date) => PromotionPreview {
            code: p.code.clone(),
            valid: true,
            discount: p.discount_for(amount),
            description: Some(p.description.clone()),
            membership: Some(p.membership),
        },
        _ => PromotionPreview::invalid(code),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
