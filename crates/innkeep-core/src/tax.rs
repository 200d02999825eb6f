//! # Tax Rate Resolution
//!
//! Selects the tax profile for a jurisdiction on a date and applies it.
//!
//! ## Resolution Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Stay in Miami, Miami-Dade County, FL on 2024-06-01                     │
//! │                                                                         │
//! │  Candidates for FL:                                                    │
//! │    FL / –          / –      eff 2024-01-01        ✓ applies (state)    │
//! │    FL / Miami-Dade / –      eff 2024-01-01        ✓ applies (county)   │
//! │    FL / Miami-Dade / Miami  eff 2024-01-01        ✓ applies (city) ★   │
//! │    FL / Miami-Dade / Miami  eff 2024-07-01        ✗ not yet effective  │
//! │    FL / Broward    / –      eff 2024-01-01        ✗ other county       │
//! │                                                                         │
//! │  Most specific wins (city > county > state), then latest effective.    │
//! │  Nothing applies → zero-rate profile (fail-open).                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Jurisdiction, TaxJurisdictionProfile};

/// Whether an optional profile field accepts the requested value.
///
/// An unset profile field is a wildcard; a set one must match.
fn field_matches(profile_value: Option<&str>, requested: Option<&str>) -> bool {
    match (profile_value, requested) {
        (None, _) => true,
        (Some(p), Some(r)) => p.eq_ignore_ascii_case(r),
        (Some(_), None) => false,
    }
}

impl TaxJurisdictionProfile {
    /// The zero-rate profile used when no configured profile applies.
    pub fn zero(jurisdiction: &Jurisdiction, effective_date: NaiveDate) -> Self {
        TaxJurisdictionProfile {
            id: String::new(),
            state_code: jurisdiction.state_code.clone(),
            county: jurisdiction.county.clone(),
            city: jurisdiction.city.clone(),
            state_sales_rate_bps: 0,
            county_occupancy_rate_bps: 0,
            city_occupancy_rate_bps: 0,
            resort_fee_rate_bps: 0,
            effective_date,
            expiry_date: None,
        }
    }

    /// True for the fallback produced by [`TaxJurisdictionProfile::zero`].
    pub fn is_fallback(&self) -> bool {
        self.id.is_empty()
    }

    /// Whether this profile covers `jurisdiction` on `date`.
    pub fn applies_to(&self, jurisdiction: &Jurisdiction, date: NaiveDate) -> bool {
        self.state_code.eq_ignore_ascii_case(&jurisdiction.state_code)
            && field_matches(self.county.as_deref(), jurisdiction.county.as_deref())
            && field_matches(self.city.as_deref(), jurisdiction.city.as_deref())
            && self.effective_date <= date
            && self.expiry_date.map_or(true, |expiry| expiry >= date)
    }

    /// Ranking key: city-specific, then county-specific, then latest.
    fn specificity(&self) -> (bool, bool, NaiveDate) {
        (self.city.is_some(), self.county.is_some(), self.effective_date)
    }

    /// Applies each rate to `net`, rounding every line independently.
    pub fn apply(&self, net: Money) -> TaxLines {
        TaxLines {
            state_tax: net.apply_rate(self.state_sales_rate()),
            county_tax: net.apply_rate(self.county_occupancy_rate()),
            city_tax: net.apply_rate(self.city_occupancy_rate()),
            resort_fee: net.apply_rate(self.resort_fee_rate()),
        }
    }
}

/// Picks the best applicable profile from `candidates`.
///
/// Returns `None` when nothing applies; callers decide whether to fall back
/// to [`TaxJurisdictionProfile::zero`].
pub fn select_profile<'a>(
    candidates: &'a [TaxJurisdictionProfile],
    jurisdiction: &Jurisdiction,
    date: NaiveDate,
) -> Option<&'a TaxJurisdictionProfile> {
    candidates
        .iter()
        .filter(|p| p.applies_to(jurisdiction, date))
        .max_by_key(|p| p.specificity())
}

/// Picks the best applicable profile, or the zero-rate profile.
pub fn resolve_profile(
    candidates: &[TaxJurisdictionProfile],
    jurisdiction: &Jurisdiction,
    date: NaiveDate,
) -> TaxJurisdictionProfile {
    select_profile(candidates, jurisdiction, date)
        .cloned()
        .unwrap_or_else(|| TaxJurisdictionProfile::zero(jurisdiction, date))
}

/// The four tax amounts computed from a net amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxLines {
    pub state_tax: Money,
    pub county_tax: Money,
    pub city_tax: Money,
    pub resort_fee: Money,
}

impl TaxLines {
    pub fn total(&self) -> Money {
        self.state_tax + self.county_tax + self.city_tax + self.resort_fee
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
