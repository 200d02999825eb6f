//! # Stay Ranges
//!
//! A stay is the half-open night range `[check_in, check_out)`: the guest
//! sleeps on every night from check-in up to, but not including, check-out.
//!
//! ```text
//!   check_in = Jan 10, check_out = Jan 13
//!
//!   Jan 10   Jan 11   Jan 12 │ Jan 13
//!   ──night── ──night── ──night──│  (morning of departure, not a night)
//!                               │
//!   nights() = 3                │
//! ```
//!
//! Two stays overlap iff `start_a < end_b && end_a > start_b`, so a
//! departure and an arrival on the same day never conflict.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A validated night range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StayRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayRange {
    /// Creates a stay of at least one night.
    ///
    /// ## Errors
    /// `CoreError::InvalidRange` if `check_out <= check_in`.
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> CoreResult<Self> {
        if check_out <= check_in {
            return Err(CoreError::InvalidRange {
                check_in,
                check_out,
            });
        }

        Ok(StayRange {
            check_in,
            check_out,
        })
    }

    /// Creates a stay that may have zero nights (`check_out == check_in`).
    ///
    /// Only for quoting; a zero-night stay prices to zero and can never be
    /// admitted.
    pub fn allow_empty(check_in: NaiveDate, check_out: NaiveDate) -> CoreResult<Self> {
        if check_out < check_in {
            return Err(CoreError::InvalidRange {
                check_in,
                check_out,
            });
        }

        Ok(StayRange {
            check_in,
            check_out,
        })
    }

    #[inline]
    pub const fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    #[inline]
    pub const fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Number of nights in the stay.
    pub fn nights(&self) -> u32 {
        (self.check_out - self.check_in).num_days() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.check_in == self.check_out
    }

    /// Iterates the night dates, check-in inclusive, check-out exclusive.
    pub fn night_dates(&self) -> impl Iterator<Item = NaiveDate> {
        let check_out = self.check_out;
        self.check_in
            .iter_days()
            .take_while(move |date| *date < check_out)
    }

    /// Half-open overlap test against another stay.
    #[inline]
    pub fn overlaps(&self, other: &StayRange) -> bool {
        overlaps(self.check_in, self.check_out, other.check_in, other.check_out)
    }
}

/// Half-open interval overlap: `start_a < end_b && end_a > start_b`.
#[inline]
pub fn overlaps(
    start_a: NaiveDate,
    end_a: NaiveDate,
    start_b: NaiveDate,
    end_b: NaiveDate,
) -> bool {
    start_a < end_b && end_a > start_b
}

// =============================================================================
// Unit Tests
// =============================================================================
