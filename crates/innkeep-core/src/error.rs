//! # Error Types
//!
//! Domain-specific error types for innkeep-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  innkeep-core errors (this file)                                       │
//! │  ├── CoreError        - Booking and settlement rule violations         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  innkeep-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  innkeep-booking errors                                                │
//! │  └── BookingError     - Core | Store | Config                          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │                          DbError ───┴─► BookingError → caller          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Booking and settlement errors.
///
/// Every variant is returned synchronously to the caller; the engine never
/// retries.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Check-out is not after check-in.
    #[error("Invalid stay range: check-out {check_out} must be after check-in {check_in}")]
    InvalidRange {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    /// Room id is unknown to the catalog.
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// Another active reservation overlaps the requested nights.
    ///
    /// ## When This Occurs
    /// ```text
    /// Existing:   [Jan 10 ──────── Jan 13)
    /// Requested:            [Jan 12 ──────── Jan 15)
    ///                        ▲
    ///                        night of Jan 12 is taken
    /// ```
    /// Also returned when a concurrent admission for the same nights
    /// committed first.
    #[error("Room {room_id} is not available from {check_in} to {check_out}")]
    RoomUnavailable {
        room_id: String,
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("Reservation not found: {0}")]
    ReservationNotFound(String),

    /// Promo code is unknown, inactive, out of its window, exhausted, or the
    /// stay is shorter than its minimum.
    #[error("Invalid promo code: {0}")]
    InvalidPromoCode(String),

    /// Charge is not in a status that allows the requested operation.
    #[error("Charge {charge_id} is {status}, cannot {operation}")]
    InvalidState {
        charge_id: String,
        status: String,
        operation: String,
    },

    /// Monetary amount is not acceptable for the operation.
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("Charge not found: {0}")]
    ChargeNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid state code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::RoomUnavailable {
            room_id: "room-101".to_string(),
            check_in: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Room room-101 is not available from 2024-01-12 to 2024-01-15"
        );

        let err = CoreError::InvalidState {
            charge_id: "c-1".to_string(),
            status: "pending".to_string(),
            operation: "refund".to_string(),
        };
        assert_eq!(err.to_string(), "Charge c-1 is pending, cannot refund");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "promo_code".to_string(),
        };
        assert_eq!(err.to_string(), "promo_code is required");

        let err = ValidationError::TooLong {
            field: "reason".to_string(),
            max: 500,
        };
        assert_eq!(err.to_string(), "reason must be at most 500 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "room_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
