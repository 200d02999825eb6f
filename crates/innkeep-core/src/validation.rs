//! # Validation Module
//!
//! Input validation utilities for Innkeep.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (front desk / channel manager)                        │
//! │  └── Basic format checks, immediate feedback                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: innkeep-booking services                                     │
//! │  └── THIS MODULE: ids, codes, rates, stay length                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (check_out > check_in)                                      │
//! │  ├── UNIQUE (promotions.code)                                          │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_AMOUNT_CENTS, MAX_PROMO_CODE_LEN, MAX_STAY_NIGHTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a promo code and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - At most 32 characters
/// - Letters, digits, hyphens and underscores only
///
/// Codes are case-sensitive; no case folding happens here.
///
/// ## Example
/// ```rust
/// use innkeep_core::validation::validate_promo_code;
///
/// assert_eq!(validate_promo_code(" AAA2024 ").unwrap(), "AAA2024");
/// assert!(validate_promo_code("").is_err());
/// assert!(validate_promo_code("TEN PERCENT").is_err());
/// ```
pub fn validate_promo_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "promo_code".to_string(),
        });
    }

    if code.len() > MAX_PROMO_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "promo_code".to_string(),
            max: MAX_PROMO_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "promo_code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code.to_string())
}

/// Validates a two-letter state code and returns it uppercased.
///
/// ## Example
/// ```rust
/// use innkeep_core::validation::validate_state_code;
///
/// assert_eq!(validate_state_code("ny").unwrap(), "NY");
/// assert!(validate_state_code("New York").is_err());
/// ```
pub fn validate_state_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "state_code".to_string(),
        });
    }

    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidFormat {
            field: "state_code".to_string(),
            reason: "must be a two-letter state code".to_string(),
        });
    }

    Ok(code.to_ascii_uppercase())
}

/// Validates a non-empty identifier (room id, reservation id, charge id).
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (complimentary rooms)
/// - At most MAX_AMOUNT_CENTS
///
/// ## Example
/// ```rust
/// use innkeep_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(12999).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// assert!(validate_price_cents(i64::MAX).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_AMOUNT_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

/// Validates a tax or discount rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_rate_bps(field: &str, bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

/// Validates a surcharge multiplier in basis points.
///
/// ## Rules
/// - At least 1.00× (10000 bps); surcharges never discount
/// - At most 5.00× (50000 bps)
pub fn validate_multiplier_bps(bps: u32) -> ValidationResult<()> {
    if !(10_000..=50_000).contains(&bps) {
        return Err(ValidationError::OutOfRange {
            field: "peak_multiplier_bps".to_string(),
            min: 10_000,
            max: 50_000,
        });
    }

    Ok(())
}

/// Validates the length of a stay.
///
/// ## Rules
/// - At most MAX_STAY_NIGHTS (365)
pub fn validate_stay_length(nights: u32) -> ValidationResult<()> {
    if nights > MAX_STAY_NIGHTS {
        return Err(ValidationError::OutOfRange {
            field: "nights".to_string(),
            min: 1,
            max: MAX_STAY_NIGHTS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use innkeep_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_promo_code() {
        assert_eq!(validate_promo_code("CORP2024").unwrap(), "CORP2024");
        assert_eq!(validate_promo_code("early_bird-1").unwrap(), "early_bird-1");

        assert!(validate_promo_code("").is_err());
        assert!(validate_promo_code("   ").is_err());
        assert!(validate_promo_code("has space").is_err());
        assert!(validate_promo_code(&"A".repeat(40)).is_err());
    }

    #[test]
    fn test_validate_state_code() {
        assert_eq!(validate_state_code("ca").unwrap(), "CA");
        assert!(validate_state_code("").is_err());
        assert!(validate_state_code("C1").is_err());
        assert!(validate_state_code("CAL").is_err());
    }

    #[test]
    fn test_validate_price_cents_bounds() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(MAX_AMOUNT_CENTS).is_ok());
        assert!(validate_price_cents(MAX_AMOUNT_CENTS + 1).is_err());
        assert!(validate_price_cents(-1).is_err());
    }

    #[test]
    fn test_validate_rate_bps() {
        assert!(validate_rate_bps("state_sales_rate", 0).is_ok());
        assert!(validate_rate_bps("state_sales_rate", 10_000).is_ok());
        assert!(validate_rate_bps("state_sales_rate", 10_001).is_err());
    }

    #[test]
    fn test_validate_multiplier_bps() {
        assert!(validate_multiplier_bps(12_000).is_ok());
        assert!(validate_multiplier_bps(10_000).is_ok());
        assert!(validate_multiplier_bps(9_999).is_err());
        assert!(validate_multiplier_bps(50_001).is_err());
    }

    #[test]
    fn test_validate_stay_length() {
        assert!(validate_stay_length(1).is_ok());
        assert!(validate_stay_length(365).is_ok());
        assert!(validate_stay_length(366).is_err());
    }

    #[test]
    fn test_validate_id_and_uuid() {
        assert!(validate_id("room_id", "room-101").is_ok());
        assert!(validate_id("room_id", " ").is_err());
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("123").is_err());
    }
}
