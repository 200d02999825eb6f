//! # innkeep-core: Pure Booking Logic for Innkeep
//!
//! This crate is the **heart** of Innkeep. It contains the booking and
//! settlement rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Innkeep Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 innkeep-booking (orchestration)                 │   │
//! │  │     BookingService: admit / cancel                              │   │
//! │  │     SettlementService: settle / refund / capture / preview      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ innkeep-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  money   │ │ pricing  │ │   tax    │ │    promotion     │  │   │
//! │  │   │  Money   │ │ quote    │ │ resolve  │ │ validity/discount│  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │   ┌──────────┐ ┌──────────────┐ ┌────────────┐ ┌────────────┐  │   │
//! │  │   │   stay   │ │ availability │ │ settlement │ │ validation │  │   │
//! │  │   └──────────┘ └──────────────┘ └────────────┘ └────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  innkeep-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Room, Reservation, Promotion, ChargeBreakdown, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`stay`] - Half-open night ranges and the overlap rule
//! - [`availability`] - Conflict detection over existing reservations
//! - [`pricing`] - Nightly pricing with peak-day surcharges
//! - [`tax`] - Tax profile selection and tax lines
//! - [`promotion`] - Promo validity and discount math
//! - [`settlement`] - Charge computation and the charge state machine
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: "today" and "now" are parameters, never read from a clock
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: cents (i64) and basis points (u32), rounded half-up
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use innkeep_core::money::Money;
//! use innkeep_core::types::Rate;
//!
//! let net = Money::from_cents(10000); // $100.00
//! let county_tax = net.apply_rate(Rate::from_bps(575)); // 5.75%
//! assert_eq!(county_tax.cents(), 575);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod availability;
pub mod error;
pub mod money;
pub mod pricing;
pub mod promotion;
pub mod settlement;
pub mod stay;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{PriceQuote, PricingRules};
pub use promotion::PromotionPreview;
pub use stay::StayRange;
pub use tax::TaxLines;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default weekend surcharge: 1.20× in basis points.
pub const DEFAULT_PEAK_MULTIPLIER_BPS: u32 = 12_000;

/// Longest stay accepted for admission.
pub const MAX_STAY_NIGHTS: u32 = 365;

/// Largest price or subtotal accepted, in cents ($1,000,000,000.00).
///
/// Keeps every tax line and total of a charge well inside `i64`.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;

/// Maximum promo code length.
pub const MAX_PROMO_CODE_LEN: usize = 32;

/// Maximum length of a refund reason.
pub const MAX_REFUND_REASON_LEN: usize = 500;
