//! # Domain Types
//!
//! Core domain types used throughout Innkeep.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Room       │   │   Reservation   │   │ ChargeBreakdown │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  room_number    │   │  room_id (FK)   │   │  invoice_number │       │
//! │  │  base_rate      │   │  check_in/out   │   │  net, 4 taxes   │       │
//! │  │  status         │   │  subtotal       │   │  status         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Rate       │   │   Promotion     │   │ TaxJurisdiction │       │
//! │  │  ─────────────  │   │  ─────────────  │   │     Profile     │       │
//! │  │  bps (u32)      │   │  code           │   │  ─────────────  │       │
//! │  │  575 = 5.75%    │   │  Discount       │   │  state/county/  │       │
//! │  │  12000 = 1.20×  │   │  uses/max_uses  │   │  city + 4 rates │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (room_number, invoice_number, promo code) - human-readable

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Rate
// =============================================================================

/// A rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
///
/// The same type carries every multiplicative factor of the engine:
/// ```text
///   575 bps   = 5.75%   county occupancy tax
///   1000 bps  = 10%     percentage promotion
///   12000 bps = 1.20×   weekend surcharge multiplier
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        Rate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// The identity multiplier (1.00×).
    #[inline]
    pub const fn one() -> Self {
        Rate(10_000)
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Room
// =============================================================================

/// Operational status of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    /// Ready to be sold.
    #[default]
    Available,
    /// Occupied or held for a guest checking in today.
    Booked,
    /// Out of order.
    Maintenance,
    /// Being turned over by housekeeping.
    Cleaning,
}

impl RoomStatus {
    /// Returns the storage/display name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "available",
            RoomStatus::Booked => "booked",
            RoomStatus::Maintenance => "maintenance",
            RoomStatus::Cleaning => "cleaning",
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Room category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Single,
    Double,
    Suite,
}

/// A sellable room, as seen by the booking engine.
///
/// The room catalog owns this record; admission only reads it and may
/// request a status transition.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Room {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Door number shown to guests.
    pub room_number: String,

    pub room_type: RoomType,

    /// Base nightly rate in cents.
    pub base_rate_cents: i64,

    pub status: RoomStatus,
}

impl Room {
    /// Returns the base nightly rate as Money.
    #[inline]
    pub fn base_rate(&self) -> Money {
        Money::from_cents(self.base_rate_cents)
    }
}

// =============================================================================
// Reservation
// =============================================================================

/// Lifecycle status of a reservation.
///
/// ```text
///   admit ──► Confirmed ──cancel──► Cancelled
///   (Pending is reserved for holds created outside the engine)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    /// Whether a reservation in this status occupies its room.
    #[inline]
    pub const fn blocks_room(&self) -> bool {
        !matches!(self, ReservationStatus::Cancelled)
    }
}

/// The guest a reservation is made for.
///
/// Guest records live in an external directory; the engine only needs
/// enough to address a confirmation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GuestRef {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl GuestRef {
    /// Creates a guest reference with a display name and email.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        GuestRef {
            id: None,
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }

    /// Sets the guest directory id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// A room reservation over the half-open night range `[check_in, check_out)`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Reservation {
    pub id: String,
    pub room_id: String,
    pub guest_id: Option<String>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    #[ts(as = "String")]
    pub check_in: NaiveDate,
    /// First morning the room is free again (exclusive).
    #[ts(as = "String")]
    pub check_out: NaiveDate,
    pub status: ReservationStatus,
    /// Quoted subtotal in cents; the basis for settlement.
    pub subtotal_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Returns the quoted subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    /// Returns the guest reference carried on this reservation.
    pub fn guest(&self) -> GuestRef {
        GuestRef {
            id: self.guest_id.clone(),
            name: self.guest_name.clone(),
            email: self.guest_email.clone(),
        }
    }

    /// Number of nights booked.
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

// =============================================================================
// Tax Jurisdiction
// =============================================================================

/// Where a stay is taxed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Jurisdiction {
    /// Two-letter U.S. state code.
    pub state_code: String,
    pub county: Option<String>,
    pub city: Option<String>,
}

impl Jurisdiction {
    /// State-only jurisdiction.
    pub fn new(state_code: impl Into<String>) -> Self {
        Jurisdiction {
            state_code: state_code.into(),
            county: None,
            city: None,
        }
    }

    pub fn with_county(mut self, county: impl Into<String>) -> Self {
        self.county = Some(county.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }
}

/// The set of rates that apply to lodging in one jurisdiction from an
/// effective date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TaxJurisdictionProfile {
    pub id: String,
    pub state_code: String,
    pub county: Option<String>,
    pub city: Option<String>,
    pub state_sales_rate_bps: u32,
    pub county_occupancy_rate_bps: u32,
    pub city_occupancy_rate_bps: u32,
    pub resort_fee_rate_bps: u32,
    #[ts(as = "String")]
    pub effective_date: NaiveDate,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
}

impl TaxJurisdictionProfile {
    pub fn state_sales_rate(&self) -> Rate {
        Rate::from_bps(self.state_sales_rate_bps)
    }

    pub fn county_occupancy_rate(&self) -> Rate {
        Rate::from_bps(self.county_occupancy_rate_bps)
    }

    pub fn city_occupancy_rate(&self) -> Rate {
        Rate::from_bps(self.city_occupancy_rate_bps)
    }

    pub fn resort_fee_rate(&self) -> Rate {
        Rate::from_bps(self.resort_fee_rate_bps)
    }

    /// Sum of the four rates.
    pub fn combined_rate(&self) -> Rate {
        Rate::from_bps(
            self.state_sales_rate_bps
                + self.county_occupancy_rate_bps
                + self.city_occupancy_rate_bps
                + self.resort_fee_rate_bps,
        )
    }
}

// =============================================================================
// Promotion
// =============================================================================

/// Membership program a promotion is tied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MembershipType {
    #[default]
    None,
    Aaa,
    Aarp,
    Military,
    Corporate,
    Government,
}

/// How a promotion reduces the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Discount {
    /// Fraction of the subtotal, in basis points (1000 = 10%).
    Percentage(Rate),
    /// Flat amount, never more than the subtotal.
    FixedAmount(Money),
}

/// A promotional code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Promotion {
    pub id: String,
    /// Case-sensitive, unique.
    pub code: String,
    pub description: String,
    pub membership: MembershipType,
    pub discount: Discount,
    pub min_stay_nights: Option<u32>,
    pub max_uses: Option<u32>,
    pub current_uses: u32,
    /// First day the code is valid (inclusive).
    #[ts(as = "String")]
    pub valid_from: NaiveDate,
    /// Last day the code is valid (inclusive).
    #[ts(as = "String")]
    pub valid_until: NaiveDate,
    pub is_active: bool,
}

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Cash,
    /// Unified Payments Interface transfer.
    Upi,
    Check,
    Ach,
    Wire,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 6] = [
        PaymentMethod::Card,
        PaymentMethod::Cash,
        PaymentMethod::Upi,
        PaymentMethod::Check,
        PaymentMethod::Ach,
        PaymentMethod::Wire,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Check => "check",
            PaymentMethod::Ach => "ach",
            PaymentMethod::Wire => "wire",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a payment method name, case-insensitively.
///
/// Unknown names are rejected rather than mapped to a fallback method.
impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: PaymentMethod::ALL
                    .iter()
                    .map(|m| m.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Charge
// =============================================================================

/// Status of a settled charge.
///
/// ```text
///   Pending ──┐
///             ├──capture──► Captured ──refund──► Refunded
///   Authorized┘
///
///   Paid ─────────────────────────────refund──► Refunded
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    #[default]
    Pending,
    Authorized,
    Captured,
    Paid,
    Refunded,
    Failed,
}

impl ChargeStatus {
    /// Whether money has been collected and can be returned.
    #[inline]
    pub const fn is_refundable(&self) -> bool {
        matches!(self, ChargeStatus::Paid | ChargeStatus::Captured)
    }

    /// Whether a deferred charge can still be captured.
    #[inline]
    pub const fn is_capturable(&self) -> bool {
        matches!(self, ChargeStatus::Pending | ChargeStatus::Authorized)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ChargeStatus::Pending => "pending",
            ChargeStatus::Authorized => "authorized",
            ChargeStatus::Captured => "captured",
            ChargeStatus::Paid => "paid",
            ChargeStatus::Refunded => "refunded",
            ChargeStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ChargeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a settlement collects immediately or only records the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// Charge is PAID on creation.
    #[default]
    Immediate,
    /// Charge is PENDING until captured.
    Deferred,
}

/// An itemized charge produced by settlement.
///
/// Uses the snapshot pattern: rates and amounts are frozen at settlement
/// time, later profile edits do not change a stored charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ChargeBreakdown {
    pub id: String,
    pub reservation_id: Option<String>,
    /// `INV-YYYYMMDD-XXXX`.
    pub invoice_number: String,
    pub method: PaymentMethod,
    pub promo_code: Option<String>,
    /// Pre-discount amount.
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    /// Subtotal minus discount; the tax base.
    pub net_cents: i64,
    pub state_tax_cents: i64,
    pub county_tax_cents: i64,
    pub city_tax_cents: i64,
    pub resort_fee_cents: i64,
    pub total_tax_cents: i64,
    pub total_cents: i64,
    /// Profile the taxes were computed from; None for the zero-rate fallback.
    pub tax_profile_id: Option<String>,
    pub state_rate_bps: u32,
    pub county_rate_bps: u32,
    pub city_rate_bps: u32,
    pub resort_fee_rate_bps: u32,
    pub status: ChargeStatus,
    pub refund_cents: Option<i64>,
    #[ts(as = "Option<String>")]
    pub refunded_at: Option<DateTime<Utc>>,
    pub refund_reason: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub paid_at: Option<DateTime<Utc>>,
}

impl ChargeBreakdown {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    #[inline]
    pub fn net(&self) -> Money {
        Money::from_cents(self.net_cents)
    }

    #[inline]
    pub fn total_tax(&self) -> Money {
        Money::from_cents(self.total_tax_cents)
    }

    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn refund(&self) -> Option<Money> {
        self.refund_cents.map(Money::from_cents)
    }

    /// Human-readable rates applied, as percentages.
    pub fn tax_summary(&self) -> TaxSummary {
        TaxSummary {
            state_rate_percent: Rate::from_bps(self.state_rate_bps).percentage(),
            county_rate_percent: Rate::from_bps(self.county_rate_bps).percentage(),
            city_rate_percent: Rate::from_bps(self.city_rate_bps).percentage(),
            resort_fee_rate_percent: Rate::from_bps(self.resort_fee_rate_bps).percentage(),
            total_tax: self.total_tax(),
        }
    }
}

/// Rates applied to a charge, for receipts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxSummary {
    pub state_rate_percent: f64,
    pub county_rate_percent: f64,
    pub city_rate_percent: f64,
    pub resort_fee_rate_percent: f64,
    pub total_tax: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
