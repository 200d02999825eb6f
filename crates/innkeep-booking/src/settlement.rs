//! # Settlement Service
//!
//! Turns a reservation subtotal into a persisted, itemized charge, and
//! drives refunds and captures.
//!
//! ## Settle Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  settle(request)                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  promo code? ── find + validate + min stay ── invalid ► InvalidPromoCode│
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  resolve tax profile (no match → zero rates, WARN)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  compute_charge (discount → net → four tax lines → total)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  redeem promo (atomic increment) ── refused ──► InvalidPromoCode        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ChargeStore::save ── failed ──► release promo use, return error        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Ok(charge)   PAID (immediate) / PENDING (deferred)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use innkeep_core::promotion::{preview, validate_promotion};
use innkeep_core::settlement::{compute_charge, ChargeRequest};
use innkeep_core::tax::resolve_profile;
use innkeep_core::validation::{validate_id, validate_promo_code, validate_state_code};
use innkeep_core::{
    CaptureMode, ChargeBreakdown, CoreError, Jurisdiction, Money, PaymentMethod, Promotion,
    PromotionPreview, TaxJurisdictionProfile,
};
use innkeep_db::Database;

use crate::error::{BookingError, BookingResult};
use crate::store::{ChargeStore, PromotionStore, TaxProfileStore};

/// Inputs to [`SettlementService::settle`].
#[derive(Debug, Clone)]
pub struct SettleRequest {
    /// Pre-discount amount, normally the reservation's quoted subtotal.
    pub subtotal: Money,
    pub promo_code: Option<String>,
    /// Stay length, checked against a promotion's minimum stay when known.
    pub nights: Option<u32>,
    pub jurisdiction: Jurisdiction,
    /// Business date for promo validity and tax profile selection.
    pub date: NaiveDate,
    pub method: PaymentMethod,
    pub capture: CaptureMode,
    pub reservation_id: Option<String>,
}

impl SettleRequest {
    pub fn new(subtotal: Money, jurisdiction: Jurisdiction, date: NaiveDate) -> Self {
        SettleRequest {
            subtotal,
            promo_code: None,
            nights: None,
            jurisdiction,
            date,
            method: PaymentMethod::Card,
            capture: CaptureMode::Immediate,
            reservation_id: None,
        }
    }

    pub fn with_promo_code(mut self, code: impl Into<String>) -> Self {
        self.promo_code = Some(code.into());
        self
    }

    pub fn with_nights(mut self, nights: u32) -> Self {
        self.nights = Some(nights);
        self
    }

    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = method;
        self
    }

    pub fn deferred(mut self) -> Self {
        self.capture = CaptureMode::Deferred;
        self
    }

    pub fn for_reservation(mut self, reservation_id: impl Into<String>) -> Self {
        self.reservation_id = Some(reservation_id.into());
        self
    }
}

/// Charges, refunds and captures.
#[derive(Clone)]
pub struct SettlementService {
    tax_profiles: Arc<dyn TaxProfileStore>,
    promotions: Arc<dyn PromotionStore>,
    charges: Arc<dyn ChargeStore>,
}

impl SettlementService {
    pub fn new(
        tax_profiles: Arc<dyn TaxProfileStore>,
        promotions: Arc<dyn PromotionStore>,
        charges: Arc<dyn ChargeStore>,
    ) -> Self {
        SettlementService {
            tax_profiles,
            promotions,
            charges,
        }
    }

    /// Builds the service over the SQLite repositories of `db`.
    pub fn from_database(db: &Database) -> Self {
        SettlementService::new(
            Arc::new(db.tax_profiles()),
            Arc::new(db.promotions()),
            Arc::new(db.charges()),
        )
    }

    // =========================================================================
    // Settle
    // =========================================================================

    /// Computes, redeems and stores a charge.
    ///
    /// ## Errors
    /// - `CoreError::InvalidPromoCode` - code unknown, inactive, outside its
    ///   window, exhausted (also when exhausted by a concurrent settle), or
    ///   the stay is shorter than its minimum
    /// - `CoreError::InvalidAmount` - negative subtotal
    pub async fn settle(
        &self,
        request: SettleRequest,
        now: DateTime<Utc>,
    ) -> BookingResult<ChargeBreakdown> {
        let promotion = match request.promo_code.as_deref() {
            Some(code) => Some(self.require_promotion(code, request.date, request.nights).await?),
            None => None,
        };

        let profile = self.resolve_tax(&request.jurisdiction, request.date).await?;

        let charge = compute_charge(
            ChargeRequest {
                subtotal: request.subtotal,
                promotion: promotion.as_ref(),
                profile: &profile,
                method: request.method,
                capture: request.capture,
                reservation_id: request.reservation_id,
            },
            now,
        )?;

        if let Some(promotion) = &promotion {
            let redeemed = self
                .promotions
                .save_usage_increment(&promotion.code, request.date)
                .await?;
            if !redeemed {
                info!(code = %promotion.code, "Promotion exhausted before redemption");
                return Err(CoreError::InvalidPromoCode(promotion.code.clone()).into());
            }
        }

        if let Err(e) = self.charges.save(&charge).await {
            if let Some(promotion) = &promotion {
                self.release_promotion(&promotion.code).await;
            }
            return Err(e.into());
        }

        info!(
            charge_id = %charge.id,
            invoice_number = %charge.invoice_number,
            total = %charge.total(),
            status = %charge.status,
            promo_code = ?charge.promo_code,
            "Charge settled"
        );

        Ok(charge)
    }

    async fn require_promotion(
        &self,
        code: &str,
        date: NaiveDate,
        nights: Option<u32>,
    ) -> BookingResult<Promotion> {
        let code = validate_promo_code(code)
            .map_err(|_| CoreError::InvalidPromoCode(code.trim().to_string()))?;

        let promotion = self
            .validate_promotion(&code, date)
            .await?
            .ok_or_else(|| CoreError::InvalidPromoCode(code.clone()))?;

        if !promotion.allows_stay(nights) {
            debug!(
                code = %code,
                ?nights,
                min = ?promotion.min_stay_nights,
                "Stay below promotion minimum"
            );
            return Err(CoreError::InvalidPromoCode(code).into());
        }

        Ok(promotion)
    }

    async fn release_promotion(&self, code: &str) {
        match self.promotions.release_usage(code).await {
            Ok(true) => debug!(code = %code, "Promotion use released"),
            Ok(false) => warn!(code = %code, "Promotion use was not released"),
            Err(e) => warn!(code = %code, error = %e, "Failed to release promotion use"),
        }
    }

    // =========================================================================
    // Tax & Promotions
    // =========================================================================

    /// Picks the tax profile for `jurisdiction` on `date`.
    ///
    /// Falls back to a zero-rate profile, logged at WARN, when nothing
    /// applies.
    pub async fn resolve_tax(
        &self,
        jurisdiction: &Jurisdiction,
        date: NaiveDate,
    ) -> BookingResult<TaxJurisdictionProfile> {
        let state_code = validate_state_code(&jurisdiction.state_code)?;
        let candidates = self.tax_profiles.find_candidates(&state_code).await?;

        let profile = resolve_profile(&candidates, jurisdiction, date);
        if profile.is_fallback() {
            warn!(
                state = %jurisdiction.state_code,
                county = ?jurisdiction.county,
                city = ?jurisdiction.city,
                %date,
                "No tax profile applies; charging zero tax"
            );
        } else {
            debug!(profile_id = %profile.id, %date, "Tax profile resolved");
        }

        Ok(profile)
    }

    /// The promotion behind `code` if it is redeemable on `date`.
    pub async fn validate_promotion(
        &self,
        code: &str,
        date: NaiveDate,
    ) -> BookingResult<Option<Promotion>> {
        let found = self.promotions.find_by_code(code).await?;
        Ok(validate_promotion(found, date))
    }

    /// What `code` would take off `amount` on `date`, without redeeming it.
    pub async fn preview_promotion(
        &self,
        code: &str,
        amount: Money,
        date: NaiveDate,
    ) -> BookingResult<PromotionPreview> {
        let code = code.trim();
        if validate_promo_code(code).is_err() {
            return Ok(PromotionPreview::invalid(code));
        }

        let found = self.promotions.find_by_code(code).await?;
        Ok(preview(code, found.as_ref(), amount, date))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Refunds part or all of a PAID or CAPTURED charge.
    ///
    /// Promotion usage and room availability are left as they are. The write
    /// only applies if the stored charge is still refundable, so of two
    /// concurrent refunds exactly one succeeds.
    ///
    /// ## Errors
    /// - `CoreError::ChargeNotFound` - unknown charge
    /// - `CoreError::InvalidState` - charge is not PAID or CAPTURED, or was
    ///   refunded by a concurrent call
    /// - `CoreError::InvalidAmount` - `amount <= 0` or above the grand total
    pub async fn refund(
        &self,
        charge_id: &str,
        amount: Money,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> BookingResult<ChargeBreakdown> {
        let mut charge = self.load_charge(charge_id).await?;
        charge.apply_refund(amount, reason, now)?;

        if !self.charges.save_refund(&charge).await? {
            return Err(self.lost_transition(charge_id, "refund").await);
        }

        info!(charge_id = %charge_id, refund = %amount, "Charge refunded");
        Ok(charge)
    }

    /// Captures a PENDING or AUTHORIZED charge.
    pub async fn capture(
        &self,
        charge_id: &str,
        now: DateTime<Utc>,
    ) -> BookingResult<ChargeBreakdown> {
        let mut charge = self.load_charge(charge_id).await?;
        charge.capture(now)?;

        if !self.charges.save_capture(&charge).await? {
            return Err(self.lost_transition(charge_id, "capture").await);
        }

        info!(charge_id = %charge_id, total = %charge.total(), "Charge captured");
        Ok(charge)
    }

    /// The error for a lifecycle write refused because the stored status
    /// changed after the charge was loaded.
    async fn lost_transition(&self, charge_id: &str, operation: &str) -> BookingError {
        let status = match self.charges.find_by_id(charge_id).await {
            Ok(Some(current)) => current.status.to_string(),
            Ok(None) => return CoreError::ChargeNotFound(charge_id.to_string()).into(),
            Err(e) => return e.into(),
        };

        info!(charge_id = %charge_id, %status, operation, "Charge changed concurrently");
        CoreError::InvalidState {
            charge_id: charge_id.to_string(),
            status,
            operation: operation.to_string(),
        }
        .into()
    }

    pub async fn get_charge(&self, charge_id: &str) -> BookingResult<Option<ChargeBreakdown>> {
        Ok(self.charges.find_by_id(charge_id).await?)
    }

    async fn load_charge(&self, charge_id: &str) -> BookingResult<ChargeBreakdown> {
        validate_id("charge_id", charge_id)?;

        let charge = self
            .charges
            .find_by_id(charge_id)
            .await?
            .ok_or_else(|| CoreError::ChargeNotFound(charge_id.to_string()))?;

        Ok(charge)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
