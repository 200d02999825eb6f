//! # Settlement Math
//!
//! Builds an itemized [`ChargeBreakdown`] from a subtotal, an already
//! validated promotion and a resolved tax profile, and drives the charge
//! state machine (refund, capture).
//!
//! ## Calculation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal                              $100.00                          │
//! │  − discount (promo)                      $0.00                          │
//! │  = net                                 $100.00   ◄── tax base           │
//! │                                                                         │
//! │  state sales      4.00%   net × rate →   $4.00   each line rounded     │
//! │  county occupancy 5.75%                  $5.75   half-up on its own    │
//! │  city occupancy   3.75%                  $3.75                          │
//! │  resort fee       2.00%                  $2.00                          │
//! │                                         ───────                         │
//! │  total tax                              $15.50                          │
//! │  grand total = net + total tax         $115.50                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation::validate_price_cents;
use crate::MAX_AMOUNT_CENTS;
use crate::types::{
    CaptureMode, ChargeBreakdown, ChargeStatus, PaymentMethod, Promotion, TaxJurisdictionProfile,
};
use crate::MAX_REFUND_REASON_LEN;

/// Everything needed to price a charge.
#[derive(Debug, Clone)]
pub struct ChargeRequest<'a> {
    pub subtotal: Money,
    pub promotion: Option<&'a Promotion>,
    pub profile: &'a TaxJurisdictionProfile,
    pub method: PaymentMethod,
    pub capture: CaptureMode,
    pub reservation_id: Option<String>,
}

/// Generates an invoice number: `INV-YYYYMMDD-XXXX`.
///
/// `XXXX` is the first four hex characters of a fresh UUID, uppercased.
pub fn generate_invoice_number(at: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(4)
        .collect::<String>()
        .to_uppercase();

    format!("INV-{}-{}", at.format("%Y%m%d"), suffix)
}

/// Computes a new charge.
///
/// ## Errors
/// `CoreError::InvalidAmount` if the subtotal is negative or above
/// [`MAX_AMOUNT_CENTS`].
pub fn compute_charge(
    request: ChargeRequest<'_>,
    now: DateTime<Utc>,
) -> CoreResult<ChargeBreakdown> {
    let subtotal = request.subtotal;
    if validate_price_cents(subtotal.cents()).is_err() {
        return Err(CoreError::InvalidAmount {
            reason: format!(
                "subtotal {subtotal} is outside 0.00..={}",
                Money::from_cents(MAX_AMOUNT_CENTS)
            ),
        });
    }

    let discount = request
        .promotion
        .map(|p| p.discount_for(subtotal))
        .unwrap_or_default();
    let net = subtotal - discount;

    let profile = request.profile;
    let lines = profile.apply(net);
    let total_tax = lines.total();
    let total = net + total_tax;

    let (status, paid_at) = match request.capture {
        CaptureMode::Immediate => (ChargeStatus::Paid, Some(now)),
        CaptureMode::Deferred => (ChargeStatus::Pending, None),
    };

    Ok(ChargeBreakdown {
        id: Uuid::new_v4().to_string(),
        reservation_id: request.reservation_id,
        invoice_number: generate_invoice_number(now),
        method: request.method,
        promo_code: request.promotion.map(|p| p.code.clone()),
        subtotal_cents: subtotal.cents(),
        discount_cents: discount.cents(),
        net_cents: net.cents(),
        state_tax_cents: lines.state_tax.cents(),
        county_tax_cents: lines.county_tax.cents(),
        city_tax_cents: lines.city_tax.cents(),
        resort_fee_cents: lines.resort_fee.cents(),
        total_tax_cents: total_tax.cents(),
        total_cents: total.cents(),
        tax_profile_id: (!profile.is_fallback()).then(|| profile.id.clone()),
        state_rate_bps: profile.state_sales_rate_bps,
        county_rate_bps: profile.county_occupancy_rate_bps,
        city_rate_bps: profile.city_occupancy_rate_bps,
        resort_fee_rate_bps: profile.resort_fee_rate_bps,
        status,
        refund_cents: None,
        refunded_at: None,
        refund_reason: None,
        created_at: now,
        paid_at,
    })
}

impl ChargeBreakdown {
    fn invalid_state(&self, operation: &str) -> CoreError {
        CoreError::InvalidState {
            charge_id: self.id.clone(),
            status: self.status.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Records a refund and moves the charge to REFUNDED.
    ///
    /// ## Errors
    /// - `InvalidState` unless the charge is PAID or CAPTURED
    /// - `InvalidAmount` if `amount <= 0` or `amount > total`
    pub fn apply_refund(
        &mut self,
        amount: Money,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> CoreResult<()> {
        if !self.status.is_refundable() {
            return Err(self.invalid_state("refund"));
        }

        if !amount.is_positive() {
            return Err(CoreError::InvalidAmount {
                reason: "refund amount must be positive".to_string(),
            });
        }

        if amount > self.total() {
            return Err(CoreError::InvalidAmount {
                reason: format!("refund {} exceeds charge total {}", amount, self.total()),
            });
        }

        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        if reason.as_ref().map_or(false, |r| r.len() > MAX_REFUND_REASON_LEN) {
            return Err(crate::ValidationError::TooLong {
                field: "refund_reason".to_string(),
                max: MAX_REFUND_REASON_LEN,
            }
            .into());
        }

        self.refund_cents = Some(amount.cents());
        self.refund_reason = reason;
        self.refunded_at = Some(at);
        self.status = ChargeStatus::Refunded;
        Ok(())
    }

    /// Captures a deferred charge.
    ///
    /// ## Errors
    /// `InvalidState` unless the charge is PENDING or AUTHORIZED.
    pub fn capture(&mut self, at: DateTime<Utc>) -> CoreResult<()> {
        if !self.status.is_capturable() {
            return Err(self.invalid_state("capture"));
        }

        self.status = ChargeStatus::Captured;
        self.paid_at = Some(at);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Discount, MembershipType, Rate};
    use chrono::{NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn ny_profile() -> TaxJurisdictionProfile {
        TaxJurisdictionProfile {
            id: "tax-ny".to_string(),
            state_code: "NY".to_string(),
            county: Some("New York".to_string()),
            city: Some("New York".to_string()),
            state_sales_rate_bps: 400,
            county_occupancy_rate_bps: 575,
            city_occupancy_rate_bps: 375,
            resort_fee_rate_bps: 200,
            effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            expiry_date: None,
        }
    }

    fn settle(subtotal: i64, capture: CaptureMode) -> CoreResult<ChargeBreakdown> {
        compute_charge(request(subtotal, None, &ny_profile(), capture), now())
    }

    fn request<'a>(
        subtotal: i64,
        promotion: Option<&'a Promotion>,
        profile: &'a TaxJurisdictionProfile,
        capture: CaptureMode,
    ) -> ChargeRequest<'a> {
        ChargeRequest {
            subtotal: Money::from_cents(subtotal),
            promotion,
            profile,
            method: PaymentMethod::Card,
            capture,
            reservation_id: None,
        }
    }

    #[test]
    fn test_stacked_taxes_on_hundred_dollars() {
        let charge = settle(10000, CaptureMode::Immediate).unwrap();

        assert_eq!(charge.net_cents, 10000);
        assert_eq!(charge.state_tax_cents, 400);
        assert_eq!(charge.county_tax_cents, 575);
        assert_eq!(charge.city_tax_cents, 375);
        assert_eq!(charge.resort_fee_cents, 200);
        assert_eq!(charge.total_tax_cents, 1550);
        assert_eq!(charge.total_cents, 11550);
        assert_eq!(charge.status, ChargeStatus::Paid);
        assert_eq!(charge.tax_profile_id.as_deref(), Some("tax-ny"));
        assert!(charge.paid_at.is_some());
    }

    #[test]
    fn test_discount_reduces_tax_base() {
        let profile = ny_profile();
        let promo = Promotion {
            id: "p".to_string(),
            code: "AAA2024".to_string(),
            description: "10% off".to_string(),
            membership: MembershipType::Aaa,
            discount: Discount::Percentage(Rate::from_bps(1000)),
            min_stay_nights: None,
            max_uses: None,
            current_uses: 0,
            valid_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            valid_until: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            is_active: true,
        };

        let request = request(20000, Some(&promo), &profile, CaptureMode::Immediate);
        let charge = compute_charge(request, now()).unwrap();
        assert_eq!(charge.discount_cents, 2000);
        assert_eq!(charge.net_cents, 18000);
        // 15.5% of 180.00 = 27.90
        assert_eq!(charge.total_tax_cents, 2790);
        assert_eq!(charge.total_cents, 20790);
        assert_eq!(charge.promo_code.as_deref(), Some("AAA2024"));
    }

    #[test]
    fn test_deferred_capture_is_pending() {
        let charge = settle(10000, CaptureMode::Deferred).unwrap();
        assert_eq!(charge.status, ChargeStatus::Pending);
        assert!(charge.paid_at.is_none());
    }

    #[test]
    fn test_zero_profile_is_not_recorded() {
        let oregon = crate::types::Jurisdiction::new("OR");
        let profile = TaxJurisdictionProfile::zero(&oregon, now().date_naive());
        let request = request(10000, None, &profile, CaptureMode::Immediate);
        let charge = compute_charge(request, now()).unwrap();
        assert_eq!(charge.total_cents, 10000);
        assert!(charge.tax_profile_id.is_none());
    }

    #[test]
    fn test_negative_subtotal_rejected() {
        let err = settle(-1, CaptureMode::Immediate).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));
    }

    #[test]
    fn test_subtotal_above_ceiling_rejected() {
        assert!(settle(MAX_AMOUNT_CENTS, CaptureMode::Immediate).is_ok());

        for cents in [MAX_AMOUNT_CENTS + 1, i64::MAX] {
            let err = settle(cents, CaptureMode::Immediate).unwrap_err();
            assert!(matches!(err, CoreError::InvalidAmount { .. }));
        }
    }

    #[test]
    fn test_invoice_number_format() {
        let invoice = generate_invoice_number(now());
        assert!(invoice.starts_with("INV-20240601-"));
        assert_eq!(invoice.len(), "INV-20240601-".len() + 4);
        assert!(invoice[13..]
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_refund_pending_is_invalid_state() {
        let mut charge = settle(10000, CaptureMode::Deferred).unwrap();
        let err = charge.apply_refund(Money::from_cents(100), None, now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState { .. }));
    }

    #[test]
    fn test_refund_amount_bounds() {
        let mut charge = settle(10000, CaptureMode::Immediate).unwrap();

        assert!(matches!(
            charge.apply_refund(Money::zero(), None, now()),
            Err(CoreError::InvalidAmount { .. })
        ));
        assert!(matches!(
            charge.apply_refund(Money::from_cents(11551), None, now()),
            Err(CoreError::InvalidAmount { .. })
        ));
        assert_eq!(charge.status, ChargeStatus::Paid);
    }

    #[test]
    fn test_partial_refund_then_second_refund_rejected() {
        let mut charge = settle(10000, CaptureMode::Immediate).unwrap();

        charge
            .apply_refund(Money::from_cents(5000), Some("  early checkout ".to_string()), now())
            .unwrap();
        assert_eq!(charge.status, ChargeStatus::Refunded);
        assert_eq!(charge.refund(), Some(Money::from_cents(5000)));
        assert_eq!(charge.refund_reason.as_deref(), Some("early checkout"));

        let err = charge.apply_refund(Money::from_cents(100), None, now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState { .. }));
    }

    #[test]
    fn test_capture_then_refund() {
        let mut charge = settle(10000, CaptureMode::Deferred).unwrap();

        charge.capture(now()).unwrap();
        assert_eq!(charge.status, ChargeStatus::Captured);
        assert!(charge.capture(now()).is_err());

        charge.apply_refund(charge.total(), None, now()).unwrap();
        assert_eq!(charge.status, ChargeStatus::Refunded);
    }

    #[test]
    fn test_tax_summary_percentages() {
        let charge = settle(10000, CaptureMode::Immediate).unwrap();
        let summary = charge.tax_summary();
        assert!((summary.county_rate_percent - 5.75).abs() < 1e-9);
        assert_eq!(summary.total_tax.cents(), 1550);
    }
}
