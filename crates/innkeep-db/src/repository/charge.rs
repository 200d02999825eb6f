//! # Charge Repository
//!
//! Persistence for itemized charges produced by settlement.
//!
//! Charges are snapshots: amounts and the rates they were computed from are
//! stored as-is. Only the lifecycle fields (status, refund, paid_at) change
//! after insert, and only through writes guarded by the stored status.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use innkeep_core::{ChargeBreakdown, ChargeStatus};

const CHARGE_COLUMNS: &str = r#"
    id, reservation_id, invoice_number, method, promo_code,
    subtotal_cents, discount_cents, net_cents,
    state_tax_cents, county_tax_cents, city_tax_cents, resort_fee_cents,
    total_tax_cents, total_cents, tax_profile_id,
    state_rate_bps, county_rate_bps, city_rate_bps, resort_fee_rate_bps,
    status, refund_cents, refunded_at, refund_reason,
    created_at, paid_at
"#;

/// Repository for charge database operations.
#[derive(Debug, Clone)]
pub struct ChargeRepository {
    pool: SqlitePool,
}

impl ChargeRepository {
    /// Creates a new ChargeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ChargeRepository { pool }
    }

    /// Gets a charge by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ChargeBreakdown>> {
        let sql = format!("SELECT {CHARGE_COLUMNS} FROM charges WHERE id = ?1");

        let charge = sqlx::query_as::<_, ChargeBreakdown>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(charge)
    }

    /// Lists the charges recorded against a reservation, oldest first.
    pub async fn list_for_reservation(
        &self,
        reservation_id: &str,
    ) -> DbResult<Vec<ChargeBreakdown>> {
        let sql = format!(
            "SELECT {CHARGE_COLUMNS} FROM charges WHERE reservation_id = ?1 ORDER BY created_at"
        );

        let charges = sqlx::query_as::<_, ChargeBreakdown>(&sql)
            .bind(reservation_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(charges)
    }

    /// Inserts a new charge.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - invoice number collision
    /// * `Err(DbError::ForeignKeyViolation)` - unknown reservation id
    pub async fn insert(&self, charge: &ChargeBreakdown) -> DbResult<()> {
        debug!(
            id = %charge.id,
            invoice_number = %charge.invoice_number,
            total_cents = charge.total_cents,
            "Inserting charge"
        );

        sqlx::query(
            r#"
            INSERT INTO charges (
                id, reservation_id, invoice_number, method, promo_code,
                subtotal_cents, discount_cents, net_cents,
                state_tax_cents, county_tax_cents, city_tax_cents, resort_fee_cents,
                total_tax_cents, total_cents, tax_profile_id,
                state_rate_bps, county_rate_bps, city_rate_bps, resort_fee_rate_bps,
                status, refund_cents, refunded_at, refund_reason,
                created_at, paid_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10, ?11, ?12,
                ?13, ?14, ?15,
                ?16, ?17, ?18, ?19,
                ?20, ?21, ?22, ?23,
                ?24, ?25
            )
            "#,
        )
        .bind(&charge.id)
        .bind(&charge.reservation_id)
        .bind(&charge.invoice_number)
        .bind(charge.method)
        .bind(&charge.promo_code)
        .bind(charge.subtotal_cents)
        .bind(charge.discount_cents)
        .bind(charge.net_cents)
        .bind(charge.state_tax_cents)
        .bind(charge.county_tax_cents)
        .bind(charge.city_tax_cents)
        .bind(charge.resort_fee_cents)
        .bind(charge.total_tax_cents)
        .bind(charge.total_cents)
        .bind(&charge.tax_profile_id)
        .bind(charge.state_rate_bps)
        .bind(charge.county_rate_bps)
        .bind(charge.city_rate_bps)
        .bind(charge.resort_fee_rate_bps)
        .bind(charge.status)
        .bind(charge.refund_cents)
        .bind(charge.refunded_at)
        .bind(&charge.refund_reason)
        .bind(charge.created_at)
        .bind(charge.paid_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Writes the refund fields of a charge, provided it is still PAID or
    /// CAPTURED in the database.
    ///
    /// Returns `false` when the stored status has moved on, which is how a
    /// concurrent refund loses.
    pub async fn record_refund(&self, charge: &ChargeBreakdown) -> DbResult<bool> {
        self.transition(charge, [ChargeStatus::Paid, ChargeStatus::Captured])
            .await
    }

    /// Writes the capture fields of a charge, provided it is still PENDING
    /// or AUTHORIZED in the database.
    pub async fn record_capture(&self, charge: &ChargeBreakdown) -> DbResult<bool> {
        self.transition(charge, [ChargeStatus::Pending, ChargeStatus::Authorized])
            .await
    }

    /// Conditional lifecycle write: one statement, guarded by the stored status.
    async fn transition(
        &self,
        charge: &ChargeBreakdown,
        from: [ChargeStatus; 2],
    ) -> DbResult<bool> {
        debug!(id = %charge.id, status = %charge.status, "Updating charge");

        let result = sqlx::query(
            r#"
            UPDATE charges SET
                status = ?2,
                refund_cents = ?3,
                refunded_at = ?4,
                refund_reason = ?5,
                paid_at = ?6
            WHERE id = ?1 AND status IN (?7, ?8)
            "#,
        )
        .bind(&charge.id)
        .bind(charge.status)
        .bind(charge.refund_cents)
        .bind(charge.refunded_at)
        .bind(&charge.refund_reason)
        .bind(charge.paid_at)
        .bind(from[0])
        .bind(from[1])
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
