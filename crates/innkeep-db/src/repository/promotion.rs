//! # Promotion Repository
//!
//! Promo code lookup and the atomic usage counter.
//!
//! ## Usage Counter
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Redemption Strategy                                  │
//! │                                                                         │
//! │  ❌ WRONG: read-modify-write (two redemptions both read uses = 0)       │
//! │     uses = SELECT current_uses; UPDATE SET current_uses = uses + 1     │
//! │                                                                         │
//! │  ✅ CORRECT: conditional delta update                                   │
//! │     UPDATE promotions SET current_uses = current_uses + 1              │
//! │     WHERE code = ? AND is_active = 1                                    │
//! │       AND valid_from <= ? AND valid_until >= ?                          │
//! │       AND (max_uses IS NULL OR current_uses < max_uses)                 │
//! │                                                                         │
//! │  max_uses = 1, two concurrent redemptions:                             │
//! │     first  → rows_affected = 1  (redeemed)                             │
//! │     second → rows_affected = 0  (exhausted)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use innkeep_core::{Discount, Money, MembershipType, Promotion, Rate};

/// Storage form of [`Discount`]'s tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
enum DiscountKind {
    Percentage,
    FixedAmount,
}

/// Flat row shape of the `promotions` table.
#[derive(Debug, sqlx::FromRow)]
struct PromotionRow {
    id: String,
    code: String,
    description: String,
    membership_type: MembershipType,
    discount_type: DiscountKind,
    discount_value: i64,
    min_stay_nights: Option<u32>,
    max_uses: Option<u32>,
    current_uses: u32,
    valid_from: NaiveDate,
    valid_until: NaiveDate,
    is_active: bool,
}

impl TryFrom<PromotionRow> for Promotion {
    type Error = DbError;

    fn try_from(row: PromotionRow) -> Result<Self, Self::Error> {
        let discount = match row.discount_type {
            DiscountKind::Percentage => {
                let bps = u32::try_from(row.discount_value).map_err(|_| {
                    DbError::Internal(format!(
                        "promotion {} has invalid percentage {}",
                        row.code, row.discount_value
                    ))
                })?;
                Discount::Percentage(Rate::from_bps(bps))
            }
            DiscountKind::FixedAmount => {
                Discount::FixedAmount(Money::from_cents(row.discount_value))
            }
        };

        Ok(Promotion {
            id: row.id,
            code: row.code,
            description: row.description,
            membership: row.membership_type,
            discount,
            min_stay_nights: row.min_stay_nights,
            max_uses: row.max_uses,
            current_uses: row.current_uses,
            valid_from: row.valid_from,
            valid_until: row.valid_until,
            is_active: row.is_active,
        })
    }
}

fn split_discount(discount: &Discount) -> (DiscountKind, i64) {
    match discount {
        Discount::Percentage(rate) => (DiscountKind::Percentage, rate.bps() as i64),
        Discount::FixedAmount(amount) => (DiscountKind::FixedAmount, amount.cents()),
    }
}

/// Repository for promotion database operations.
#[derive(Debug, Clone)]
pub struct PromotionRepository {
    pool: SqlitePool,
}

impl PromotionRepository {
    /// Creates a new PromotionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PromotionRepository { pool }
    }

    /// Gets a promotion by its code (case-sensitive).
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Promotion>> {
        let row = sqlx::query_as::<_, PromotionRow>(
            r#"
            SELECT
                id, code, description, membership_type,
                discount_type, discount_value, min_stay_nights,
                max_uses, current_uses, valid_from, valid_until, is_active
            FROM promotions
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Promotion::try_from).transpose()
    }

    /// Inserts a new promotion.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - code already exists
    pub async fn insert(&self, promotion: &Promotion) -> DbResult<()> {
        debug!(code = %promotion.code, "Inserting promotion");

        let (kind, value) = split_discount(&promotion.discount);

        sqlx::query(
            r#"
            INSERT INTO promotions (
                id, code, description, membership_type,
                discount_type, discount_value, min_stay_nights,
                max_uses, current_uses, valid_from, valid_until,
                is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&promotion.id)
        .bind(&promotion.code)
        .bind(&promotion.description)
        .bind(promotion.membership)
        .bind(kind)
        .bind(value)
        .bind(promotion.min_stay_nights)
        .bind(promotion.max_uses)
        .bind(promotion.current_uses)
        .bind(promotion.valid_from)
        .bind(promotion.valid_until)
        .bind(promotion.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Atomically records one use of `code` if it is still redeemable on
    /// `date`.
    ///
    /// ## Returns
    /// * `Ok(true)` - Usage recorded
    /// * `Ok(false)` - Unknown, inactive, outside its window, or exhausted
    pub async fn increment_usage(&self, code: &str, date: NaiveDate) -> DbResult<bool> {
        debug!(code = %code, %date, "Redeeming promotion");

        let result = sqlx::query(
            r#"
            UPDATE promotions
            SET current_uses = current_uses + 1
            WHERE code = ?1
              AND is_active = 1
              AND valid_from <= ?2
              AND valid_until >= ?2
              AND (max_uses IS NULL OR current_uses < max_uses)
            "#,
        )
        .bind(code)
        .bind(date)
        .execute(&self.pool)
        .await?;

        let redeemed = result.rows_affected() == 1;
        debug!(code = %code, redeemed, "Promotion redemption finished");
        Ok(redeemed)
    }

    /// Gives back one use of `code`.
    ///
    /// Compensates an increment whose charge could not be stored.
    pub async fn release_usage(&self, code: &str) -> DbResult<bool> {
        debug!(code = %code, "Releasing promotion usage");

        let result = sqlx::query(
            r#"
            UPDATE promotions
            SET current_uses = current_uses - 1
            WHERE code = ?1 AND current_uses > 0
            "#,
        )
        .bind(code)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Counts promotions (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM promotions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{self, date};

    fn promo(code: &str, discount: Discount, max_uses: Option<u32>) -> Promotion {
        Promotion {
            id: uuid::Uuid::new_v4().to_string(),
            code: code.to_string(),
            description: format!("{code} promotion"),
            membership: MembershipType::Corporate,
            discount,
            min_stay_nights: Some(2),
            max_uses,
            current_uses: 0,
            valid_from: date(2024, 1, 1),
            valid_until: date(2024, 12, 31),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_round_trip_preserves_discount_kind() {
        let db = fixtures::database().await;
        let pct = promo("AAA2024", Discount::Percentage(Rate::from_bps(1000)), None);
        let fixed = promo("CORP2024", Discount::FixedAmount(Money::from_cents(5000)), Some(10));
        db.promotions().insert(&pct).await.unwrap();
        db.promotions().insert(&fixed).await.unwrap();

        assert_eq!(db.promotions().get_by_code("AAA2024").await.unwrap(), Some(pct));
        assert_eq!(db.promotions().get_by_code("CORP2024").await.unwrap(), Some(fixed));
    }

    #[tokio::test]
    async fn test_code_lookup_is_case_sensitive() {
        let db = fixtures::database().await;
        db.promotions()
            .insert(&promo("AAA2024", Discount::Percentage(Rate::from_bps(1000)), None))
            .await
            .unwrap();

        assert!(db.promotions().get_by_code("aaa2024").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_increment_respects_max_uses() {
        let db = fixtures::database().await;
        db.promotions()
            .insert(&promo("ONCE", Discount::Percentage(Rate::from_bps(1000)), Some(1)))
            .await
            .unwrap();

        let day = date(2024, 6, 1);
        assert!(db.promotions().increment_usage("ONCE", day).await.unwrap());
        assert!(!db.promotions().increment_usage("ONCE", day).await.unwrap());

        let stored = db.promotions().get_by_code("ONCE").await.unwrap().unwrap();
        assert_eq!(stored.current_uses, 1);
    }

    #[tokio::test]
    async fn test_increment_outside_window_or_inactive() {
        let db = fixtures::database().await;
        let mut inactive = promo("OFF", Discount::Percentage(Rate::from_bps(1000)), None);
        inactive.is_active = false;
        db.promotions().insert(&inactive).await.unwrap();
        db.promotions()
            .insert(&promo("ON", Discount::Percentage(Rate::from_bps(1000)), None))
            .await
            .unwrap();

        assert!(!db.promotions().increment_usage("OFF", date(2024, 6, 1)).await.unwrap());
        assert!(!db.promotions().increment_usage("ON", date(2025, 1, 1)).await.unwrap());
        assert!(db.promotions().increment_usage("ON", date(2024, 12, 31)).await.unwrap());
        assert!(!db.promotions().increment_usage("MISSING", date(2024, 6, 1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_release_usage_never_goes_negative() {
        let db = fixtures::database().await;
        db.promotions()
            .insert(&promo("BACK", Discount::Percentage(Rate::from_bps(1000)), Some(1)))
            .await
            .unwrap();

        assert!(!db.promotions().release_usage("BACK").await.unwrap());

        db.promotions().increment_usage("BACK", date(2024, 6, 1)).await.unwrap();
        assert!(db.promotions().release_usage("BACK").await.unwrap());
        assert!(db.promotions().increment_usage("BACK", date(2024, 6, 1)).await.unwrap());
    }
}
