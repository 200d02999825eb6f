//! # Tax Profile Repository
//!
//! Storage for tax jurisdiction profiles. The repository returns every
//! profile for a state; choosing the applicable one is pure logic in
//! `innkeep_core::tax`.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use innkeep_core::TaxJurisdictionProfile;

const PROFILE_COLUMNS: &str = r#"
    id, state_code, county, city,
    state_sales_rate_bps, county_occupancy_rate_bps,
    city_occupancy_rate_bps, resort_fee_rate_bps,
    effective_date, expiry_date
"#;

/// Repository for tax profile database operations.
#[derive(Debug, Clone)]
pub struct TaxProfileRepository {
    pool: SqlitePool,
}

impl TaxProfileRepository {
    /// Creates a new TaxProfileRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TaxProfileRepository { pool }
    }

    /// Returns all profiles for a state code (case-insensitive).
    pub async fn find_by_state(&self, state_code: &str) -> DbResult<Vec<TaxJurisdictionProfile>> {
        debug!(state_code = %state_code, "Loading tax profiles");

        let sql = format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM tax_profiles
            WHERE state_code = ?1 COLLATE NOCASE
            ORDER BY effective_date DESC
            "#
        );

        let profiles = sqlx::query_as::<_, TaxJurisdictionProfile>(&sql)
            .bind(state_code)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = profiles.len(), "Tax profiles loaded");
        Ok(profiles)
    }

    /// Inserts a new profile.
    pub async fn insert(&self, profile: &TaxJurisdictionProfile) -> DbResult<()> {
        debug!(
            id = %profile.id,
            state_code = %profile.state_code,
            county = ?profile.county,
            city = ?profile.city,
            "Inserting tax profile"
        );

        sqlx::query(
            r#"
            INSERT INTO tax_profiles (
                id, state_code, county, city,
                state_sales_rate_bps, county_occupancy_rate_bps,
                city_occupancy_rate_bps, resort_fee_rate_bps,
                effective_date, expiry_date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.state_code)
        .bind(&profile.county)
        .bind(&profile.city)
        .bind(profile.state_sales_rate_bps)
        .bind(profile.county_occupancy_rate_bps)
        .bind(profile.city_occupancy_rate_bps)
        .bind(profile.resort_fee_rate_bps)
        .bind(profile.effective_date)
        .bind(profile.expiry_date)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts profiles (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tax_profiles")
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

    fn profile(id: &str, state: &str, city: Option<&str>) -> TaxJurisdictionProfile {
        TaxJurisdictionProfile {
            id: id.to_string(),
            state_code: state.to_string(),
            county: city.map(|_| "New York".to_string()),
            city: city.map(str::to_string),
            state_sales_rate_bps: 400,
            county_occupancy_rate_bps: 575,
            city_occupancy_rate_bps: 375,
            resort_fee_rate_bps: 200,
            effective_date: date(2024, 1, 1),
            expiry_date: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_state() {
        let db = fixtures::database().await;
        db.tax_profiles().insert(&profile("ny-state", "NY", None)).await.unwrap();
        db.tax_profiles().insert(&profile("ny-city", "NY", Some("New York"))).await.unwrap();
        db.tax_profiles().insert(&profile("ca-state", "CA", None)).await.unwrap();

        let ny = db.tax_profiles().find_by_state("ny").await.unwrap();
        assert_eq!(ny.len(), 2);
        assert!(ny.iter().all(|p| p.state_code == "NY"));

        let city = ny.iter().find(|p| p.id == "ny-city").unwrap();
        assert_eq!(city.city.as_deref(), Some("New York"));
        assert_eq!(city.county_occupancy_rate_bps, 575);
        assert_eq!(city.effective_date, date(2024, 1, 1));
        assert!(city.expiry_date.is_none());

        assert!(db.tax_profiles().find_by_state("TX").await.unwrap().is_empty());
    }
}
