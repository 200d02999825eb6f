//! # Store Traits
//!
//! The narrow persistence interfaces the services depend on, and their
//! implementations over the `innkeep-db` repositories.
//!
//! ## Seams
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BookingService                    SettlementService                    │
//! │    │  RoomStore                      │  TaxProfileStore                 │
//! │    │  ReservationStore               │  PromotionStore                  │
//! │    │  NotificationSender (notify.rs) │  ChargeStore                     │
//! │    ▼                                 ▼                                  │
//! │  ┌───────────────────────────────────────────────────────────────────┐ │
//! │  │  innkeep-db repositories (SQLite)                                 │ │
//! │  │  RoomRepository  ReservationRepository  TaxProfileRepository      │ │
//! │  │  PromotionRepository  ChargeRepository                            │ │
//! │  └───────────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The writes that guard shared state are conditional single statements:
//! [`ReservationStore::save`], [`PromotionStore::save_usage_increment`],
//! [`ChargeStore::save_refund`] and [`ChargeStore::save_capture`]. Each
//! reports whether it applied instead of failing.

use async_trait::async_trait;
use chrono::NaiveDate;

use innkeep_core::{
    ChargeBreakdown, Promotion, Reservation, ReservationStatus, Room, RoomStatus,
    TaxJurisdictionProfile,
};
use innkeep_db::{
    ChargeRepository, DbResult, PromotionRepository, ReservationRepository, RoomRepository,
    TaxProfileRepository,
};

// =============================================================================
// Traits
// =============================================================================

/// Read access to the room catalog plus status transitions.
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn get_room(&self, id: &str) -> DbResult<Option<Room>>;

    /// Fails with `DbError::NotFound` if the room doesn't exist.
    async fn set_room_status(&self, id: &str, status: RoomStatus) -> DbResult<()>;

    async fn room_exists(&self, id: &str) -> DbResult<bool>;
}

/// Reservation intervals.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Non-cancelled reservations of `room_id` overlapping `[start, end)`.
    async fn find_overlapping(
        &self,
        room_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<Reservation>>;

    /// Inserts `reservation` unless an overlapping active one exists.
    ///
    /// Returns `false` when the insert was refused.
    async fn save(&self, reservation: &Reservation) -> DbResult<bool>;

    async fn find_by_id(&self, id: &str) -> DbResult<Option<Reservation>>;

    async fn update_status(&self, id: &str, status: ReservationStatus) -> DbResult<()>;
}

/// Tax profiles by state.
#[async_trait]
pub trait TaxProfileStore: Send + Sync {
    /// All profiles for a state; selection happens in `innkeep_core::tax`.
    async fn find_candidates(&self, state_code: &str) -> DbResult<Vec<TaxJurisdictionProfile>>;
}

/// Promotion lookup and usage counting.
#[async_trait]
pub trait PromotionStore: Send + Sync {
    async fn find_by_code(&self, code: &str) -> DbResult<Option<Promotion>>;

    /// Records one use if the code is still redeemable on `date`.
    ///
    /// Returns `false` if it was not (exhausted in the meantime, for one).
    async fn save_usage_increment(&self, code: &str, date: NaiveDate) -> DbResult<bool>;

    /// Gives back one use recorded by `save_usage_increment`.
    async fn release_usage(&self, code: &str) -> DbResult<bool>;
}

/// Persisted charges.
#[async_trait]
pub trait ChargeStore: Send + Sync {
    async fn save(&self, charge: &ChargeBreakdown) -> DbResult<()>;

    async fn find_by_id(&self, id: &str) -> DbResult<Option<ChargeBreakdown>>;

    /// Stores a refund computed from a PAID or CAPTURED snapshot.
    ///
    /// Returns `false` if the stored charge is no longer refundable.
    async fn save_refund(&self, charge: &ChargeBreakdown) -> DbResult<bool>;

    /// Stores a capture computed from a PENDING or AUTHORIZED snapshot.
    ///
    /// Returns `false` if the stored charge is no longer capturable.
    async fn save_capture(&self, charge: &ChargeBreakdown) -> DbResult<bool>;
}

// =============================================================================
// SQLite Implementations
// =============================================================================

#[async_trait]
impl RoomStore for RoomRepository {
    async fn get_room(&self, id: &str) -> DbResult<Option<Room>> {
        self.get_by_id(id).await
    }

    async fn set_room_status(&self, id: &str, status: RoomStatus) -> DbResult<()> {
        self.set_status(id, status).await
    }

    async fn room_exists(&self, id: &str) -> DbResult<bool> {
        self.exists(id).await
    }
}

#[async_trait]
impl ReservationStore for ReservationRepository {
    async fn find_overlapping(
        &self,
        room_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<Reservation>> {
        ReservationRepository::find_overlapping(self, room_id, start, end).await
    }

    async fn save(&self, reservation: &Reservation) -> DbResult<bool> {
        self.insert_if_available(reservation).await
    }

    async fn find_by_id(&self, id: &str) -> DbResult<Option<Reservation>> {
        self.get_by_id(id).await
    }

    async fn update_status(&self, id: &str, status: ReservationStatus) -> DbResult<()> {
        ReservationRepository::update_status(self, id, status).await
    }
}

#[async_trait]
impl TaxProfileStore for TaxProfileRepository {
    async fn find_candidates(&self, state_code: &str) -> DbResult<Vec<TaxJurisdictionProfile>> {
        self.find_by_state(state_code).await
    }
}

#[async_trait]
impl PromotionStore for PromotionRepository {
    async fn find_by_code(&self, code: &str) -> DbResult<Option<Promotion>> {
        self.get_by_code(code).await
    }

    async fn save_usage_increment(&self, code: &str, date: NaiveDate) -> DbResult<bool> {
        self.increment_usage(code, date).await
    }

    async fn release_usage(&self, code: &str) -> DbResult<bool> {
        PromotionRepository::release_usage(self, code).await
    }
}

#[async_trait]
impl ChargeStore for ChargeRepository {
    async fn save(&self, charge: &ChargeBreakdown) -> DbResult<()> {
        self.insert(charge).await
    }

    async fn find_by_id(&self, id: &str) -> DbResult<Option<ChargeBreakdown>> {
        self.get_by_id(id).await
    }

    async fn save_refund(&self, charge: &ChargeBreakdown) -> DbResult<bool> {
        self.record_refund(charge).await
    }

    async fn save_capture(&self, charge: &ChargeBreakdown) -> DbResult<bool> {
        self.record_capture(charge).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use innkeep_core::{RoomType, TaxJurisdictionProfile};
    use innkeep_db::{Database, DbConfig};
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_room_store_through_trait_object() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let room = Room {
            id: "room-101".to_string(),
            room_number: "101".to_string(),
            room_type: RoomType::Single,
            base_rate_cents: 10000,
            status: RoomStatus::Available,
        };
        db.rooms().insert(&room).await.unwrap();

        let store: Arc<dyn RoomStore> = Arc::new(db.rooms());
        assert!(store.room_exists("room-101").await.unwrap());
        assert!(!store.room_exists("room-999").await.unwrap());

        store.set_room_status("room-101", RoomStatus::Booked).await.unwrap();
        let loaded = store.get_room("room-101").await.unwrap().unwrap();
        assert_eq!(loaded.status, RoomStatus::Booked);

        assert!(store
            .set_room_status("room-999", RoomStatus::Booked)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_tax_store_returns_state_candidates() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let profile = TaxJurisdictionProfile {
            id: "tax-ny".to_string(),
            state_code: "NY".to_string(),
            county: None,
            city: None,
            state_sales_rate_bps: 400,
            county_occupancy_rate_bps: 0,
            city_occupancy_rate_bps: 0,
            resort_fee_rate_bps: 0,
            effective_date: date(2024, 1, 1),
            expiry_date: None,
        };
        db.tax_profiles().insert(&profile).await.unwrap();

        let store: Arc<dyn TaxProfileStore> = Arc::new(db.tax_profiles());
        assert_eq!(store.find_candidates("NY").await.unwrap().len(), 1);
        assert!(store.find_candidates("CA").await.unwrap().is_empty());
    }
}
