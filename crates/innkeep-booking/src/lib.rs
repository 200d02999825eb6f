//! # innkeep-booking: Admission and Settlement for Innkeep
//!
//! Orchestrates the pure rules of `innkeep-core` over the stores of
//! `innkeep-db`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Innkeep Workspace                                │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 innkeep-booking (THIS CRATE)                     │  │
//! │  │                                                                  │  │
//! │  │  BookingService            SettlementService                     │  │
//! │  │   admit / cancel            settle / refund / capture            │  │
//! │  │   has_conflict / quote      resolve_tax / preview_promotion      │  │
//! │  │        │                           │                             │  │
//! │  │        ▼                           ▼                             │  │
//! │  │  store traits (store.rs)  +  NotificationSender (notify.rs)      │  │
//! │  └──────────────┬───────────────────────────────────────────────────┘  │
//! │                 │                                                       │
//! │        ┌────────┴─────────┐                                             │
//! │        ▼                  ▼                                             │
//! │  ┌─────────────┐   ┌─────────────┐                                     │
//! │  │ innkeep-core│   │ innkeep-db  │                                     │
//! │  │ money, tax, │   │ SQLite      │                                     │
//! │  │ pricing ... │   │ repositories│                                     │
//! │  └─────────────┘   └─────────────┘                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use std::sync::Arc;
//! use innkeep_booking::{
//!     BookingConfig, BookingService, LogNotifier, SettleRequest, SettlementService,
//! };
//! use innkeep_db::Database;
//!
//! innkeep_booking::telemetry::init_tracing()?;
//! let config = BookingConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//!
//! let booking = BookingService::from_database(&db, &config, Arc::new(LogNotifier));
//! let reservation = booking.admit(&room_id, check_in, check_out, guest, today).await?;
//!
//! let settlement = SettlementService::from_database(&db);
//! let charge = settlement
//!     .settle(
//!         SettleRequest::new(reservation.subtotal(), config.jurisdiction(), today)
//!             .for_reservation(&reservation.id),
//!         chrono::Utc::now(),
//!     )
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod booking;
pub mod config;
pub mod error;
pub mod notify;
pub mod settlement;
pub mod store;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use booking::BookingService;
pub use config::{BookingConfig, RoomStatusPolicy};
pub use error::{BookingError, BookingResult};
pub use notify::{ConfirmationSummary, LogNotifier, NotificationSender, NotifyError};
pub use settlement::{SettleRequest, SettlementService};
pub use store::{ChargeStore, PromotionStore, ReservationStore, RoomStore, TaxProfileStore};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use innkeep_core::{
        ChargeStatus, CoreError, Discount, GuestRef, Jurisdiction, MembershipType, Money,
        Promotion, Room, RoomStatus, RoomType, TaxJurisdictionProfile,
    };
    use innkeep_db::{Database, DbConfig};
    use std::path::PathBuf;
    use std::sync::Arc;

    /// A SQLite file under the temp dir, removed with its WAL files on drop.
    struct TempDbFile(PathBuf);

    impl TempDbFile {
        fn new() -> Self {
            let name = format!("innkeep-test-{}.db", uuid::Uuid::new_v4().simple());
            TempDbFile(std::env::temp_dir().join(name))
        }
    }

    impl Drop for TempDbFile {
        fn drop(&mut self) {
            for suffix in ["", "-wal", "-shm"] {
                let mut path = self.0.clone().into_os_string();
                path.push(suffix);
                let _ = std::fs::remove_file(path);
            }
        }
    }

    fn suite(id: &str) -> Room {
        Room {
            id: id.to_string(),
            room_number: id.trim_start_matches("room-").to_string(),
            room_type: RoomType::Suite,
            base_rate_cents: 25000,
            status: RoomStatus::Available,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_admit_then_settle_reservation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.rooms()
            .insert(&suite("room-202"))
            .await
            .unwrap();
        db.tax_profiles()
            .insert(&TaxJurisdictionProfile {
                id: "tax-nv".to_string(),
                state_code: "NV".to_string(),
                county: Some("Clark".to_string()),
                city: None,
                state_sales_rate_bps: 685,
                county_occupancy_rate_bps: 500,
                city_occupancy_rate_bps: 0,
                resort_fee_rate_bps: 500,
                effective_date: date(2024, 1, 1),
                expiry_date: None,
            })
            .await
            .unwrap();

        let config = BookingConfig::default();
        let booking = BookingService::from_database(&db, &config, Arc::new(LogNotifier));
        let settlement = SettlementService::from_database(&db);

        // Thu 2024-03-07 .. Sat 2024-03-09: one base night, one peak night
        let reservation = booking
            .admit(
                "room-202",
                date(2024, 3, 7),
                date(2024, 3, 9),
                GuestRef::new("Grace Hopper", "grace@example.com"),
                date(2024, 3, 1),
            )
            .await
            .unwrap();
        assert_eq!(reservation.subtotal(), Money::from_cents(55000));

        let jurisdiction = Jurisdiction::new("NV").with_county("Clark").with_city("Las Vegas");
        let charge = settlement
            .settle(
                SettleRequest::new(reservation.subtotal(), jurisdiction, date(2024, 3, 7))
                    .with_nights(2)
                    .for_reservation(&reservation.id),
                Utc::now(),
            )
            .await
            .unwrap();

        // 55000 × 6.85% = 3767.5 → 3768; × 5% = 2750 twice
        assert_eq!(charge.state_tax_cents, 3768);
        assert_eq!(charge.total_tax_cents, 3768 + 2750 + 2750);
        assert_eq!(charge.status, ChargeStatus::Paid);

        let charges = db.charges().list_for_reservation(&reservation.id).await.unwrap();
        assert_eq!(charges.len(), 1);
        assert_eq!(charges[0].id, charge.id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_races_over_pooled_file_database() {
        let file = TempDbFile::new();
        let db = Database::new(DbConfig::new(file.0.clone())).await.unwrap();
        db.rooms().insert(&suite("room-303")).await.unwrap();
        db.promotions()
            .insert(&Promotion {
                id: "promo-once".to_string(),
                code: "ONCE".to_string(),
                description: "single use".to_string(),
                membership: MembershipType::None,
                discount: Discount::FixedAmount(Money::from_cents(1000)),
                min_stay_nights: None,
                max_uses: Some(1),
                current_uses: 0,
                valid_from: date(2024, 1, 1),
                valid_until: date(2024, 12, 31),
                is_active: true,
            })
            .await
            .unwrap();

        let booking =
            BookingService::from_database(&db, &BookingConfig::default(), Arc::new(LogNotifier));
        let settlement = SettlementService::from_database(&db);
        let today = date(2024, 1, 1);

        let admissions: Vec<_> = (0..4)
            .map(|i| {
                let booking = booking.clone();
                tokio::spawn(async move {
                    let guest = GuestRef::new("Guest", format!("guest{i}@example.com"));
                    booking
                        .admit("room-303", date(2024, 4, 1), date(2024, 4, 4), guest, today)
                        .await
                })
            })
            .collect();

        let redemptions: Vec<_> = (0..4)
            .map(|_| {
                let settlement = settlement.clone();
                let request =
                    SettleRequest::new(Money::from_cents(10000), Jurisdiction::new("NV"), today)
                        .with_promo_code("ONCE");
                tokio::spawn(async move { settlement.settle(request, Utc::now()).await })
            })
            .collect();

        let mut admitted = 0;
        for handle in admissions {
            match handle.await.unwrap() {
                Ok(_) => admitted += 1,
                Err(e) => assert!(matches!(
                    e.as_core(),
                    Some(CoreError::RoomUnavailable { .. })
                )),
            }
        }
        assert_eq!(admitted, 1);

        let mut redeemed = 0;
        for handle in redemptions {
            match handle.await.unwrap() {
                Ok(_) => redeemed += 1,
                Err(e) => assert!(matches!(e.as_core(), Some(CoreError::InvalidPromoCode(_)))),
            }
        }
        assert_eq!(redeemed, 1);

        let stays = db.reservations().list_for_room("room-303").await.unwrap();
        assert_eq!(stays.len(), 1);
        let promo = db.promotions().get_by_code("ONCE").await.unwrap().unwrap();
        assert_eq!(promo.current_uses, 1);

        db.close().await;
    }
}
