//! # Repository Module
//!
//! Database repository implementations for Innkeep.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  BookingService / SettlementService                                    │
//! │       │                                                                 │
//! │       │  store traits (innkeep-booking::store)                          │
//! │       ▼                                                                 │
//! │  RoomRepository          get_by_id, set_status, exists                 │
//! │  ReservationRepository   find_overlapping, insert_if_available, ...    │
//! │  TaxProfileRepository    find_by_state                                 │
//! │  PromotionRepository     get_by_code, increment_usage, release_usage   │
//! │  ChargeRepository        insert, get_by_id, update                     │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries use the runtime `sqlx::query` / `query_as` API with `FromRow`
//! derives on the core types, so building does not need a live database or
//! prepared offline query data.

pub mod charge;
pub mod promotion;
pub mod reservation;
pub mod room;
pub mod tax_profile;

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, Utc};
    use innkeep_core::{Reservation, ReservationStatus, Room, RoomStatus, RoomType};
    use uuid::Uuid;

    use crate::{Database, DbConfig};

    pub async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn room(number: &str, base_rate_cents: i64) -> Room {
        Room {
            id: Uuid::new_v4().to_string(),
            room_number: number.to_string(),
            room_type: RoomType::Double,
            base_rate_cents,
            status: RoomStatus::Available,
        }
    }

    pub fn reservation(room_id: &str, check_in: NaiveDate, check_out: NaiveDate) -> Reservation {
        let now = Utc::now();
        Reservation {
            id: Uuid::new_v4().to_string(),
            room_id: room_id.to_string(),
            guest_id: None,
            guest_name: Some("Ada Lovelace".to_string()),
            guest_email: Some("ada@example.com".to_string()),
            check_in,
            check_out,
            status: ReservationStatus::Confirmed,
            subtotal_cents: 20000,
            created_at: now,
            updated_at: now,
        }
    }
}
