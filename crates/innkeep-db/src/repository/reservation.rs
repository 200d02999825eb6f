//! # Reservation Repository
//!
//! Database operations for reservations, including the atomic admission
//! insert.
//!
//! ## Atomic Admission
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Check-and-Insert in ONE Statement                    │
//! │                                                                         │
//! │  ❌ WRONG: read, then write (race window between the two)              │
//! │     SELECT ... overlapping?   ── no ──►  INSERT                        │
//! │     Request A: no overlap ─┐                                            │
//! │     Request B: no overlap ─┴─► both INSERT → double booking            │
//! │                                                                         │
//! │  ✅ CORRECT: conditional insert                                         │
//! │     INSERT INTO reservations (...)                                      │
//! │     SELECT ... WHERE NOT EXISTS (overlapping active reservation)        │
//! │                                                                         │
//! │  SQLite takes the write lock before the statement reads, so the        │
//! │  existence check and the insert see the same state. The loser inserts │
//! │  zero rows and gets `false` back.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use innkeep_core::{Reservation, ReservationStatus};

const RESERVATION_COLUMNS: &str = r#"
    id, room_id, guest_id, guest_name, guest_email,
    check_in, check_out, status, subtotal_cents,
    created_at, updated_at
"#;

/// Repository for reservation database operations.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: SqlitePool,
}

impl ReservationRepository {
    /// Creates a new ReservationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReservationRepository { pool }
    }

    /// Gets a reservation by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Reservation>> {
        let sql = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = ?1");

        let reservation = sqlx::query_as::<_, Reservation>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(reservation)
    }

    /// Returns the non-cancelled reservations of a room that overlap the
    /// half-open range `[start, end)`.
    pub async fn find_overlapping(
        &self,
        room_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<Reservation>> {
        debug!(room_id = %room_id, %start, %end, "Finding overlapping reservations");

        let sql = format!(
            r#"
            SELECT {RESERVATION_COLUMNS}
            FROM reservations
            WHERE room_id = ?1
              AND status != 'cancelled'
              AND check_in < ?3
              AND check_out > ?2
            ORDER BY check_in
            "#
        );

        let reservations = sqlx::query_as::<_, Reservation>(&sql)
            .bind(room_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Ok(reservations)
    }

    /// Lists every reservation of a room, any status, by check-in.
    pub async fn list_for_room(&self, room_id: &str) -> DbResult<Vec<Reservation>> {
        let sql = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE room_id = ?1 ORDER BY check_in, created_at"
        );

        let reservations = sqlx::query_as::<_, Reservation>(&sql)
            .bind(room_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(reservations)
    }

    /// Inserts the reservation only if no active reservation on the same
    /// room overlaps it.
    ///
    /// ## Returns
    /// * `Ok(true)` - Inserted
    /// * `Ok(false)` - An overlapping reservation exists; nothing written
    /// * `Err(DbError::ForeignKeyViolation)` - Room doesn't exist
    pub async fn insert_if_available(&self, reservation: &Reservation) -> DbResult<bool> {
        debug!(
            id = %reservation.id,
            room_id = %reservation.room_id,
            check_in = %reservation.check_in,
            check_out = %reservation.check_out,
            "Inserting reservation if available"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO reservations (
                id, room_id, guest_id, guest_name, guest_email,
                check_in, check_out, status, subtotal_cents,
                created_at, updated_at
            )
            SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11
            WHERE NOT EXISTS (
                SELECT 1 FROM reservations
                WHERE room_id = ?2
                  AND status != 'cancelled'
                  AND check_in < ?7
                  AND check_out > ?6
            )
            "#,
        )
        .bind(&reservation.id)
        .bind(&reservation.room_id)
        .bind(&reservation.guest_id)
        .bind(&reservation.guest_name)
        .bind(&reservation.guest_email)
        .bind(reservation.check_in)
        .bind(reservation.check_out)
        .bind(reservation.status)
        .bind(reservation.subtotal_cents)
        .bind(reservation.created_at)
        .bind(reservation.updated_at)
        .execute(&self.pool)
        .await?;

        let admitted = result.rows_affected() == 1;
        debug!(id = %reservation.id, admitted, "Conditional reservation insert finished");
        Ok(admitted)
    }

    /// Sets a reservation's status.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Reservation doesn't exist
    pub async fn update_status(&self, id: &str, status: ReservationStatus) -> DbResult<()> {
        debug!(id = %id, ?status, "Updating reservation status");

        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET status = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Reservation", id));
        }

        Ok(())
    }

    /// Counts reservations (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations")
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

    #[tokio::test]
    async fn test_insert_if_available_and_get() {
        let db = fixtures::database().await;
        let room = fixtures::room("201", 10000);
        db.rooms().insert(&room).await.unwrap();

        let r = fixtures::reservation(&room.id, date(2024, 3, 10), date(2024, 3, 13));
        assert!(db.reservations().insert_if_available(&r).await.unwrap());

        let loaded = db.reservations().get_by_id(&r.id).await.unwrap().unwrap();
        assert_eq!(loaded.check_in, date(2024, 3, 10));
        assert_eq!(loaded.check_out, date(2024, 3, 13));
        assert_eq!(loaded.status, ReservationStatus::Confirmed);
        assert_eq!(loaded.guest_email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn test_overlapping_insert_is_rejected() {
        let db = fixtures::database().await;
        let room = fixtures::room("202", 10000);
        db.rooms().insert(&room).await.unwrap();

        let first = fixtures::reservation(&room.id, date(2024, 3, 10), date(2024, 3, 13));
        let clash = fixtures::reservation(&room.id, date(2024, 3, 12), date(2024, 3, 15));
        let back_to_back = fixtures::reservation(&room.id, date(2024, 3, 13), date(2024, 3, 15));

        assert!(db.reservations().insert_if_available(&first).await.unwrap());
        assert!(!db.reservations().insert_if_available(&clash).await.unwrap());
        assert!(db.reservations().insert_if_available(&back_to_back).await.unwrap());

        assert!(db.reservations().get_by_id(&clash.id).await.unwrap().is_none());
        assert_eq!(db.reservations().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_reservation_frees_nights() {
        let db = fixtures::database().await;
        let room = fixtures::room("203", 10000);
        db.rooms().insert(&room).await.unwrap();

        let first = fixtures::reservation(&room.id, date(2024, 3, 10), date(2024, 3, 13));
        db.reservations().insert_if_available(&first).await.unwrap();
        db.reservations()
            .update_status(&first.id, ReservationStatus::Cancelled)
            .await
            .unwrap();

        let again = fixtures::reservation(&room.id, date(2024, 3, 10), date(2024, 3, 13));
        assert!(db.reservations().insert_if_available(&again).await.unwrap());

        let overlapping = db
            .reservations()
            .find_overlapping(&room.id, date(2024, 3, 11), date(2024, 3, 12))
            .await
            .unwrap();
        assert_eq!(overlapping.len(), 1);
        assert_eq!(overlapping[0].id, again.id);

        assert_eq!(db.reservations().list_for_room(&room.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_other_rooms_do_not_conflict() {
        let db = fixtures::database().await;
        let a = fixtures::room("204", 10000);
        let b = fixtures::room("205", 10000);
        db.rooms().insert(&a).await.unwrap();
        db.rooms().insert(&b).await.unwrap();

        let ra = fixtures::reservation(&a.id, date(2024, 3, 10), date(2024, 3, 13));
        let rb = fixtures::reservation(&b.id, date(2024, 3, 10), date(2024, 3, 13));
        assert!(db.reservations().insert_if_available(&ra).await.unwrap());
        assert!(db.reservations().insert_if_available(&rb).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_room_is_foreign_key_violation() {
        let db = fixtures::database().await;
        let r = fixtures::reservation("no-such-room", date(2024, 3, 10), date(2024, 3, 13));
        let err = db.reservations().insert_if_available(&r).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_status_missing() {
        let db = fixtures::database().await;
        let err = db
            .reservations()
            .update_status("missing", ReservationStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
