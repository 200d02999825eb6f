//! # Room Repository
//!
//! Read access and status transitions for rooms. Room CRUD beyond what the
//! booking engine needs (housekeeping, maintenance scheduling) lives in the
//! room catalog, not here.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use innkeep_core::{Room, RoomStatus};

/// Repository for room database operations.
///
/// ## Usage
/// ```rust,ignore
/// let room = db.rooms().get_by_id("uuid-here").await?;
/// db.rooms().set_status(&room.id, RoomStatus::Booked).await?;
/// ```
#[derive(Debug, Clone)]
pub struct RoomRepository {
    pool: SqlitePool,
}

impl RoomRepository {
    /// Creates a new RoomRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RoomRepository { pool }
    }

    /// Gets a room by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Room))` - Room found
    /// * `Ok(None)` - Room not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Room>> {
        let room = sqlx::query_as::<_, Room>(
            r#"
            SELECT id, room_number, room_type, base_rate_cents, status
            FROM rooms
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(room)
    }

    /// Checks whether a room exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM rooms WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// Lists all rooms ordered by room number.
    pub async fn list(&self) -> DbResult<Vec<Room>> {
        let rooms = sqlx::query_as::<_, Room>(
            r#"
            SELECT id, room_number, room_type, base_rate_cents, status
            FROM rooms
            ORDER BY room_number
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rooms)
    }

    /// Inserts a new room.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - room number already exists
    pub async fn insert(&self, room: &Room) -> DbResult<()> {
        debug!(id = %room.id, room_number = %room.room_number, "Inserting room");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO rooms (
                id, room_number, room_type, base_rate_cents, status,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(&room.id)
        .bind(&room.room_number)
        .bind(room.room_type)
        .bind(room.base_rate_cents)
        .bind(room.status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Sets a room's operational status.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Room doesn't exist
    pub async fn set_status(&self, id: &str, status: RoomStatus) -> DbResult<()> {
        debug!(id = %id, status = %status, "Updating room status");

        let result = sqlx::query(
            r#"
            UPDATE rooms
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
            return Err(DbError::not_found("Room", id));
        }

        Ok(())
    }

    /// Counts rooms (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rooms")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
