//! # Booking Admission
//!
//! Decides whether a reservation can be accepted, prices it, and records it.
//!
//! ## Admission Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  admit(room_id, check_in, check_out, guest, today)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StayRange::new ─────────────────────────────► InvalidRange             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RoomStore::get_room ── None ────────────────► RoomNotFound             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  find_overlapping + has_conflict ── conflict ► RoomUnavailable          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  quote_stay (peak nights × multiplier, rounded once)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ReservationStore::save ── refused (lost race) ► RoomUnavailable        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  room → BOOKED (per RoomStatusPolicy) ── failed ► cancel insert, error  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  spawn confirmation ───────► NotificationSender (errors logged)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Ok(reservation)                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The up-front conflict check gives a fast, readable rejection. The
//! conditional insert is what actually guarantees no two active
//! reservations on a room overlap.

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use innkeep_core::availability::has_conflict;
use innkeep_core::pricing::quote_stay;
use innkeep_core::validation::{validate_id, validate_stay_length};
use innkeep_core::{
    CoreError, GuestRef, PriceQuote, PricingRules, Reservation, ReservationStatus, Room,
    RoomStatus, StayRange,
};
use innkeep_db::Database;

use crate::config::{BookingConfig, RoomStatusPolicy};
use crate::error::BookingResult;
use crate::notify::{ConfirmationSummary, NotificationSender};
use crate::store::{ReservationStore, RoomStore};

/// Admission and cancellation of reservations.
///
/// Stateless per request; cheap to clone and share between tasks.
#[derive(Clone)]
pub struct BookingService {
    rooms: Arc<dyn RoomStore>,
    reservations: Arc<dyn ReservationStore>,
    notifier: Arc<dyn NotificationSender>,
    rules: PricingRules,
    policy: RoomStatusPolicy,
}

impl BookingService {
    pub fn new(
        rooms: Arc<dyn RoomStore>,
        reservations: Arc<dyn ReservationStore>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        BookingService {
            rooms,
            reservations,
            notifier,
            rules: PricingRules::default(),
            policy: RoomStatusPolicy::default(),
        }
    }

    /// Builds the service over the SQLite repositories of `db`.
    pub fn from_database(
        db: &Database,
        config: &BookingConfig,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        BookingService::new(Arc::new(db.rooms()), Arc::new(db.reservations()), notifier)
            .with_pricing_rules(config.pricing_rules())
            .with_room_status_policy(config.room_status_policy())
    }

    pub fn with_pricing_rules(mut self, rules: PricingRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_room_status_policy(mut self, policy: RoomStatusPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn pricing_rules(&self) -> &PricingRules {
        &self.rules
    }

    // =========================================================================
    // Admission
    // =========================================================================

    /// Admits a CONFIRMED reservation for `[check_in, check_out)`.
    ///
    /// ## Errors
    /// - `CoreError::InvalidRange` - `check_out <= check_in`
    /// - `CoreError::Validation` - stay longer than `MAX_STAY_NIGHTS`
    /// - `CoreError::RoomNotFound` - unknown room
    /// - `CoreError::RoomUnavailable` - an active reservation overlaps, or a
    ///   concurrent admission for the same nights won
    pub async fn admit(
        &self,
        room_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guest: GuestRef,
        today: NaiveDate,
    ) -> BookingResult<Reservation> {
        validate_id("room_id", room_id)?;
        let stay = StayRange::new(check_in, check_out)?;
        validate_stay_length(stay.nights())?;

        let room = self
            .rooms
            .get_room(room_id)
            .await?
            .ok_or_else(|| CoreError::RoomNotFound(room_id.to_string()))?;

        if self.conflicts(room_id, &stay).await? {
            debug!(room_id = %room_id, %check_in, %check_out, "Admission rejected: overlap");
            return Err(unavailable(room_id, &stay).into());
        }

        let quote = quote_stay(&room, &stay, &self.rules);

        let now = Utc::now();
        let reservation = Reservation {
            id: Uuid::new_v4().to_string(),
            room_id: room.id.clone(),
            guest_id: guest.id,
            guest_name: guest.name,
            guest_email: guest.email,
            check_in,
            check_out,
            status: ReservationStatus::Confirmed,
            subtotal_cents: quote.subtotal.cents(),
            created_at: now,
            updated_at: now,
        };

        if !self.reservations.save(&reservation).await? {
            info!(room_id = %room_id, %check_in, %check_out, "Admission lost race for room");
            return Err(unavailable(room_id, &stay).into());
        }

        if self.policy.marks_booked(check_in, today) {
            if let Err(e) = self.rooms.set_room_status(&room.id, RoomStatus::Booked).await {
                self.withdraw(&reservation.id).await;
                return Err(e.into());
            }
        }

        info!(
            reservation_id = %reservation.id,
            room_id = %room.id,
            %check_in,
            %check_out,
            nights = stay.nights(),
            subtotal = %quote.subtotal,
            "Reservation admitted"
        );

        self.spawn_confirmation(&room, &reservation);

        Ok(reservation)
    }

    /// Undoes an insert whose admission failed afterwards.
    async fn withdraw(&self, reservation_id: &str) {
        match self
            .reservations
            .update_status(reservation_id, ReservationStatus::Cancelled)
            .await
        {
            Ok(()) => warn!(reservation_id = %reservation_id, "Admission withdrawn"),
            Err(e) => warn!(
                reservation_id = %reservation_id,
                error = %e,
                "Failed to withdraw reservation after admission error"
            ),
        }
    }

    /// Cancels a reservation and returns its room to AVAILABLE.
    ///
    /// Cancelling an already-cancelled reservation changes nothing and
    /// succeeds.
    ///
    /// ## Errors
    /// - `CoreError::ReservationNotFound` - unknown reservation
    pub async fn cancel(&self, reservation_id: &str) -> BookingResult<Reservation> {
        validate_id("reservation_id", reservation_id)?;

        let mut reservation = self
            .reservations
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| CoreError::ReservationNotFound(reservation_id.to_string()))?;

        if reservation.status == ReservationStatus::Cancelled {
            debug!(reservation_id = %reservation_id, "Reservation already cancelled");
            return Ok(reservation);
        }

        self.reservations
            .update_status(reservation_id, ReservationStatus::Cancelled)
            .await?;
        self.rooms
            .set_room_status(&reservation.room_id, RoomStatus::Available)
            .await?;

        reservation.status = ReservationStatus::Cancelled;
        reservation.updated_at = Utc::now();

        info!(
            reservation_id = %reservation_id,
            room_id = %reservation.room_id,
            "Reservation cancelled"
        );

        Ok(reservation)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Whether any active reservation of `room_id` overlaps the range.
    pub async fn has_conflict(
        &self,
        room_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> BookingResult<bool> {
        let stay = StayRange::new(check_in, check_out)?;
        self.conflicts(room_id, &stay).await
    }

    /// Prices a stay without reserving anything.
    pub async fn quote(
        &self,
        room_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> BookingResult<PriceQuote> {
        let stay = StayRange::new(check_in, check_out)?;
        let room = self
            .rooms
            .get_room(room_id)
            .await?
            .ok_or_else(|| CoreError::RoomNotFound(room_id.to_string()))?;

        Ok(quote_stay(&room, &stay, &self.rules))
    }

    async fn conflicts(&self, room_id: &str, stay: &StayRange) -> BookingResult<bool> {
        let existing = self
            .reservations
            .find_overlapping(room_id, stay.check_in(), stay.check_out())
            .await?;

        Ok(has_conflict(room_id, stay, &existing))
    }

    fn spawn_confirmation(&self, room: &Room, reservation: &Reservation) {
        let Some(recipient) = reservation.guest_email.clone() else {
            debug!(reservation_id = %reservation.id, "No guest email; confirmation skipped");
            return;
        };

        let summary = ConfirmationSummary::new(room, reservation);
        let notifier = Arc::clone(&self.notifier);

        tokio::spawn(async move {
            if let Err(e) = notifier.send_confirmation(&recipient, &summary).await {
                warn!(
                    reservation_id = %summary.reservation_id,
                    error = %e,
                    "Failed to send booking confirmation"
                );
            }
        });
    }
}

fn unavailable(room_id: &str, stay: &StayRange) -> CoreError {
    CoreError::RoomUnavailable {
        room_id: room_id.to_string(),
        check_in: stay.check_in(),
        check_out: stay.check_out(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BookingError;
    use crate::notify::{LogNotifier, NotifyError};
    use async_trait::async_trait;
    use innkeep_core::{Money, RoomType};
    use innkeep_db::{DbConfig, DbError, DbResult, RoomRepository};
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct ChannelNotifier {
        tx: mpsc::UnboundedSender<(String, ConfirmationSummary)>,
    }

    #[async_trait]
    impl NotificationSender for ChannelNotifier {
        async fn send_confirmation(
            &self,
            recipient: &str,
            summary: &ConfirmationSummary,
        ) -> Result<(), NotifyError> {
            self.tx
                .send((recipient.to_string(), summary.clone()))
                .map_err(|e| NotifyError::Delivery(e.to_string()))
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl NotificationSender for FailingNotifier {
        async fn send_confirmation(
            &self,
            _recipient: &str,
            _summary: &ConfirmationSummary,
        ) -> Result<(), NotifyError> {
            Err(NotifyError::Delivery("smtp relay down".to_string()))
        }
    }

    /// Room catalog whose status writes always fail.
    struct StuckRooms(RoomRepository);

    #[async_trait]
    impl RoomStore for StuckRooms {
        async fn get_room(&self, id: &str) -> DbResult<Option<Room>> {
            self.0.get_by_id(id).await
        }

        async fn set_room_status(&self, _id: &str, _status: RoomStatus) -> DbResult<()> {
            Err(DbError::PoolExhausted)
        }

        async fn room_exists(&self, id: &str) -> DbResult<bool> {
            self.0.exists(id).await
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn guest() -> GuestRef {
        GuestRef::new("Ada Lovelace", "ada@example.com")
    }

    async fn setup_with(notifier: Arc<dyn NotificationSender>) -> (Database, BookingService) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.rooms()
            .insert(&Room {
                id: "room-101".to_string(),
                room_number: "101".to_string(),
                room_type: RoomType::Double,
                base_rate_cents: 10000,
                status: RoomStatus::Available,
            })
            .await
            .unwrap();

        let service = BookingService::from_database(&db, &BookingConfig::default(), notifier);
        (db, service)
    }

    async fn setup() -> (Database, BookingService) {
        setup_with(Arc::new(LogNotifier)).await
    }

    fn assert_no_overlaps(reservations: &[Reservation]) {
        let active: Vec<_> = reservations
            .iter()
            .filter(|r| r.status != ReservationStatus::Cancelled)
            .collect();
        for (i, a) in active.iter().enumerate() {
            for b in &active[i + 1..] {
                assert!(
                    !(a.check_in < b.check_out && a.check_out > b.check_in),
                    "{} overlaps {}",
                    a.id,
                    b.id
                );
            }
        }
    }

    #[tokio::test]
    async fn test_admit_prices_weekdays() {
        let (_db, service) = setup().await;

        // Mon 2024-01-08 .. Wed 2024-01-10
        let r = service
            .admit("room-101", date(2024, 1, 8), date(2024, 1, 10), guest(), date(2024, 1, 1))
            .await
            .unwrap();

        assert_eq!(r.status, ReservationStatus::Confirmed);
        assert_eq!(r.subtotal(), Money::from_cents(20000));
        assert_eq!(r.guest_email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn test_admit_prices_weekend() {
        let (_db, service) = setup().await;

        // Fri 2024-01-12 .. Sun 2024-01-14
        let r = service
            .admit("room-101", date(2024, 1, 12), date(2024, 1, 14), guest(), date(2024, 1, 1))
            .await
            .unwrap();

        assert_eq!(r.subtotal(), Money::from_cents(24000));
    }

    #[tokio::test]
    async fn test_admit_unknown_room() {
        let (_db, service) = setup().await;

        let err = service
            .admit("room-999", date(2024, 1, 8), date(2024, 1, 10), guest(), date(2024, 1, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::Core(CoreError::RoomNotFound(_))));
    }

    #[tokio::test]
    async fn test_admit_invalid_range() {
        let (_db, service) = setup().await;

        let err = service
            .admit("room-101", date(2024, 1, 10), date(2024, 1, 10), guest(), date(2024, 1, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::Core(CoreError::InvalidRange { .. })));
    }

    #[tokio::test]
    async fn test_conflict_leaves_existing_untouched() {
        let (db, service) = setup().await;

        let first = service
            .admit("room-101", date(2024, 1, 8), date(2024, 1, 12), guest(), date(2024, 1, 1))
            .await
            .unwrap();

        let err = service
            .admit("room-101", date(2024, 1, 10), date(2024, 1, 14), guest(), date(2024, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Core(CoreError::RoomUnavailable { .. })));

        let all = db.reservations().list_for_room("room-101").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, first.id);
        assert_eq!(all[0].status, ReservationStatus::Confirmed);
        assert_eq!(all[0].check_out, date(2024, 1, 12));
    }

    #[tokio::test]
    async fn test_back_to_back_stays_allowed() {
        let (_db, service) = setup().await;

        service
            .admit("room-101", date(2024, 1, 8), date(2024, 1, 10), guest(), date(2024, 1, 1))
            .await
            .unwrap();
        service
            .admit("room-101", date(2024, 1, 10), date(2024, 1, 12), guest(), date(2024, 1, 1))
            .await
            .unwrap();

        assert!(!service
            .has_conflict("room-101", date(2024, 1, 12), date(2024, 1, 13))
            .await
            .unwrap());
        assert!(service
            .has_conflict("room-101", date(2024, 1, 9), date(2024, 1, 11))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_admissions_one_wins() {
        let (db, service) = setup().await;
        let other = service.clone();
        let today = date(2024, 1, 1);

        let (a, b) = tokio::join!(
            service.admit("room-101", date(2024, 2, 1), date(2024, 2, 4), guest(), today),
            other.admit("room-101", date(2024, 2, 2), date(2024, 2, 5), guest(), today),
        );

        let outcomes = [a.is_ok(), b.is_ok()];
        assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);

        let loser = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
        assert!(matches!(loser, BookingError::Core(CoreError::RoomUnavailable { .. })));

        let all = db.reservations().list_for_room("room-101").await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_room_booked_when_check_in_today() {
        let (db, service) = setup().await;

        service
            .admit("room-101", date(2024, 1, 20), date(2024, 1, 22), guest(), date(2024, 1, 1))
            .await
            .unwrap();
        let room = db.rooms().get_by_id("room-101").await.unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::Available);

        service
            .admit("room-101", date(2024, 1, 1), date(2024, 1, 3), guest(), date(2024, 1, 1))
            .await
            .unwrap();
        let room = db.rooms().get_by_id("room-101").await.unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::Booked);
    }

    #[tokio::test]
    async fn test_always_policy_books_room() {
        let (db, service) = setup().await;
        let service = service.with_room_status_policy(RoomStatusPolicy::Always);

        service
            .admit("room-101", date(2024, 1, 20), date(2024, 1, 22), guest(), date(2024, 1, 1))
            .await
            .unwrap();

        let room = db.rooms().get_by_id("room-101").await.unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::Booked);
    }

    #[tokio::test]
    async fn test_failed_status_write_withdraws_reservation() {
        let (db, healthy) = setup().await;
        let stuck = BookingService::new(
            Arc::new(StuckRooms(db.rooms())),
            Arc::new(db.reservations()),
            Arc::new(LogNotifier),
        );
        let today = date(2024, 1, 1);

        let err = stuck
            .admit("room-101", today, date(2024, 1, 3), guest(), today)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Store(DbError::PoolExhausted)));

        let all = db.reservations().list_for_room("room-101").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, ReservationStatus::Cancelled);

        // The nights were not left blocked
        healthy
            .admit("room-101", today, date(2024, 1, 3), guest(), today)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_stay_longer_than_a_year_rejected() {
        let (db, service) = setup().await;

        service
            .admit("room-101", date(2024, 1, 1), date(2024, 12, 31), guest(), date(2024, 1, 1))
            .await
            .unwrap();

        // 2025 is not a leap year: 365 nights is fine, 366 is not
        let err = service
            .admit("room-101", date(2025, 1, 1), date(2026, 1, 2), guest(), date(2024, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Core(CoreError::Validation(_))));
        assert_eq!(db.reservations().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cancel_frees_room_and_is_idempotent() {
        let (db, service) = setup().await;

        let r = service
            .admit("room-101", date(2024, 1, 1), date(2024, 1, 3), guest(), date(2024, 1, 1))
            .await
            .unwrap();

        let cancelled = service.cancel(&r.id).await.unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);

        let room = db.rooms().get_by_id("room-101").await.unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::Available);

        let again = service.cancel(&r.id).await.unwrap();
        assert_eq!(again.status, ReservationStatus::Cancelled);

        // The nights are free again
        service
            .admit("room-101", date(2024, 1, 1), date(2024, 1, 3), guest(), date(2024, 1, 1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancel_unknown_reservation() {
        let (_db, service) = setup().await;

        let err = service.cancel("res-missing").await.unwrap_err();
        assert!(matches!(err, BookingError::Core(CoreError::ReservationNotFound(_))));
    }

    #[tokio::test]
    async fn test_no_overlap_after_mixed_sequence() {
        let (db, service) = setup().await;
        let today = date(2024, 1, 1);

        let ranges = [
            (date(2024, 3, 1), date(2024, 3, 5)),
            (date(2024, 3, 3), date(2024, 3, 6)),
            (date(2024, 3, 5), date(2024, 3, 7)),
            (date(2024, 2, 27), date(2024, 3, 2)),
            (date(2024, 3, 6), date(2024, 3, 9)),
        ];

        let mut admitted = Vec::new();
        for (check_in, check_out) in ranges {
            if let Ok(r) = service.admit("room-101", check_in, check_out, guest(), today).await {
                admitted.push(r);
            }
        }

        service.cancel(&admitted[0].id).await.unwrap();
        let _ = service
            .admit("room-101", date(2024, 3, 2), date(2024, 3, 4), guest(), today)
            .await;
        let _ = service
            .admit("room-101", date(2024, 3, 4), date(2024, 3, 6), guest(), today)
            .await;

        let all = db.reservations().list_for_room("room-101").await.unwrap();
        assert_no_overlaps(&all);
    }

    #[tokio::test]
    async fn test_quote_does_not_reserve() {
        let (db, service) = setup().await;

        // Fri 2024-01-05, one peak night
        let quote = service
            .quote("room-101", date(2024, 1, 5), date(2024, 1, 6))
            .await
            .unwrap();
        assert_eq!(quote.subtotal, Money::from_cents(12000));
        assert_eq!(db.reservations().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_confirmation_sent_after_admission() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (_db, service) = setup_with(Arc::new(ChannelNotifier { tx })).await;

        let r = service
            .admit("room-101", date(2024, 1, 8), date(2024, 1, 10), guest(), date(2024, 1, 1))
            .await
            .unwrap();

        let (recipient, summary) = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(recipient, "ada@example.com");
        assert_eq!(summary.reservation_id, r.id);
        assert_eq!(summary.room_number, "101");
    }

    #[tokio::test]
    async fn test_no_confirmation_without_email() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (_db, service) = setup_with(Arc::new(ChannelNotifier { tx })).await;

        let walk_in = GuestRef {
            id: None,
            name: Some("Walk-in".to_string()),
            email: None,
        };
        service
            .admit("room-101", date(2024, 1, 8), date(2024, 1, 10), walk_in, date(2024, 1, 1))
            .await
            .unwrap();

        let received = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(received.is_err());
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_fail_admission() {
        let (db, service) = setup_with(Arc::new(FailingNotifier)).await;

        let r = service
            .admit("room-101", date(2024, 1, 8), date(2024, 1, 10), guest(), date(2024, 1, 1))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(db.reservations().get_by_id(&r.id).await.unwrap().is_some());
    }
}
