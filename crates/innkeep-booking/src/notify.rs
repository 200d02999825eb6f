//! # Confirmation Notifications
//!
//! Fire-and-forget delivery of booking confirmations.
//!
//! ## Flow
//! ```text
//!   admit() ── insert committed ──► tokio::spawn ──► NotificationSender
//!      │                                                   │
//!      ▼                                                   ▼
//!   Ok(reservation)                              Err(_) → warn!, dropped
//! ```
//!
//! The admission result never waits on, or depends on, delivery.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use innkeep_core::{Money, Reservation, Room, RoomType};

/// Failure reported by a [`NotificationSender`].
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
}

/// What a confirmation tells the guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationSummary {
    pub reservation_id: String,
    pub guest_name: Option<String>,
    pub room_number: String,
    pub room_type: RoomType,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i64,
    pub subtotal: Money,
}

impl ConfirmationSummary {
    pub fn new(room: &Room, reservation: &Reservation) -> Self {
        ConfirmationSummary {
            reservation_id: reservation.id.clone(),
            guest_name: reservation.guest_name.clone(),
            room_number: room.room_number.clone(),
            room_type: room.room_type,
            check_in: reservation.check_in,
            check_out: reservation.check_out,
            nights: reservation.nights(),
            subtotal: reservation.subtotal(),
        }
    }
}

/// Delivers booking confirmations (email, SMS, ...).
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send_confirmation(
        &self,
        recipient: &str,
        summary: &ConfirmationSummary,
    ) -> Result<(), NotifyError>;
}

/// Sender that only writes the confirmation to the log.
///
/// Default for deployments without a mail relay.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSender for LogNotifier {
    async fn send_confirmation(
        &self,
        recipient: &str,
        summary: &ConfirmationSummary,
    ) -> Result<(), NotifyError> {
        if !recipient.contains('@') {
            return Err(NotifyError::InvalidRecipient(recipient.to_string()));
        }

        info!(
            recipient = %recipient,
            reservation_id = %summary.reservation_id,
            room = %summary.room_number,
            check_in = %summary.check_in,
            check_out = %summary.check_out,
            subtotal = %summary.subtotal,
            "Booking confirmation sent"
        );
        Ok(())
    }
}
