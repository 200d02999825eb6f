//! # Availability Checking
//!
//! Pure conflict detection over a room's existing reservations.
//!
//! The store narrows candidates (`find_overlapping`); this module applies
//! the exact rule so the outcome never depends on how wide the store query
//! was. Cancelled reservations never block.

use crate::stay::StayRange;
use crate::types::Reservation;

/// Returns true if the reservation occupies `room_id` on any night of `stay`.
pub fn blocks(reservation: &Reservation, room_id: &str, stay: &StayRange) -> bool {
    reservation.room_id == room_id
        && reservation.status.blocks_room()
        && crate::stay::overlaps(
            reservation.check_in,
            reservation.check_out,
            stay.check_in(),
            stay.check_out(),
        )
}

/// Returns true if any of `existing` blocks `room_id` for `stay`.
///
/// ## Example
/// ```rust,ignore
/// let existing = store.find_overlapping(room_id, stay.check_in(), stay.check_out()).await?;
/// if has_conflict(room_id, &stay, &existing) {
///     return Err(CoreError::RoomUnavailable { .. });
/// }
/// ```
pub fn has_conflict(room_id: &str, stay: &StayRange, existing: &[Reservation]) -> bool {
    existing.iter().any(|r| blocks(r, room_id, stay))
}

/// Returns the reservations that block `room_id` for `stay`.
pub fn conflicts<'a>(
    room_id: &'a str,
    stay: &'a StayRange,
    existing: &'a [Reservation],
) -> impl Iterator<Item = &'a Reservation> + 'a {
    existing.iter().filter(move |r| blocks(r, room_id, stay))
}

// =============================================================================
// Unit Tests
// =============================================================================
