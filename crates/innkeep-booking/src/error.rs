//! # Booking Error Types
//!
//! Error type for the orchestration layer.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      BookingError Categories                            │
//! │                                                                         │
//! │  ┌─────────────────────┐  ┌─────────────────────┐  ┌────────────────┐  │
//! │  │  Core (domain)      │  │  Store (database)   │  │  Config        │  │
//! │  │                     │  │                     │  │                │  │
//! │  │  RoomNotFound       │  │  QueryFailed        │  │  bad toml      │  │
//! │  │  RoomUnavailable    │  │  ConnectionFailed   │  │  bad env value │  │
//! │  │  InvalidPromoCode   │  │  ForeignKeyViolation│  │  io failure    │  │
//! │  │  InvalidState ...   │  │  ...                │  │                │  │
//! │  └─────────────────────┘  └─────────────────────┘  └────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Notification failures never surface here; they are logged and dropped.

use thiserror::Error;

use innkeep_core::CoreError;
use innkeep_db::DbError;

/// Result type alias for booking and settlement operations.
pub type BookingResult<T> = Result<T, BookingError>;

/// Errors returned by [`BookingService`](crate::BookingService) and
/// [`SettlementService`](crate::SettlementService).
#[derive(Debug, Error)]
pub enum BookingError {
    /// A business rule rejected the request.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The backing store failed.
    #[error("Store error: {0}")]
    Store(#[from] DbError),

    /// Configuration could not be loaded, saved or validated.
    #[error("Configuration error: {0}")]
    Config(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<innkeep_core::ValidationError> for BookingError {
    fn from(err: innkeep_core::ValidationError) -> Self {
        BookingError::Core(CoreError::Validation(err))
    }
}

impl From<std::io::Error> for BookingError {
    fn from(err: std::io::Error) -> Self {
        BookingError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for BookingError {
    fn from(err: toml::de::Error) -> Self {
        BookingError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for BookingError {
    fn from(err: toml::ser::Error) -> Self {
        BookingError::Config(err.to_string())
    }
}

impl BookingError {
    /// Returns the domain error, if this is one.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            BookingError::Core(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(self, BookingError::Config(_))
    }
}
