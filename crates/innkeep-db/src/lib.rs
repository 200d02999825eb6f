//! # innkeep-db: Database Layer for Innkeep
//!
//! This crate provides database access for Innkeep.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Innkeep Data Flow                                │
//! │                                                                         │
//! │  BookingService::admit / SettlementService::settle                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    innkeep-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐  ┌──────────────────┐  ┌────────────────┐  │   │
//! │  │   │   Database    │  │   Repositories   │  │   Migrations   │  │   │
//! │  │   │   (pool.rs)   │  │                  │  │   (embedded)   │  │   │
//! │  │   │               │  │ RoomRepo         │  │                │  │   │
//! │  │   │ SqlitePool    │◄─│ ReservationRepo  │  │ 001_initial_   │  │   │
//! │  │   │ WAL, FKs on   │  │ TaxProfileRepo   │  │   schema.sql   │  │   │
//! │  │   │               │  │ PromotionRepo    │  │                │  │   │
//! │  │   │               │  │ ChargeRepo       │  │                │  │   │
//! │  │   └───────────────┘  └──────────────────┘  └────────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (innkeep.db)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use innkeep_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/innkeep.db")).await?;
//! let overlapping = db.reservations().find_overlapping(&room_id, check_in, check_out).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::charge::ChargeRepository;
pub use repository::promotion::PromotionRepository;
pub use repository::reservation::ReservationRepository;
pub use repository::room::RoomRepository;
pub use repository::tax_profile::TaxProfileRepository;
