//! # Booking Configuration
//!
//! Configuration for the admission and settlement services.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     INNKEEP_DATABASE_PATH=/var/lib/innkeep/innkeep.db                  │
//! │     INNKEEP_STATE_CODE=NY                                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/innkeep/innkeep.toml (Linux)                             │
//! │     ~/Library/Application Support/com.innkeep.innkeep/innkeep.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     ./innkeep.db, NY, Fri/Sat at 1.20×, check_in_today                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # innkeep.toml
//! [database]
//! path = "./innkeep.db"
//! max_connections = 5
//!
//! [property]
//! state_code = "NY"
//! county = "New York"
//! city = "New York"
//!
//! [pricing]
//! peak_days = ["Fri", "Sat"]
//! peak_multiplier_bps = 12000
//!
//! [admission]
//! room_status_policy = "check_in_today"  # check_in_today | always
//! ```

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use innkeep_core::validation::{validate_multiplier_bps, validate_state_code};
use innkeep_core::{Jurisdiction, PricingRules, Rate, DEFAULT_PEAK_MULTIPLIER_BPS};
use innkeep_db::DbConfig;

use crate::error::{BookingError, BookingResult};

// =============================================================================
// Room Status Policy
// =============================================================================

/// When an admitted reservation flips its room to BOOKED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatusPolicy {
    /// Only when the stay starts today.
    #[default]
    CheckInToday,

    /// On every admission.
    Always,
}

impl RoomStatusPolicy {
    /// Whether a stay starting on `check_in` marks the room BOOKED on `today`.
    pub fn marks_booked(&self, check_in: NaiveDate, today: NaiveDate) -> bool {
        match self {
            RoomStatusPolicy::CheckInToday => check_in == today,
            RoomStatusPolicy::Always => true,
        }
    }
}

impl std::fmt::Display for RoomStatusPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoomStatusPolicy::CheckInToday => write!(f, "check_in_today"),
            RoomStatusPolicy::Always => write!(f, "always"),
        }
    }
}

impl std::str::FromStr for RoomStatusPolicy {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "check_in_today" | "today" => Ok(RoomStatusPolicy::CheckInToday),
            "always" => Ok(RoomStatusPolicy::Always),
            other => Err(BookingError::Config(format!(
                "Unknown room status policy: '{}'. Valid options: check_in_today, always",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// `[database]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./innkeep.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// `[property]`: the jurisdiction charges are taxed in unless a caller
/// passes another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySettings {
    #[serde(default = "default_state_code")]
    pub state_code: String,

    #[serde(default)]
    pub county: Option<String>,

    #[serde(default)]
    pub city: Option<String>,
}

fn default_state_code() -> String {
    "NY".to_string()
}

impl Default for PropertySettings {
    fn default() -> Self {
        PropertySettings {
            state_code: default_state_code(),
            county: None,
            city: None,
        }
    }
}

/// `[pricing]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSettings {
    #[serde(default = "default_peak_days")]
    pub peak_days: Vec<Weekday>,

    #[serde(default = "default_peak_multiplier_bps")]
    pub peak_multiplier_bps: u32,
}

fn default_peak_days() -> Vec<Weekday> {
    vec![Weekday::Fri, Weekday::Sat]
}

fn default_peak_multiplier_bps() -> u32 {
    DEFAULT_PEAK_MULTIPLIER_BPS
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            peak_days: default_peak_days(),
            peak_multiplier_bps: default_peak_multiplier_bps(),
        }
    }
}

/// `[admission]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdmissionSettings {
    #[serde(default)]
    pub room_status_policy: RoomStatusPolicy,
}

// =============================================================================
// Booking Configuration
// =============================================================================

/// Complete service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub property: PropertySettings,

    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub admission: AdmissionSettings,
}

impl BookingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (innkeep.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> BookingResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading booking config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load booking config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> BookingResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| BookingError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Booking config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> BookingResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(BookingError::Config("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(BookingError::Config(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        validate_state_code(&self.property.state_code)?;
        validate_multiplier_bps(self.pricing.peak_multiplier_bps)?;

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("INNKEEP_DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(state) = std::env::var("INNKEEP_STATE_CODE") {
            debug!(state = %state, "Overriding state code from environment");
            self.property.state_code = state;
        }

        if let Ok(county) = std::env::var("INNKEEP_COUNTY") {
            self.property.county = Some(county).filter(|c| !c.is_empty());
        }

        if let Ok(city) = std::env::var("INNKEEP_CITY") {
            self.property.city = Some(city).filter(|c| !c.is_empty());
        }

        if let Ok(policy) = std::env::var("INNKEEP_ROOM_STATUS_POLICY") {
            match policy.parse() {
                Ok(parsed) => self.admission.room_status_policy = parsed,
                Err(_) => warn!(policy = %policy, "Unknown room status policy in environment"),
            }
        }

        if let Ok(bps) = std::env::var("INNKEEP_PEAK_MULTIPLIER_BPS") {
            match bps.parse::<u32>() {
                Ok(b) => self.pricing.peak_multiplier_bps = b,
                Err(_) => warn!(value = %bps, "Invalid peak multiplier in environment"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "innkeep", "innkeep")
            .map(|dirs| dirs.config_dir().join("innkeep.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Pool settings for [`innkeep_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
    }

    /// The property's default tax jurisdiction.
    pub fn jurisdiction(&self) -> Jurisdiction {
        let mut jurisdiction = Jurisdiction::new(self.property.state_code.trim().to_uppercase());
        if let Some(county) = &self.property.county {
            jurisdiction = jurisdiction.with_county(county);
        }
        if let Some(city) = &self.property.city {
            jurisdiction = jurisdiction.with_city(city);
        }
        jurisdiction
    }

    pub fn pricing_rules(&self) -> PricingRules {
        PricingRules {
            peak_days: self.pricing.peak_days.clone(),
            peak_multiplier: Rate::from_bps(self.pricing.peak_multiplier_bps),
        }
    }

    pub fn room_status_policy(&self) -> RoomStatusPolicy {
        self.admission.room_status_policy
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
