//! # Seed Data Generator
//!
//! Populates the database with sample rooms, tax jurisdictions and
//! promotions for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p innkeep-db --bin seed
//!
//! # Specify database path
//! cargo run -p innkeep-db --bin seed -- --db ./data/innkeep.db
//! ```
//!
//! ## Generated Data
//! - Rooms 101-110 (singles, doubles, suites)
//! - Lodging tax profiles for NY, CA, FL, TX, NV (effective 2024-01-01)
//! - Promotions AAA2024, AARP15, MILITARY20, CORP2024, GOV2024, EARLYBIRD

use chrono::{Months, NaiveDate, Utc};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use innkeep_core::{
    Discount, MembershipType, Money, Promotion, Rate, Room, RoomStatus, RoomType,
    TaxJurisdictionProfile,
};
use innkeep_db::{Database, DbConfig};

/// Rooms: (number, type, base rate in cents).
const ROOMS: &[(&str, RoomType, i64)] = &[
    ("101", RoomType::Single, 8999),
    ("102", RoomType::Single, 8999),
    ("103", RoomType::Double, 12999),
    ("104", RoomType::Double, 12999),
    ("105", RoomType::Double, 13999),
    ("201", RoomType::Double, 14999),
    ("202", RoomType::Suite, 24999),
    ("203", RoomType::Suite, 27999),
    ("301", RoomType::Suite, 34999),
    ("302", RoomType::Single, 9999),
];

/// Jurisdictions: (state, county, city, state sales, county occupancy,
/// city occupancy, resort fee), rates in basis points.
const JURISDICTIONS: &[(&str, &str, &str, u32, u32, u32, u32)] = &[
    ("NY", "New York", "New York", 400, 575, 375, 200),
    ("CA", "Los Angeles", "Los Angeles", 725, 200, 1400, 150),
    ("FL", "Miami-Dade", "Miami", 600, 600, 200, 300),
    ("TX", "Harris", "Houston", 625, 200, 700, 100),
    ("NV", "Clark", "Las Vegas", 685, 500, 700, 500),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./innkeep_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Innkeep Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./innkeep_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(path = %db_path, "Seeding database");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    if db.rooms().count().await? > 0 {
        warn!("Database already has rooms; skipping seed to avoid duplicates");
        return Ok(());
    }

    for (number, room_type, base_rate_cents) in ROOMS {
        let room = Room {
            id: Uuid::new_v4().to_string(),
            room_number: number.to_string(),
            room_type: *room_type,
            base_rate_cents: *base_rate_cents,
            status: RoomStatus::Available,
        };
        db.rooms().insert(&room).await?;
    }
    info!(count = ROOMS.len(), "Rooms seeded");

    let effective = date(2024, 1, 1)?;
    for (state, county, city, state_bps, county_bps, city_bps, resort_bps) in JURISDICTIONS {
        let profile = TaxJurisdictionProfile {
            id: Uuid::new_v4().to_string(),
            state_code: state.to_string(),
            county: Some(county.to_string()),
            city: Some(city.to_string()),
            state_sales_rate_bps: *state_bps,
            county_occupancy_rate_bps: *county_bps,
            city_occupancy_rate_bps: *city_bps,
            resort_fee_rate_bps: *resort_bps,
            effective_date: effective,
            expiry_date: None,
        };
        db.tax_profiles().insert(&profile).await?;
    }
    info!(count = JURISDICTIONS.len(), "Tax profiles seeded");

    let promotions = sample_promotions(Utc::now().date_naive())?;
    for promotion in &promotions {
        db.promotions().insert(promotion).await?;
    }
    info!(count = promotions.len(), "Promotions seeded");

    println!("✓ Seed complete: {}", db_path);
    Ok(())
}

fn date(y: i32, m: u32, d: u32) -> Result<NaiveDate, String> {
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| format!("invalid date {y}-{m}-{d}"))
}

fn promotion(
    code: &str,
    description: &str,
    membership: MembershipType,
    discount: Discount,
    min_stay_nights: Option<u32>,
    max_uses: Option<u32>,
    valid_from: NaiveDate,
    valid_until: NaiveDate,
) -> Promotion {
    Promotion {
        id: Uuid::new_v4().to_string(),
        code: code.to_string(),
        description: description.to_string(),
        membership,
        discount,
        min_stay_nights,
        max_uses,
        current_uses: 0,
        valid_from,
        valid_until,
        is_active: true,
    }
}

fn sample_promotions(today: NaiveDate) -> Result<Vec<Promotion>, String> {
    let year_start = date(2024, 1, 1)?;
    let year_end = date(2024, 12, 31)?;
    let early_bird_end = today
        .checked_add_months(Months::new(3))
        .ok_or("EARLYBIRD end date out of range")?;

    Ok(vec![
        promotion(
            "AAA2024",
            "AAA Member Discount - 10% off",
            MembershipType::Aaa,
            Discount::Percentage(Rate::from_bps(1000)),
            None,
            None,
            year_start,
            year_end,
        ),
        promotion(
            "AARP15",
            "AARP Member Discount - 15% off",
            MembershipType::Aarp,
            Discount::Percentage(Rate::from_bps(1500)),
            None,
            None,
            year_start,
            year_end,
        ),
        promotion(
            "MILITARY20",
            "Military Discount - 20% off",
            MembershipType::Military,
            Discount::Percentage(Rate::from_bps(2000)),
            None,
            None,
            year_start,
            year_end,
        ),
        promotion(
            "CORP2024",
            "Corporate Rate - $50 off (min 2 nights)",
            MembershipType::Corporate,
            Discount::FixedAmount(Money::from_cents(5000)),
            Some(2),
            None,
            year_start,
            year_end,
        ),
        promotion(
            "GOV2024",
            "Government Employee Rate - 12% off",
            MembershipType::Government,
            Discount::Percentage(Rate::from_bps(1200)),
            None,
            None,
            year_start,
            year_end,
        ),
        promotion(
            "EARLYBIRD",
            "Early Bird Special - $75 off (min 3 nights)",
            MembershipType::None,
            Discount::FixedAmount(Money::from_cents(7500)),
            Some(3),
            Some(100),
            today,
            early_bird_end,
        ),
    ])
}
