//! # Seed Data Generator
//!
//! Populates the database with demo institutions, employees and an admin
//! account for development.
//!
//! ## Usage
//! ```bash
//! # Generate 3 institutions with 3 employees each (default)
//! cargo run -p ilm-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p ilm-db --bin seed -- --count 10
//!
//! # Specify database path (overrides ILM_DB_PATH)
//! cargo run -p ilm-db --bin seed -- --db ./data/ilm.db
//! ```
//!
//! ## Generated Data
//! Per institution:
//! - Details in English and Russian
//! - One achievement
//! - One project with two partners
//! - Employees with details, a publication and a research area with topics
//!
//! Plus one `admin` user with a fresh 30-day session.

use chrono::{Duration, NaiveDate};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ilm_core::*;
use ilm_db::{Database, DbConfig};

/// Institution names for realistic test data
const INSTITUTIONS: &[(&str, &str, &str)] = &[
    ("Institute of Physics", "Институт физики", "Dushanbe"),
    ("Institute of Botany", "Институт ботаники", "Khujand"),
    ("Institute of Chemistry", "Институт химии", "Dushanbe"),
    ("Institute of History", "Институт истории", "Bokhtar"),
    ("Institute of Geology", "Институт геологии", "Kulob"),
];

/// Employee names
const EMPLOYEES: &[(&str, &str)] = &[
    ("Rahimov", "Ali"),
    ("Karimova", "Zarina"),
    ("Nazarov", "Firuz"),
    ("Saidova", "Malika"),
    ("Sharipov", "Davron"),
];

/// Research areas with their key topics
const AREAS: &[(&str, &str, &[&str])] = &[
    ("Solid state physics", "Physics", &["Semiconductors", "Thin films"]),
    ("Plant ecology", "Biology", &["Endemic flora", "Drought tolerance"]),
    ("Organic synthesis", "Chemistry", &["Catalysis", "Natural products"]),
];

const EMPLOYEES_PER_INSTITUTION: usize = 3;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,ilm=debug,sqlx=warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 3;
    let mut config = DbConfig::from_env()?;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(3);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("ilm Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of institutions to generate (default: 3)");
                println!("  -d, --db <PATH>    Database file path (default: $ILM_DB_PATH or ./ilm.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(
        database = %config.database_path.display(),
        institutions = count,
        "Seeding database"
    );

    let db = Database::new(config.run_migrations(true)).await?;

    let existing = db.institutions().list().await?;
    if !existing.is_empty() {
        warn!(
            existing = existing.len(),
            "Database already has institutions; skipping seed to avoid duplicates"
        );
        return Ok(());
    }

    let start = std::time::Instant::now();

    for index in 0..count {
        seed_institution(&db, index).await?;
    }

    seed_admin(&db).await?;

    info!(
        institutions = count,
        employees = count * EMPLOYEES_PER_INSTITUTION,
        elapsed = ?start.elapsed(),
        "Seed complete"
    );

    db.close().await;
    Ok(())
}

/// Creates one institution with its localized records and employees.
async fn seed_institution(db: &Database, index: usize) -> Result<(), Box<dyn std::error::Error>> {
    let (title_en, title_ru, city) = INSTITUTIONS[index % INSTITUTIONS.len()];

    let institution = db
        .institutions()
        .create(Institution {
            year_of_establishment: 1950 + (index as i32 * 7) % 60,
            email: format!("office{index}@ilm.tj"),
            phone_number: format!("+992 37 221 {:04}", index),
            mail_index: format!("7340{:02}", index % 100),
            ..Default::default()
        })
        .await?;

    for (language, title) in [("en", title_en), ("ru", title_ru)] {
        db.institution_details()
            .create(InstitutionDetails {
                institution_id: institution.id,
                language_code: language.to_string(),
                institution_title: title.to_string(),
                institution_type: "Research institute".to_string(),
                legal_status: "State".to_string(),
                city: city.to_string(),
                ..Default::default()
            })
            .await?;
    }

    db.institution_achievements()
        .create(InstitutionAchievement {
            institution_id: institution.id,
            language_code: "en".to_string(),
            achievement_title: "Best research laboratory".to_string(),
            date_of_achievement: date(2019, 5, 1)?,
            given_by: "Ministry of Education".to_string(),
            ..Default::default()
        })
        .await?;

    let project = db
        .institution_projects()
        .create(InstitutionProject {
            institution_id: institution.id,
            language_code: "en".to_string(),
            project_type: "International".to_string(),
            project_title: format!("{title_en} capacity building"),
            date_start: date(2021, 9, 1)?,
            fund: 250_000,
            institution_role: "Coordinator".to_string(),
            coordinator: title_en.to_string(),
            partners: vec![partner("University of Vienna"), partner("Moscow State University")],
            ..Default::default()
        })
        .await?;
    info!(
        project_id = project.id,
        partners = project.partners.len(),
        "Seeded project"
    );

    for slot in 0..EMPLOYEES_PER_INSTITUTION {
        seed_employee(db, index * EMPLOYEES_PER_INSTITUTION + slot).await?;
    }

    Ok(())
}

/// Creates one employee with details, a publication and a research area.
async fn seed_employee(db: &Database, index: usize) -> Result<(), Box<dyn std::error::Error>> {
    let (surname, name) = EMPLOYEES[index % EMPLOYEES.len()];
    let (area, discipline, topics) = AREAS[index % AREAS.len()];

    let employee = db
        .employees()
        .create(Employee {
            unique_id: format!("EMP-{:05}", index + 1),
            ..Default::default()
        })
        .await?;

    db.employee_details()
        .create(EmployeeDetails {
            employee_id: employee.id,
            language_code: "en".to_string(),
            surname: surname.to_string(),
            name: name.to_string(),
            ..Default::default()
        })
        .await?;

    db.employee_publications()
        .create(EmployeePublication {
            employee_id: employee.id,
            language_code: "en".to_string(),
            publication_title: format!("Notes on {}", area.to_lowercase()),
            link_to_publication: format!("https://doi.example/ilm.{}", index + 1),
            ..Default::default()
        })
        .await?;

    db.employee_main_research_areas()
        .create(EmployeeMainResearchArea {
            employee_id: employee.id,
            language_code: "en".to_string(),
            area: area.to_string(),
            discipline: discipline.to_string(),
            key_topics: topics
                .iter()
                .map(|title| ResearchAreaKeyTopic {
                    key_topic_title: title.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        })
        .await?;

    Ok(())
}

/// Creates the `admin` account and issues it a session.
async fn seed_admin(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let admin = db
        .users()
        .create(User {
            email: "admin@ilm.tj".to_string(),
            // Placeholder digest; hashing belongs to the auth layer.
            password_hash: "seed-only-not-a-real-hash".to_string(),
            role: "admin".to_string(),
            ..Default::default()
        })
        .await?;

    let session = db.user_sessions().issue(admin.id, Duration::days(30)).await?;
    info!(
        user_id = admin.id,
        expires_at = %session.expires_at,
        "Seeded admin session"
    );

    Ok(())
}

fn partner(name: &str) -> InstitutionProjectPartner {
    InstitutionProjectPartner {
        language_code: "en".to_string(),
        partner_type: "University".to_string(),
        partner_name: name.to_string(),
        ..Default::default()
    }
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| "invalid calendar date".into())
}
