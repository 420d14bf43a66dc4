//! # Seed Data Generator
//!
//! Creates a demo account and a starter menu for development.
//!
//! ## Usage
//! ```bash
//! # Defaults: demo@miga.cr / miga-demo, ./data/miga.db
//! cargo run -p miga-api --bin seed
//!
//! # Custom account or database path
//! cargo run -p miga-api --bin seed -- --email ana@miga.cr --password s3cret --db ./miga.db
//! ```

use std::env;

use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;
use chrono::Utc;
use uuid::Uuid;

use miga_core::{MenuCategory, MenuItemInput, User};
use miga_db::{Database, DbConfig};

/// Starter menu: (category, name, description, price in cents).
const MENU: &[(MenuCategory, &str, &str, i64)] = &[
    (
        MenuCategory::Bocadillos,
        "Bocadillos surtidos (docena)",
        "Surtido de bocadillos salados para eventos",
        600_000,
    ),
    (
        MenuCategory::Bocadillos,
        "Empanaditas de queso (docena)",
        "Empanaditas horneadas rellenas de queso",
        450_000,
    ),
    (
        MenuCategory::Postres,
        "Brownies (docena)",
        "Brownies de chocolate con nuez",
        550_000,
    ),
    (
        MenuCategory::Postres,
        "Mini cheesecakes (docena)",
        "Cheesecakes individuales con fruta",
        700_000,
    ),
    (
        MenuCategory::Queques,
        "Queque de zanahoria",
        "Queque entero, 20 porciones",
        1_200_000,
    ),
    (
        MenuCategory::Queques,
        "Queque de chocolate",
        "Queque entero, 20 porciones",
        1_250_000,
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args: Vec<String> = env::args().collect();
    let db_path = arg_value(&args, "--db").unwrap_or_else(|| "./data/miga.db".to_string());
    let email = arg_value(&args, "--email").unwrap_or_else(|| "demo@miga.cr".to_string());
    let password = arg_value(&args, "--password").unwrap_or_else(|| "miga-demo".to_string());

    let db = Database::new(DbConfig::new(&db_path)).await?;

    if db.users().get_by_email(&email).await?.is_some() {
        println!("User {email} already exists, nothing to do");
        return Ok(());
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?
        .to_string();

    let user = User {
        id: Uuid::new_v4().to_string(),
        email: email.clone(),
        password_hash,
        display_name: "Demo".to_string(),
        created_at: Utc::now(),
    };
    db.users().insert(&user).await?;

    for (category, name, description, price_cents) in MENU {
        db.menu_items()
            .insert(
                &user.id,
                &MenuItemInput {
                    category: *category,
                    name: (*name).to_string(),
                    description: Some((*description).to_string()),
                    price_cents: *price_cents,
                },
            )
            .await?;
    }

    println!("Seeded {email} with {} menu items into {db_path}", MENU.len());

    Ok(())
}

fn arg_value(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
