//! # miga-db: Database Layer for Miga Proformas
//!
//! This crate provides database access for the system. It uses SQLite for
//! storage with sqlx for async operations.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (clients, menu, proformas, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use miga_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/miga.db")).await?;
//!
//! let (clients, total) = db.clients().list("owner-id", "", 10, 0).await?;
//! let doc = db.proformas().create("owner-id", &input).await?;
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

// Repository re-exports for convenience
pub use repository::client::ClientRepository;
pub use repository::menu_item::MenuItemRepository;
pub use repository::proforma::ProformaRepository;
pub use repository::settings::SettingsRepository;
pub use repository::user::UserRepository;
