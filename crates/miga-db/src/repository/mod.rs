//! # Repository Module
//!
//! Database repository implementations for Miga Proformas.
//!
//! ## Repository Pattern
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │  API handler                                                       │
//! │       │                                                            │
//! │       │  db.proformas().create(owner, &input)                      │
//! │       ▼                                                            │
//! │  ProformaRepository                                                │
//! │  ├── create / update / duplicate (transactional)                   │
//! │  ├── get_with_items / list                                         │
//! │  └── delete                                                        │
//! │       │                                                            │
//! │       │  SQL                                                       │
//! │       ▼                                                            │
//! │  SQLite database                                                   │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every query in this module is scoped by the owning user id; a repository
//! never returns another owner's rows.
//!
//! ## Available Repositories
//!
//! - [`user::UserRepository`] - accounts (lookup for the auth guard)
//! - [`client::ClientRepository`] - client CRUD and search
//! - [`menu_item::MenuItemRepository`] - menu CRUD, category filter
//! - [`settings::SettingsRepository`] - company settings upsert
//! - [`proforma::ProformaRepository`] - the proforma document service

pub mod client;
pub mod menu_item;
pub mod proforma;
pub mod settings;
pub mod user;
