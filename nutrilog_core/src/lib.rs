#![forbid(unsafe_code)]

//! Core domain model and business logic for the Nutrilog tracker.
//!
//! This crate provides:
//! - Domain types (accounts, diet plans, meal entries)
//! - Account registration and authentication
//! - Food catalog management
//! - Meal journal (append-only JSONL) and CSV export
//! - Session roles and credential checks

pub mod types;
pub mod error;
pub mod validate;
pub mod config;
pub mod logging;
pub mod store;
pub mod account;
pub mod catalog;
pub mod meals;
pub mod session;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use account::{authenticate, register, Registration};
pub use catalog::{add_food, AddFoodOutcome};
pub use config::Config;
pub use export::export_meals_csv;
pub use meals::{log_meal, recent_meals};
pub use session::{check_admin_secret, CredentialVerifier, PlaintextVerifier, Session};
pub use store::Store;
