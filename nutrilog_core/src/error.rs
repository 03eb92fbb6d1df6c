//! Error types for the nutrilog_core library.
//!
//! Every core operation returns `Result<T>`; all domain failures are
//! recoverable and are meant to be rendered by the caller, not to abort the
//! process. The one deliberate exception to "failure means `Err`" is the
//! duplicate-food case, which is a soft outcome (see `catalog::AddFoodOutcome`).

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for nutrilog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// E-mail does not have the local@domain.tld shape
    #[error("invalid e-mail address")]
    InvalidEmail,

    /// An account with this e-mail already exists
    #[error("e-mail is already registered")]
    EmailTaken,

    /// The password may not be empty
    #[error("password must not be empty")]
    EmptyPassword,

    /// Weight and height must both be positive
    #[error("weight and height must be greater than zero")]
    InvalidMeasurement,

    /// Sex must be 'M' or 'F'
    #[error("sex must be 'M' or 'F'")]
    InvalidSex,

    /// The diet is not one of the known plans
    #[error("unknown diet plan: {0}")]
    InvalidDiet(String),

    /// No account is registered for this e-mail
    #[error("no account registered for this e-mail")]
    UnknownEmail,

    /// The password did not match the stored one
    #[error("incorrect password")]
    WrongPassword,

    /// The food is not in the catalog
    #[error("unknown food: {0}")]
    UnknownFood(String),

    /// The quantity must be positive
    #[error("quantity must be greater than zero")]
    InvalidQuantity,

    /// A row with this primary key already exists
    #[error("duplicate key '{key}' in table '{table}'")]
    DuplicateKey { table: &'static str, key: String },

    /// A referenced row does not exist
    #[error("foreign key '{key}' not found in table '{table}'")]
    ForeignKeyViolation { table: &'static str, key: String },
}
