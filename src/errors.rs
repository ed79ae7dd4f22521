//! Unified application error type.
//! All modules (client, core, db, cli, utils) return AppError to keep the
//! error handling consistent and easy to manage.

use std::io;
use thiserror::Error;

use crate::schema::Collection;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO / serialization
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    // ---------------------------
    // Entity client / relations
    // ---------------------------
    #[error("Unknown relation '{relation}' for collection {collection}")]
    UnknownRelation {
        collection: Collection,
        relation: String,
    },

    #[error("Relation query '{relation}' failed: {source}")]
    RelationQuery {
        relation: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("Collection {0} is local and cannot be reached through the entity client")]
    LocalCollection(Collection),

    #[error("{collection} '{id}' not found")]
    EntityNotFound { collection: Collection, id: String },

    #[error("Invalid {collection} record: {message}")]
    InvalidRecord {
        collection: Collection,
        message: String,
    },

    #[error("Invalid relational schema: {0}")]
    Schema(String),

    // ---------------------------
    // Timer errors
    // ---------------------------
    #[error("Timer '{0}' not found")]
    TimerNotFound(String),

    #[error("Timer '{0}' already exists")]
    TimerExists(String),

    #[error("Timer '{0}' has no project: assign one before submitting")]
    MissingProject(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Export(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
