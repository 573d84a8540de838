//! Unified application error type.
//! All modules (db, core, cli) return AppError so rejection reasons stay
//! specific: conflicting contract windows, measured distances, missing rows.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

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
    #[error("Invalid date/time: {0}")]
    InvalidDateTime(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid task status: {0}")]
    InvalidTaskStatus(String),

    // ---------------------------
    // Not-found (tenant, contract, worker, task)
    // ---------------------------
    #[error("{0} not found: {1}")]
    NotFound(&'static str, i64),

    // ---------------------------
    // Validation / bad request
    // ---------------------------
    #[error("Invalid time window: end ({end}) must be after start ({start})")]
    InvertedWindow { start: String, end: String },

    #[error("Start time {0} is in the past")]
    StartInPast(String),

    #[error(
        "Pointage rejected: you are {measured_m} m from the work site, the limit is {allowed_m} m"
    )]
    OutOfRange { measured_m: i64, allowed_m: i64 },

    #[error("No active contract covers the current time")]
    NoActiveContract,

    #[error("Worker {worker_id} is not assigned to contract {contract_id}")]
    NotAssigned { worker_id: i64, contract_id: i64 },

    // ---------------------------
    // Conflicts
    // ---------------------------
    #[error("Schedule conflict for worker {worker_id}: {details}")]
    ScheduleConflict { worker_id: i64, details: String },

    #[error(
        "Attendance already recorded today for worker {worker_id} on contract {contract_id}: one arrival and one departure are allowed per day"
    )]
    AlreadyPointedToday { worker_id: i64, contract_id: i64 },

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;
