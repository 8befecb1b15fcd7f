// src/utils/error.rs
#![allow(dead_code)]
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP status {0}")]
    Http(reqwest::StatusCode), // e.g., 403 Forbidden after a block
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("expected 5 tables, found {0} (schema changed or page blocked)")]
    TableCount(usize),

    #[error("expected 4 crimetype tables, found {0}")]
    CrimeTypeTableCount(usize),

    #[error("crimetype table has {0} header cell(s), need 2")]
    CrimeTypeHeader(usize),

    #[error("age-group table has {0} header cell(s), expected 3")]
    AgeGroupHeader(usize),

    #[error("no age-group table found")]
    MissingAgeGroupTable,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Fetch setup failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
