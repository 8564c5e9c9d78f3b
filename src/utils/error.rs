// src/utils/error.rs
#![allow(dead_code)]
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum NotionError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode), // e.g., 404 Not Found, 401 Unauthorized

    #[error("Notion rate limit exceeded")]
    RateLimited,

    #[error("NOTION_API_KEY is not set")]
    MissingToken,

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Failed to parse Notion response: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Notion interaction failed: {0}")]
    Notion(#[from] NotionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
