//! Postflow Core Library
//!
//! This crate provides the domain models, error types, and configuration
//! shared by the grouping and scheduling components.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{BaseConfig, WorkerConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
