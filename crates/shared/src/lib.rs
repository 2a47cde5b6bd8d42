//! Shared types, errors, and configuration for Bursar.
//!
//! This crate provides common types used across all other crates:
//! - Currency rounding and tolerance helpers
//! - Typed IDs for type-safe entity references
//! - Pagination and date-range types for read endpoints
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, DeactivationPolicy, LedgerConfig};
pub use error::{AppError, AppResult};
