//! # Bismillah Common Library
//!
//! Shared code for the Bismillah bot workspace:
//! - Error types
//! - Bootstrap configuration loading and data folder resolution
//! - SQLite-backed key/value store with expiry
//! - Timestamp helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
