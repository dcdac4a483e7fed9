//! Core types and foundational components
//!
//! This module contains the record types, error handling,
//! and constants used throughout the application.

pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items for convenience
pub use error::{CarbonEdaError, Result};
pub use types::{Category, CategoryProfile, Dataset, Rating, Record};
