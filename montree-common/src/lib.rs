//! # Montree Common Library
//!
//! Shared code for the Montree curriculum engine:
//! - Database initialization, schema, and row models
//! - The progress status lattice
//! - Area taxonomy and normalization
//! - Age tier mapping
//! - Configuration loading
//! - Error types

pub mod area;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod status;
pub mod tier;
pub mod time;

pub use area::Area;
pub use error::{Error, Result};
pub use status::ProgressStatus;
pub use tier::AgeTier;
