//! Catalog - Definitions shared by the INE collector and parser
//!
//! Responsibilities:
//! - Describe the six INE tables (table id, artifact names, series filter)
//! - Own the raw CSV schema written by the collector and read by the parser
//! - Load environment configuration and install logging

pub mod config;
pub mod dataset;
pub mod raw;

pub use config::{init_logging, Config};
pub use dataset::{Dataset, YearField};
pub use raw::RawRow;
