//! # HCS Common Library
//!
//! Shared code for the HCS batch-analysis tools including:
//! - The measurement store (per-image-set scalars and per-object vectors)
//! - Metadata templating, grouping and matching
//! - SQLite persistence of a whole run
//! - Batch-driver helpers and the distributed-work transport client
//! - Configuration loading

pub mod config;
pub mod db;
pub mod driver;
pub mod error;
pub mod grouping;
pub mod matching;
pub mod remote;
pub mod store;
pub mod template;
pub mod value;

pub use error::{Error, Result};
pub use store::{Store, EXIT_STATUS, EXPERIMENT, IMAGE, IMAGE_NUMBER, METADATA_PREFIX};
pub use value::Value;
