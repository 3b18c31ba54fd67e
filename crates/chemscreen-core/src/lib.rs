//! chemscreen-core - Core library for chemscreen
//!
//! This crate provides the export pipeline for batch chemical literature
//! searches: search result models, quality scoring, record flattening and
//! the CSV, spreadsheet and JSON writers.

pub mod error;
pub mod types;
pub mod config;
pub mod search;
pub mod session;
pub mod quality;
pub mod export;

pub use error::{ChemScreenError, Result};
pub use types::*;
