//! Search result module
//!
//! Read-only view of what the literature-search pipeline produced:
//! chemicals, their matched publications, and per-chemical outcomes.

pub mod builder;
pub mod model;

pub use builder::PublicationBuilder;
pub use model::*;
