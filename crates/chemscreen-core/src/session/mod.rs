//! Batch session module
//!
//! A batch session is the snapshot handed to the exporter: the batch
//! identifier, the chemicals searched, and the parameters used. It is
//! rebuilt from a batch snapshot for each export.

mod model;

pub use model::{BatchSearchSession, SearchParameters, SessionInfo, STATUS_COMPLETED};
