//! chemscreen-storage - Storage library for chemscreen
//!
//! This crate persists batch search snapshots so they can be exported later.

mod snapshot_store;

pub use snapshot_store::{BatchSnapshot, FileSystemStorage, SnapshotInfo, SnapshotStorage};
