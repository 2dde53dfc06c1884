//! Application layer
//!
//! `SyncEngine` orchestrates the configured mapper sets over entity
//! transitions and assembles the resulting action lists.

pub mod sync_engine;

pub use sync_engine::{MappingFailure, SyncEngine, SyncOperation, SyncOutcome, Transition};
