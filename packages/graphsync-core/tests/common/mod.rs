//! Common test utilities for graphsync-core
//!
//! Shared mapper fixtures and snapshot builders for the integration tests.

#![allow(dead_code)]

mod builders;
mod fixtures;

pub use builders::*;
pub use fixtures::*;
