//! Common test utilities for metasync integration tests
//!
//! A small but complete metadata repository, plus store and sink wrappers
//! that fail or block on demand.

pub mod faults;
pub mod repository;

pub use faults::{BlockingSink, FailingSink, FailingStore};
pub use repository::{repository, team_chain, Harness};
