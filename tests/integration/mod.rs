//! Integration test suite for modelpack
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! - **acquire**: listing and downloading against a mock HuggingFace/GitHub server
//! - **assemble**: packaging local folders through the library API
//! - **cli**: end-to-end runs of the `modelpack` binary

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod acquire;
mod assemble;
mod cli;
