//! Configuration for modelpack
//!
//! modelpack has a single, optional, user-wide configuration file. See
//! [`GlobalConfig`] for its location and format. Nothing is persisted between runs
//! apart from what the user writes there.

mod global;

pub use global::{CONFIG_ENV, GlobalConfig};
