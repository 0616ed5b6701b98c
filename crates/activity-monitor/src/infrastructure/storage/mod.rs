//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the TOML configuration file, supplies
//! defaults for anything the file leaves out, and converts sections into the
//! settings types the rest of the crate consumes.

pub mod config;
