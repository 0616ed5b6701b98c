//! Infrastructure layer for the monitor.
//!
//! Contains OS-facing adapters: device discovery, the `poll(2)`-backed device
//! registry, the state-file publisher, TOML configuration, and the runtime
//! wiring that ties them to the monitor loop.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `activity_core`, but MUST NOT be imported by the `application` or domain
//! layers.

pub mod device_registry;
pub mod discovery;
pub mod runtime;
pub mod state_files;
pub mod storage;
