//! Application layer for the monitor.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure business rules, here in `activity-core`) and the infrastructure
//! (device nodes, files, signals).
//!
//! Code in this layer:
//!
//! - **Orchestrates** domain functions to fulfil the program's goal (turn
//!   device readiness into counters and published state).
//! - **Depends on abstractions** (traits) rather than concrete
//!   implementations, so tests can drive it without `/dev/input`.
//! - **Contains no direct OS calls** beyond the wall clock.
//!
//! # Sub-modules
//!
//! - **`monitor`** – The monitor loop state machine and the
//!   [`monitor::InputDevices`] / [`monitor::StateSink`] traits it runs on.
//! - **`errors`** – The fatal vs. recoverable error split and exit codes.

pub mod errors;
pub mod monitor;
