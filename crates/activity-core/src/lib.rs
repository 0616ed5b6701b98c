//! # activity-core
//!
//! Shared library for the input activity monitor containing the evdev record
//! codec, device-name classification, the capability-listing parser, and the
//! counting policy.
//!
//! It has zero dependencies on device nodes, file systems, or sockets: every
//! function here is a pure function of its inputs, which is what lets the
//! monitor's behaviour be tested against fixture strings and byte arrays.
//!
//! # Architecture overview (for beginners)
//!
//! The monitor watches the raw `/dev/input/event*` streams of a Linux host and
//! turns them into two numbers ("how many key presses", "how many pointer
//! events") plus a "last activity" timestamp that other programs poll.
//!
//! This crate (`activity-core`) is the shared foundation.  It defines:
//!
//! - **`event`** – How bytes coming out of a device node become typed events.
//!   The kernel writes fixed 24-byte `struct input_event` records; the codec
//!   turns each one into a [`RawEvent`].
//!
//! - **`domain`** – Pure business logic: deciding whether a device *name* looks
//!   like a keyboard or a pointer, parsing the kernel's textual capability
//!   listing, and the counting policy that maps an event on a classified device
//!   to counter increments.

// Declare the two top-level modules.  Rust will look for each in a
// subdirectory with the same name (e.g., src/event/mod.rs).
pub mod domain;
pub mod event;

// Re-export the most-used types at the crate root so callers can write
// `activity_core::RawEvent` instead of `activity_core::event::RawEvent`.
pub use domain::classify::{classify, DeviceClass, NameHints};
pub use domain::counting::{apply, ActivitySignal, CountDelta, CounterState};
pub use event::codec::{decode, decode_slice, encode, DecodeError};
pub use event::{EventKind, RawEvent, EVENT_SIZE};
