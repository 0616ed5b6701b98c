//! Domain layer: pure business rules with no I/O.
//!
//! - **`classify`** – decides from a device *name* whether it looks like a
//!   keyboard or a pointing device.
//! - **`capabilities`** – parses the kernel's `/proc/bus/input/devices`
//!   listing into name + handler records.
//! - **`counting`** – the counting policy and the counter/activity state it
//!   updates.

pub mod capabilities;
pub mod classify;
pub mod counting;

pub use capabilities::{parse_capability_listing, CapabilityRecord};
pub use classify::{classify, DeviceClass, NameHints};
pub use counting::{apply, ActivitySignal, CountDelta, CounterState};
