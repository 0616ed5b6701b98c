//! Counting policy and the state it updates.
//!
//! The counters approximate "number of discrete interactions", not raw event
//! volume:
//!
//! | Event                       | Keyboard handle | Pointer handle |
//! |-----------------------------|-----------------|----------------|
//! | `EV_KEY` value 1 (press)    | keyboard +1     | pointer +1     |
//! | `EV_KEY` value 0 / 2        | —               | —              |
//! | `EV_REL`                    | —               | pointer +1     |
//! | `EV_ABS`                    | pointer +1      | pointer +1     |
//! | anything else               | —               | —              |
//!
//! Every row with an increment also touches the activity timestamp.
//!
//! Autorepeat is a known approximation: some drivers re-send value 1 instead
//! of value 2 while a key is held, and those presses are counted like fresh
//! ones.

use crate::domain::classify::DeviceClass;
use crate::event::{EventKind, RawEvent};

/// Outcome of applying the counting policy to one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountDelta {
    /// 0 or 1.
    pub keyboard: u64,
    /// 0 or 1.
    pub pointer: u64,
    /// Whether this event refreshes the last-activity timestamp.
    pub activity_touched: bool,
}

impl CountDelta {
    const NONE: CountDelta = CountDelta {
        keyboard: 0,
        pointer: 0,
        activity_touched: false,
    };
    const KEYBOARD: CountDelta = CountDelta {
        keyboard: 1,
        pointer: 0,
        activity_touched: true,
    };
    const POINTER: CountDelta = CountDelta {
        keyboard: 0,
        pointer: 1,
        activity_touched: true,
    };

    /// Returns `true` if the event changed anything.
    pub fn is_qualifying(&self) -> bool {
        self.activity_touched
    }
}

/// Applies the counting policy to `event` read from a handle classified as
/// `class`.
///
/// # Examples
///
/// ```rust
/// use activity_core::{apply, DeviceClass, RawEvent};
///
/// // Left mouse button down on a pointer counts as pointer activity.
/// let delta = apply(DeviceClass::Pointer, &RawEvent::key_press(0x110));
/// assert_eq!((delta.keyboard, delta.pointer, delta.activity_touched), (0, 1, true));
/// ```
pub fn apply(class: DeviceClass, event: &RawEvent) -> CountDelta {
    match (event.kind, class) {
        (EventKind::Key, DeviceClass::Keyboard) if event.is_press() => CountDelta::KEYBOARD,
        (EventKind::Key, DeviceClass::Pointer) if event.is_press() => CountDelta::POINTER,
        (EventKind::RelativeMove, DeviceClass::Pointer) => CountDelta::POINTER,
        (EventKind::AbsoluteMove, _) => CountDelta::POINTER,
        _ => CountDelta::NONE,
    }
}

/// Cumulative counters for the lifetime of the process.
///
/// Counters only ever grow (saturating at `u64::MAX`) and start at zero on
/// every launch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterState {
    pub keyboard_count: u64,
    pub pointer_count: u64,
}

impl CounterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `delta` to the counters.
    pub fn accumulate(&mut self, delta: CountDelta) {
        self.keyboard_count = self.keyboard_count.saturating_add(delta.keyboard);
        self.pointer_count = self.pointer_count.saturating_add(delta.pointer);
    }
}

/// The "time of last qualifying input" signal.
///
/// This is a point in time, not a decaying idle timer: `idle_millis` is always
/// zero when written and consumers compute idleness themselves from
/// `last_activity_epoch_millis`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivitySignal {
    pub last_activity_epoch_millis: u64,
    pub idle_millis: u64,
}

impl ActivitySignal {
    /// A fresh touch at `now_millis`.
    pub fn touched_at(now_millis: u64) -> Self {
        Self {
            last_activity_epoch_millis: now_millis,
            idle_millis: 0,
        }
    }
}
