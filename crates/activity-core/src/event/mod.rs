//! Input event types and the binary record codec.
//!
//! Event type numbers come from `linux/input-event-codes.h`.

pub mod codec;

/// Size of one `struct input_event` record on a 64-bit host.
///
/// ```text
/// [tv_sec:8][tv_usec:8][type:2][code:2][value:4]
/// ```
pub const EVENT_SIZE: usize = 24;

/// `EV_KEY`: key or button state change.
pub const EV_KEY: u16 = 0x01;
/// `EV_REL`: relative axis change (mouse motion, wheel).
pub const EV_REL: u16 = 0x02;
/// `EV_ABS`: absolute axis change (touchpad, touchscreen, tablet).
pub const EV_ABS: u16 = 0x03;

/// `value` of an `EV_KEY` event when the key goes down.
pub const KEY_PRESS: i32 = 1;
/// `value` of an `EV_KEY` event when the key goes up.
pub const KEY_RELEASE: i32 = 0;
/// `value` of an `EV_KEY` event generated by keyboard autorepeat.
pub const KEY_REPEAT: i32 = 2;

/// The kind of a decoded event, derived from the record's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Key or button (`EV_KEY`).
    Key,
    /// Relative motion (`EV_REL`).
    RelativeMove,
    /// Absolute motion (`EV_ABS`).
    AbsoluteMove,
    /// Any other event type (`EV_SYN`, `EV_MSC`, `EV_LED`, …).  The raw type
    /// number is kept so the record can be re-encoded.
    Other(u16),
}

impl EventKind {
    /// Maps a raw `type` field to an [`EventKind`].  Total over all `u16`.
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            EV_KEY => EventKind::Key,
            EV_REL => EventKind::RelativeMove,
            EV_ABS => EventKind::AbsoluteMove,
            other => EventKind::Other(other),
        }
    }

    /// Returns the raw `type` field for this kind.
    pub fn to_raw(self) -> u16 {
        match self {
            EventKind::Key => EV_KEY,
            EventKind::RelativeMove => EV_REL,
            EventKind::AbsoluteMove => EV_ABS,
            EventKind::Other(raw) => raw,
        }
    }
}

/// A decoded input event.
///
/// The kernel timestamp is not part of this type; activity timing uses the
/// wall clock at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: EventKind,
    /// Key code, axis code, etc.  Meaning depends on `kind`.
    pub code: u16,
    pub value: i32,
}

impl RawEvent {
    /// A key/button press of `code`.
    pub fn key_press(code: u16) -> Self {
        Self {
            kind: EventKind::Key,
            code,
            value: KEY_PRESS,
        }
    }

    /// Returns `true` for an `EV_KEY` event whose value is exactly a press.
    pub fn is_press(&self) -> bool {
        self.kind == EventKind::Key && self.value == KEY_PRESS
    }
}
