//! Heuristic device classification by name.
//!
//! Linux does not tell an unprivileged process "this node is the keyboard".
//! What it does expose are *names*: the stable symlinks in
//! `/dev/input/by-path` (e.g. `platform-i8042-serio-0-event-kbd`) and the
//! device names in `/proc/bus/input/devices` (e.g. `AT Translated Set 2
//! keyboard`).  Matching those names against a few substrings is imperfect
//! but cheap and needs no extra privileges.
//!
//! Matching is case-insensitive substring search.  The hint lists are plain
//! data so hosts with unusual naming can extend them from the config file.

/// Classification attached to every open device handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    Keyboard,
    /// Mouse, touchpad, trackpad, or any other pointing device.
    Pointer,
}

impl std::fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceClass::Keyboard => f.write_str("keyboard"),
            DeviceClass::Pointer => f.write_str("pointer"),
        }
    }
}

/// Substrings that mark a device name as a keyboard or a pointer.
///
/// Hints are stored lower-cased; names are lower-cased before matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameHints {
    keyboard: Vec<String>,
    pointer: Vec<String>,
}

impl NameHints {
    /// Builds a hint set.  Hints are lower-cased here so matching only has to
    /// fold the name.
    pub fn new<K, P>(keyboard: K, pointer: P) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        Self {
            keyboard: keyboard
                .into_iter()
                .map(|h| h.as_ref().to_lowercase())
                .collect(),
            pointer: pointer
                .into_iter()
                .map(|h| h.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Hints for `/dev/input/by-path` symlink names.
    pub fn symlink_defaults() -> Self {
        Self::new(["kbd", "keyboard"], ["mouse", "pointer"])
    }

    /// Hints for device names in the capability listing.
    pub fn capability_defaults() -> Self {
        Self::new(["keyboard", "kbd"], ["mouse", "touchpad", "trackpad"])
    }

    /// Returns `true` if `name` contains any keyboard hint.
    pub fn is_keyboard(&self, name: &str) -> bool {
        contains_any(&name.to_lowercase(), &self.keyboard)
    }

    /// Returns `true` if `name` contains any pointer hint.
    pub fn is_pointer(&self, name: &str) -> bool {
        contains_any(&name.to_lowercase(), &self.pointer)
    }
}

/// Classifies a device name.  When a name matches both hint lists the
/// keyboard wins: combo receivers usually expose their keyboard interface
/// under a name that also mentions the mouse.
///
/// Deterministic and stateless: the same name and hints always give the same
/// answer.
///
/// # Examples
///
/// ```rust
/// use activity_core::{classify, DeviceClass, NameHints};
///
/// let hints = NameHints::symlink_defaults();
/// assert_eq!(
///     classify("platform-i8042-serio-0-event-kbd", &hints),
///     Some(DeviceClass::Keyboard)
/// );
/// assert_eq!(classify("pci-0000:00:14.0-usb-0:2:1.0-event", &hints), None);
/// ```
pub fn classify(name: &str, hints: &NameHints) -> Option<DeviceClass> {
    let folded = name.to_lowercase();
    if contains_any(&folded, &hints.keyboard) {
        Some(DeviceClass::Keyboard)
    } else if contains_any(&folded, &hints.pointer) {
        Some(DeviceClass::Pointer)
    } else {
        None
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|n| !n.is_empty() && haystack.contains(n.as_str()))
}
