//! Parser for the kernel's textual input-device listing
//! (`/proc/bus/input/devices`).
//!
//! The listing is a sequence of records separated by blank lines:
//!
//! ```text
//! I: Bus=0011 Vendor=0001 Product=0001 Version=ab41
//! N: Name="AT Translated Set 2 keyboard"
//! P: Phys=isa0060/serio0/input0
//! H: Handlers=sysrq kbd event3 leds
//! B: EV=120013
//!
//! I: Bus=0011 Vendor=0002 Product=0007 Version=01b1
//! N: Name="SynPS/2 Synaptics TouchPad"
//! H: Handlers=mouse0 event4
//! ```
//!
//! Only the `N:` and `H:` lines matter here.  Anything the parser does not
//! recognise is skipped rather than rejected, so a truncated or garbled listing
//! degrades to fewer records instead of an error.

use tracing::trace;

const NAME_PREFIX: &str = "N: Name=";
const HANDLERS_PREFIX: &str = "H: Handlers=";
const EVENT_HANDLER_PREFIX: &str = "event";

/// One device record from the capability listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityRecord {
    /// Device name with the surrounding quotes removed.  Empty when the record
    /// had no `N:` line.
    pub name: String,
    /// Every handler token from the `H:` line (`kbd`, `mouse0`, `event3`, …).
    pub handlers: Vec<String>,
}

impl CapabilityRecord {
    /// Handler tokens that name an evdev node (`event<N>`).
    pub fn event_handlers(&self) -> impl Iterator<Item = &str> {
        self.handlers
            .iter()
            .map(String::as_str)
            .filter(|h| h.starts_with(EVENT_HANDLER_PREFIX))
    }

    fn is_empty(&self) -> bool {
        self.name.is_empty() && self.handlers.is_empty()
    }
}

/// Splits a capability listing into records.
///
/// Records without either a name or handlers are dropped.
///
/// # Examples
///
/// ```rust
/// use activity_core::domain::parse_capability_listing;
///
/// let listing = "N: Name=\"AT Translated Set 2 keyboard\"\nH: Handlers=kbd event3\n";
/// let records = parse_capability_listing(listing);
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].event_handlers().collect::<Vec<_>>(), vec!["event3"]);
/// ```
pub fn parse_capability_listing(listing: &str) -> Vec<CapabilityRecord> {
    let mut records = Vec::new();
    let mut current = CapabilityRecord::default();

    for line in listing.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            flush(&mut records, &mut current);
        } else if let Some(raw) = line.strip_prefix(NAME_PREFIX) {
            current.name = unquote(raw).to_string();
        } else if let Some(raw) = line.strip_prefix(HANDLERS_PREFIX) {
            current.handlers = raw.split_whitespace().map(str::to_string).collect();
        }
    }
    flush(&mut records, &mut current);

    trace!(count = records.len(), "parsed capability listing");
    records
}

fn flush(records: &mut Vec<CapabilityRecord>, current: &mut CapabilityRecord) {
    let record = std::mem::take(current);
    if !record.is_empty() {
        records.push(record);
    }
}

fn unquote(raw: &str) -> &str {
    let raw = raw.trim();
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw)
}
