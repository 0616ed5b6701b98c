//! Binary codec for `struct input_event` records.
//!
//! Record format (64-bit Linux):
//! ```text
//! [tv_sec:8][tv_usec:8][type:2][code:2][value:4]
//! ```
//! Total size: 24 bytes.  All integers are in host-native byte order because
//! the kernel writes the struct straight out of memory.  The two timestamp
//! fields are skipped on decode.

use std::time::Duration;

use thiserror::Error;

use crate::event::{EventKind, RawEvent, EVENT_SIZE};

/// Errors that can occur when decoding a record from an arbitrary slice.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The slice is not exactly one record long.
    #[error("short record: need {needed} bytes, got {available}")]
    ShortRecord { needed: usize, available: usize },
}

const TYPE_OFFSET: usize = 16;
const CODE_OFFSET: usize = 18;
const VALUE_OFFSET: usize = 20;

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes one complete record.
///
/// Pure and total: every 24-byte buffer decodes to some [`RawEvent`].
///
/// # Examples
///
/// ```rust
/// use activity_core::{decode, encode, EventKind, RawEvent};
/// use std::time::Duration;
///
/// let bytes = encode(&RawEvent::key_press(30), Duration::ZERO);
/// let event = decode(&bytes);
/// assert_eq!(event.kind, EventKind::Key);
/// assert_eq!(event.code, 30);
/// assert_eq!(event.value, 1);
/// ```
pub fn decode(bytes: &[u8; EVENT_SIZE]) -> RawEvent {
    let kind = u16::from_ne_bytes([bytes[TYPE_OFFSET], bytes[TYPE_OFFSET + 1]]);
    let code = u16::from_ne_bytes([bytes[CODE_OFFSET], bytes[CODE_OFFSET + 1]]);
    let value = i32::from_ne_bytes([
        bytes[VALUE_OFFSET],
        bytes[VALUE_OFFSET + 1],
        bytes[VALUE_OFFSET + 2],
        bytes[VALUE_OFFSET + 3],
    ]);
    RawEvent {
        kind: EventKind::from_raw(kind),
        code,
        value,
    }
}

/// Decodes a record from a slice, rejecting anything that is not exactly
/// [`EVENT_SIZE`] bytes long.
///
/// # Errors
///
/// Returns [`DecodeError::ShortRecord`] when `bytes.len() != EVENT_SIZE`.
pub fn decode_slice(bytes: &[u8]) -> Result<RawEvent, DecodeError> {
    let record: &[u8; EVENT_SIZE] = bytes.try_into().map_err(|_| DecodeError::ShortRecord {
        needed: EVENT_SIZE,
        available: bytes.len(),
    })?;
    Ok(decode(record))
}

/// Encodes `event` into a record stamped with `timestamp` (time since the
/// epoch, split into seconds and microseconds like a `timeval`).
pub fn encode(event: &RawEvent, timestamp: Duration) -> [u8; EVENT_SIZE] {
    let mut buf = [0u8; EVENT_SIZE];
    buf[0..8].copy_from_slice(&(timestamp.as_secs() as i64).to_ne_bytes());
    buf[8..16].copy_from_slice(&i64::from(timestamp.subsec_micros()).to_ne_bytes());
    buf[TYPE_OFFSET..CODE_OFFSET].copy_from_slice(&event.kind.to_raw().to_ne_bytes());
    buf[CODE_OFFSET..VALUE_OFFSET].copy_from_slice(&event.code.to_ne_bytes());
    buf[VALUE_OFFSET..EVENT_SIZE].copy_from_slice(&event.value.to_ne_bytes());
    buf
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: u16, code: u16, value: i32) -> [u8; EVENT_SIZE] {
        let mut buf = [0u8; EVENT_SIZE];
        buf[16..18].copy_from_slice(&kind.to_ne_bytes());
        buf[18..20].copy_from_slice(&code.to_ne_bytes());
        buf[20..24].copy_from_slice(&value.to_ne_bytes());
        buf
    }

    #[test]
    fn test_decode_key_press() {
        // Arrange: KEY_A (30) down
        let bytes = record(0x01, 30, 1);

        // Act
        let event = decode(&bytes);

        // Assert
        assert_eq!(
            event,
            RawEvent {
                kind: EventKind::Key,
                code: 30,
                value: 1
            }
        );
    }

    #[test]
    fn test_decode_negative_relative_motion() {
        // REL_X moving left by 7 units
        let event = decode(&record(0x02, 0x00, -7));
        assert_eq!(event.kind, EventKind::RelativeMove);
        assert_eq!(event.code, 0);
        assert_eq!(event.value, -7);
    }

    #[test]
    fn test_decode_absolute_motion() {
        // ABS_MT_POSITION_X
        let event = decode(&record(0x03, 0x35, 1234));
        assert_eq!(event.kind, EventKind::AbsoluteMove);
        assert_eq!(event.code, 0x35);
        assert_eq!(event.value, 1234);
    }

    #[test]
    fn test_decode_sync_report_is_other() {
        let event = decode(&record(0x00, 0, 0));
        assert_eq!(event.kind, EventKind::Other(0));
    }

    #[test]
    fn test_decode_ignores_timestamp_fields() {
        // Arrange: identical payload, wildly different timestamps
        let mut a = record(0x01, 272, 1);
        let mut b = a;
        a[0..8].copy_from_slice(&0i64.to_ne_bytes());
        b[0..8].copy_from_slice(&i64::MAX.to_ne_bytes());
        b[8..16].copy_from_slice(&999_999i64.to_ne_bytes());

        // Act / Assert
        assert_eq!(decode(&a), decode(&b));
    }

    #[test]
    fn test_decode_value_extremes() {
        assert_eq!(decode(&record(0x03, 0, i32::MIN)).value, i32::MIN);
        assert_eq!(decode(&record(0x03, 0, i32::MAX)).value, i32::MAX);
    }

    #[test]
    fn test_decode_slice_rejects_short_input() {
        let result = decode_slice(&[0u8; 16]);
        assert_eq!(
            result,
            Err(DecodeError::ShortRecord {
                needed: 24,
                available: 16
            })
        );
    }

    #[test]
    fn test_decode_slice_rejects_empty_input() {
        assert!(matches!(
            decode_slice(&[]),
            Err(DecodeError::ShortRecord { available: 0, .. })
        ));
    }

    #[test]
    fn test_decode_slice_rejects_oversized_input() {
        assert!(matches!(
            decode_slice(&[0u8; 48]),
            Err(DecodeError::ShortRecord { available: 48, .. })
        ));
    }

    #[test]
    fn test_decode_slice_accepts_exact_record() {
        let bytes = record(0x01, 0x110, 1);
        assert_eq!(decode_slice(&bytes), Ok(decode(&bytes)));
    }

    #[test]
    fn test_encode_writes_timeval_fields() {
        // Arrange
        let ts = Duration::new(1_700_000_000, 250_000_000);

        // Act
        let bytes = encode(&RawEvent::key_press(1), ts);

        // Assert
        let sec = i64::from_ne_bytes(bytes[0..8].try_into().unwrap());
        let usec = i64::from_ne_bytes(bytes[8..16].try_into().unwrap());
        assert_eq!(sec, 1_700_000_000);
        assert_eq!(usec, 250_000);
    }

    #[test]
    fn test_encode_preserves_other_kind_number() {
        let event = RawEvent {
            kind: EventKind::Other(0x04),
            code: 4,
            value: 0x70004,
        };
        assert_eq!(decode(&encode(&event, Duration::ZERO)), event);
    }
}
