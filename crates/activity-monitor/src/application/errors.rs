//! Error taxonomy for the monitor.
//!
//! Two separate channels:
//!
//! - [`FatalError`] – the process cannot do anything useful (no devices found,
//!   none could be opened).  Propagated to `main`, which maps it to an exit
//!   code.
//! - [`RecoverableError`] – one device or one file misbehaved.  Never
//!   propagated; handed to [`report`], which logs it, and the loop carries on.
//!
//! Would-block and short reads are neither: they are the normal end of a
//! drain.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

/// Exit status for a clean, signal-driven shutdown.
pub const EXIT_OK: u8 = 0;
/// Exit status for startup failures that are not device related (bad config).
pub const EXIT_STARTUP_FAILED: u8 = 1;
/// Exit status when no tier of the locator found any device.
pub const EXIT_NO_DEVICES_FOUND: u8 = 2;
/// Exit status when devices were found but none could be opened.
pub const EXIT_NO_DEVICES_OPENED: u8 = 3;

/// Conditions that terminate the process.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FatalError {
    #[error("no input devices found; make sure you are in the 'input' group")]
    NoDevicesFound,

    #[error("could not open any of the {attempted} input device(s) found")]
    NoDevicesOpened { attempted: usize },
}

impl FatalError {
    /// The process exit status for this condition.
    pub fn exit_code(&self) -> u8 {
        match self {
            FatalError::NoDevicesFound => EXIT_NO_DEVICES_FOUND,
            FatalError::NoDevicesOpened { .. } => EXIT_NO_DEVICES_OPENED,
        }
    }
}

/// Why a single device path could not be opened.
#[derive(Debug)]
pub enum OpenFailureReason {
    /// `EACCES`/`EPERM`.  Actionable: the user needs the `input` group.
    PermissionDenied,
    /// Missing node, busy device, etc.
    Io(io::Error),
}

/// A device path the registry skipped.
#[derive(Debug)]
pub struct OpenFailure {
    pub path: PathBuf,
    pub reason: OpenFailureReason,
}

impl OpenFailure {
    /// Classifies an `open(2)` error for `path`.
    pub fn from_io(path: PathBuf, err: io::Error) -> Self {
        let reason = if err.kind() == io::ErrorKind::PermissionDenied {
            OpenFailureReason::PermissionDenied
        } else {
            OpenFailureReason::Io(err)
        };
        Self { path, reason }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self.reason, OpenFailureReason::PermissionDenied)
    }
}

/// A failed write of one state file.
#[derive(Debug, Error)]
#[error("failed to write {path}: {source}")]
pub struct WriteFailure {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// One or more state files could not be written during a publish or touch.
/// The remaining files of the same call were still attempted.
#[derive(Debug, Error)]
#[error("{} state file write(s) failed", .failures.len())]
pub struct PublishError {
    pub failures: Vec<WriteFailure>,
}

/// Per-device and per-file failures that the monitor logs and survives.
#[derive(Debug, Error)]
pub enum RecoverableError {
    #[error("permission denied for {}; add yourself to the 'input' group", .0.path.display())]
    OpenDenied(OpenFailure),

    #[error("error opening {}: {source}", .path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error reading from {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error writing state: {0}")]
    PublishFailed(#[from] PublishError),

    #[error("readiness wait failed: {0}")]
    PollFailed(#[source] io::Error),
}

impl From<OpenFailure> for RecoverableError {
    fn from(failure: OpenFailure) -> Self {
        match failure.reason {
            OpenFailureReason::PermissionDenied => RecoverableError::OpenDenied(failure),
            OpenFailureReason::Io(source) => RecoverableError::OpenFailed {
                path: failure.path,
                source,
            },
        }
    }
}

/// Borrowing conversion, for callers that keep the failure after logging it.
impl From<&OpenFailure> for RecoverableError {
    fn from(failure: &OpenFailure) -> Self {
        let path = failure.path.clone();
        match &failure.reason {
            OpenFailureReason::PermissionDenied => RecoverableError::OpenDenied(OpenFailure {
                path,
                reason: OpenFailureReason::PermissionDenied,
            }),
            OpenFailureReason::Io(e) => RecoverableError::OpenFailed {
                path,
                source: copy_io_error(e),
            },
        }
    }
}

fn copy_io_error(e: &io::Error) -> io::Error {
    match e.raw_os_error() {
        Some(code) => io::Error::from_raw_os_error(code),
        None => io::Error::new(e.kind(), e.to_string()),
    }
}

/// Logs a recoverable error.  This is the only sink for that channel.
pub fn report(err: &RecoverableError) {
    match err {
        RecoverableError::PublishFailed(publish) => {
            for failure in &publish.failures {
                warn!(path = %failure.path.display(), "state write failed: {}", failure.source);
            }
        }
        other => warn!("{other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_exit_codes_are_distinct_and_nonzero() {
        let found = FatalError::NoDevicesFound.exit_code();
        let opened = FatalError::NoDevicesOpened { attempted: 2 }.exit_code();
        assert_ne!(found, EXIT_OK);
        assert_ne!(opened, EXIT_OK);
        assert_ne!(found, opened);
        assert_ne!(found, EXIT_STARTUP_FAILED);
        assert_ne!(opened, EXIT_STARTUP_FAILED);
    }

    #[test]
    fn test_open_failure_classifies_permission_denied() {
        let failure = OpenFailure::from_io(
            PathBuf::from("/dev/input/event3"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(failure.is_permission_denied());

        let err = RecoverableError::from(failure);
        assert!(matches!(err, RecoverableError::OpenDenied(_)));
        assert!(err.to_string().contains("'input' group"));
    }

    #[test]
    fn test_open_failure_keeps_other_io_errors() {
        let failure = OpenFailure::from_io(
            PathBuf::from("/dev/input/event9"),
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(!failure.is_permission_denied());

        let err = RecoverableError::from(failure);
        match err {
            RecoverableError::OpenFailed { path, source } => {
                assert_eq!(path, PathBuf::from("/dev/input/event9"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_borrowed_open_failure_keeps_os_error() {
        let failure = OpenFailure::from_io(
            PathBuf::from("/dev/input/event5"),
            io::Error::from_raw_os_error(libc::ENODEV),
        );

        let err = RecoverableError::from(&failure);

        match err {
            RecoverableError::OpenFailed { source, .. } => {
                assert_eq!(source.raw_os_error(), Some(libc::ENODEV));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
        // The failure itself is still usable.
        assert_eq!(failure.path, PathBuf::from("/dev/input/event5"));
    }

    #[test]
    fn test_publish_error_message_counts_failures() {
        let err = PublishError {
            failures: vec![
                WriteFailure {
                    path: PathBuf::from("/tmp/a"),
                    source: io::Error::from(io::ErrorKind::PermissionDenied),
                },
                WriteFailure {
                    path: PathBuf::from("/tmp/b"),
                    source: io::Error::from(io::ErrorKind::NotFound),
                },
            ],
        };
        assert_eq!(err.to_string(), "2 state file write(s) failed");
    }
}
