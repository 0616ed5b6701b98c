//! Device registry: the open event-node handles and `poll(2)` readiness.
//!
//! # Non-blocking reads (for beginners)
//!
//! Every node is opened with `O_NONBLOCK`.  A plain blocking `read` on an idle
//! keyboard would park the whole loop until the next keystroke, starving the
//! other devices and the publish timer.  With `O_NONBLOCK` the kernel returns
//! `EAGAIN` (surfaced by Rust as `ErrorKind::WouldBlock`) instead, which the
//! monitor treats as "this handle is drained for now".
//!
//! To avoid spinning on `EAGAIN`, the monitor first asks `poll(2)` which
//! handles have data, sleeping at most the poll timeout when none do.

use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, IntoRawFd};
use std::path::{Path, PathBuf};
use std::time::Duration;

use activity_core::DeviceClass;
use tracing::{debug, info};

use crate::application::errors::{report, FatalError, OpenFailure, RecoverableError};
use crate::application::monitor::{HandleId, InputDevices, ReadyHandle};

/// `poll(2)` conditions that make a handle worth reading.  Error and hang-up
/// are included so the read surfaces the failure instead of the handle going
/// silent.
const READY_EVENTS: libc::c_short = libc::POLLIN | libc::POLLERR | libc::POLLHUP | libc::POLLNVAL;

/// One open device node.
#[derive(Debug)]
pub struct DeviceHandle {
    file: File,
    path: PathBuf,
    class: DeviceClass,
}

impl DeviceHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn class(&self) -> DeviceClass {
        self.class
    }
}

/// Exclusive owner of every open device handle.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    handles: Vec<DeviceHandle>,
}

impl DeviceRegistry {
    /// Opens every keyboard path, then every pointer path.
    ///
    /// Per-path failures are logged and returned alongside the registry; a
    /// path listed in both categories gets one handle per listing.
    ///
    /// # Errors
    ///
    /// Returns [`FatalError::NoDevicesOpened`] when not a single path could
    /// be opened.
    pub fn open_all(
        keyboards: &[PathBuf],
        pointers: &[PathBuf],
    ) -> Result<(Self, Vec<OpenFailure>), FatalError> {
        let mut registry = Self::default();
        let mut failures = Vec::new();

        let wanted = keyboards
            .iter()
            .map(|p| (p, DeviceClass::Keyboard))
            .chain(pointers.iter().map(|p| (p, DeviceClass::Pointer)));

        for (path, class) in wanted {
            match open_nonblocking(path) {
                Ok(file) => {
                    info!(path = %path.display(), %class, "opened input device");
                    registry.handles.push(DeviceHandle {
                        file,
                        path: path.clone(),
                        class,
                    });
                }
                Err(e) => {
                    let failure = OpenFailure::from_io(path.clone(), e);
                    report(&RecoverableError::from(&failure));
                    failures.push(failure);
                }
            }
        }

        if registry.handles.is_empty() {
            return Err(FatalError::NoDevicesOpened {
                attempted: keyboards.len() + pointers.len(),
            });
        }
        Ok((registry, failures))
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn handles(&self) -> &[DeviceHandle] {
        &self.handles
    }
}

impl InputDevices for DeviceRegistry {
    fn poll_ready(&mut self, timeout: Duration) -> io::Result<Vec<ReadyHandle>> {
        let mut fds: Vec<libc::pollfd> = self
            .handles
            .iter()
            .map(|h| libc::pollfd {
                fd: h.file.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            })
            .collect();
        let timeout_ms = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

        // SAFETY: `fds` is a live, exclusively borrowed buffer of exactly
        // `fds.len()` pollfd structs for the duration of the call.
        let ret = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, timeout_ms) };
        if ret < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(Vec::new());
            }
            return Err(err);
        }

        Ok(fds
            .iter()
            .zip(&self.handles)
            .enumerate()
            .filter(|(_, (fd, _))| fd.revents & READY_EVENTS != 0)
            .map(|(id, (_, handle))| ReadyHandle {
                id,
                class: handle.class,
            })
            .collect())
    }

    fn read(&mut self, id: HandleId, buf: &mut [u8]) -> io::Result<usize> {
        let handle = self.handles.get_mut(id).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no device handle {id}"))
        })?;
        handle.file.read(buf)
    }

    fn path(&self, id: HandleId) -> Option<&Path> {
        self.handles.get(id).map(DeviceHandle::path)
    }

    fn close_all(&mut self) {
        for handle in self.handles.drain(..) {
            let fd = handle.file.into_raw_fd();
            // SAFETY: `into_raw_fd` transferred ownership of `fd` to us and
            // nothing else refers to it.
            if unsafe { libc::close(fd) } != 0 {
                debug!(
                    path = %handle.path.display(),
                    "close failed: {}",
                    io::Error::last_os_error()
                );
            }
        }
    }
}

fn open_nonblocking(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
