//! Startup wiring: discovery, opening, and the blocking monitor loop.
//!
//! ```text
//! run_monitor()
//!  ├─ locate_devices()          -- NoDevicesFound if both lists are empty
//!  ├─ DeviceRegistry::open_all  -- NoDevicesOpened if nothing opens
//!  └─ ActivityMonitor::run      -- until `running` is cleared
//! ```
//!
//! Everything here blocks.  The binary calls it from Tokio's blocking pool.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::{info, warn};

use crate::application::errors::FatalError;
use crate::application::monitor::ActivityMonitor;
use crate::infrastructure::device_registry::DeviceRegistry;
use crate::infrastructure::discovery::{DeviceLocator, LocatedDevices};
use crate::infrastructure::state_files::StateFiles;
use crate::infrastructure::storage::config::AppConfig;

/// Runs discovery with the configured locations.
///
/// # Errors
///
/// Returns [`FatalError::NoDevicesFound`] when no tier found anything.
pub fn locate_devices(config: &AppConfig) -> Result<LocatedDevices, FatalError> {
    let located = DeviceLocator::from_config(&config.discovery).locate();
    if located.is_empty() {
        return Err(FatalError::NoDevicesFound);
    }
    for (class, path) in located.iter() {
        info!(path = %path.display(), %class, "found input device");
    }
    Ok(located)
}

/// Discovers and opens the devices, then runs the monitor until `running`
/// is cleared.  State files are not touched unless at least one device
/// opened.
///
/// # Errors
///
/// Returns the [`FatalError`] that stopped startup.  Once the loop is
/// running nothing is fatal.
pub fn run_monitor(config: &AppConfig, running: Arc<AtomicBool>) -> Result<(), FatalError> {
    let located = locate_devices(config)?;

    let (registry, failures) = DeviceRegistry::open_all(&located.keyboards, &located.pointers)?;
    if failures.iter().any(|f| f.is_permission_denied()) {
        warn!(
            denied = failures.iter().filter(|f| f.is_permission_denied()).count(),
            "some devices were not readable; add yourself to the 'input' group and log in again"
        );
    }
    info!(opened = registry.len(), skipped = failures.len(), "devices ready");

    let sink = StateFiles::new(config.state.clone());
    let mut monitor = ActivityMonitor::new(registry, sink, config.monitor.settings());
    monitor.run(&running);
    Ok(())
}
