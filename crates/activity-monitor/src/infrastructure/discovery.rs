//! Device discovery: finds the keyboard and pointer event nodes on this host.
//!
//! # How discovery works (for beginners)
//!
//! Every input device the kernel knows about gets a node named
//! `/dev/input/event<N>`.  The number says nothing about what the device is,
//! and it can change across reboots.  The locator therefore tries three
//! sources, cheapest and most reliable first:
//!
//! 1. **Stable symlinks** in `/dev/input/by-path`.  udev names these after the
//!    bus and device type, e.g. `platform-i8042-serio-0-event-kbd`.
//! 2. **The capability listing** `/proc/bus/input/devices`, which pairs each
//!    device's human-readable name with its `event<N>` handler.  Consulted only
//!    when step 1 left either category empty.
//! 3. **Blind probing** of `event<N>` nodes in a configured order, for hosts
//!    where neither source is usable (containers, minimal images).
//!
//! None of this needs elevated privileges; opening the nodes afterwards does.
//! Discovery never fails: the worst outcome is two empty lists.

use std::fs;
use std::path::{Path, PathBuf};

use activity_core::domain::parse_capability_listing;
use activity_core::{classify, DeviceClass, NameHints};
use tracing::{debug, info};

use crate::infrastructure::storage::config::DiscoveryConfig;

/// Result of a discovery pass.  Both lists are ordered and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatedDevices {
    pub keyboards: Vec<PathBuf>,
    pub pointers: Vec<PathBuf>,
}

impl LocatedDevices {
    /// `true` when neither category holds a path.
    pub fn is_empty(&self) -> bool {
        self.keyboards.is_empty() && self.pointers.is_empty()
    }

    /// Total number of paths across both categories.
    pub fn len(&self) -> usize {
        self.keyboards.len() + self.pointers.len()
    }

    /// Every path paired with its class, keyboards first.
    pub fn iter(&self) -> impl Iterator<Item = (DeviceClass, &Path)> {
        self.keyboards
            .iter()
            .map(|p| (DeviceClass::Keyboard, p.as_path()))
            .chain(self.pointers.iter().map(|p| (DeviceClass::Pointer, p.as_path())))
    }

    fn list_mut(&mut self, class: DeviceClass) -> &mut Vec<PathBuf> {
        match class {
            DeviceClass::Keyboard => &mut self.keyboards,
            DeviceClass::Pointer => &mut self.pointers,
        }
    }

    fn push_unique(&mut self, class: DeviceClass, path: PathBuf) -> bool {
        let list = self.list_mut(class);
        if list.contains(&path) {
            false
        } else {
            list.push(path);
            true
        }
    }
}

/// Layered device discovery over configurable host locations.
#[derive(Debug, Clone)]
pub struct DeviceLocator {
    by_path_dir: PathBuf,
    capabilities_file: PathBuf,
    device_dir: PathBuf,
    keyboard_probe_order: Vec<u32>,
    pointer_probe_limit: u32,
    symlink_hints: NameHints,
    capability_hints: NameHints,
}

impl DeviceLocator {
    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self {
            by_path_dir: config.by_path_dir.clone(),
            capabilities_file: config.capabilities_file.clone(),
            device_dir: config.device_dir.clone(),
            keyboard_probe_order: config.keyboard_probe_order.clone(),
            pointer_probe_limit: config.pointer_probe_limit,
            symlink_hints: config.symlink_hints(),
            capability_hints: config.capability_hints(),
        }
    }

    /// Runs all three tiers and returns what they found.
    pub fn locate(&self) -> LocatedDevices {
        let mut found = LocatedDevices::default();

        self.scan_symlinks(&mut found);

        if found.keyboards.is_empty() || found.pointers.is_empty() {
            self.scan_capabilities(&mut found);
        }

        self.probe_nodes(&mut found);

        info!(
            keyboards = found.keyboards.len(),
            pointers = found.pointers.len(),
            "device discovery finished"
        );
        found
    }

    // ── Tier 1: by-path symlinks ──────────────────────────────────────────────

    fn scan_symlinks(&self, found: &mut LocatedDevices) {
        let entries = match fs::read_dir(&self.by_path_dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %self.by_path_dir.display(), "symlink directory unavailable: {e}");
                return;
            }
        };

        let mut links: Vec<(String, PathBuf)> = entries
            .filter_map(Result::ok)
            .map(|entry| (entry.file_name().to_string_lossy().into_owned(), entry.path()))
            .collect();
        links.sort();

        for (name, link) in links {
            let Some(class) = classify(&name, &self.symlink_hints) else {
                continue;
            };
            match fs::canonicalize(&link) {
                Ok(node) => {
                    if found.push_unique(class, node.clone()) {
                        debug!(link = %name, node = %node.display(), %class, "found device via symlink");
                    }
                }
                Err(e) => debug!(link = %link.display(), "cannot resolve symlink: {e}"),
            }
        }
    }

    // ── Tier 2: capability listing ────────────────────────────────────────────

    fn scan_capabilities(&self, found: &mut LocatedDevices) {
        let listing = match fs::read_to_string(&self.capabilities_file) {
            Ok(listing) => listing,
            Err(e) => {
                debug!(file = %self.capabilities_file.display(), "capability listing unreadable: {e}");
                return;
            }
        };

        for record in parse_capability_listing(&listing) {
            let is_keyboard = self.capability_hints.is_keyboard(&record.name);
            let is_pointer = self.capability_hints.is_pointer(&record.name);
            if !is_keyboard && !is_pointer {
                continue;
            }

            for handler in record.event_handlers() {
                let node = self.device_dir.join(handler);
                if is_keyboard && found.push_unique(DeviceClass::Keyboard, node.clone()) {
                    debug!(name = %record.name, node = %node.display(), "found keyboard via capability listing");
                }
                if is_pointer && found.push_unique(DeviceClass::Pointer, node.clone()) {
                    debug!(name = %record.name, node = %node.display(), "found pointer via capability listing");
                }
            }
        }
    }

    // ── Tier 3: numbered node probing ─────────────────────────────────────────

    fn probe_nodes(&self, found: &mut LocatedDevices) {
        if found.keyboards.is_empty() {
            if let Some(node) = self
                .keyboard_probe_order
                .iter()
                .map(|n| self.event_node(*n))
                .find(|node| node.exists())
            {
                debug!(node = %node.display(), "guessing keyboard by probing");
                found.keyboards.push(node);
            }
        }

        if found.pointers.is_empty() {
            if let Some(node) = (0..self.pointer_probe_limit)
                .map(|n| self.event_node(n))
                .find(|node| node.exists() && !found.keyboards.contains(node))
            {
                debug!(node = %node.display(), "guessing pointer by probing");
                found.pointers.push(node);
            }
        }
    }

    fn event_node(&self, n: u32) -> PathBuf {
        self.device_dir.join(format!("event{n}"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
