//! State-file publisher: the four plain-text files downstream tools read.
//!
//! Each file holds a single decimal number and nothing else (no newline).
//! Writes go to a sibling temp file first and are then renamed over the
//! target.  `rename(2)` within one directory is atomic, so a reader sees
//! either the old number or the new one, never a truncated mix.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use activity_core::{ActivitySignal, CounterState};
use tracing::trace;

use crate::application::errors::{PublishError, WriteFailure};
use crate::application::monitor::StateSink;
use crate::infrastructure::storage::config::StateConfig;

/// [`StateSink`] backed by the configured state files.
#[derive(Debug, Clone)]
pub struct StateFiles {
    paths: StateConfig,
}

impl StateFiles {
    pub fn new(paths: StateConfig) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &StateConfig {
        &self.paths
    }
}

impl StateSink for StateFiles {
    fn publish(
        &mut self,
        counters: &CounterState,
        activity: &ActivitySignal,
    ) -> Result<(), PublishError> {
        trace!(
            keyboard = counters.keyboard_count,
            pointer = counters.pointer_count,
            "publishing counters"
        );
        write_all(&[
            (&self.paths.keyboard_count_file, counters.keyboard_count),
            (&self.paths.pointer_count_file, counters.pointer_count),
            (&self.paths.idle_file, activity.idle_millis),
            (
                &self.paths.last_activity_file,
                activity.last_activity_epoch_millis,
            ),
        ])
    }

    fn touch_activity(&mut self, now_millis: u64) -> Result<(), PublishError> {
        write_all(&[
            (&self.paths.last_activity_file, now_millis),
            (&self.paths.idle_file, 0),
        ])
    }
}

/// Writes every value, collecting failures instead of stopping at the first.
fn write_all(values: &[(&PathBuf, u64)]) -> Result<(), PublishError> {
    let failures: Vec<WriteFailure> = values
        .iter()
        .filter_map(|(path, value)| {
            write_atomic(path, &value.to_string())
                .err()
                .map(|source| WriteFailure {
                    path: path.to_path_buf(),
                    source,
                })
        })
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(PublishError { failures })
    }
}

fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let tmp = temp_sibling(path);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path).map_err(|e| {
        fs::remove_file(&tmp).ok();
        e
    })
}

/// `<dir>/.<name>.<pid>.tmp`: same directory, so the rename never crosses a
/// filesystem boundary.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("activity_state_{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_publish_writes_four_decimal_files() {
        // Arrange
        let dir = temp_dir();
        let mut sink = StateFiles::new(StateConfig::in_dir(&dir));
        let counters = CounterState {
            keyboard_count: 42,
            pointer_count: 7,
        };
        let activity = ActivitySignal::touched_at(1_700_000_000_123);

        // Act
        sink.publish(&counters, &activity).expect("publish");

        // Assert
        let paths = sink.paths();
        assert_eq!(read(&paths.keyboard_count_file), "42");
        assert_eq!(read(&paths.pointer_count_file), "7");
        assert_eq!(read(&paths.idle_file), "0");
        assert_eq!(read(&paths.last_activity_file), "1700000000123");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_publish_overwrites_previous_value() {
        let dir = temp_dir();
        let mut sink = StateFiles::new(StateConfig::in_dir(&dir));
        let activity = ActivitySignal::touched_at(1);

        sink.publish(
            &CounterState {
                keyboard_count: 1000,
                pointer_count: 0,
            },
            &activity,
        )
        .unwrap();
        sink.publish(
            &CounterState {
                keyboard_count: 9,
                pointer_count: 0,
            },
            &activity,
        )
        .unwrap();

        assert_eq!(read(&sink.paths().keyboard_count_file), "9");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_touch_activity_writes_timestamp_and_zero_idle() {
        let dir = temp_dir();
        let mut sink = StateFiles::new(StateConfig::in_dir(&dir));
        fs::write(&sink.paths().idle_file, "5000").unwrap();

        sink.touch_activity(1_700_000_000_999).expect("touch");

        assert_eq!(read(&sink.paths().last_activity_file), "1700000000999");
        assert_eq!(read(&sink.paths().idle_file), "0");
        assert!(!sink.paths().keyboard_count_file.exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = temp_dir();
        let mut sink = StateFiles::new(StateConfig::in_dir(&dir));

        sink.publish(&CounterState::new(), &ActivitySignal::touched_at(5))
            .unwrap();

        let names: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 4, "{names:?}");
        assert!(names.iter().all(|n| !n.ends_with(".tmp")));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_failed_write_does_not_stop_the_others() {
        // Arrange: the keyboard file lives in a directory that does not exist
        let dir = temp_dir();
        let mut paths = StateConfig::in_dir(&dir);
        paths.keyboard_count_file = dir.join("missing").join("kbd");
        let mut sink = StateFiles::new(paths);
        let counters = CounterState {
            keyboard_count: 3,
            pointer_count: 4,
        };

        // Act
        let err = sink
            .publish(&counters, &ActivitySignal::touched_at(10))
            .unwrap_err();

        // Assert
        assert_eq!(err.failures.len(), 1);
        assert_eq!(err.failures[0].path, dir.join("missing").join("kbd"));
        assert_eq!(read(&sink.paths().pointer_count_file), "4");
        assert_eq!(read(&sink.paths().last_activity_file), "10");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_temp_sibling_stays_in_same_directory() {
        let tmp = temp_sibling(Path::new("/tmp/upwork-keyboard-count"));
        assert_eq!(tmp.parent(), Some(Path::new("/tmp")));
        assert!(tmp
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(".upwork-keyboard-count."));
    }
}
