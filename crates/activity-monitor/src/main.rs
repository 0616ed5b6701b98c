//! Input Activity Monitor: entry point.
//!
//! Counts keyboard presses and pointer activity from the Linux event nodes
//! and publishes the totals, plus a last-activity timestamp, as small text
//! files that time-tracking tools poll.
//!
//! # Usage
//!
//! ```text
//! input-activity-monitor                        # defaults, /tmp state files
//! input-activity-monitor --state-dir /run/user/1000
//! input-activity-monitor --list-devices         # show what would be opened
//! RUST_LOG=debug input-activity-monitor         # verbose diagnostics
//! ```
//!
//! # Threads
//!
//! ```text
//! main (current-thread Tokio runtime)
//!  ├─ signal task        -- SIGINT/SIGTERM clears `running`
//!  └─ spawn_blocking     -- run_monitor(): poll/drain/publish loop
//! ```
//!
//! # Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | shut down by a signal |
//! | 1 | startup failure (bad config, runtime error) |
//! | 2 | no input devices discovered |
//! | 3 | devices discovered but none could be opened |

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use activity_monitor::application::errors::{FatalError, EXIT_OK, EXIT_STARTUP_FAILED};
use activity_monitor::infrastructure::runtime::{locate_devices, run_monitor};
use activity_monitor::infrastructure::storage::config::{
    load_config, load_config_from, AppConfig, StateConfig,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Keyboard and pointer activity monitor for Linux input devices.
///
/// Every flag can also be given through the environment variable shown in
/// `--help`; the command line wins over the environment, which wins over the
/// config file.
#[derive(Debug, Parser)]
#[command(
    name = "input-activity-monitor",
    about = "Counts keyboard and pointer activity and publishes it to state files",
    version
)]
struct Cli {
    /// Config file to read instead of the per-user default.
    ///
    /// The default location is `$XDG_CONFIG_HOME/input-activity/config.toml`
    /// (or `~/.config/input-activity/config.toml`); it may be absent.  An
    /// explicitly named file must exist.
    #[arg(long, env = "INPUT_ACTIVITY_CONFIG")]
    config: Option<PathBuf>,

    /// Minimum milliseconds between counter publishes.
    #[arg(long, env = "INPUT_ACTIVITY_PUBLISH_MS")]
    publish_interval_ms: Option<u64>,

    /// Upper bound in milliseconds on one readiness wait.
    #[arg(long, env = "INPUT_ACTIVITY_POLL_MS")]
    poll_timeout_ms: Option<u64>,

    /// Directory for the four state files (default names are kept).
    #[arg(long, env = "INPUT_ACTIVITY_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Print the discovered devices and exit without monitoring.
    #[arg(long)]
    list_devices: bool,
}

impl Cli {
    /// Loads the config file and applies the command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    fn resolve_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_from(path, false)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => load_config().context("loading default config")?,
        };

        if let Some(ms) = self.publish_interval_ms {
            config.monitor.publish_interval_ms = ms;
        }
        if let Some(ms) = self.poll_timeout_ms {
            config.monitor.poll_timeout_ms = ms;
        }
        if let Some(dir) = &self.state_dir {
            config.state = StateConfig::in_dir(dir);
        }
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// A current-thread runtime is enough: the only async work is waiting for
/// signals.  The monitor loop itself blocks in `poll(2)` and therefore runs on
/// Tokio's blocking pool.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::from(EXIT_OK),
        Err(e) => {
            // Config errors happen before logging is configured.
            init_logging("info");
            error!("{e:#}");
            let code = e
                .downcast_ref::<FatalError>()
                .map_or(EXIT_STARTUP_FAILED, FatalError::exit_code);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.resolve_config()?;
    init_logging(&config.monitor.log_level);

    if cli.list_devices {
        return list_devices(&config);
    }

    info!(
        publish_interval_ms = config.monitor.publish_interval_ms,
        poll_timeout_ms = config.monitor.poll_timeout_ms,
        "input activity monitor starting"
    );

    // ── Graceful shutdown flag ─────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    tokio::spawn(watch_shutdown_signals(Arc::clone(&running)));

    // ── Monitor loop ───────────────────────────────────────────────────────────
    tokio::task::spawn_blocking(move || run_monitor(&config, running))
        .await
        .context("monitor thread panicked")??;

    info!("input activity monitor stopped");
    Ok(())
}

/// Installs the stderr subscriber.  `RUST_LOG` overrides `level`.  A second
/// call is a no-op.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

/// Prints `<class>\t<path>` for every discovered device.
fn list_devices(config: &AppConfig) -> anyhow::Result<()> {
    let located = locate_devices(config)?;
    for (class, path) in located.iter() {
        println!("{class}\t{}", path.display());
    }
    Ok(())
}

/// Clears `running` on SIGINT or SIGTERM.  If the handlers cannot be
/// installed the flag is left alone and the process runs until killed.
async fn watch_shutdown_signals(running: Arc<AtomicBool>) {
    match wait_for_signal().await {
        Ok(name) => {
            info!("received {name}; shutting down");
            running.store(false, Ordering::Relaxed);
        }
        Err(e) => warn!("failed to install signal handlers: {e}"),
    }
}

async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|()| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
