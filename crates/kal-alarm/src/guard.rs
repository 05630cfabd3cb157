//! Single-instance guard over lock and wake markers.
//!
//! The protocol is nothing but the presence of two empty files in the
//! marker directory:
//!
//! * the first instance creates the lock marker and polls for the wake
//!   marker; when one appears it deletes it and asks its window to come to
//!   the front;
//! * a later instance that finds the lock marker writes the wake marker and
//!   exits instead of opening a second window.
//!
//! Exclusion is approximate.  Two instances starting within the same moment
//! can both miss the other's lock marker, and a lock left behind by a
//! crashed process turns the next start into a secondary until the marker is
//! removed by hand.  Every filesystem failure degrades enforcement and never
//! prevents startup.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use kal_core::errors::Error;
use kal_core::settings::{Settings, DEFAULT_GUARD_POLL};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// File name of the lock marker.
pub const LOCK_MARKER: &str = "kalender.lock";

/// File name of the wake marker.
pub const WAKE_MARKER: &str = "kalender.wake";

/// Where the markers live and how often to look for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    /// Marker directory.
    pub dir: PathBuf,
    /// Lock marker file name, relative to `dir`.
    pub lock_name: String,
    /// Wake marker file name, relative to `dir`.
    pub wake_name: String,
    /// Polling period of the wake watcher.
    pub poll_interval: Duration,
}

impl GuardConfig {
    /// Markers with their standard names in `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// Marker directory and poll interval from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            dir: settings.marker_dir.clone(),
            poll_interval: settings.guard_poll,
            ..Self::default()
        }
    }

    /// Path of the lock marker.
    pub fn lock_path(&self) -> PathBuf {
        self.dir.join(&self.lock_name)
    }

    /// Path of the wake marker.
    pub fn wake_path(&self) -> PathBuf {
        self.dir.join(&self.wake_name)
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            dir: std::env::temp_dir(),
            lock_name: LOCK_MARKER.to_owned(),
            wake_name: WAKE_MARKER.to_owned(),
            poll_interval: DEFAULT_GUARD_POLL,
        }
    }
}

/// The window owned by the primary instance.
pub trait WindowHost: Send + Sync + 'static {
    /// Bring the window to the foreground, restoring it if minimized.
    fn restore(&self);
}

/// Outcome of [`SingleInstanceGuard::acquire`].
#[derive(Debug)]
pub enum Startup {
    /// This process is the primary instance and should open its window.
    Primary(SingleInstanceGuard),
    /// Another instance is running and has been asked to come forward; this
    /// process should exit.
    Secondary,
}

/// Held by the primary instance.  Dropping it stops the wake watcher and
/// removes the lock marker.
#[derive(Debug)]
pub struct SingleInstanceGuard {
    config: GuardConfig,
    owns_lock: bool,
    degraded: Option<Error>,
    cancel: CancellationToken,
    watcher: Option<JoinHandle<()>>,
}

impl SingleInstanceGuard {
    /// Decide whether this process is the primary instance.
    ///
    /// Must be called from within a tokio runtime; the primary's wake
    /// watcher runs as a spawned task.  A zero `poll_interval` is replaced
    /// by the default period.
    pub async fn acquire(mut config: GuardConfig, host: Arc<dyn WindowHost>) -> Startup {
        if config.poll_interval.is_zero() {
            warn!(default = ?DEFAULT_GUARD_POLL, "zero wake poll interval; using the default");
            config.poll_interval = DEFAULT_GUARD_POLL;
        }
        let lock = config.lock_path();
        let wake = config.wake_path();
        let mut degraded = None;

        let lock_exists = tokio::fs::try_exists(&lock).await.unwrap_or(false);
        if lock_exists {
            match tokio::fs::write(&wake, b"").await {
                Ok(()) => {
                    info!(marker = %wake.display(), "another instance is running; asked it to come forward");
                    return Startup::Secondary;
                }
                Err(e) => {
                    let err = Error::GuardDegraded(format!("cannot write {}: {e}", wake.display()));
                    warn!(error = %err, "continuing as primary");
                    degraded = Some(err);
                }
            }
        }

        let owns_lock = if lock_exists {
            false
        } else {
            match tokio::fs::write(&lock, b"").await {
                Ok(()) => true,
                Err(e) => {
                    let err = Error::GuardDegraded(format!("cannot create {}: {e}", lock.display()));
                    warn!(error = %err, "single-instance enforcement disabled");
                    degraded = Some(err);
                    false
                }
            }
        };

        let cancel = CancellationToken::new();
        let watcher = tokio::spawn(watch_wake(
            wake,
            config.poll_interval,
            host,
            cancel.clone(),
        ));
        info!(dir = %config.dir.display(), owns_lock, "primary instance");
        Startup::Primary(SingleInstanceGuard {
            config,
            owns_lock,
            degraded,
            cancel,
            watcher: Some(watcher),
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Return `true` if this process created the lock marker.
    pub fn owns_lock(&self) -> bool {
        self.owns_lock
    }

    /// Return `true` if a marker could not be written.
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    /// The failure that degraded the guard, if any.
    pub fn degradation(&self) -> Option<&Error> {
        self.degraded.as_ref()
    }

    /// Stop the watcher, wait for it, and remove the lock marker.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(watcher) = self.watcher.take() {
            if let Err(e) = watcher.await {
                warn!(error = %e, "wake watcher ended abnormally");
            }
        }
        if self.owns_lock {
            self.owns_lock = false;
            remove_marker(tokio::fs::remove_file(self.config.lock_path()).await, &self.config);
        }
    }
}

impl Drop for SingleInstanceGuard {
    fn drop(&mut self) {
        self.cancel.cancel();
        if self.owns_lock {
            remove_marker(std::fs::remove_file(self.config.lock_path()), &self.config);
        }
    }
}

fn remove_marker(result: std::io::Result<()>, config: &GuardConfig) {
    match result {
        Ok(()) => debug!(marker = %config.lock_path().display(), "lock marker removed"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(marker = %config.lock_path().display(), error = %e, "cannot remove lock marker"),
    }
}

async fn watch_wake(
    wake: PathBuf,
    poll: Duration,
    host: Arc<dyn WindowHost>,
    cancel: CancellationToken,
) {
    let mut ticks = tokio::time::interval(poll);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticks.tick() => {}
        }
        // Removing doubles as the existence check.
        match tokio::fs::remove_file(&wake).await {
            Ok(()) => {
                info!("wake request received; restoring window");
                host.restore();
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(marker = %wake.display(), error = %e, "cannot consume wake marker"),
        }
    }
    debug!("wake watcher stopped");
}
