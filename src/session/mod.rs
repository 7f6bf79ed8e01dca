//! Session takeover: at most one orchestration process drives the player.
//!
//! The session file holds the PID of the current holder. A newly started
//! instance terminates the previous holder and overwrites the file. This is an
//! advisory hand-over, not a lock.


use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

const SESSION_LOG_TARGET: &str = "r_tubeplay::session";

/// Liveness checks and termination for other processes.
pub trait ProcessSignaller: Send + Sync {
    fn is_alive(&self, pid: u32) -> bool;
    fn terminate(&self, pid: u32) -> io::Result<()>;
}

/// Signals delivered with `kill(2)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibcSignaller;

impl ProcessSignaller for LibcSignaller {
    fn is_alive(&self, pid: u32) -> bool {
        let Ok(pid) = libc::pid_t::try_from(pid) else {
            return false;
        };
        if pid <= 0 {
            return false;
        }
        // Signal 0 performs the permission and existence checks only
        let rc = unsafe { libc::kill(pid, 0) };
        rc == 0 || io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
    }

    fn terminate(&self, pid: u32) -> io::Result<()> {
        let pid = libc::pid_t::try_from(pid)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        if pid <= 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "refusing to signal a process group"));
        }
        let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
        if rc == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}

/// What `acquire` found and did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTakeover {
    pub previous_pid: Option<u32>,
    /// A termination signal was delivered to `previous_pid`
    pub terminated_previous: bool,
    /// The current PID made it to disk
    pub registered: bool,
}

/// Claims the session file for the current process.
pub struct SessionRegistrar {
    path: PathBuf,
    pid: u32,
    signaller: Box<dyn ProcessSignaller>,
}

impl SessionRegistrar {
    /// Registrar for the current process using real signals.
    pub fn new(path: PathBuf) -> Self {
        Self::with_signaller(path, std::process::id(), Box::new(LibcSignaller))
    }

    pub fn with_signaller(path: PathBuf, pid: u32, signaller: Box<dyn ProcessSignaller>) -> Self {
        SessionRegistrar { path, pid, signaller }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// PID currently recorded in the session file, if readable.
    pub fn recorded_pid(&self) -> Option<u32> {
        fs::read_to_string(&self.path).ok()?.trim().parse().ok()
    }

    /// Terminates a live previous holder and records the current PID.
    #[instrument(skip(self), fields(pid = self.pid, path = %self.path.display()))]
    pub fn acquire(&self) -> SessionTakeover {
        let previous_pid = self.recorded_pid();
        let mut terminated_previous = false;

        if let Some(old_pid) = previous_pid {
            if old_pid != self.pid && self.signaller.is_alive(old_pid) {
                match self.signaller.terminate(old_pid) {
                    Ok(()) => {
                        info!(target: SESSION_LOG_TARGET, "Session handover: terminated previous loop (PID: {})", old_pid);
                        terminated_previous = true;
                    }
                    // The old holder may have exited between the check and the signal
                    Err(e) => debug!(target: SESSION_LOG_TARGET, "Could not signal previous session {}: {}", old_pid, e),
                }
            } else if old_pid != self.pid {
                debug!(target: SESSION_LOG_TARGET, "Stale session file for PID {}, taking over", old_pid);
            }
        }

        let registered = match self.write_pid() {
            Ok(()) => {
                info!(target: SESSION_LOG_TARGET, "New session ID registered: {}", self.pid);
                true
            }
            Err(e) => {
                warn!(target: SESSION_LOG_TARGET, "Error writing session file: {}", e);
                false
            }
        };

        SessionTakeover { previous_pid, terminated_previous, registered }
    }

    /// Removes the session file if this process still holds it.
    pub fn release(&self) -> bool {
        if self.recorded_pid() != Some(self.pid) {
            debug!(target: SESSION_LOG_TARGET, "Session no longer held by {}, leaving file in place", self.pid);
            return false;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => true,
            Err(e) => {
                warn!(target: SESSION_LOG_TARGET, "Error removing session file: {}", e);
                false
            }
        }
    }

    fn write_pid(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, self.pid.to_string())
    }
}
