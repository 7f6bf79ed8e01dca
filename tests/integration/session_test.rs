//! Integration tests for session takeover with real processes

use r_tubeplay::session::{LibcSignaller, ProcessSignaller, SessionRegistrar};
use std::fs;
use std::os::unix::process::ExitStatusExt;
use std::process::Command;
use tempfile::tempdir;

#[cfg(test)]
mod session_integration_tests {
    use super::*;

    /// A live previous holder gets SIGTERM and the file holds the new PID.
    #[test]
    fn test_takeover_terminates_running_holder() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.pid");
        let mut previous = Command::new("sleep").arg("30").spawn().unwrap();
        fs::write(&path, previous.id().to_string()).unwrap();

        let registrar = SessionRegistrar::new(path.clone());
        let takeover = registrar.acquire();

        assert_eq!(takeover.previous_pid, Some(previous.id()));
        assert!(takeover.terminated_previous);
        assert!(takeover.registered);
        let status = previous.wait().unwrap();
        assert_eq!(status.signal(), Some(libc::SIGTERM));
        assert_eq!(registrar.recorded_pid(), Some(std::process::id()));

        assert!(registrar.release());
        assert!(!path.exists());
    }

    #[test]
    fn test_takeover_of_exited_holder_sends_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.pid");
        let mut finished = Command::new("true").spawn().unwrap();
        let finished_pid = finished.id();
        finished.wait().unwrap();
        fs::write(&path, finished_pid.to_string()).unwrap();

        assert!(!LibcSignaller.is_alive(finished_pid));
        let takeover = SessionRegistrar::new(path.clone()).acquire();

        assert_eq!(takeover.previous_pid, Some(finished_pid));
        assert!(!takeover.terminated_previous);
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), std::process::id().to_string());
    }

    #[test]
    fn test_signaller_refuses_group_pids() {
        assert!(!LibcSignaller.is_alive(0));
        assert!(LibcSignaller.terminate(0).is_err());
    }
}
