use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Failures talking to a player's control channel.
#[derive(Debug)]
pub enum BackendError {
    /// The control channel could not be opened
    Connect(io::Error),
    Io(io::Error),
    Timeout(Duration),
    /// The player accepted the connection but hung up before replying
    Closed,
    /// The mpv IPC socket file does not exist
    SocketMissing(PathBuf),
    /// Reply could not be understood
    Protocol(String),
    /// The player answered with an error status
    Rejected(String),
    /// The command shape is not understood by this backend
    Unsupported(String),
}

impl BackendError {
    /// True when the failure means the player cannot be reached at all.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            BackendError::Connect(_)
                | BackendError::Io(_)
                | BackendError::Timeout(_)
                | BackendError::Closed
                | BackendError::SocketMissing(_)
        )
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Connect(e) => write!(f, "Connection failed: {}", e),
            BackendError::Io(e) => write!(f, "I/O error: {}", e),
            BackendError::Timeout(d) => write!(f, "Timed out after {:?}", d),
            BackendError::Closed => write!(f, "Connection closed before reply"),
            BackendError::SocketMissing(p) => write!(f, "Control socket not found: {}", p.display()),
            BackendError::Protocol(s) => write!(f, "Protocol error: {}", s),
            BackendError::Rejected(s) => write!(f, "Command rejected: {}", s),
            BackendError::Unsupported(s) => write!(f, "Unsupported command: {}", s),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BackendError::Connect(e) | BackendError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for BackendError {
    fn from(e: io::Error) -> Self {
        BackendError::Io(e)
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(e: serde_json::Error) -> Self {
        BackendError::Protocol(e.to_string())
    }
}
