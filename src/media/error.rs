use std::error::Error;
use std::fmt;
use std::io;
use std::time::Duration;

/// Errors from the link resolver and the result providers.
#[derive(Debug)]
pub enum MediaError {
    Io(io::Error),
    /// An external tool exited unsuccessfully
    Process(String),
    Timeout(Duration),
    Network(reqwest::Error),
    Parse(String),
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaError::Io(e) => write!(f, "I/O error: {}", e),
            MediaError::Process(msg) => write!(f, "Process error: {}", msg),
            MediaError::Timeout(d) => write!(f, "Timed out after {:?}", d),
            MediaError::Network(e) => write!(f, "Network error: {}", e),
            MediaError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl Error for MediaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MediaError::Io(e) => Some(e),
            MediaError::Network(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MediaError {
    fn from(e: io::Error) -> Self {
        MediaError::Io(e)
    }
}

impl From<reqwest::Error> for MediaError {
    fn from(e: reqwest::Error) -> Self {
        MediaError::Network(e)
    }
}

impl From<serde_json::Error> for MediaError {
    fn from(e: serde_json::Error) -> Self {
        MediaError::Parse(e.to_string())
    }
}
