use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplorerError {
    /// Network-level failure reaching the explorer or the forwarding proxy
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Explorer returned HTTP {status}")]
    FetchFailure { status: u16 },

    #[error("Embedded appState payload not found in page")]
    StateNotFound,

    #[error("Embedded appState payload is not valid JSON: {0}")]
    StateParse(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ExplorerError {
    /// The request never produced an HTTP response (DNS, connect, timeout, reset).
    pub fn is_transport(&self) -> bool {
        matches!(self, ExplorerError::Transport(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ExplorerError::Transport(e) if e.is_timeout())
    }

    /// The page loaded but no longer carries the payload we expect.
    pub fn is_page_shape_error(&self) -> bool {
        matches!(
            self,
            ExplorerError::StateNotFound | ExplorerError::StateParse(_)
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ExplorerError::FetchFailure { status } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
