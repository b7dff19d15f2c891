use thiserror::Error;

/// The two request-failure kinds every operation can raise, plus the ambient
/// persistence failure. `InvalidInput` and `AccessDenied` propagate uncaught
/// to the transport boundary, which maps them to 400/403; `Storage` maps
/// to 500.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    AccessDenied(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl WorkspaceError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn denied(msg: impl Into<String>) -> Self {
        Self::AccessDenied(msg.into())
    }
}

impl From<std::io::Error> for WorkspaceError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for WorkspaceError {
    fn from(e: serde_json::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

pub type Result<T, E = WorkspaceError> = std::result::Result<T, E>;
