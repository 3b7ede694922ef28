//! Errors from the typed accessors.

use liveproto::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum LiveError {
    /// The transport failed, timed out, was busy, or is closed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Live answered, but not with what the accessor expects.
    #[error("Unexpected reply on {address}: {detail}")]
    UnexpectedReply { address: String, detail: String },

    /// Rejected before anything was sent.
    #[error("Invalid {name}: {detail}")]
    InvalidArgument { name: &'static str, detail: String },
}

impl LiveError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, LiveError::Client(e) if e.is_timeout())
    }

    pub(crate) fn invalid(name: &'static str, detail: impl Into<String>) -> Self {
        LiveError::InvalidArgument {
            name,
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LiveError>;
