use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("could not connect to the API at {url}: {reason}")]
    Connection { url: String, reason: String },
    #[error("{0}")]
    Auth(String),
    #[error("authentication required; the session token is missing or expired")]
    Unauthorized,
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },
}

impl ClientError {
    /// A 401 from an authenticated endpoint. The caller must drop the session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
