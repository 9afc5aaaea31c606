use crate::models::{Field, Format};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: Field,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transport,
    Parse,
    Busy,
    Config,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid {format} response: {message}")]
    Parse { format: Format, message: String },

    #[error("failed to encode request body: {0}")]
    Encode(serde_json::Error),

    #[error("a submission is already in progress")]
    Busy,

    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn parse(format: Format, err: impl std::fmt::Display) -> Self {
        ClientError::Parse {
            format,
            message: err.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::Http { .. } | ClientError::Rejected { .. } | ClientError::Network(_) => {
                ErrorKind::Transport
            }
            ClientError::Parse { .. } | ClientError::Encode(_) => ErrorKind::Parse,
            ClientError::Busy => ErrorKind::Busy,
            ClientError::Config(_) => ErrorKind::Config,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } | ClientError::Rejected { status, .. } => Some(*status),
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
