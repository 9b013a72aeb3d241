use serde_json::Value;
use thiserror::Error;

/// Backend rejection details, kept verbatim so callers can present them.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPayload {
    pub status: u16,
    pub message: Option<String>,
    pub body: Value,
}

impl ErrorPayload {
    pub fn new(status: u16, body: Value) -> Self {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .or_else(|| body.as_str().filter(|s| !s.is_empty()).map(str::to_owned));

        Self {
            status,
            message,
            body,
        }
    }

    fn describe(&self) -> String {
        match &self.message {
            Some(m) => format!("{} (status {})", m, self.status),
            None => format!("status {}", self.status),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Authentication error: {message}")]
    Auth {
        message: String,
        payload: Option<ErrorPayload>,
    },

    #[error("Validation error: {}", .0.describe())]
    Validation(ErrorPayload),

    #[error("Not found: {}", .0.describe())]
    NotFound(ErrorPayload),

    #[error("Unauthorized: {}", .0.describe())]
    Unauthorized(ErrorPayload),

    #[error("Transport error: {message}")]
    Transport {
        message: String,
        payload: Option<ErrorPayload>,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Maps a non-2xx response onto the taxonomy.
    pub fn from_status(status: u16, body: Value) -> Self {
        let payload = ErrorPayload::new(status, body);
        match status {
            400 | 409 | 422 => ClientError::Validation(payload),
            401 | 403 => ClientError::Unauthorized(payload),
            404 => ClientError::NotFound(payload),
            s if s >= 500 => ClientError::Transport {
                message: format!("server responded with status {}", s),
                payload: Some(payload),
            },
            _ => ClientError::Validation(payload),
        }
    }

    pub fn payload(&self) -> Option<&ErrorPayload> {
        match self {
            ClientError::Auth { payload, .. } | ClientError::Transport { payload, .. } => {
                payload.as_ref()
            }
            ClientError::Validation(p) | ClientError::NotFound(p) | ClientError::Unauthorized(p) => {
                Some(p)
            }
            _ => None,
        }
    }

    /// Text to show inline: the backend's message when it sent one, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Auth { message, .. } => message.clone(),
            ClientError::InvalidInput(msg) => msg.clone(),
            other => other
                .payload()
                .and_then(|p| p.message.clone())
                .unwrap_or_else(|| fallback.to_string()),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport {
            message: err.to_string(),
            payload: None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ClientError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ClientError::Export(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
