//! Error types shared by the interchange core, the catalog client and the CLI

use thiserror::Error;

/// Errors produced while exporting or importing a material
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid local input. Never reaches the network.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed or cyclic node graph, or a program that cannot be replayed
    #[error("Structural error: {0}")]
    Structural(String),

    /// Transport failure: unreachable host, timeout, unreadable response
    #[error("Network error: {0}")]
    Network(String),

    /// The catalog was reached but reported a failure
    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    /// Invalid settings
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn structural(message: impl Into<String>) -> Self {
        Error::Structural(message.into())
    }

    /// Message suitable for showing to the artist
    pub fn user_message(&self) -> String {
        match self {
            Error::Network(_) => "API Request Failed".to_string(),
            Error::Api { message, .. } => format!("Shader Cloud Error: {}", message),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_transport_detail() {
        let err = Error::Network("connection refused".to_string());
        assert_eq!(err.user_message(), "API Request Failed");
    }

    #[test]
    fn test_user_message_uses_service_text() {
        let err = Error::Api { code: 200, message: "Category missing".to_string() };
        assert_eq!(err.user_message(), "Shader Cloud Error: Category missing");
    }
}
