use thiserror::Error;

#[derive(Error, Debug)]
pub enum SloError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SloError {
    /// Whether an outer retry policy may re-invoke the failed call.
    ///
    /// Only network-level failures qualify. A request that could not even be
    /// built will fail the same way on every attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            SloError::Transport(e) => !e.is_builder(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, SloError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_transport_errors_are_not_transient() {
        assert!(!SloError::Decode("not json".to_string()).is_transient());
        assert!(!SloError::UnsupportedMethod("POST".to_string()).is_transient());
        assert!(!SloError::InvalidConfig("empty metric".to_string()).is_transient());
    }

    #[test]
    fn test_error_messages() {
        let err = SloError::UnsupportedMethod("PUT".to_string());
        assert_eq!(err.to_string(), "Unsupported HTTP method: PUT");

        let err = SloError::InvalidConfig("api_url cannot be empty".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: api_url cannot be empty"
        );
    }
}
