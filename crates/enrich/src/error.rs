/// Error from a rating call.
#[derive(Debug, Clone)]
pub enum ScoreError {
    /// No API key from flag, environment or key file
    MissingKey,
    /// Network error
    NetworkError(String),
    /// API error response
    ApiError { status: u16, message: String },
    /// Failed to decode the response envelope
    ParseError(String),
    /// Provider returned unexpected format
    InvalidResponse(String),
}

impl std::fmt::Display for ScoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreError::MissingKey => write!(f, "API key not configured"),
            ScoreError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            ScoreError::ApiError { status, message } => {
                write!(f, "API error ({}): {}", status, message)
            }
            ScoreError::ParseError(msg) => write!(f, "Failed to parse response: {}", msg),
            ScoreError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for ScoreError {}
