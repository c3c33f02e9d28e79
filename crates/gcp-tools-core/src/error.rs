use thiserror::Error;

#[derive(Debug, Error)]
pub enum GcpToolsError {
    #[error("invalid request: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{label} failed (`{command}`): {message}")]
    StepFailed {
        label: String,
        command: String,
        message: String,
    },

    #[error("{label} returned no output (`{command}`)")]
    EmptyOutput { label: String, command: String },

    #[error("`{name}` not found on PATH — {hint}")]
    CliNotFound { name: String, hint: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GcpToolsError>;
