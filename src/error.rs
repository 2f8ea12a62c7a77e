use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Input too short: expected at least {min_length} characters, got {actual_length}")]
    Validation {
        min_length: usize,
        actual_length: usize,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No API key configured (set MAI_API_KEY or api_key in mai.toml)")]
    MissingApiKey,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Provider rejected the request with status {status}")]
    Provider { status: u16 },

    #[error("Request failed after {attempts} attempts: {last_error}")]
    ExhaustedRetries { attempts: u32, last_error: String },

    #[error("Empty or unexpected response from provider")]
    EmptyResponse,
}

impl Error {
    /// Whether a dispatcher may try the same request again after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::Timeout(_) | Error::Provider { status: 429 }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
