use thiserror::Error;

/// Failure to obtain data for a team (or league listing) from a data source.
///
/// Missing corner counts and missing odds are not errors; they are handled by
/// the aggregator as data-quality exclusions.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("API key missing (set API_FOOTBALL_KEY or use --demo)")]
    MissingApiKey,
    #[error("http client setup failed: {0}")]
    Client(#[source] reqwest::Error),
    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} http {status}: {snippet}")]
    Status {
        endpoint: String,
        status: u16,
        snippet: String,
    },
    #[error("{endpoint} api error: {message}")]
    Api { endpoint: String, message: String },
    #[error("{endpoint} invalid json: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        match self {
            FetchError::Transport { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        match self {
            FetchError::Transport { endpoint, .. }
            | FetchError::Status { endpoint, .. }
            | FetchError::Api { endpoint, .. }
            | FetchError::Decode { endpoint, .. } => Some(endpoint),
            FetchError::MissingApiKey | FetchError::Client(_) => None,
        }
    }
}
