use retry_utils::RetryClass;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeliusError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Helius API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed page payload: {0}")]
    MalformedPage(String),

    #[error("retries exhausted after {attempts} attempts: {cause}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        cause: Box<HeliusError>,
    },
}

impl HeliusError {
    /// Map this error onto the retry strategy. Connection failures,
    /// timeouts and 5xx responses are transient; everything else (4xx,
    /// malformed payloads) aborts the wallet's fetch immediately.
    pub fn retry_class(&self) -> RetryClass {
        match self {
            HeliusError::Http(e) if e.is_timeout() => RetryClass::Timeout,
            HeliusError::Http(e) if e.is_connect() => RetryClass::Connect,
            HeliusError::Api { status, .. } if (500..600).contains(&(*status as u32)) => {
                RetryClass::ServerError
            }
            _ => RetryClass::Fatal,
        }
    }
}
