use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single call against the posting API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required credential variable is unset or empty.
    #[error("{0} is not set")]
    MissingCredential(&'static str),

    #[error("could not sign request: {0}")]
    Signing(String),

    /// Connection, TLS or body read failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status. Displays as
    /// `403 Forbidden` followed by the API's own message on the next line.
    #[error("{status}\n{detail}")]
    Status { status: StatusCode, detail: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}
