//! Error type definitions.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// A `Result` alias where the `Err` case is `skillcircuit::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for the SkillCircuit client.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A reachable service refused the credentials. This is never turned into
    /// a fallback session, not even in demo mode.
    #[error(transparent)]
    AuthRejected(ApiError),
    /// The service could not be reached at the transport level. With demo
    /// mode enabled the auth client resolves this by synthesizing a local
    /// session instead of returning it.
    #[error("Service unreachable: {0}")]
    ServiceUnreachable(reqwest::Error),
    /// The session context was used after [`teardown`] ended its lifecycle.
    ///
    /// [`teardown`]: crate::session::SessionContext::teardown
    #[error("Session context used after teardown")]
    ContextMisuse,
    /// An in-flight login or registration was overtaken by a newer login,
    /// registration or logout and its result was discarded.
    #[error("Superseded by a newer login or logout")]
    Superseded,
    #[error("Failed to setup HTTP client: {0}")]
    HttpClientSetup(reqwest::Error),
    #[error("Failed to deserialize response: {0}")]
    Deserialize(reqwest::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(url::ParseError),
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write session store: {0}")]
    StoreWrite(std::io::Error),
}

/// An error returned by the SkillCircuit API.
#[derive(Deserialize, Debug)]
pub struct ApiError {
    #[serde(skip)]
    pub status: u16,
    #[serde(skip)]
    pub method: http::Method,
    #[serde(skip)]
    pub path: String,
    pub message: Option<String>,
}

impl ApiError {
    pub(crate) fn new(
        status: u16,
        method: http::Method,
        path: String,
        message: Option<String>,
    ) -> Self {
        Self {
            status,
            method,
            path,
            message,
        }
    }
}

impl std::error::Error for ApiError {}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(msg) = self.message.as_ref() {
            write!(
                f,
                "Received {} on {} {}: {}",
                self.status, self.method, self.path, msg
            )
        } else {
            write!(
                f,
                "Received {} on {} {}",
                self.status, self.method, self.path
            )
        }
    }
}
