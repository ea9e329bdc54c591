//! Error taxonomy shared by every layer of tunetrail.
//!
//! Provider failures are split the way callers need to react to them:
//! [`Error::Auth`] means the token is no good and the user has to log in
//! again, [`Error::Network`] covers unreachable hosts, timeouts and any other
//! non-success status, and [`Error::Parse`] is a response we could not decode.
//! Everything that goes wrong inside a store transaction surfaces as
//! [`Error::Persistence`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("network error: {0}")]
    Network(String),
    #[error("authorization error: {0}")]
    Auth(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("not authenticated: {0}")]
    Unauthenticated(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::Parse(e.to_string())
        } else {
            Error::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::Persistence(e.to_string())
    }
}

impl Error {
    /// HTTP status used when this error reaches a request handler.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated(_) | Error::Auth(_) => StatusCode::UNAUTHORIZED,
            Error::Network(_) | Error::Parse(_) => StatusCode::BAD_GATEWAY,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Persistence(_) | Error::Config(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
