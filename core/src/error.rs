//! Error types for the admin API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the record does not exist" from "the server refused the request." All
//! other non-2xx responses land in `HttpError`, carrying the server's
//! `detail` message when it sent one.
//!
//! `ApiClient::request` itself never produces `NotFound` or `HttpError`: a
//! non-2xx status is data at that layer. Only the resource services turn
//! statuses into errors.

use serde::Deserialize;
use thiserror::Error;

/// Failure to complete an HTTP exchange at the network level.
#[derive(Debug, Error)]
pub enum TransportError {
    /// DNS, connect, TLS or I/O failure reported by ureq.
    #[error("HTTP transport error: {0}")]
    Ureq(#[from] ureq::Error),

    /// A host-supplied transport could not complete the exchange.
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Errors returned by `ApiClient` and the resource services.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("{message}")]
    HttpError { status: u16, message: String },

    /// The request never got a response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("invalid URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header `{0}`")]
    InvalidHeader(String),

    #[error("unsupported HTTP method `{0}`")]
    InvalidMethod(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// A required field was empty; nothing was sent.
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Body shape of a backend error response.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorEnvelope {
    /// Best-effort decode. A body that is not JSON, or whose `detail` is not
    /// a string (validation errors send a list), yields an empty envelope.
    pub fn decode(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}
