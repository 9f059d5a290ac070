//! HTTP request and response types exchanged with a [`Transport`].
//!
//! # Design
//! Requests and responses are plain data. `ApiClient` builds an
//! `HttpRequest` without touching the network and a transport turns it into
//! an `HttpResponse`. Headers use `http::HeaderMap`, which gives
//! case-insensitive names and last-write-wins `insert` for free.
//!
//! [`Transport`]: crate::transport::Transport

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use http::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ErrorEnvelope};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// GET and HEAD carry the credential in the query string so that
    /// cross-origin calls stay "simple" and skip the CORS preflight.
    pub fn uses_query_credential(self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Head)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(ApiError::InvalidMethod(s.to_string())),
        }
    }
}

/// Whether ambient session credentials (cookies) ride along with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialsMode {
    #[default]
    Include,
    Omit,
}

/// Caller-facing options for [`ApiClient::request`](crate::ApiClient::request).
///
/// Header names are validated when the request is built, so adding one here
/// never fails.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub credentials: CredentialsMode,
    /// Options this layer does not interpret. Forwarded to the transport
    /// untouched.
    pub passthrough: BTreeMap<String, String>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn with_method(method: HttpMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn credentials(mut self, mode: CredentialsMode) -> Self {
        self.credentials = mode;
        self
    }

    pub fn passthrough(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.passthrough.insert(key.into(), value.into());
        self
    }
}

/// A fully resolved HTTP request.
///
/// Built by `ApiClient::build_request`. `url` is final: the credential has
/// already been placed in the query string or in `headers`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
    pub credentials: CredentialsMode,
    pub passthrough: BTreeMap<String, String>,
}

/// An HTTP response described as plain data.
///
/// The transport reads the body fully; decoding it is left to the caller.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// True for any 2xx status.
    pub fn is_ok(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// The server's `detail` message, if the body carries one.
    pub fn error_detail(&self) -> Option<String> {
        ErrorEnvelope::decode(&self.body).detail
    }
}
