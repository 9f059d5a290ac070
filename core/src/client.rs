//! Request client: URL resolution, credential placement and the 401 retry.
//!
//! # Design
//! Every call moves through `BUILD → SEND → DONE`, with one detour:
//! when the first response is a 401 and a credential is configured, the
//! client builds a retry (`RETRY_BUILD`) that forces the `X-API-KEY` header
//! onto the same final URL, sends it (`RETRY_SEND`) and returns whatever
//! comes back. There is never a third attempt.
//!
//! `build_request` and `build_retry` are pure, so the placement rules are
//! testable without a transport. `request` wires them to the transport.
//!
//! The credential lives in the immutable `ClientConfig`, so concurrent calls
//! from several threads always read the same value.

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::HeaderMap;
use serde::Serialize;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestOptions};
use crate::transport::{Transport, UreqTransport};

/// Header carrying the credential on non-GET/HEAD requests and on retries.
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Query parameter carrying the credential on GET/HEAD requests.
pub const API_KEY_PARAM: &str = "api_key";

/// Client for the admin REST backend.
///
/// Built once from a `ClientConfig` and shared by reference with every
/// resource service.
#[derive(Debug, Clone)]
pub struct ApiClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl ApiClient<UreqTransport> {
    pub fn with_ureq(config: ClientConfig) -> Self {
        Self::new(config, UreqTransport::new())
    }
}

impl<T> ApiClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Absolute URLs pass through; anything else is joined to the base URL
    /// with exactly one slash.
    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{path}", self.config.base_url())
        } else {
            format!("{}/{path}", self.config.base_url())
        }
    }

    /// Build the first attempt for `path`.
    ///
    /// Caller headers are applied in order, so a later header with the same
    /// (case-insensitive) name replaces an earlier one.
    pub fn build_request(&self, path: &str, options: RequestOptions) -> Result<HttpRequest, ApiError> {
        let RequestOptions {
            method,
            headers: raw_headers,
            body,
            credentials,
            passthrough,
        } = options;

        let mut headers = HeaderMap::new();
        for (name, value) in raw_headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|_| ApiError::InvalidHeader(name.clone()))?;
            let header_value = HeaderValue::from_str(&value).map_err(|_| ApiError::InvalidHeader(name))?;
            headers.insert(header_name, header_value);
        }

        if body.is_some() && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let mut url = self.resolve_url(path);
        if let Some(key) = self.config.api_key() {
            if method.uses_query_credential() {
                url = with_query_credential(&url, key)?;
            } else {
                headers.insert(API_KEY_HEADER, credential_header(key)?);
            }
        }

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
            credentials,
            passthrough,
        })
    }

    /// The retry for `first`, if `response` calls for one: status 401 with
    /// a credential configured. The retry keeps the final URL and forces
    /// the `X-API-KEY` header.
    pub fn build_retry(
        &self,
        first: &HttpRequest,
        response: &HttpResponse,
    ) -> Result<Option<HttpRequest>, ApiError> {
        let Some(key) = self.config.api_key() else {
            return Ok(None);
        };
        if response.status != 401 {
            return Ok(None);
        }
        let mut retry = first.clone();
        retry.headers.insert(API_KEY_HEADER, credential_header(key)?);
        Ok(Some(retry))
    }
}

impl<T: Transport> ApiClient<T> {
    /// Issue a request and return the last response received.
    ///
    /// Non-2xx statuses are returned, not raised. Only a transport failure
    /// (or a request that cannot be built) is an error.
    pub fn request(&self, path: &str, options: RequestOptions) -> Result<HttpResponse, ApiError> {
        let request = self.build_request(path, options)?;
        let response = self.send(&request)?;

        match self.build_retry(&request, &response)? {
            Some(retry) => {
                tracing::warn!(
                    method = %retry.method,
                    url = %redact(&retry.url),
                    "unauthorized, retrying once with X-API-KEY header"
                );
                self.send(&retry)
            }
            None => Ok(response),
        }
    }

    /// Serialize `body` as JSON and send it with `method`.
    pub fn send_json<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpResponse, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        self.request(path, RequestOptions::with_method(method).body(body))
    }

    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        tracing::debug!(method = %request.method, url = %redact(&request.url), "sending request");
        let response = self.transport.execute(request)?;
        tracing::debug!(status = response.status, "response received");
        Ok(response)
    }
}

fn credential_header(key: &str) -> Result<HeaderValue, ApiError> {
    let mut value = HeaderValue::from_str(key).map_err(|_| ApiError::InvalidHeader(API_KEY_HEADER.to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Set `api_key` on `url`. The first existing `api_key` is overwritten in
/// place and any duplicates dropped; other parameters keep their order.
fn with_query_credential(url: &str, key: &str) -> Result<String, ApiError> {
    let mut parsed = Url::parse(url).map_err(|source| ApiError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;

    let mut replaced = false;
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .filter_map(|(name, value)| {
            if name != API_KEY_PARAM {
                return Some((name.into_owned(), value.into_owned()));
            }
            if replaced {
                return None;
            }
            replaced = true;
            Some((name.into_owned(), key.to_string()))
        })
        .collect();

    {
        let mut query = parsed.query_pairs_mut();
        query.clear().extend_pairs(&pairs);
        if !replaced {
            query.append_pair(API_KEY_PARAM, key);
        }
    }
    Ok(parsed.into())
}

/// `url` with the `api_key` value masked, for logs.
fn redact(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    if !parsed.query_pairs().any(|(name, _)| name == API_KEY_PARAM) {
        return url.to_string();
    }
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(name, value)| {
            let value = if name == API_KEY_PARAM {
                "***".to_string()
            } else {
                value.into_owned()
            };
            (name.into_owned(), value)
        })
        .collect();
    parsed.query_pairs_mut().clear().extend_pairs(&pairs);
    parsed.into()
}
