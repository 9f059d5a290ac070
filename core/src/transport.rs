//! Executes `HttpRequest` values against the network.
//!
//! # Design
//! `ApiClient` only builds requests and decides whether to retry; a
//! `Transport` performs the round-trip. Any closure with the right signature
//! is a transport, which is how tests script server behavior and how a host
//! that owns its own HTTP stack plugs in.

use http::HeaderMap;
use ureq::typestate::WithBody;
use ureq::{Agent, RequestBuilder};

use crate::error::TransportError;
use crate::http::{CredentialsMode, HttpMethod, HttpRequest, HttpResponse};

pub trait Transport {
    /// Perform one HTTP exchange. Non-2xx statuses are returned as
    /// responses; only network-level faults are errors.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

/// Blocking transport backed by ureq.
///
/// Requests with `CredentialsMode::Include` go through an agent whose cookie
/// jar persists across calls, so a backend session cookie rides along with
/// the API key. Each `Omit` request gets a fresh agent whose jar is dropped
/// with the exchange, so it neither sends nor keeps cookies.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    session: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self { session: new_agent() }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Status codes are data here, not errors.
fn new_agent() -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent()
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let anonymous;
        let agent = match request.credentials {
            CredentialsMode::Include => &self.session,
            CredentialsMode::Omit => {
                anonymous = new_agent();
                &anonymous
            }
        };
        if !request.passthrough.is_empty() {
            tracing::trace!(options = ?request.passthrough.keys().collect::<Vec<_>>(), "ureq ignores passthrough options");
        }

        let url = request.url.as_str();
        let body = request.body.as_deref();
        let mut response = match request.method {
            HttpMethod::Get => with_headers(agent.get(url), &request.headers).call(),
            HttpMethod::Head => with_headers(agent.head(url), &request.headers).call(),
            HttpMethod::Delete => {
                let builder = with_headers(agent.delete(url), &request.headers);
                match body {
                    Some(b) => builder.force_send_body().send(b.as_bytes()),
                    None => builder.call(),
                }
            }
            HttpMethod::Post => send(with_headers(agent.post(url), &request.headers), body),
            HttpMethod::Put => send(with_headers(agent.put(url), &request.headers), body),
            HttpMethod::Patch => send(with_headers(agent.patch(url), &request.headers), body),
        }?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &HeaderMap) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_bytes());
    }
    builder
}

fn send(
    builder: RequestBuilder<WithBody>,
    body: Option<&str>,
) -> Result<http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(b) => builder.send(b.as_bytes()),
        None => builder.send_empty(),
    }
}
