//! Typed CRUD services, one per backend collection.
//!
//! # Design
//! A service borrows the shared `ApiClient` and turns each operation into
//! one `request` call plus a status check. Presentation code depends on
//! `ResourceService`, not on the concrete services.
//!
//! Status mapping is the same everywhere: 2xx decodes the body, 404 is
//! `ApiError::NotFound`, anything else is `ApiError::HttpError` carrying the
//! server's `detail` or a "<what failed>: <status>" fallback.

mod caracteristicas;
mod mantenimiento;
mod personal;
mod recursos;

pub use caracteristicas::CaracteristicasService;
pub use mantenimiento::MantenimientoService;
pub use personal::PersonalService;
pub use recursos::RecursosService;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::HttpResponse;
use crate::types::ListPayload;

/// CRUD operations over one backend collection.
pub trait ResourceService {
    type Key: ?Sized;
    type Record;
    type Create;
    type Update;
    type Query;

    fn list(&self, query: &Self::Query) -> Result<Vec<Self::Record>, ApiError>;
    fn get(&self, key: &Self::Key) -> Result<Self::Record, ApiError>;
    fn create(&self, input: &Self::Create) -> Result<Self::Record, ApiError>;
    fn update(&self, key: &Self::Key, input: &Self::Update) -> Result<Self::Record, ApiError>;
    fn delete(&self, key: &Self::Key) -> Result<(), ApiError>;
}

/// Unreserved characters (RFC 3986) stay as they are in a path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// `{collection}/{key}` with the key percent-encoded as one segment.
fn item_path(collection: &str, key: &str) -> String {
    format!("{collection}/{}", utf8_percent_encode(key, SEGMENT))
}

/// Map non-success statuses to the appropriate `ApiError` variant.
fn check_status(response: HttpResponse, context: &str) -> Result<HttpResponse, ApiError> {
    if response.is_ok() {
        return Ok(response);
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    let message = response
        .error_detail()
        .unwrap_or_else(|| format!("{context}: {}", response.status));
    Err(ApiError::HttpError {
        status: response.status,
        message,
    })
}

fn parse_list<T: DeserializeOwned>(response: &HttpResponse) -> Result<Vec<T>, ApiError> {
    response.json::<ListPayload<T>>().map(ListPayload::into_vec)
}
