//! Client core for the personnel and inventory admin backend.
//!
//! # Overview
//! `ApiClient` turns a path plus `RequestOptions` into an outbound request,
//! places the API key (query parameter for GET/HEAD, `X-API-KEY` header
//! otherwise) and retries exactly once with the header when the server
//! answers 401. Typed services for personnel, material resources,
//! equipment characteristics and maintenance records sit on top.
//!
//! # Design
//! - Configuration is an explicit `ClientConfig` owned by the client; the
//!   credential is read once from a `CredentialStore` and never changes.
//! - Request building is pure (`build_request`, `build_retry`); a
//!   `Transport` does the I/O, so hosts and tests can swap it out.
//! - Non-2xx statuses are data at the client layer. Services map them to
//!   `ApiError`, preferring the server's `detail` message.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod services;
pub mod store;
pub mod transport;
pub mod types;

pub use client::{ApiClient, API_KEY_HEADER, API_KEY_PARAM};
pub use config::ClientConfig;
pub use error::{ApiError, ErrorEnvelope, TransportError};
pub use crate::http::{CredentialsMode, HttpMethod, HttpRequest, HttpResponse, RequestOptions};
pub use services::{
    CaracteristicasService, MantenimientoService, PersonalService, RecursosService, ResourceService,
};
pub use store::{CredentialStore, EnvStore, JsonFileStore, MemoryStore};
pub use transport::{Transport, UreqTransport};
pub use types::{
    Caracteristicas, CaracteristicasFields, ListQuery, Mantenimiento, MantenimientoFields, Personal,
    PersonalFields, PersonalPage, PersonalRef, PersonalSummary, Recurso, RecursoFields, ResguardoGroup,
};
