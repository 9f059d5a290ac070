//! Domain DTOs for the admin backend.
//!
//! # Design
//! Each record is its key plus a flattened `*Fields` struct. Create sends
//! the whole record; update sends only the fields, because the key travels
//! in the path. Optional fields are serialized as `null` rather than
//! omitted, matching what the backend's forms have always sent.
//!
//! The mock server stores records as untyped JSON; integration tests catch
//! any schema drift between the two crates.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// A personnel record as embedded by the backend inside other records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonalSummary {
    pub expediente: i64,
    #[serde(default)]
    pub paterno: Option<String>,
    #[serde(default)]
    pub materno: Option<String>,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub adscripcion: Option<String>,
    #[serde(default)]
    pub cargo: Option<String>,
}

/// Reference to a personnel record. Requests send the bare `expediente`;
/// responses may embed the record instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PersonalRef {
    Expediente(i64),
    Embedded(PersonalSummary),
}

impl PersonalRef {
    pub fn expediente(&self) -> i64 {
        match self {
            PersonalRef::Expediente(id) => *id,
            PersonalRef::Embedded(summary) => summary.expediente,
        }
    }
}

// ---------------------------------------------------------------------------
// Personal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonalFields {
    pub paterno: String,
    #[serde(default)]
    pub materno: Option<String>,
    pub nombre: String,
    /// `YYYY-MM-DD`.
    #[serde(default)]
    pub f_nacimiento: Option<String>,
    #[serde(default)]
    pub estado_civil: Option<String>,
    #[serde(default)]
    pub adscripcion: Option<String>,
    #[serde(default)]
    pub cargo: Option<String>,
    /// Photo path.
    #[serde(default)]
    pub ruta: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Personal {
    pub expediente: i64,
    #[serde(flatten)]
    pub fields: PersonalFields,
}

impl Personal {
    /// "paterno materno nombre", skipping a missing materno.
    pub fn full_name(&self) -> String {
        let f = &self.fields;
        [Some(f.paterno.as_str()), f.materno.as_deref(), Some(f.nombre.as_str())]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Client-side search: `q` against "expediente nombre paterno materno",
    /// ignoring case.
    pub fn matches(&self, q: &str) -> bool {
        let f = &self.fields;
        let haystack = format!(
            "{} {} {} {}",
            self.expediente,
            f.nombre,
            f.paterno,
            f.materno.as_deref().unwrap_or("")
        )
        .to_lowercase();
        haystack.contains(&q.to_lowercase())
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.expediente <= 0 {
            return Err(ApiError::Validation("expediente es obligatorio".to_string()));
        }
        self.fields.validate()
    }
}

impl PersonalFields {
    pub fn validate(&self) -> Result<(), ApiError> {
        require("paterno", Some(&self.paterno))?;
        require("nombre", Some(&self.nombre))
    }
}

// ---------------------------------------------------------------------------
// Recursos materiales
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecursoFields {
    #[serde(rename = "nu_NSAR")]
    pub nu_nsar: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    pub marca: String,
    pub modelo: String,
    #[serde(default)]
    pub serie: String,
    #[serde(default)]
    pub observaciones: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub estado_fisico: Option<String>,
    #[serde(default)]
    pub ubicacion: Option<String>,
    /// Custodian.
    #[serde(default)]
    pub expediente_resguardo: Option<PersonalRef>,
    #[serde(default)]
    pub fecha_asig: Option<String>,
    #[serde(default)]
    pub ruta: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recurso {
    pub nu_inventario: String,
    #[serde(flatten)]
    pub fields: RecursoFields,
}

impl Recurso {
    pub fn validate(&self) -> Result<(), ApiError> {
        require("nu_inventario", Some(&self.nu_inventario))?;
        self.fields.validate()
    }
}

impl RecursoFields {
    pub fn validate(&self) -> Result<(), ApiError> {
        require("nu_NSAR", Some(&self.nu_nsar))?;
        require("marca", Some(&self.marca))?;
        require("modelo", Some(&self.modelo))
    }
}

/// Resources held by one custodian, as returned by `RecursosService::search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResguardoGroup {
    /// `None` groups resources with no custodian.
    pub holder: Option<PersonalRef>,
    pub recursos: Vec<Recurso>,
}

// ---------------------------------------------------------------------------
// Caracteristicas
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaracteristicasFields {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub procesador: Option<String>,
    #[serde(default)]
    pub memoria: Option<String>,
    #[serde(default)]
    pub disco_duro: Option<String>,
    #[serde(default)]
    pub paqueterias: Option<String>,
    /// Previous inventory number.
    #[serde(default)]
    pub inv_anterio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Caracteristicas {
    pub nu_inventario: String,
    #[serde(flatten)]
    pub fields: CaracteristicasFields,
}

impl Caracteristicas {
    pub fn validate(&self) -> Result<(), ApiError> {
        require("nu_inventario", Some(&self.nu_inventario))
    }
}

// ---------------------------------------------------------------------------
// Mantenimiento
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MantenimientoFields {
    #[serde(default)]
    pub nu_inventario: Option<String>,
    #[serde(default)]
    pub fecha: Option<String>,
    #[serde(default)]
    pub trabajo: Option<String>,
    #[serde(default)]
    pub fallas: Option<String>,
    #[serde(default)]
    pub estatus: Option<String>,
    #[serde(default)]
    pub observaciones: Option<String>,
    #[serde(default)]
    pub responsable: Option<PersonalRef>,
}

/// A maintenance record. The backend assigns `id` on create.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mantenimiento {
    pub id: i64,
    #[serde(flatten)]
    pub fields: MantenimientoFields,
}

impl MantenimientoFields {
    pub fn validate(&self) -> Result<(), ApiError> {
        require("nu_inventario", self.nu_inventario.as_ref())?;
        require("fecha", self.fecha.as_ref())?;
        require("trabajo", self.trabajo.as_ref())?;
        require("fallas", self.fallas.as_ref())?;
        require("estatus", self.estatus.as_ref())?;
        if self.responsable.is_none() {
            return Err(missing("responsable"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Paging for `/personal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonalPage {
    pub skip: u32,
    pub limit: u32,
}

impl Default for PersonalPage {
    fn default() -> Self {
        Self { skip: 0, limit: 50 }
    }
}

/// Search and paging for the `q`/`limit`/`offset` endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub q: String,
    pub limit: u32,
    pub offset: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            q: String::new(),
            limit: 50,
            offset: 0,
        }
    }
}

impl ListQuery {
    pub fn search(q: impl Into<String>, limit: u32) -> Self {
        Self {
            q: q.into(),
            limit,
            offset: 0,
        }
    }

    /// `q` only when non-empty; `limit` and `offset` always.
    pub fn to_query_string(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if !self.q.is_empty() {
            query.append_pair("q", &self.q);
        }
        query
            .append_pair("limit", &self.limit.to_string())
            .append_pair("offset", &self.offset.to_string());
        query.finish()
    }
}

/// List responses come bare or wrapped in `items` / `data`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Items { items: Vec<T> },
    Data { data: Vec<T> },
    Bare(Vec<T>),
}

impl<T> ListPayload<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListPayload::Items { items } => items,
            ListPayload::Data { data } => data,
            ListPayload::Bare(list) => list,
        }
    }
}

fn require(field: &str, value: Option<&String>) -> Result<(), ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(missing(field)),
    }
}

fn missing(field: &str) -> ApiError {
    ApiError::Validation(format!("el campo '{field}' es obligatorio"))
}
