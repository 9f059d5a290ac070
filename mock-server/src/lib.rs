use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const DEFAULT_API_KEY: &str = "dev_key_change_me";

/// The four collections the admin backend serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Personal,
    Recursos,
    Caracteristicas,
    Mantenimiento,
}

impl Collection {
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "personal" => Some(Collection::Personal),
            "recursos_m" => Some(Collection::Recursos),
            "caracteristicas" => Some(Collection::Caracteristicas),
            "mantenimiento" => Some(Collection::Mantenimiento),
            _ => None,
        }
    }

    pub fn key_field(self) -> &'static str {
        match self {
            Collection::Personal => "expediente",
            Collection::Recursos | Collection::Caracteristicas => "nu_inventario",
            Collection::Mantenimiento => "id",
        }
    }

    /// Fields a create must carry besides the key.
    fn required(self) -> &'static [&'static str] {
        match self {
            Collection::Personal => &["paterno", "nombre"],
            Collection::Recursos => &["nu_NSAR", "marca", "modelo"],
            Collection::Caracteristicas => &[],
            Collection::Mantenimiento => &["nu_inventario", "fecha", "trabajo", "fallas", "estatus", "responsable"],
        }
    }

    /// Fields holding an `expediente` that responses expand into the
    /// personnel record.
    fn personal_refs(self) -> &'static [&'static str] {
        match self {
            Collection::Recursos => &["expediente_resguardo"],
            Collection::Mantenimiento => &["responsable"],
            _ => &[],
        }
    }
}

/// Which credential placements the server accepts.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub api_key: String,
    /// When false, `?api_key=` is ignored and only `X-API-KEY` counts.
    pub accept_query_key: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: DEFAULT_API_KEY.to_string(),
            accept_query_key: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct Tables {
    records: HashMap<Collection, Vec<Value>>,
    next_id: i64,
}

pub type Db = Arc<RwLock<Tables>>;

#[derive(Clone)]
pub struct AppState {
    auth: Arc<AuthConfig>,
    db: Db,
}

pub fn app() -> Router {
    app_with(AuthConfig::default())
}

pub fn app_with(auth: AuthConfig) -> Router {
    let state = AppState {
        auth: Arc::new(auth),
        db: Db::default(),
    };
    Router::new()
        .route("/{collection}", get(list_records).post(create_record))
        .route(
            "/{collection}/{key}",
            get(get_record)
                .put(update_record)
                .patch(update_record)
                .delete(delete_record),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
}

pub async fn run(listener: TcpListener, auth: AuthConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(auth)).await
}

fn error(status: StatusCode, detail: impl Into<String>) -> Response {
    (status, Json(json!({ "detail": detail.into() }))).into_response()
}

type HandlerResult<T> = Result<T, Response>;

async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let expected = state.auth.api_key.as_str();
    let by_header = request
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        == Some(expected);
    let by_query = state.auth.accept_query_key
        && Query::<HashMap<String, String>>::try_from_uri(request.uri())
            .map(|Query(params)| params.get("api_key").map(String::as_str) == Some(expected))
            .unwrap_or(false);

    if by_header || by_query {
        return next.run(request).await;
    }
    tracing::warn!(method = %request.method(), path = request.uri().path(), "rejected request without a valid API key");
    error(StatusCode::UNAUTHORIZED, "API key inválida o ausente")
}

fn collection(segment: &str) -> HandlerResult<Collection> {
    Collection::from_segment(segment)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, format!("Colección desconocida: {segment}")))
}

/// Keys compare by their text form, so `7` and `"7"` address the same record.
pub fn key_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Case-insensitive substring match over a record's scalar fields.
pub fn matches_query(record: &Value, q: &str) -> bool {
    let q = q.to_lowercase();
    record
        .as_object()
        .map(|fields| {
            fields.values().any(|v| match v {
                Value::String(s) => s.to_lowercase().contains(&q),
                Value::Number(n) => n.to_string().contains(&q),
                _ => false,
            })
        })
        .unwrap_or(false)
}

fn find(records: &[Value], key_field: &str, key: &str) -> Option<usize> {
    records
        .iter()
        .position(|r| r.get(key_field).and_then(key_string).as_deref() == Some(key))
}

/// A record as the API returns it: personnel references expanded.
fn present(tables: &Tables, collection: Collection, record: &Value) -> Value {
    let mut out = record.clone();
    let personal = tables.records.get(&Collection::Personal);
    for field in collection.personal_refs() {
        let Some(expediente) = out.get(*field).and_then(key_string) else {
            continue;
        };
        let found = personal.and_then(|rows| find(rows, "expediente", &expediente).map(|i| &rows[i]));
        if let Some(person) = found {
            out[*field] = person.clone();
        }
    }
    out
}

fn body_object(body: Value) -> HandlerResult<Map<String, Value>> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(error(StatusCode::UNPROCESSABLE_ENTITY, "Se esperaba un objeto JSON")),
    }
}

#[derive(Debug, Deserialize)]
struct ListParams {
    skip: Option<usize>,
    offset: Option<usize>,
    limit: Option<usize>,
    q: Option<String>,
}

async fn list_records(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Query(params): Query<ListParams>,
) -> HandlerResult<Json<Vec<Value>>> {
    let collection = collection(&segment)?;
    let tables = state.db.read().await;
    let rows = tables.records.get(&collection).map(Vec::as_slice).unwrap_or_default();
    let q = params.q.as_deref().unwrap_or("").trim();
    let page = rows
        .iter()
        .filter(|r| q.is_empty() || matches_query(r, q))
        .skip(params.skip.or(params.offset).unwrap_or(0))
        .take(params.limit.unwrap_or(50))
        .map(|r| present(&tables, collection, r))
        .collect();
    Ok(Json(page))
}

async fn create_record(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Json(body): Json<Value>,
) -> HandlerResult<(StatusCode, Json<Value>)> {
    let collection = collection(&segment)?;
    let mut record = body_object(body)?;
    let key_field = collection.key_field();

    for field in collection.required() {
        if record.get(*field).and_then(key_string).is_none() {
            return Err(error(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("El campo '{field}' es obligatorio"),
            ));
        }
    }

    let mut tables = state.db.write().await;
    if collection == Collection::Mantenimiento {
        tables.next_id += 1;
        record.insert(key_field.to_string(), json!(tables.next_id));
    }
    let Some(key) = record.get(key_field).and_then(key_string) else {
        return Err(error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("El campo '{key_field}' es obligatorio"),
        ));
    };

    let rows = tables.records.entry(collection).or_default();
    if find(rows, key_field, &key).is_some() {
        return Err(error(StatusCode::CONFLICT, format!("El registro {key} ya existe")));
    }
    let record = Value::Object(record);
    rows.push(record.clone());
    tracing::debug!(collection = ?collection, key = %key, "record created");
    Ok((StatusCode::CREATED, Json(present(&tables, collection, &record))))
}

async fn get_record(
    State(state): State<AppState>,
    Path((segment, key)): Path<(String, String)>,
) -> HandlerResult<Json<Value>> {
    let collection = collection(&segment)?;
    let tables = state.db.read().await;
    let rows = tables.records.get(&collection).map(Vec::as_slice).unwrap_or_default();
    let index = find(rows, collection.key_field(), &key)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, format!("No existe el registro {key}")))?;
    Ok(Json(present(&tables, collection, &rows[index])))
}

/// PUT replaces every field but the key; PATCH merges the fields sent.
async fn update_record(
    State(state): State<AppState>,
    method: Method,
    Path((segment, key)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> HandlerResult<Json<Value>> {
    let collection = collection(&segment)?;
    let mut changes = body_object(body)?;
    let key_field = collection.key_field();

    let mut tables = state.db.write().await;
    let rows = tables.records.entry(collection).or_default();
    let index = find(rows, key_field, &key)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, format!("No existe el registro {key}")))?;

    let key_value = rows[index][key_field].clone();
    changes.remove(key_field);
    let updated = if method == Method::PUT {
        let mut replaced = changes;
        replaced.insert(key_field.to_string(), key_value);
        Value::Object(replaced)
    } else {
        let mut merged = rows[index].as_object().cloned().unwrap_or_default();
        merged.extend(changes);
        Value::Object(merged)
    };
    rows[index] = updated.clone();
    Ok(Json(present(&tables, collection, &updated)))
}

async fn delete_record(
    State(state): State<AppState>,
    Path((segment, key)): Path<(String, String)>,
) -> HandlerResult<StatusCode> {
    let collection = collection(&segment)?;
    let mut tables = state.db.write().await;
    let rows = tables.records.entry(collection).or_default();
    let index = find(rows, collection.key_field(), &key)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, format!("No existe el registro {key}")))?;
    rows.remove(index);
    Ok(StatusCode::NO_CONTENT)
}
