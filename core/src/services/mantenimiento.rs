use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, RequestOptions};
use crate::services::{check_status, parse_list, ResourceService};
use crate::transport::Transport;
use crate::types::{ListQuery, Mantenimiento, MantenimientoFields};

const COLLECTION: &str = "/mantenimiento";

/// Maintenance records. The backend assigns ids, so create takes only the
/// fields.
#[derive(Debug)]
pub struct MantenimientoService<'a, T> {
    api: &'a ApiClient<T>,
}

impl<'a, T: Transport> MantenimientoService<'a, T> {
    pub fn new(api: &'a ApiClient<T>) -> Self {
        Self { api }
    }
}

impl<T: Transport> ResourceService for MantenimientoService<'_, T> {
    type Key = i64;
    type Record = Mantenimiento;
    type Create = MantenimientoFields;
    type Update = MantenimientoFields;
    type Query = ListQuery;

    fn list(&self, query: &ListQuery) -> Result<Vec<Mantenimiento>, ApiError> {
        let path = format!("{COLLECTION}?{}", query.to_query_string());
        let response = self.api.request(&path, RequestOptions::get())?;
        parse_list(&check_status(response, "Error al listar mantenimientos")?)
    }

    fn get(&self, id: &i64) -> Result<Mantenimiento, ApiError> {
        let response = self
            .api
            .request(&format!("{COLLECTION}/{id}"), RequestOptions::get())?;
        check_status(response, &format!("No se pudo obtener mantenimiento {id}"))?.json()
    }

    fn create(&self, input: &MantenimientoFields) -> Result<Mantenimiento, ApiError> {
        input.validate()?;
        let response = self.api.send_json(HttpMethod::Post, COLLECTION, input)?;
        check_status(response, "Error al crear mantenimiento")?.json()
    }

    fn update(&self, id: &i64, input: &MantenimientoFields) -> Result<Mantenimiento, ApiError> {
        input.validate()?;
        let response = self
            .api
            .send_json(HttpMethod::Patch, &format!("{COLLECTION}/{id}"), input)?;
        check_status(response, "Error al actualizar mantenimiento")?.json()
    }

    fn delete(&self, id: &i64) -> Result<(), ApiError> {
        let response = self.api.request(
            &format!("{COLLECTION}/{id}"),
            RequestOptions::with_method(HttpMethod::Delete),
        )?;
        check_status(response, "Error al eliminar mantenimiento")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpResponse;
    use crate::services::test_support::api;
    use crate::types::PersonalRef;

    fn cleaning() -> MantenimientoFields {
        MantenimientoFields {
            nu_inventario: Some("A-1".to_string()),
            fecha: Some("2024-05-01".to_string()),
            trabajo: Some("Limpieza".to_string()),
            fallas: Some("Ventilador ruidoso".to_string()),
            estatus: Some("Terminado".to_string()),
            observaciones: None,
            responsable: Some(PersonalRef::Expediente(7)),
        }
    }

    #[test]
    fn create_posts_fields_and_reads_assigned_id() {
        let api = api(|req| {
            let mut record: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            record["id"] = 31.into();
            record["responsable"] = serde_json::json!({"expediente": 7, "paterno": "Ruiz", "nombre": "Ana"});
            HttpResponse::new(201, record.to_string())
        });
        let created = MantenimientoService::new(&api).create(&cleaning()).unwrap();
        assert_eq!(created.id, 31);
        assert_eq!(created.fields.responsable.as_ref().map(PersonalRef::expediente), Some(7));

        let seen = api.transport().seen.lock().unwrap();
        let body: serde_json::Value = serde_json::from_str(seen[0].body.as_deref().unwrap()).unwrap();
        assert!(body.get("id").is_none());
        assert_eq!(body["responsable"], 7);
    }

    #[test]
    fn create_without_fecha_is_rejected_locally() {
        let api = api(|_| HttpResponse::new(201, "{}"));
        let fields = MantenimientoFields {
            fecha: None,
            ..cleaning()
        };
        let err = MantenimientoService::new(&api).create(&fields).unwrap_err();
        assert_eq!(err.to_string(), "el campo 'fecha' es obligatorio");
        assert!(api.transport().seen.lock().unwrap().is_empty());
    }

    #[test]
    fn update_patches_by_id() {
        let api = api(|_| HttpResponse::new(200, r#"{"id":31,"estatus":"Pendiente","responsable":7}"#));
        let updated = MantenimientoService::new(&api).update(&31, &cleaning()).unwrap();
        assert_eq!(updated.fields.estatus.as_deref(), Some("Pendiente"));

        let seen = api.transport().seen.lock().unwrap();
        assert_eq!(seen[0].method, HttpMethod::Patch);
        assert_eq!(seen[0].url, "http://localhost:8000/mantenimiento/31");
    }

    #[test]
    fn delete_missing_is_not_found() {
        let api = api(|_| HttpResponse::new(404, ""));
        assert!(matches!(
            MantenimientoService::new(&api).delete(&31),
            Err(ApiError::NotFound)
        ));
    }

    #[test]
    fn list_decodes_bare_array() {
        let api = api(|_| HttpResponse::new(200, r#"[{"id":1},{"id":2,"estatus":"Abierto"}]"#));
        let found = MantenimientoService::new(&api).list(&ListQuery::default()).unwrap();
        assert_eq!(found.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 2]);
    }
}
