use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, RequestOptions};
use crate::services::{check_status, item_path, parse_list, ResourceService};
use crate::transport::Transport;
use crate::types::{ListQuery, Recurso, RecursoFields, ResguardoGroup};

const COLLECTION: &str = "/recursos_m";

const SEARCH_LIMIT: u32 = 100;

/// Material resources, keyed by inventory number.
#[derive(Debug)]
pub struct RecursosService<'a, T> {
    api: &'a ApiClient<T>,
}

impl<'a, T: Transport> RecursosService<'a, T> {
    pub fn new(api: &'a ApiClient<T>) -> Self {
        Self { api }
    }

    /// Server-side search, grouped by custodian in first-seen order.
    pub fn search(&self, q: &str) -> Result<Vec<ResguardoGroup>, ApiError> {
        let q = q.trim();
        if q.is_empty() {
            return Err(ApiError::Validation(
                "Ingresa nombre o expediente para buscar".to_string(),
            ));
        }
        let found = self.list(&ListQuery::search(q, SEARCH_LIMIT))?;
        Ok(group_by_resguardo(found))
    }
}

/// Resources sharing a custodian `expediente` land in one group; resources
/// with no custodian share a `holder: None` group.
pub(crate) fn group_by_resguardo(recursos: Vec<Recurso>) -> Vec<ResguardoGroup> {
    let mut groups: Vec<ResguardoGroup> = Vec::new();
    for recurso in recursos {
        let key = recurso.fields.expediente_resguardo.as_ref().map(|r| r.expediente());
        match groups
            .iter_mut()
            .find(|g| g.holder.as_ref().map(|h| h.expediente()) == key)
        {
            Some(group) => group.recursos.push(recurso),
            None => groups.push(ResguardoGroup {
                holder: recurso.fields.expediente_resguardo.clone(),
                recursos: vec![recurso],
            }),
        }
    }
    groups
}

impl<T: Transport> ResourceService for RecursosService<'_, T> {
    type Key = str;
    type Record = Recurso;
    type Create = Recurso;
    type Update = RecursoFields;
    type Query = ListQuery;

    fn list(&self, query: &ListQuery) -> Result<Vec<Recurso>, ApiError> {
        let path = format!("{COLLECTION}?{}", query.to_query_string());
        let response = self.api.request(&path, RequestOptions::get())?;
        parse_list(&check_status(response, "Error al listar recursos")?)
    }

    fn get(&self, nu_inventario: &str) -> Result<Recurso, ApiError> {
        let response = self
            .api
            .request(&item_path(COLLECTION, nu_inventario), RequestOptions::get())?;
        check_status(
            response,
            &format!("No se pudo obtener el recurso {nu_inventario}"),
        )?
        .json()
    }

    fn create(&self, input: &Recurso) -> Result<Recurso, ApiError> {
        input.validate()?;
        let response = self.api.send_json(HttpMethod::Post, COLLECTION, input)?;
        check_status(response, "Error al crear recurso")?.json()
    }

    fn update(&self, nu_inventario: &str, input: &RecursoFields) -> Result<Recurso, ApiError> {
        input.validate()?;
        let response =
            self.api
                .send_json(HttpMethod::Patch, &item_path(COLLECTION, nu_inventario), input)?;
        check_status(response, "Error al actualizar recurso")?.json()
    }

    fn delete(&self, nu_inventario: &str) -> Result<(), ApiError> {
        let response = self.api.request(
            &item_path(COLLECTION, nu_inventario),
            RequestOptions::with_method(HttpMethod::Delete),
        )?;
        check_status(response, "Error al eliminar recurso")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpResponse;
    use crate::services::test_support::api;
    use crate::types::PersonalRef;

    const LISTING: &str = r#"{"items":[
        {"nu_inventario":"A-1","nu_NSAR":"N1","marca":"HP","modelo":"ProBook","serie":"S1",
         "expediente_resguardo":{"expediente":7,"paterno":"Ruiz","nombre":"Ana","cargo":"Jefa"}},
        {"nu_inventario":"A-2","nu_NSAR":"N2","marca":"Dell","modelo":"Latitude","serie":"S2",
         "expediente_resguardo":null},
        {"nu_inventario":"A-3","nu_NSAR":"N3","marca":"Lenovo","modelo":"T14","serie":"S3",
         "expediente_resguardo":7}
    ],"total":3}"#;

    fn laptop() -> Recurso {
        Recurso {
            nu_inventario: "A-9".to_string(),
            fields: RecursoFields {
                nu_nsar: "N9".to_string(),
                marca: "HP".to_string(),
                modelo: "EliteBook".to_string(),
                serie: "S9".to_string(),
                expediente_resguardo: Some(PersonalRef::Expediente(7)),
                ..RecursoFields::default()
            },
        }
    }

    #[test]
    fn list_sends_q_limit_offset() {
        let api = api(|_| HttpResponse::new(200, LISTING));
        let found = RecursosService::new(&api)
            .list(&ListQuery {
                q: "hp".to_string(),
                limit: 20,
                offset: 40,
            })
            .unwrap();
        assert_eq!(found.len(), 3);
        let seen = api.transport().seen.lock().unwrap();
        assert_eq!(
            seen[0].url,
            "http://localhost:8000/recursos_m?q=hp&limit=20&offset=40&api_key=abc"
        );
    }

    #[test]
    fn list_without_q_omits_it() {
        let api = api(|_| HttpResponse::new(200, "[]"));
        assert!(RecursosService::new(&api).list(&ListQuery::default()).unwrap().is_empty());
        let seen = api.transport().seen.lock().unwrap();
        assert_eq!(
            seen[0].url,
            "http://localhost:8000/recursos_m?limit=50&offset=0&api_key=abc"
        );
    }

    #[test]
    fn update_patches_encoded_key() {
        let api = api(|req| {
            let mut record: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            record["nu_inventario"] = "INV 01".into();
            HttpResponse::new(200, record.to_string())
        });
        let updated = RecursosService::new(&api).update("INV 01", &laptop().fields).unwrap();
        assert_eq!(updated.nu_inventario, "INV 01");
        assert_eq!(updated.fields.expediente_resguardo, Some(PersonalRef::Expediente(7)));

        let seen = api.transport().seen.lock().unwrap();
        assert_eq!(seen[0].method, HttpMethod::Patch);
        assert_eq!(seen[0].url, "http://localhost:8000/recursos_m/INV%2001");
    }

    #[test]
    fn create_requires_marca_and_modelo() {
        let api = api(|_| HttpResponse::new(201, "{}"));
        let mut input = laptop();
        input.fields.modelo.clear();
        assert!(matches!(
            RecursosService::new(&api).create(&input),
            Err(ApiError::Validation(_))
        ));
        assert!(api.transport().seen.lock().unwrap().is_empty());
    }

    #[test]
    fn delete_failure_uses_fallback_message() {
        let api = api(|_| HttpResponse::new(500, ""));
        let err = RecursosService::new(&api).delete("A-1").unwrap_err();
        assert_eq!(err.to_string(), "Error al eliminar recurso: 500");
    }

    #[test]
    fn search_groups_by_custodian() {
        let api = api(|_| HttpResponse::new(200, LISTING));
        let groups = RecursosService::new(&api).search("a").unwrap();
        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].holder.as_ref().map(PersonalRef::expediente), Some(7));
        let inv: Vec<_> = groups[0].recursos.iter().map(|r| r.nu_inventario.as_str()).collect();
        assert_eq!(inv, vec!["A-1", "A-3"]);
        assert!(matches!(groups[0].holder, Some(PersonalRef::Embedded(_))));

        assert!(groups[1].holder.is_none());
        assert_eq!(groups[1].recursos[0].nu_inventario, "A-2");

        let seen = api.transport().seen.lock().unwrap();
        assert!(seen[0].url.contains("q=a&limit=100&offset=0"));
    }

    #[test]
    fn search_rejects_blank_query() {
        let api = api(|_| HttpResponse::new(200, LISTING));
        assert!(matches!(
            RecursosService::new(&api).search(""),
            Err(ApiError::Validation(_))
        ));
    }
}
