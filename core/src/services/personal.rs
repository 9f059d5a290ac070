use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, RequestOptions};
use crate::services::{check_status, parse_list, ResourceService};
use crate::transport::Transport;
use crate::types::{Personal, PersonalFields, PersonalPage};

const COLLECTION: &str = "/personal";

/// How many records a name search pulls down before filtering locally.
const SEARCH_LIMIT: u32 = 500;

/// Personnel records, keyed by `expediente`. Updates replace the whole
/// record (PUT).
#[derive(Debug)]
pub struct PersonalService<'a, T> {
    api: &'a ApiClient<T>,
}

impl<'a, T: Transport> PersonalService<'a, T> {
    pub fn new(api: &'a ApiClient<T>) -> Self {
        Self { api }
    }

    /// Look someone up by expediente number or by name.
    ///
    /// An all-digit query is a direct fetch and an unknown expediente gives
    /// an empty result. Anything else lists the first `SEARCH_LIMIT`
    /// records and filters them with [`Personal::matches`].
    pub fn search(&self, q: &str) -> Result<Vec<Personal>, ApiError> {
        let q = q.trim();
        if q.is_empty() {
            return Err(ApiError::Validation(
                "Ingresa un nombre o número de expediente.".to_string(),
            ));
        }

        if q.bytes().all(|b| b.is_ascii_digit()) {
            return match self.fetch(q) {
                Ok(person) => Ok(vec![person]),
                Err(ApiError::NotFound) => Ok(Vec::new()),
                Err(e) => Err(e),
            };
        }

        let all = self.list(&PersonalPage {
            skip: 0,
            limit: SEARCH_LIMIT,
        })?;
        Ok(all.into_iter().filter(|p| p.matches(q)).collect())
    }

    /// GET `/personal/{expediente}` with the expediente exactly as typed, so
    /// leading zeros reach the backend.
    fn fetch(&self, expediente: &str) -> Result<Personal, ApiError> {
        let response = self
            .api
            .request(&format!("{COLLECTION}/{expediente}"), RequestOptions::get())?;
        check_status(
            response,
            &format!("No se pudo obtener el expediente {expediente}"),
        )?
        .json()
    }
}

impl<T: Transport> ResourceService for PersonalService<'_, T> {
    type Key = i64;
    type Record = Personal;
    type Create = Personal;
    type Update = PersonalFields;
    type Query = PersonalPage;

    fn list(&self, page: &PersonalPage) -> Result<Vec<Personal>, ApiError> {
        let path = format!("{COLLECTION}?skip={}&limit={}", page.skip, page.limit);
        let response = self.api.request(&path, RequestOptions::get())?;
        let response = check_status(response, "Error al listar personal")?;
        parse_list(&response)
    }

    fn get(&self, expediente: &i64) -> Result<Personal, ApiError> {
        self.fetch(&expediente.to_string())
    }

    fn create(&self, input: &Personal) -> Result<Personal, ApiError> {
        input.validate()?;
        let response = self.api.send_json(HttpMethod::Post, COLLECTION, input)?;
        check_status(response, "Error al crear personal")?.json()
    }

    fn update(&self, expediente: &i64, input: &PersonalFields) -> Result<Personal, ApiError> {
        input.validate()?;
        let response = self
            .api
            .send_json(HttpMethod::Put, &format!("{COLLECTION}/{expediente}"), input)?;
        check_status(response, "Error al actualizar personal")?.json()
    }

    fn delete(&self, expediente: &i64) -> Result<(), ApiError> {
        let response = self.api.request(
            &format!("{COLLECTION}/{expediente}"),
            RequestOptions::with_method(HttpMethod::Delete),
        )?;
        check_status(response, "Error al eliminar el expediente")?;
        Ok(())
    }
}
