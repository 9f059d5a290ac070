use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, RequestOptions};
use crate::services::{check_status, item_path, parse_list, ResourceService};
use crate::transport::Transport;
use crate::types::{Caracteristicas, CaracteristicasFields, ListQuery};

const COLLECTION: &str = "/caracteristicas";

/// Equipment characteristics, keyed by the equipment's inventory number.
#[derive(Debug)]
pub struct CaracteristicasService<'a, T> {
    api: &'a ApiClient<T>,
}

impl<'a, T: Transport> CaracteristicasService<'a, T> {
    pub fn new(api: &'a ApiClient<T>) -> Self {
        Self { api }
    }
}

impl<T: Transport> ResourceService for CaracteristicasService<'_, T> {
    type Key = str;
    type Record = Caracteristicas;
    type Create = Caracteristicas;
    type Update = CaracteristicasFields;
    type Query = ListQuery;

    fn list(&self, query: &ListQuery) -> Result<Vec<Caracteristicas>, ApiError> {
        let path = format!("{COLLECTION}?{}", query.to_query_string());
        let response = self.api.request(&path, RequestOptions::get())?;
        parse_list(&check_status(response, "Error al listar características")?)
    }

    fn get(&self, nu_inventario: &str) -> Result<Caracteristicas, ApiError> {
        let response = self
            .api
            .request(&item_path(COLLECTION, nu_inventario), RequestOptions::get())?;
        check_status(
            response,
            &format!("No se pudo obtener características de {nu_inventario}"),
        )?
        .json()
    }

    fn create(&self, input: &Caracteristicas) -> Result<Caracteristicas, ApiError> {
        input.validate()?;
        let response = self.api.send_json(HttpMethod::Post, COLLECTION, input)?;
        check_status(response, "Error al crear característica")?.json()
    }

    fn update(
        &self,
        nu_inventario: &str,
        input: &CaracteristicasFields,
    ) -> Result<Caracteristicas, ApiError> {
        let response =
            self.api
                .send_json(HttpMethod::Patch, &item_path(COLLECTION, nu_inventario), input)?;
        check_status(response, "Error al actualizar característica")?.json()
    }

    fn delete(&self, nu_inventario: &str) -> Result<(), ApiError> {
        let response = self.api.request(
            &item_path(COLLECTION, nu_inventario),
            RequestOptions::with_method(HttpMethod::Delete),
        )?;
        check_status(response, "Error al eliminar característica")?;
        Ok(())
    }
}
