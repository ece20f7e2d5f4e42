//! Forecast facade: masters and their monthly volume cases

use crate::api::client::AlanaClient;
use crate::error::Result;
use crate::resource::crud::Resource;
use serde_json::Value;

pub struct Forecast<'a> {
    client: &'a AlanaClient,
}

impl<'a> Forecast<'a> {
    pub fn new(client: &'a AlanaClient) -> Self {
        Self { client }
    }

    pub fn masters(&self) -> Result<Resource<'a>> {
        self.client.resource("forecastmaster")
    }

    pub fn volumes(&self) -> Result<Resource<'a>> {
        self.client.resource("forecastmonthlyvolume")
    }

    pub async fn create_master_and_volumes(&self, master: &Value, volumes: Vec<Value>) -> Result<(Value, Value)> {
        self.masters()?.create_master_then_cases(master, volumes).await
    }

    /// Monthly volumes of the named forecast
    pub async fn volumes_of(&self, master: &str) -> Result<Value> {
        let masters = self.masters()?;
        let id = masters.resolve_id(master).await?;
        masters.get_cases(id).await
    }
}
