//! Well-type facade

use crate::api::client::AlanaClient;
use crate::error::Result;
use crate::resource::crud::Resource;
use serde_json::Value;

const WELLTYPE_CALC_PATH: &str = "/api/welltype/welltype_calc/";

pub struct WellType<'a> {
    client: &'a AlanaClient,
}

impl<'a> WellType<'a> {
    pub fn new(client: &'a AlanaClient) -> Self {
        Self { client }
    }

    pub fn masters(&self) -> Result<Resource<'a>> {
        self.client.resource("welltypemaster")
    }

    pub fn cases(&self) -> Result<Resource<'a>> {
        self.client.resource("welltypecase")
    }

    pub fn generic_prod_inj(&self) -> Result<Resource<'a>> {
        self.client.resource("genericprodinjmaster")
    }

    pub async fn create_master(&self, master: &Value) -> Result<Value> {
        self.masters()?.create_master(master).await
    }

    pub async fn create_master_and_cases(&self, master: &Value, cases: Vec<Value>) -> Result<(Value, Value)> {
        self.masters()?.create_master_then_cases(master, cases).await
    }

    /// Run the well-type calculation; the server reads its input from a GET body
    pub async fn run(&self, params: &Value) -> Result<Value> {
        self.client.session().get_with_body(WELLTYPE_CALC_PATH, params).await
    }
}
