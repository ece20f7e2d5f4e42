//! Economics facade

use crate::api::client::AlanaClient;
use crate::error::{AlanaError, Result};
use crate::resource::crud::Resource;
use serde_json::Value;

const RUN_ECONOMICS_PATH: &str = "/api/economics/runeconomics/";

pub struct Economics<'a> {
    client: &'a AlanaClient,
}

impl<'a> Economics<'a> {
    pub fn new(client: &'a AlanaClient) -> Self {
        Self { client }
    }

    /// Run the economic evaluation described by `params`
    pub async fn run(&self, params: &Value) -> Result<Value> {
        match params.as_object() {
            Some(map) if !map.is_empty() => {},
            _ => {
                return Err(AlanaError::InvalidArgument(
                    "economics run needs a non-empty parameter object".into(),
                ))
            },
        }
        self.client.session().get(RUN_ECONOMICS_PATH, Some(params)).await
    }

    pub fn models(&self) -> Result<Resource<'a>> {
        self.client.resource("economicmaster")
    }

    pub fn forecasts(&self) -> Result<Resource<'a>> {
        self.client.resource("economicforecastmaster")
    }

    pub fn scenarios(&self) -> Result<Resource<'a>> {
        self.client.resource("economicscenario")
    }

    pub fn capex(&self) -> Result<Resource<'a>> {
        self.client.resource("capexmaster")
    }

    pub fn opex(&self) -> Result<Resource<'a>> {
        self.client.resource("opexmaster")
    }

    pub fn price_decks(&self) -> Result<Resource<'a>> {
        self.client.resource("pricedeck")
    }

    pub fn abandonment(&self) -> Result<Resource<'a>> {
        self.client.resource("abandonmentmaster")
    }

    pub async fn create_forecast_and_cases(&self, master: &Value, cases: Vec<Value>) -> Result<(Value, Value)> {
        self.forecasts()?.create_master_then_cases(master, cases).await
    }

    pub async fn create_scenario_and_cases(&self, master: &Value, cases: Vec<Value>) -> Result<(Value, Value)> {
        self.scenarios()?.create_master_then_cases(master, cases).await
    }

    pub async fn create_capex_and_cases(&self, master: &Value, cases: Vec<Value>) -> Result<(Value, Value)> {
        self.capex()?.create_master_then_cases(master, cases).await
    }

    pub async fn create_opex_and_cases(&self, master: &Value, cases: Vec<Value>) -> Result<(Value, Value)> {
        self.opex()?.create_master_then_cases(master, cases).await
    }

    pub async fn create_price_deck_and_cases(&self, master: &Value, cases: Vec<Value>) -> Result<(Value, Value)> {
        self.price_decks()?.create_master_then_cases(master, cases).await
    }

    pub async fn create_model_and_cases(&self, master: &Value, cases: Vec<Value>) -> Result<(Value, Value)> {
        self.models()?.create_master_then_cases(master, cases).await
    }
}
