//! Decline-curve analysis
//!
//! Fitting and forecasting happen on the server; this module shapes the
//! requests, stores results as DCA cases and drives multi-well batches.
//!
//! # Module Structure
//!
//! - [`series`] - Production series parsing and pre-fit classification
//! - [`batch`] - Sequential multi-well fit orchestration

pub mod batch;
pub mod series;

use crate::api::client::AlanaClient;
use crate::error::{AlanaError, Result};
use crate::resource::crud::Resource;
use batch::{DcaBatch, DcaBatchReport};
use serde_json::{json, Value};
use series::{Frequency, ProductionSeries, DEFAULT_RATE_FIELD};

const FIT_FORECAST_PATH: &str = "/api/dca/fit_forecast/";
const FORECAST_PATH: &str = "/api/dca/forecast/";
const AUTO_DCA_PATH: &str = "/api/dca/auto_dca/";

/// Fit result fields copied onto a saved case
const FIT_RESULT_FIELDS: &[(&str, &str)] = &[
    ("primary_phase_reserves", "oil_reserves"),
    ("gas_reserves", "gas_reserves"),
    ("water_reserves", "water_reserves"),
    ("primary_phase_beta", "primary_phase_beta"),
    ("primary_phase_decline", "primary_phase_decline"),
];

pub struct Dca<'a> {
    client: &'a AlanaClient,
}

impl<'a> Dca<'a> {
    pub fn new(client: &'a AlanaClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &'a AlanaClient {
        self.client
    }

    pub fn masters(&self) -> Result<Resource<'a>> {
        self.client.resource("dcamaster")
    }

    pub fn cases(&self) -> Result<Resource<'a>> {
        self.client.resource("dcacase")
    }

    pub async fn create_master(&self, master: &Value) -> Result<Value> {
        self.masters()?.create_master(master).await
    }

    pub async fn create_cases(&self, cases: Vec<Value>) -> Result<Value> {
        self.cases()?.create_cases(cases).await
    }

    pub async fn create_master_and_cases(&self, master: &Value, cases: Vec<Value>) -> Result<(Value, Value)> {
        self.masters()?.create_master_then_cases(master, cases).await
    }

    /// Cases of the named master
    pub async fn master_cases(&self, master: &str) -> Result<Value> {
        let masters = self.masters()?;
        let id = masters.resolve_id(master).await?;
        masters.get_cases(id).await
    }

    /// Default fit request from the server
    pub async fn fit_template(&self) -> Result<Value> {
        self.client.session().get(FIT_FORECAST_PATH, None).await
    }

    /// Default forecast request from the server
    pub async fn forecast_template(&self) -> Result<Value> {
        self.client.session().get(FORECAST_PATH, None).await
    }

    pub async fn fit_forecast(&self, request: &Value) -> Result<Value> {
        self.client.session().post(FIT_FORECAST_PATH, request).await
    }

    pub async fn forecast(&self, request: &Value) -> Result<Value> {
        self.client.session().post(FORECAST_PATH, request).await
    }

    pub async fn auto_dca(&self, request: &Value) -> Result<Value> {
        self.client.session().post(AUTO_DCA_PATH, request).await
    }

    /// Production series of a well at the given sampling
    pub async fn production(&self, well: &str, frequency: Frequency) -> Result<ProductionSeries> {
        let datasource = self.client.datasource();
        let response = match frequency {
            Frequency::Monthly => datasource.monthly_production(&[well], false, false).await?,
            Frequency::Daily => datasource.daily_production(well).await?,
        };
        ProductionSeries::from_records(&response, DEFAULT_RATE_FIELD)
    }

    /// Store a fit as a case of `master_id`
    pub async fn save_case(&self, master_id: i64, well_id: i64, request: &Value, fit: &Value) -> Result<Value> {
        let case = case_payload(master_id, well_id, request, fit)?;
        let cases = self.cases()?;
        let saved = self
            .client
            .session()
            .post(&cases.def().collection_path(), &case)
            .await?;
        cases.invalidate().await;
        Ok(saved)
    }

    pub async fn run_batch(&self, batch: DcaBatch) -> Result<DcaBatchReport> {
        batch::run_batch(self, batch).await
    }
}

/// Case body built from the fit request and the server's fit result
pub fn case_payload(master_id: i64, well_id: i64, request: &Value, fit: &Value) -> Result<Value> {
    let mut case = request
        .as_object()
        .cloned()
        .ok_or_else(|| AlanaError::InvalidArgument("fit request must be a JSON object".into()))?;
    let fit_obj = fit
        .as_object()
        .ok_or_else(|| AlanaError::malformed("dca fit", "fit result is not a JSON object"))?;

    let required = |key: &str| {
        fit_obj
            .get(key)
            .cloned()
            .ok_or_else(|| AlanaError::malformed("dca fit", format!("missing '{key}'")))
    };

    for (from, to) in FIT_RESULT_FIELDS {
        case.insert((*to).to_string(), required(from)?);
    }

    case.insert("fit_type".into(), json!("AUTO"));
    case.insert("secondary_forecast_type".into(), json!("RATIO"));
    case.insert("water_forecast_type".into(), json!("RATIO"));
    case.insert("secondary_phase_ratio".into(), json!(0.8));
    case.insert("water_phase_ratio".into(), json!(0.8));
    case.insert("primary_plot_layout".into(), Value::Null);
    case.insert("secondary_plot_data".into(), Value::Null);
    case.insert("secondary_plot_layout".into(), Value::Null);
    case.insert("resources".into(), Value::Null);
    case.insert("cumprod".into(), Value::Null);
    case.insert("well_fk".into(), json!(well_id));
    case.insert("dcamaster_fk".into(), json!(master_id));
    case.insert(
        "primary_phase_fit_rate".into(),
        request.get("primary_phase_forecast_rate").cloned().unwrap_or(Value::Null),
    );
    case.insert(
        "primary_plot_data".into(),
        json!({
            "fit": fit_obj.get("fit").cloned().unwrap_or(Value::Null),
            "time_fit": fit_obj.get("time_fit").cloned().unwrap_or(Value::Null),
            "forecast": required("forecast")?,
            "time_forecast": required("time_forecast")?,
            "x_selected": request.get("x_selected").cloned().unwrap_or(Value::Null),
            "y_selected": request.get("y_selected").cloned().unwrap_or(Value::Null),
            "reinitialize_choice": "NO",
            "fc_date_choice": "DEFAULT",
            "fc_rate_choice": "LASTVAL",
        }),
    );

    Ok(Value::Object(case))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit() -> Value {
        json!({
            "primary_phase_reserves": 1000.0,
            "gas_reserves": 10.0,
            "water_reserves": 5.0,
            "primary_phase_beta": 0.7,
            "primary_phase_decline": 0.05,
            "forecast": [100.0, 90.0],
            "time_forecast": ["2024-01-01", "2024-02-01"]
        })
    }

    #[test]
    fn test_case_payload_maps_fit_fields() {
        let request = json!({
            "arps_type": "HYPE",
            "x_selected": ["2023-12-01"],
            "y_selected": [110.0],
            "primary_phase_forecast_rate": 110.0
        });
        let case = case_payload(7, 42, &request, &fit()).unwrap();

        assert_eq!(case["dcamaster_fk"], 7);
        assert_eq!(case["well_fk"], 42);
        assert_eq!(case["oil_reserves"], 1000.0);
        assert_eq!(case["primary_phase_fit_rate"], 110.0);
        assert_eq!(case["arps_type"], "HYPE");
        assert_eq!(case["primary_plot_data"]["fit"], Value::Null);
        assert_eq!(case["primary_plot_data"]["forecast"], json!([100.0, 90.0]));
        assert_eq!(case["primary_plot_data"]["fc_rate_choice"], "LASTVAL");
    }

    #[test]
    fn test_case_payload_requires_reserves() {
        let mut partial = fit();
        partial.as_object_mut().unwrap().remove("gas_reserves");
        let err = case_payload(1, 1, &json!({}), &partial).unwrap_err();
        assert!(matches!(err, AlanaError::MalformedResponse { ref reason, .. } if reason.contains("gas_reserves")));
    }
}
