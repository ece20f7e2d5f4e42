//! Decline-curve batch
//!
//! Creates one DCA master, then walks the wells one at a time: fetch the
//! production series, classify it, and for fittable wells request a remote
//! fit and store it as a case under the master. A failing well is recorded
//! and skipped; the batch carries on with the next one.

use super::series::{classify, Classification, Frequency, ProductionSeries, DATE_FORMAT};
use super::Dca;
use crate::error::{AlanaError, Result};
use crate::resource::lookup::record_id;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

/// Forecast horizon sent with every fit, in months
pub const FORECAST_MONTHS: f64 = 420.0;

/// One well of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DcaWell {
    pub well_name: String,
    pub arps_type: String,
    pub primary_forecast_date: String,
}

impl DcaWell {
    /// Parse `NAME:ARPS:YYYY-MM-DD`; the name itself may contain `:`
    pub fn parse(spec: &str) -> Result<Self> {
        let mut parts = spec.rsplitn(3, ':');
        let (Some(date), Some(arps), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(AlanaError::InvalidArgument(format!(
                "'{spec}' is not NAME:ARPS:YYYY-MM-DD"
            )));
        };
        if name.is_empty() || arps.is_empty() {
            return Err(AlanaError::InvalidArgument(format!(
                "'{spec}' is missing a well name or arps type"
            )));
        }
        NaiveDate::parse_from_str(date, DATE_FORMAT)
            .map_err(|e| AlanaError::InvalidArgument(format!("'{date}' is not a date: {e}")))?;

        Ok(Self {
            well_name: name.to_string(),
            arps_type: arps.to_string(),
            primary_forecast_date: date.to_string(),
        })
    }
}

/// Batch request
#[derive(Debug, Clone)]
pub struct DcaBatch {
    /// Name of the DCA master to create
    pub name: String,
    pub frequency: Frequency,
    pub wells: Vec<DcaWell>,
    /// Extra master fields (`dca_method`, `forecast_type`, ...)
    pub master_fields: Value,
}

/// A well that errored during the batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WellFailure {
    pub well_name: String,
    pub error: String,
}

/// Wells per bucket, in input order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DcaBatchReport {
    pub master_id: i64,
    pub fitted: Vec<String>,
    pub insufficient_history: Vec<String>,
    pub no_recent_production: Vec<String>,
    pub failed: Vec<WellFailure>,
}

impl DcaBatchReport {
    pub fn total(&self) -> usize {
        self.fitted.len()
            + self.insufficient_history.len()
            + self.no_recent_production.len()
            + self.failed.len()
    }
}

enum WellOutcome {
    Fitted,
    InsufficientHistory,
    NoRecentProduction,
}

/// Fit request for one well: the server template plus this well's series
pub fn fit_request(template: &Value, well: &DcaWell, trimmed: &ProductionSeries, last_rate: f64) -> Result<Value> {
    let mut request = template
        .as_object()
        .cloned()
        .ok_or_else(|| AlanaError::malformed("dca fit template", "template is not a JSON object"))?;

    let x_selected = trimmed.date_strings();
    let last_date = x_selected.last().cloned().unwrap_or_default();

    request.insert("arps_type".into(), json!(well.arps_type));
    request.insert("x_selected".into(), json!(x_selected));
    request.insert("y_selected".into(), json!(trimmed.rates));
    request.insert("primary_phase_forecast_rate".into(), json!(last_rate));
    request.insert("forecast_months".into(), json!(FORECAST_MONTHS));
    request.insert("primary_forecast_date".into(), json!(well.primary_forecast_date));
    request.insert("primary_forecast_last_date".into(), json!(last_date));
    request.insert("primary_phase_abandonment".into(), json!(0.0));
    request.insert("fit_dates".into(), json!(x_selected));
    request.insert("reinitialize_choice".into(), json!("NO"));
    request.insert("fc_date_choice".into(), json!("DEFAULT"));
    request.insert("fc_rate_choice".into(), json!("LASTVALFIT"));

    Ok(Value::Object(request))
}

/// Run a batch; only template fetch and master creation abort it
pub async fn run_batch(dca: &Dca<'_>, batch: DcaBatch) -> Result<DcaBatchReport> {
    if batch.wells.is_empty() {
        return Err(AlanaError::InvalidArgument("a DCA batch needs at least one well".into()));
    }

    let template = dca.fit_template().await?;
    if !template.is_object() {
        return Err(AlanaError::malformed("dca fit template", "template is not a JSON object"));
    }

    let mut master = match &batch.master_fields {
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        _ => {
            return Err(AlanaError::InvalidArgument(
                "DCA master fields must be a JSON object".into(),
            ))
        },
    };
    master.insert("name".into(), json!(batch.name));

    let created = dca.masters()?.create_master(&Value::Object(master)).await?;
    let master_id = created
        .get("id")
        .and_then(record_id)
        .ok_or_else(|| AlanaError::malformed("dcamaster", "create response carries no id"))?;

    info!(
        "DCA batch '{}': master {} with {} {} wells",
        batch.name,
        master_id,
        batch.wells.len(),
        batch.frequency
    );

    let mut report = DcaBatchReport {
        master_id,
        ..Default::default()
    };

    for well in &batch.wells {
        match run_well(dca, &template, master_id, well, batch.frequency).await {
            Ok(WellOutcome::Fitted) => report.fitted.push(well.well_name.clone()),
            Ok(WellOutcome::InsufficientHistory) => report.insufficient_history.push(well.well_name.clone()),
            Ok(WellOutcome::NoRecentProduction) => report.no_recent_production.push(well.well_name.clone()),
            Err(e) => {
                warn!("DCA batch '{}': well {} failed: {}", batch.name, well.well_name, e);
                report.failed.push(WellFailure {
                    well_name: well.well_name.clone(),
                    error: e.to_string(),
                });
            },
        }
    }

    info!(
        "DCA batch '{}': {} fitted, {} insufficient history, {} without recent production, {} failed",
        batch.name,
        report.fitted.len(),
        report.insufficient_history.len(),
        report.no_recent_production.len(),
        report.failed.len()
    );

    Ok(report)
}

async fn run_well(
    dca: &Dca<'_>,
    template: &Value,
    master_id: i64,
    well: &DcaWell,
    frequency: Frequency,
) -> Result<WellOutcome> {
    let well_id = dca.client().resolve_id("wellmaster", &well.well_name).await?;
    let series = dca.production(&well.well_name, frequency).await?;

    match classify(&series, frequency) {
        Classification::InsufficientHistory => Ok(WellOutcome::InsufficientHistory),
        Classification::NoRecentProduction => Ok(WellOutcome::NoRecentProduction),
        Classification::Fittable(trimmed) => {
            let last_rate = series.last_rate().unwrap_or(0.0);
            let request = fit_request(template, well, &trimmed, last_rate)?;
            let fit = dca.fit_forecast(&request).await?;
            dca.save_case(master_id, well_id, &request, &fit).await?;
            Ok(WellOutcome::Fitted)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_spec() {
        let well = DcaWell::parse("PAD-1:W:2:HYPE:2024-01-01").unwrap();
        assert_eq!(well.well_name, "PAD-1:W:2");
        assert_eq!(well.arps_type, "HYPE");
        assert_eq!(well.primary_forecast_date, "2024-01-01");

        assert!(DcaWell::parse("W1:HYPE").is_err());
        assert!(DcaWell::parse("W1:HYPE:tomorrow").is_err());
        assert!(DcaWell::parse(":HYPE:2024-01-01").is_err());
    }

    #[test]
    fn test_fit_request_fills_template() {
        let template = json!({"arps_type": "EXP", "forecast_months": 12, "dca_units": "bbl"});
        let well = DcaWell::parse("W1:HYPE:2024-01-01").unwrap();
        let trimmed = ProductionSeries::new(
            vec![
                NaiveDate::from_ymd_opt(2023, 11, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
            ],
            vec![120.0, 110.0],
        )
        .unwrap();

        let request = fit_request(&template, &well, &trimmed, 0.0).unwrap();
        assert_eq!(request["arps_type"], "HYPE");
        assert_eq!(request["forecast_months"], 420.0);
        assert_eq!(request["dca_units"], "bbl");
        assert_eq!(request["x_selected"], json!(["2023-11-01", "2023-12-01"]));
        assert_eq!(request["y_selected"], json!([120.0, 110.0]));
        assert_eq!(request["primary_forecast_last_date"], "2023-12-01");
        assert_eq!(request["primary_phase_forecast_rate"], 0.0);
        assert_eq!(request["fc_rate_choice"], "LASTVALFIT");

        // template itself is untouched
        assert_eq!(template["arps_type"], "EXP");
    }

    #[test]
    fn test_fit_request_rejects_non_object_template() {
        let well = DcaWell::parse("W1:HYPE:2024-01-01").unwrap();
        let err = fit_request(&json!([]), &well, &ProductionSeries::default(), 1.0).unwrap_err();
        assert!(matches!(err, AlanaError::MalformedResponse { .. }));
    }

    #[test]
    fn test_report_total() {
        let report = DcaBatchReport {
            master_id: 1,
            fitted: vec!["A".into()],
            insufficient_history: vec!["B".into()],
            no_recent_production: vec![],
            failed: vec![WellFailure {
                well_name: "C".into(),
                error: "boom".into(),
            }],
        };
        assert_eq!(report.total(), 3);
    }
}
