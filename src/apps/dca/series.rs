//! Production series and the pre-fit classification rules

use crate::error::{AlanaError, Result};
use crate::resource::lookup::records_of;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Date format of production records
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Rate column read when none is given
pub const DEFAULT_RATE_FIELD: &str = "oil_rate";

const MONTHLY_FIT_WINDOW: usize = 60;
const MONTHLY_RECENT_WINDOW: usize = 6;
const DAYS_PER_MONTH: f64 = 30.5;

/// Sampling of a production table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Monthly,
    Daily,
}

impl Frequency {
    /// Trailing periods considered for a fit
    pub fn fit_window(self) -> usize {
        match self {
            Self::Monthly => MONTHLY_FIT_WINDOW,
            Self::Daily => (MONTHLY_FIT_WINDOW as f64 * DAYS_PER_MONTH) as usize,
        }
    }

    /// Trailing periods that must show production
    pub fn recent_window(self) -> usize {
        match self {
            Self::Monthly => MONTHLY_RECENT_WINDOW,
            Self::Daily => (MONTHLY_RECENT_WINDOW as f64 * DAYS_PER_MONTH) as usize,
        }
    }

    /// Catalog key of the production table
    pub fn table_key(self) -> &'static str {
        match self {
            Self::Monthly => "wellmonthly",
            Self::Daily => "welldaily",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monthly => write!(f, "monthly"),
            Self::Daily => write!(f, "daily"),
        }
    }
}

impl FromStr for Frequency {
    type Err = AlanaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "daily" => Ok(Self::Daily),
            other => Err(AlanaError::InvalidArgument(format!(
                "unknown frequency '{other}' (expected monthly or daily)"
            ))),
        }
    }
}

/// Dated rates of one well, in server order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductionSeries {
    pub dates: Vec<NaiveDate>,
    pub rates: Vec<f64>,
}

impl ProductionSeries {
    pub fn new(dates: Vec<NaiveDate>, rates: Vec<f64>) -> Result<Self> {
        if dates.len() != rates.len() {
            return Err(AlanaError::InvalidArgument(format!(
                "{} dates but {} rates",
                dates.len(),
                rates.len()
            )));
        }
        Ok(Self { dates, rates })
    }

    /// Parse a production response; missing or null rates read as zero
    pub fn from_records(response: &Value, rate_field: &str) -> Result<Self> {
        let records = records_of(response)
            .ok_or_else(|| AlanaError::malformed("production series", "response is not a record list"))?;

        let mut series = Self::default();
        for record in records {
            let date = record
                .get("date")
                .and_then(|d| d.as_str())
                .ok_or_else(|| AlanaError::malformed("production series", "record without a date"))?;
            let date = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|e| {
                AlanaError::malformed("production series", format!("bad date '{date}': {e}"))
            })?;
            let rate = record.get(rate_field).and_then(|r| r.as_f64()).unwrap_or(0.0);

            series.dates.push(date);
            series.rates.push(rate);
        }
        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn last_rate(&self) -> Option<f64> {
        self.rates.last().copied()
    }

    /// Trailing `window` points with zero rates removed
    pub fn trim(&self, window: usize) -> Self {
        let start = self.len().saturating_sub(window);
        let (dates, rates) = self.dates[start..]
            .iter()
            .zip(&self.rates[start..])
            .filter(|(_, rate)| **rate != 0.0)
            .map(|(d, r)| (*d, *r))
            .unzip();
        Self { dates, rates }
    }

    /// Sum of the last `window` raw rates
    pub fn recent_sum(&self, window: usize) -> f64 {
        let start = self.len().saturating_sub(window);
        self.rates[start..].iter().sum()
    }

    pub fn date_strings(&self) -> Vec<String> {
        self.dates
            .iter()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .collect()
    }
}

/// Outcome of the pre-fit checks
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// One usable point or fewer after trimming
    InsufficientHistory,
    /// Latest periods sum to zero or less
    NoRecentProduction,
    /// Trimmed series ready to send for fitting
    Fittable(ProductionSeries),
}

/// Sort a well into its batch bucket
pub fn classify(series: &ProductionSeries, frequency: Frequency) -> Classification {
    let trimmed = series.trim(frequency.fit_window());
    if trimmed.len() <= 1 {
        Classification::InsufficientHistory
    } else if series.recent_sum(frequency.recent_window()) <= 0.0 {
        Classification::NoRecentProduction
    } else {
        Classification::Fittable(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn monthly(rates: &[f64]) -> ProductionSeries {
        let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let dates = (0..rates.len())
            .map(|i| start + chrono::Months::new(i as u32))
            .collect();
        ProductionSeries::new(dates, rates.to_vec()).unwrap()
    }

    #[test]
    fn test_windows() {
        assert_eq!(Frequency::Monthly.fit_window(), 60);
        assert_eq!(Frequency::Monthly.recent_window(), 6);
        assert_eq!(Frequency::Daily.fit_window(), 1830);
        assert_eq!(Frequency::Daily.recent_window(), 183);
    }

    #[test]
    fn test_frequency_parse() {
        assert_eq!("Monthly".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert_eq!("daily".parse::<Frequency>().unwrap(), Frequency::Daily);
        assert!("weekly".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_from_records_reads_envelope_and_nulls() {
        let response = json!({"data": [
            {"date": "2020-01-01", "oil_rate": 10.5, "well_name": "W1"},
            {"date": "2020-02-01", "oil_rate": null},
            {"date": "2020-03-01"}
        ]});
        let series = ProductionSeries::from_records(&response, DEFAULT_RATE_FIELD).unwrap();
        assert_eq!(series.rates, vec![10.5, 0.0, 0.0]);
        assert_eq!(series.date_strings()[1], "2020-02-01");
    }

    #[test]
    fn test_from_records_rejects_bad_dates() {
        let response = json!([{"date": "01/02/2020", "oil_rate": 1.0}]);
        let err = ProductionSeries::from_records(&response, DEFAULT_RATE_FIELD).unwrap_err();
        assert!(matches!(err, AlanaError::MalformedResponse { .. }));
    }

    #[test]
    fn test_trim_keeps_trailing_window_without_zeros() {
        let series = monthly(&[5.0, 0.0, 3.0, 0.0, 2.0]);
        let trimmed = series.trim(4);
        assert_eq!(trimmed.rates, vec![3.0, 2.0]);
        assert_eq!(trimmed.dates.len(), 2);
    }

    #[test]
    fn test_single_point_is_insufficient_history() {
        let series = monthly(&[0.0, 0.0, 12.0]);
        assert_eq!(classify(&series, Frequency::Monthly), Classification::InsufficientHistory);
        assert_eq!(classify(&monthly(&[]), Frequency::Monthly), Classification::InsufficientHistory);
    }

    #[test]
    fn test_zero_recent_sum_is_no_recent_production() {
        let mut rates = vec![100.0, 90.0, 80.0];
        rates.extend([0.0; 6]);
        assert_eq!(
            classify(&monthly(&rates), Frequency::Monthly),
            Classification::NoRecentProduction
        );
    }

    #[test]
    fn test_positive_recent_sum_is_fittable() {
        let series = monthly(&[100.0, 0.0, 80.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        match classify(&series, Frequency::Monthly) {
            Classification::Fittable(trimmed) => assert_eq!(trimmed.rates, vec![100.0, 80.0, 1.0]),
            other => panic!("expected fittable, got {other:?}"),
        }
    }
}
