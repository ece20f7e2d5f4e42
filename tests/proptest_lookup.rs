//! Property-based tests using proptest
//!
//! These tests verify the lookup cache views, foreign key rewriting,
//! query encoding and the decline-curve trimming rules using randomized
//! inputs.

use alana::api::http::add_query_params;
use alana::apps::dca::series::{classify, Classification, Frequency, ProductionSeries};
use alana::resource::fk::rewrite_record;
use alana::resource::{ForeignKeyDef, LookupCache, Table};
use chrono::NaiveDate;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;

/// Generate a record with a small id range so collisions happen often
fn arb_record() -> impl Strategy<Value = Value> {
    (0i64..20, "[A-Z]{1,2}[0-9]?").prop_map(|(id, name)| json!({"id": id, "name": name}))
}

fn arb_records() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(arb_record(), 0..60)
}

/// Rates with plenty of zeros
fn arb_rates(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(prop_oneof![Just(0.0), 0.1f64..1000.0], 0..max_len)
}

fn series(rates: &[f64]) -> ProductionSeries {
    let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    let dates = (0..rates.len())
        .map(|i| start + chrono::Days::new(i as u64))
        .collect();
    ProductionSeries::new(dates, rates.to_vec()).unwrap()
}

proptest! {
    /// forward and inverse stay a bijection whatever the input order
    #[test]
    fn test_lookup_views_are_bijective(records in arb_records()) {
        let cache = LookupCache::from_records(&records, "name");

        prop_assert_eq!(cache.forward().len(), cache.inverse().len());
        for (name, id) in cache.forward() {
            prop_assert_eq!(cache.inverse().get(id), Some(name));
        }
        for (id, name) in cache.inverse() {
            prop_assert_eq!(cache.forward().get(name), Some(id));
        }
    }

    /// Every resolvable id maps to a record that carries that id
    #[test]
    fn test_lookup_pairs_point_at_records(records in arb_records()) {
        let cache = LookupCache::from_records(&records, "name");

        for (id, _) in cache.pairs() {
            let record = cache.record(id);
            prop_assert!(record.is_some());
            prop_assert_eq!(&record.unwrap()["id"], &json!(id));
        }
    }

    /// The last record naming a given id wins that id
    #[test]
    fn test_lookup_last_write_wins(records in arb_records()) {
        let cache = LookupCache::from_records(&records, "name");

        if let Some(last) = records.last() {
            let id = last["id"].as_i64().unwrap();
            let name = last["name"].as_str().unwrap();
            prop_assert_eq!(cache.id_of(name), Some(id));
            prop_assert_eq!(cache.name_of(id), Some(name));
        }
    }

    /// Rewriting drops the fk field and never touches other fields
    #[test]
    fn test_rewrite_record_replaces_fk(records in arb_records(), fk_id in 0i64..25, extra in "[a-z]{1,8}") {
        let cache = Arc::new(LookupCache::from_records(&records, "name"));
        let fk = ForeignKeyDef {
            field: "field_fk".into(),
            target: "fieldmaster".into(),
            display: "field_name".into(),
        };

        let resolvers = vec![(&fk, Arc::clone(&cache))];

        let mut record = json!({"id": 1, "note": extra.clone(), "field_fk": fk_id});
        rewrite_record(record.as_object_mut().unwrap(), &resolvers);

        prop_assert!(record.get("field_fk").is_none());
        prop_assert_eq!(&record["note"], &json!(extra));
        match cache.name_of(fk_id) {
            Some(name) => prop_assert_eq!(&record["field_name"], &json!(name)),
            None => prop_assert_eq!(&record["field_name"], &json!(fk_id)),
        }
    }

    /// Trimming keeps at most `window` points and never a zero rate
    #[test]
    fn test_trim_bounds(rates in arb_rates(120), window in 0usize..80) {
        let trimmed = series(&rates).trim(window);

        prop_assert!(trimmed.len() <= window);
        prop_assert!(trimmed.rates.iter().all(|r| *r != 0.0));
        prop_assert_eq!(trimmed.dates.len(), trimmed.rates.len());
        prop_assert!(trimmed.dates.windows(2).all(|w| w[0] < w[1]));
    }

    /// Classification follows the history and recent-production rules
    #[test]
    fn test_classify_rules(rates in arb_rates(90)) {
        let s = series(&rates);
        let frequency = Frequency::Monthly;
        let usable = s.trim(frequency.fit_window()).len();
        let recent = s.recent_sum(frequency.recent_window());

        match classify(&s, frequency) {
            Classification::InsufficientHistory => prop_assert!(usable <= 1),
            Classification::NoRecentProduction => {
                prop_assert!(usable > 1);
                prop_assert!(recent <= 0.0);
            },
            Classification::Fittable(trimmed) => {
                prop_assert!(trimmed.len() > 1);
                prop_assert!(recent > 0.0);
            },
        }
    }

    /// Array params become one repeated key per element
    #[test]
    fn test_query_arrays_repeat_key(ids in prop::collection::vec(1i64..10_000, 1..10)) {
        let url = add_query_params("http://alana.local/api/x/", &json!({"wells_fks[]": ids.clone()}));
        let query = url.split_once('?').map(|(_, q)| q).unwrap_or("");
        let pairs: Vec<&str> = query.split('&').collect();

        prop_assert_eq!(pairs.len(), ids.len());
        for (pair, id) in pairs.iter().zip(&ids) {
            prop_assert_eq!(*pair, format!("wells_fks%5B%5D={}", id));
        }
    }

    /// Table rendering never panics and keeps one line per row
    #[test]
    fn test_table_render_lines(records in arb_records()) {
        let table = Table::from_records(&Value::Array(records.clone()));
        let rendered = table.render();

        if records.is_empty() {
            prop_assert_eq!(rendered, "(no records)\n");
        } else {
            // header, separator, rows
            prop_assert_eq!(rendered.lines().count(), records.len() + 2);
        }
    }
}
