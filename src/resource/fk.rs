//! Foreign key denormalization
//!
//! Rewrites every declared `<x>_fk` field on returned records to the
//! referenced row's name, under the declaration's display field, and drops
//! the numeric field. Only fields declared in the catalog are touched, and
//! all of them are resolved, whatever their position in the record.

use super::catalog::{ForeignKeyDef, ResourceDef};
use super::lookup::{record_id, LookupCache};
use crate::api::client::AlanaClient;
use crate::error::Result;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Declared foreign key paired with the target's lookup
pub type Resolver<'d> = (&'d ForeignKeyDef, Arc<LookupCache>);

/// Denormalize a response for `def`, loading target lookups as needed
pub async fn denormalize(client: &AlanaClient, def: &ResourceDef, mut value: Value) -> Result<Value> {
    let present = present_foreign_keys(def, &value);
    if present.is_empty() {
        return Ok(value);
    }

    let mut resolvers: Vec<Resolver<'_>> = Vec::with_capacity(present.len());
    for fk in present {
        let cache = client.lookup(&fk.target).await?;
        resolvers.push((fk, cache));
    }

    rewrite_value(&mut value, &resolvers);
    Ok(value)
}

/// Declared foreign keys that appear on at least one record
fn present_foreign_keys<'d>(def: &'d ResourceDef, value: &Value) -> Vec<&'d ForeignKeyDef> {
    let records = records(value);
    def.foreign_keys
        .iter()
        .filter(|fk| records.iter().any(|r| r.contains_key(&fk.field)))
        .collect()
}

/// Envelope check: `{"data": [...]}` without a record id of its own
fn is_envelope(map: &Map<String, Value>) -> bool {
    map.get("data").is_some_and(Value::is_array) && !map.contains_key("id")
}

fn records(value: &Value) -> Vec<&Map<String, Value>> {
    match value {
        Value::Array(arr) => arr.iter().filter_map(|v| v.as_object()).collect(),
        Value::Object(map) if is_envelope(map) => records(&map["data"]),
        Value::Object(map) => vec![map],
        _ => Vec::new(),
    }
}

/// Apply resolvers to every record in an array, envelope or single object
pub fn rewrite_value(value: &mut Value, resolvers: &[Resolver<'_>]) {
    match value {
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                if let Some(record) = item.as_object_mut() {
                    rewrite_record(record, resolvers);
                }
            }
        },
        Value::Object(map) if is_envelope(map) => {
            if let Some(data) = map.get_mut("data") {
                rewrite_value(data, resolvers);
            }
        },
        Value::Object(map) => rewrite_record(map, resolvers),
        _ => {},
    }
}

/// Replace each declared fk field on one record with its display name
pub fn rewrite_record(record: &mut Map<String, Value>, resolvers: &[Resolver<'_>]) {
    for (fk, cache) in resolvers {
        let Some(raw) = record.remove(&fk.field) else {
            continue;
        };

        let display = match record_id(&raw).and_then(|id| cache.name_of(id)) {
            Some(name) => Value::String(name.to_string()),
            None => {
                if !raw.is_null() {
                    tracing::debug!("{}: no {} entry for {}", fk.field, fk.target, raw);
                }
                raw
            },
        };

        record.insert(fk.display.clone(), display);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::catalog::get_resource;
    use serde_json::json;

    fn cache(records: Value, name_field: &str) -> Arc<LookupCache> {
        Arc::new(LookupCache::from_records(records.as_array().unwrap(), name_field))
    }

    fn well_resolvers() -> Vec<Resolver<'static>> {
        let def = get_resource("wellmaster").unwrap();
        vec![
            (
                def.foreign_key("field_fk").unwrap(),
                cache(json!([{"id": 3, "field_name": "Field A"}]), "field_name"),
            ),
            (
                def.foreign_key("formation_fk").unwrap(),
                cache(json!([{"id": 7, "formation_name": "Vaca Muerta"}]), "formation_name"),
            ),
        ]
    }

    #[test]
    fn test_rewrites_all_declared_keys() {
        let mut value = json!([
            {"id": 42, "well_name": "W1", "field_fk": 3, "formation_fk": 7}
        ]);
        rewrite_value(&mut value, &well_resolvers());

        let record = &value[0];
        assert_eq!(record["field_name"], "Field A");
        assert_eq!(record["formation_name"], "Vaca Muerta");
        assert!(record.get("field_fk").is_none());
        assert!(record.get("formation_fk").is_none());
    }

    #[test]
    fn test_unresolved_id_keeps_raw_value() {
        let mut value = json!({"id": 1, "well_name": "W1", "field_fk": 99});
        rewrite_value(&mut value, &well_resolvers());
        assert_eq!(value["field_name"], 99);
        assert!(value.get("field_fk").is_none());
    }

    #[test]
    fn test_envelope_and_undeclared_keys() {
        let mut value = json!({"data": [
            {"date": "2020-01-01", "field_fk": 3, "pad_fk": 5}
        ]});
        rewrite_value(&mut value, &well_resolvers());
        assert_eq!(value["data"][0]["field_name"], "Field A");
        assert_eq!(value["data"][0]["pad_fk"], 5);
    }

    #[test]
    fn test_present_foreign_keys_only_lists_fields_in_use() {
        let def = get_resource("wellmaster").unwrap();
        let value = json!([{"id": 1, "field_fk": 3}]);
        let present = present_foreign_keys(def, &value);
        assert_eq!(present.len(), 1);
        assert_eq!(present[0].field, "field_fk");

        assert!(present_foreign_keys(def, &json!("scalar")).is_empty());
    }
}
