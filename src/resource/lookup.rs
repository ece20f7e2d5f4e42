//! Lookup cache
//!
//! Name/id views derived from one fetch of a resource's record list.
//! `forward` and `inverse` are kept as a strict bijection: when two records
//! share a name (or an id) the later one wins and the earlier pairing is
//! dropped from both maps. `full` keeps every record that carries an id.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Derived name <-> id views for one resource type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupCache {
    forward: HashMap<String, i64>,
    inverse: BTreeMap<i64, String>,
    full: BTreeMap<i64, Value>,
}

impl LookupCache {
    /// Cache with no records
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the views from a list of records
    pub fn from_records(records: &[Value], name_field: &str) -> Self {
        let mut cache = Self::default();

        for record in records {
            let Some(id) = record.get("id").and_then(record_id) else {
                continue;
            };
            cache.full.insert(id, record.clone());

            if let Some(name) = record.get(name_field).and_then(record_name) {
                cache.insert_pair(name, id);
            }
        }

        cache
    }

    fn insert_pair(&mut self, name: String, id: i64) {
        if let Some(old_name) = self.inverse.get(&id) {
            if *old_name != name {
                self.forward.remove(old_name);
            }
        }
        if let Some(old_id) = self.forward.insert(name.clone(), id) {
            if old_id != id {
                self.inverse.remove(&old_id);
            }
        }
        self.inverse.insert(id, name);
    }

    /// Id registered for a name
    pub fn id_of(&self, name: &str) -> Option<i64> {
        self.forward.get(name).copied()
    }

    /// Name registered for an id
    pub fn name_of(&self, id: i64) -> Option<&str> {
        self.inverse.get(&id).map(|s| s.as_str())
    }

    /// Raw record for an id
    pub fn record(&self, id: i64) -> Option<&Value> {
        self.full.get(&id)
    }

    /// All raw records, ordered by id
    pub fn records(&self) -> impl Iterator<Item = &Value> {
        self.full.values()
    }

    /// `(id, name)` pairs ordered by id
    pub fn pairs(&self) -> impl Iterator<Item = (i64, &str)> {
        self.inverse.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.forward.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// The name -> id view
    pub fn forward(&self) -> &HashMap<String, i64> {
        &self.forward
    }

    /// The id -> name view
    pub fn inverse(&self) -> &BTreeMap<i64, String> {
        &self.inverse
    }

    /// Number of name/id pairs
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

/// Locate the record list in a list response
///
/// Accepts a bare array or an object wrapping one under `results` or `data`.
pub fn records_of(response: &Value) -> Option<&Vec<Value>> {
    match response {
        Value::Array(arr) => Some(arr),
        Value::Object(map) => ["results", "data"]
            .iter()
            .find_map(|key| map.get(*key).and_then(|v| v.as_array())),
        _ => None,
    }
}

/// Numeric id from an integer or numeric-string field
pub fn record_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn record_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_from_records() {
        let records = json!([
            {"id": 1, "well_name": "W1", "field_fk": 3},
            {"id": 2, "well_name": "W2", "field_fk": 3}
        ]);
        let cache = LookupCache::from_records(records.as_array().unwrap(), "well_name");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.id_of("W1"), Some(1));
        assert_eq!(cache.name_of(2), Some("W2"));
        assert_eq!(cache.record(1).unwrap()["field_fk"], 3);
        assert_eq!(cache.names(), vec!["W1", "W2"]);
    }

    #[test]
    fn test_name_collision_last_write_wins() {
        let records = json!([
            {"id": 1, "name": "DCA A"},
            {"id": 5, "name": "DCA A"}
        ]);
        let cache = LookupCache::from_records(records.as_array().unwrap(), "name");

        assert_eq!(cache.id_of("DCA A"), Some(5));
        assert_eq!(cache.name_of(1), None);
        assert_eq!(cache.name_of(5), Some("DCA A"));
        // Both raw records survive
        assert_eq!(cache.records().count(), 2);
    }

    #[test]
    fn test_id_collision_drops_previous_name() {
        let records = json!([
            {"id": 1, "name": "old"},
            {"id": 1, "name": "new"}
        ]);
        let cache = LookupCache::from_records(records.as_array().unwrap(), "name");

        assert_eq!(cache.id_of("old"), None);
        assert_eq!(cache.id_of("new"), Some(1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_skips_records_without_id_or_name() {
        let records = json!([
            {"name": "no id"},
            {"id": "7", "name": "string id"},
            {"id": 8},
            {"id": 9, "name": null},
            "not an object"
        ]);
        let cache = LookupCache::from_records(records.as_array().unwrap(), "name");

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.id_of("string id"), Some(7));
        assert!(cache.record(8).is_some());
        assert_eq!(cache.name_of(8), None);
    }

    #[test]
    fn test_records_of_shapes() {
        assert_eq!(records_of(&json!([{"id": 1}])).map(|r| r.len()), Some(1));
        assert_eq!(
            records_of(&json!({"results": [{"id": 1}, {"id": 2}]})).map(|r| r.len()),
            Some(2)
        );
        assert_eq!(records_of(&json!({"data": []})).map(|r| r.len()), Some(0));
        assert!(records_of(&json!({"detail": "nope"})).is_none());
        assert!(records_of(&Value::Null).is_none());
    }

    #[test]
    fn test_empty_cache() {
        let cache = LookupCache::empty();
        assert!(cache.is_empty());
        assert_eq!(cache.id_of("anything"), None);
    }
}
