//! Datasource facade
//!
//! Wells, fields, formations and the per-well production tables.
//! Callers name wells and fields; ids are resolved through the lookup
//! caches and responses come back with foreign keys denormalized.

use crate::api::client::AlanaClient;
use crate::error::{AlanaError, Result};
use crate::resource::crud::{build_form, Resource, Upload};
use crate::resource::fk;
use crate::resource::lookup::{record_id, records_of};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

const NEARBY_WELLS_PATH: &str = "/api/datasource/eda/nearbywells/";
const IMPORT_PATH: &str = "/api/datasource/dataloader/import/";

/// Per-well tables filtered by `well_fk`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellTable {
    Completion,
    Status,
    Pressure,
    Deviation,
    Intervention,
}

impl WellTable {
    pub fn key(self) -> &'static str {
        match self {
            Self::Completion => "wellcompletion",
            Self::Status => "wellstatus",
            Self::Pressure => "wellpressure",
            Self::Deviation => "welldeviation",
            Self::Intervention => "wellintervention",
        }
    }
}

pub struct Datasource<'a> {
    client: &'a AlanaClient,
}

impl<'a> Datasource<'a> {
    pub fn new(client: &'a AlanaClient) -> Self {
        Self { client }
    }

    fn wells_resource(&self) -> Result<Resource<'a>> {
        self.client.resource("wellmaster")
    }

    fn fields_resource(&self) -> Result<Resource<'a>> {
        self.client.resource("fieldmaster")
    }

    fn formations_resource(&self) -> Result<Resource<'a>> {
        self.client.resource("formationmaster")
    }

    // =========================================================================
    // Wells
    // =========================================================================

    /// Create a well; `field` / `formation` names become `field_fk` / `formation_fk`
    pub async fn create_well(&self, well: &Value) -> Result<Value> {
        let record = self.resolve_well_refs(well).await?;
        self.wells_resource()?.create_master(&record).await
    }

    /// All wells, optionally restricted to one field or to producing wells
    pub async fn wells(&self, field: Option<&str>, only_producing: bool) -> Result<Value> {
        let mut query = json!({ "should_show_gt_zero": only_producing });
        if let Some(field) = field {
            query["fieldmaster_fk"] = json!(self.client.resolve_id("fieldmaster", field).await?);
        }
        self.wells_resource()?.list_where(&query).await
    }

    pub async fn well(&self, name: &str) -> Result<Value> {
        self.wells_resource()?.get_master_by_name(name).await
    }

    pub async fn edit_well(&self, name: &str, changes: &Value) -> Result<Value> {
        let record = self.resolve_well_refs(changes).await?;
        self.wells_resource()?.update_master_by_name(name, &record).await
    }

    pub async fn delete_well(&self, name: &str) -> Result<u16> {
        self.wells_resource()?.delete_master_by_name(name).await
    }

    async fn resolve_well_refs(&self, well: &Value) -> Result<Value> {
        let mut record = well
            .as_object()
            .cloned()
            .ok_or_else(|| AlanaError::InvalidArgument("well must be a JSON object".into()))?;

        for (name_key, fk_key, target) in [
            ("field", "field_fk", "fieldmaster"),
            ("formation", "formation_fk", "formationmaster"),
        ] {
            if let Some(Value::String(name)) = record.remove(name_key) {
                let id = self.client.resolve_id(target, &name).await?;
                record.insert(fk_key.to_string(), json!(id));
            }
        }
        Ok(Value::Object(record))
    }

    // =========================================================================
    // Fields and formations
    // =========================================================================

    pub async fn create_field(&self, field: &Value) -> Result<Value> {
        self.fields_resource()?.create_master(field).await
    }

    pub async fn fields(&self) -> Result<Value> {
        self.fields_resource()?.list().await
    }

    pub async fn field(&self, name: &str) -> Result<Value> {
        self.fields_resource()?.get_master_by_name(name).await
    }

    pub async fn edit_field(&self, name: &str, changes: &Value) -> Result<Value> {
        self.fields_resource()?.update_master_by_name(name, changes).await
    }

    pub async fn delete_field(&self, name: &str) -> Result<u16> {
        self.fields_resource()?.delete_master_by_name(name).await
    }

    pub async fn create_formation(&self, formation: &Value) -> Result<Value> {
        self.formations_resource()?.create_master(formation).await
    }

    pub async fn formations(&self) -> Result<Value> {
        self.formations_resource()?.list().await
    }

    pub async fn formation(&self, name: &str) -> Result<Value> {
        self.formations_resource()?.get_master_by_name(name).await
    }

    pub async fn edit_formation(&self, name: &str, changes: &Value) -> Result<Value> {
        self.formations_resource()?.update_master_by_name(name, changes).await
    }

    pub async fn delete_formation(&self, name: &str) -> Result<u16> {
        self.formations_resource()?.delete_master_by_name(name).await
    }

    // =========================================================================
    // Maps
    // =========================================================================

    /// Well name -> field name, from the cached well records
    pub async fn well_field_map(&self) -> Result<BTreeMap<String, String>> {
        let wells = self.client.lookup("wellmaster").await?;
        let fields = self.client.lookup("fieldmaster").await?;

        let mut map = BTreeMap::new();
        for (id, well_name) in wells.pairs() {
            let field = wells
                .record(id)
                .and_then(|r| r.get("field_fk"))
                .and_then(record_id)
                .and_then(|fid| fields.name_of(fid));
            if let Some(field) = field {
                map.insert(well_name.to_string(), field.to_string());
            }
        }
        Ok(map)
    }

    /// Field name -> sorted well names; fields without wells map to an empty list
    pub async fn field_wells_map(&self) -> Result<BTreeMap<String, Vec<String>>> {
        let well_fields = self.well_field_map().await?;
        let fields = self.client.lookup("fieldmaster").await?;

        let mut map: BTreeMap<String, Vec<String>> = fields
            .names()
            .into_iter()
            .map(|name| (name.to_string(), Vec::new()))
            .collect();
        for (well, field) in well_fields {
            map.entry(field).or_default().push(well);
        }
        // BTreeMap iteration already yields wells in order
        Ok(map)
    }

    // =========================================================================
    // Production
    // =========================================================================

    /// Monthly production for named wells
    pub async fn monthly_production(&self, wells: &[&str], last_values: bool, aggregate: bool) -> Result<Value> {
        if wells.is_empty() {
            return Err(AlanaError::InvalidArgument(
                "monthly production needs at least one well".into(),
            ));
        }

        let mut ids = Vec::with_capacity(wells.len());
        for well in wells {
            ids.push(self.client.resolve_id("wellmaster", well).await?);
        }

        let mut query = json!({
            "wells_fks[]": ids,
            "should_return_extra_field": true,
        });
        if aggregate {
            query["should_aggregate"] = json!(true);
        }
        if last_values {
            query["last_val"] = json!(true);
        }
        self.client.resource("wellmonthly")?.list_where(&query).await
    }

    /// Daily production for one well
    pub async fn daily_production(&self, well: &str) -> Result<Value> {
        let id = self.client.resolve_id("wellmaster", well).await?;
        let query = json!({ "well_fk": id, "should_return_extra_field": true });
        self.client.resource("welldaily")?.list_where(&query).await
    }

    /// Monthly production aggregated per field
    pub async fn field_monthly_production(&self, fields: &[&str]) -> Result<Value> {
        let query = json!({ "fields[]": fields, "should_return_extra_field": true });
        self.client.resource("fieldmonthly")?.list_where(&query).await
    }

    /// Rows of a per-well table, all wells or one well
    ///
    /// The server filter is not relied on: rows are also filtered on their
    /// raw `well_fk` before denormalization.
    pub async fn well_table(&self, table: WellTable, well: Option<&str>) -> Result<Value> {
        let resource = self.client.resource(table.key())?;
        let Some(well) = well else {
            return resource.list().await;
        };

        let id = self.client.resolve_id("wellmaster", well).await?;
        let raw = self
            .client
            .session()
            .get(&resource.def().collection_path(), Some(&json!({ "well_fk": id })))
            .await?;

        let rows: Vec<Value> = records_of(&raw)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.get("well_fk").and_then(record_id) == Some(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        fk::denormalize(self.client, resource.def(), Value::Array(rows)).await
    }

    /// Wells within `radius` metres of a well
    pub async fn nearby_wells(&self, well: &str, radius: f64) -> Result<Value> {
        let query = json!({ "well_name": well, "radius": radius });
        self.client.session().get(NEARBY_WELLS_PATH, Some(&query)).await
    }

    /// Upload CSV rows into a datasource table
    pub async fn import_table(&self, table: &str, csv: Vec<u8>, is_new_data: bool) -> Result<Value> {
        let mut fields = Map::new();
        fields.insert("tablename".to_string(), json!(table));
        fields.insert("is_new_data".to_string(), json!(is_new_data));

        let upload = Upload::new("file_uploaded", format!("{table}.csv"), csv);
        let form = build_form(&Value::Object(fields), vec![upload])?;

        let result = self.client.session().post_multipart(IMPORT_PATH, form).await?;
        // Imports may add wells, fields or formations
        for key in ["wellmaster", "fieldmaster", "formationmaster", table] {
            self.client.invalidate(key).await;
        }

        tracing::info!("datasource: imported table {}", table);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_table_keys_are_registered() {
        for table in [
            WellTable::Completion,
            WellTable::Status,
            WellTable::Pressure,
            WellTable::Deviation,
            WellTable::Intervention,
        ] {
            let def = crate::resource::get_resource(table.key()).expect("registered");
            assert_eq!(def.app, "datasource");
            assert!(def.foreign_key("well_fk").is_some());
        }
    }
}
