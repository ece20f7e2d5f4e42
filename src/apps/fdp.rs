//! Field development plan facade
//!
//! FDP cases point either at a well type or at a DCA master, named by
//! `action_type` (`WellType` / `DCA`) and `action_name`. Names are resolved
//! to `welltype_fk` / `dcamaster_fk` before the cases are posted.

use crate::api::client::AlanaClient;
use crate::error::{AlanaError, Result};
use crate::resource::crud::Resource;
use serde_json::{json, Value};

const RUN_FDP_PATH: &str = "/api/fdp/runfdp/";

/// Prefix given to generated result names when none is supplied
pub const DEFAULT_RUN_PREFIX: &str = "FDP_";

pub struct Fdp<'a> {
    client: &'a AlanaClient,
}

impl<'a> Fdp<'a> {
    pub fn new(client: &'a AlanaClient) -> Self {
        Self { client }
    }

    pub fn masters(&self) -> Result<Resource<'a>> {
        self.client.resource("fdpmaster")
    }

    pub fn cases(&self) -> Result<Resource<'a>> {
        self.client.resource("fdpcase")
    }

    pub fn downtime(&self) -> Result<Resource<'a>> {
        self.client.resource("downtimemaster")
    }

    pub async fn create_master(&self, master: &Value) -> Result<Value> {
        self.masters()?.create_master(master).await
    }

    /// Create cases under the named FDP, resolving their action targets
    pub async fn create_cases(&self, fdp_name: &str, cases: Vec<Value>) -> Result<Value> {
        let fdp_id = self.client.resolve_id("fdpmaster", fdp_name).await?;

        let mut resolved = Vec::with_capacity(cases.len());
        for case in cases {
            let mut case = self.resolve_action(case).await?;
            if let Some(obj) = case.as_object_mut() {
                obj.insert("fdpmaster_fk".into(), json!(fdp_id));
            }
            resolved.push(case);
        }
        self.cases()?.create_cases(resolved).await
    }

    /// Create the master, then cases with their action targets resolved
    pub async fn create_master_and_cases(&self, master: &Value, cases: Vec<Value>) -> Result<(Value, Value)> {
        let mut resolved = Vec::with_capacity(cases.len());
        for case in cases {
            resolved.push(self.resolve_action(case).await?);
        }
        self.masters()?.create_master_then_cases(master, resolved).await
    }

    async fn resolve_action(&self, case: Value) -> Result<Value> {
        let Value::Object(mut obj) = case else {
            return Err(AlanaError::InvalidArgument("FDP case must be a JSON object".into()));
        };

        let action_type = obj.get("action_type").and_then(|v| v.as_str()).map(str::to_string);
        let action_name = obj.get("action_name").and_then(|v| v.as_str()).map(str::to_string);

        let target = match action_type.as_deref() {
            Some("WellType") => Some(("welltypemaster", "welltype_fk")),
            Some("DCA") => Some(("dcamaster", "dcamaster_fk")),
            Some(other) => {
                return Err(AlanaError::InvalidArgument(format!(
                    "unknown FDP action type '{other}' (expected WellType or DCA)"
                )))
            },
            None => {
                tracing::warn!("FDP case without action_type, posting it unresolved");
                None
            },
        };

        if let Some((key, fk_field)) = target {
            let name = action_name.ok_or_else(|| {
                AlanaError::InvalidArgument("FDP case with an action_type needs an action_name".into())
            })?;
            let id = self.client.resolve_id(key, &name).await?;
            obj.insert(fk_field.into(), json!(id));
        }
        Ok(Value::Object(obj))
    }

    /// Run the named FDP
    pub async fn run(&self, fdp_name: &str, prefix: Option<&str>) -> Result<Value> {
        let fdp_id = self.client.resolve_id("fdpmaster", fdp_name).await?;
        let query = json!({
            "fdpmaster_fk": fdp_id,
            "preffix": prefix.unwrap_or(DEFAULT_RUN_PREFIX),
        });
        let result = self.client.session().get(RUN_FDP_PATH, Some(&query)).await?;
        tracing::info!("fdp: ran {}", fdp_name);
        Ok(result)
    }

    /// One FDP case by name
    pub async fn case_by_name(&self, case_name: &str) -> Result<Value> {
        self.cases()?.get_master_by_name(case_name).await
    }

    pub async fn create_downtime_and_cases(&self, master: &Value, cases: Vec<Value>) -> Result<(Value, Value)> {
        self.downtime()?.create_master_then_cases(master, cases).await
    }

    pub async fn downtime_cases(&self, master_id: i64) -> Result<Value> {
        self.downtime()?.get_cases(master_id).await
    }
}
