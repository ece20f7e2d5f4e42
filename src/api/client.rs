//! Alana Client
//!
//! Main client context, combining the session with the lookup registry.
//! Every domain facade borrows one of these; clients are independent of
//! each other, so several servers (or test mocks) can be used at once.

use super::session::Session;
use crate::apps::aiml::Aiml;
use crate::apps::datasource::Datasource;
use crate::apps::dca::Dca;
use crate::apps::economics::Economics;
use crate::apps::fdp::Fdp;
use crate::apps::forecast::Forecast;
use crate::apps::welltype::WellType;
use crate::apps::workspace::Workspaces;
use crate::error::{AlanaError, Result};
use crate::resource::catalog::{get_resource, resolve_def, ResourceDef};
use crate::resource::crud::Resource;
use crate::resource::lookup::LookupCache;
use crate::resource::registry::Registry;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;

/// Main Alana client
#[derive(Clone, Debug)]
pub struct AlanaClient {
    session: Session,
    registry: Registry,
    workspace: Option<Value>,
}

impl AlanaClient {
    /// Open a session and fetch the active workspace
    pub async fn connect(token: &str, base_url: &str) -> Result<Self> {
        let session = Session::new(token, base_url)?;
        Self::connect_with_session(session).await
    }

    /// Fetch the active workspace over an existing session
    pub async fn connect_with_session(session: Session) -> Result<Self> {
        let workspace = session.active_workspace().await?;
        tracing::info!(
            "Connected to {} (workspace: {})",
            session.base_url(),
            workspace.get("name").and_then(|v| v.as_str()).unwrap_or("-")
        );

        Ok(Self {
            session,
            registry: Registry::new(),
            workspace: Some(workspace),
        })
    }

    /// Client without the workspace round trip
    pub fn from_session(session: Session) -> Self {
        Self {
            session,
            registry: Registry::new(),
            workspace: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Workspace fetched at connect time
    pub fn active_workspace(&self) -> Option<&Value> {
        self.workspace.as_ref()
    }

    /// Catalog definition for a key
    pub fn definition(&self, key: &str) -> Result<&'static ResourceDef> {
        get_resource(key).ok_or_else(|| AlanaError::UnknownResource(key.to_string()))
    }

    /// CRUD handle for a registered resource
    pub fn resource(&self, key: &str) -> Result<Resource<'_>> {
        Ok(Resource::new(self, Cow::Borrowed(self.definition(key)?)))
    }

    /// CRUD handle for any `(app, table)` pair
    pub fn resource_at(&self, app: &str, table: &str) -> Resource<'_> {
        Resource::new(self, resolve_def(app, table))
    }

    /// Cached lookup for a registered resource, loaded on first use
    pub async fn lookup(&self, key: &str) -> Result<Arc<LookupCache>> {
        let def = self.definition(key)?;
        self.registry.lookup(&self.session, def).await
    }

    /// Refetch a registered resource's lookup now
    pub async fn load_lookup(&self, key: &str) -> Result<Arc<LookupCache>> {
        let def = self.definition(key)?;
        self.registry.load_lookup(&self.session, def).await
    }

    pub async fn resolve_id(&self, key: &str, name: &str) -> Result<i64> {
        let def = self.definition(key)?;
        self.registry.resolve_id(&self.session, def, name).await
    }

    pub async fn resolve_name(&self, key: &str, id: i64) -> Result<String> {
        let def = self.definition(key)?;
        self.registry.resolve_name(&self.session, def, id).await
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        self.registry.invalidate(key).await
    }

    // =========================================================================
    // Domain facades
    // =========================================================================

    pub fn datasource(&self) -> Datasource<'_> {
        Datasource::new(self)
    }

    pub fn dca(&self) -> Dca<'_> {
        Dca::new(self)
    }

    pub fn economics(&self) -> Economics<'_> {
        Economics::new(self)
    }

    pub fn fdp(&self) -> Fdp<'_> {
        Fdp::new(self)
    }

    pub fn welltype(&self) -> WellType<'_> {
        WellType::new(self)
    }

    pub fn forecast(&self) -> Forecast<'_> {
        Forecast::new(self)
    }

    pub fn aiml(&self) -> Aiml<'_> {
        Aiml::new(self)
    }

    pub fn workspaces(&self) -> Workspaces<'_> {
        Workspaces::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_client() -> AlanaClient {
        let session = Session::new("abc", "http://127.0.0.1:9").unwrap();
        AlanaClient::from_session(session)
    }

    #[test]
    fn test_unknown_resource_key() {
        let client = offline_client();
        let err = client.resource("nosuchmaster").unwrap_err();
        assert!(matches!(err, AlanaError::UnknownResource(ref k) if k == "nosuchmaster"));
    }

    #[test]
    fn test_resource_at_uses_catalog_when_registered() {
        let client = offline_client();
        let wells = client.resource_at("datasource", "wellmaster");
        assert_eq!(wells.def().name_field, "well_name");

        let adhoc = client.resource_at("custom", "gizmo");
        assert_eq!(adhoc.def().name_field, "name");
        assert_eq!(adhoc.key(), "custom/gizmo");
    }

    #[test]
    fn test_from_session_has_no_workspace() {
        assert!(offline_client().active_workspace().is_none());
    }
}
