//! Workspaces

use crate::api::client::AlanaClient;
use crate::error::Result;
use crate::resource::crud::Resource;
use serde_json::Value;

pub struct Workspaces<'a> {
    client: &'a AlanaClient,
}

impl<'a> Workspaces<'a> {
    pub fn new(client: &'a AlanaClient) -> Self {
        Self { client }
    }

    fn resource(&self) -> Result<Resource<'a>> {
        self.client.resource("workspacemaster")
    }

    pub async fn create_workspace(&self, workspace: &Value) -> Result<Value> {
        self.resource()?.create_master(workspace).await
    }

    pub async fn workspace(&self, id: i64) -> Result<Value> {
        self.resource()?.get_master(Some(id)).await
    }

    pub async fn workspaces(&self) -> Result<Value> {
        self.resource()?.list().await
    }

    /// Fresh copy of the session's active workspace
    pub async fn active(&self) -> Result<Value> {
        self.client.session().active_workspace().await
    }
}
