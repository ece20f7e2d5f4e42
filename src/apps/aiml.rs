//! AI/ML model artifacts and petrophysics LAS files
//!
//! Both store a file alongside their record; reads can return the record
//! or download the file itself.

use crate::api::client::AlanaClient;
use crate::error::Result;
use crate::resource::crud::{Resource, Upload};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Multipart field carrying a model file
pub const MODEL_FILE_FIELD: &str = "file";

pub struct Aiml<'a> {
    client: &'a AlanaClient,
}

impl<'a> Aiml<'a> {
    pub fn new(client: &'a AlanaClient) -> Self {
        Self { client }
    }

    pub fn models_resource(&self) -> Result<Resource<'a>> {
        self.client.resource("aimlmodel")
    }

    pub fn las_resource(&self) -> Result<Resource<'a>> {
        self.client.resource("las")
    }

    /// Upload a model file with its metadata
    pub async fn create_model(&self, fields: &Value, file: &Path) -> Result<Value> {
        let upload = Upload::from_path(MODEL_FILE_FIELD, file).await?;
        self.models_resource()?
            .create_master_with_files(fields, vec![upload])
            .await
    }

    pub async fn models(&self) -> Result<Value> {
        self.models_resource()?.list().await
    }

    pub async fn model(&self, name: &str) -> Result<Value> {
        self.models_resource()?.get_master_by_name(name).await
    }

    pub async fn download_model(&self, name: &str, dir: &Path) -> Result<PathBuf> {
        let models = self.models_resource()?;
        let id = models.resolve_id(name).await?;
        models.download_master(id, dir).await
    }

    pub async fn las(&self) -> Result<Value> {
        self.las_resource()?.list().await
    }

    pub async fn download_las(&self, name: &str, dir: &Path) -> Result<PathBuf> {
        let las = self.las_resource()?;
        let id = las.resolve_id(name).await?;
        las.download_master(id, dir).await
    }
}
