//! Generic CRUD facade
//!
//! One [`Resource`] handle per `(app, table)` pair. Every domain facade is a
//! set of thin named calls into these operations. Mutations invalidate the
//! resource's lookup cache so the next name resolution refetches it.

use super::catalog::{get_resource, ResourceDef};
use super::fk;
use super::lookup::{record_id, LookupCache};
use crate::api::client::AlanaClient;
use crate::api::http::{filename_from_disposition, query_scalar};
use crate::error::{AlanaError, Result};
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// File name used when a download carries no Content-Disposition filename
pub const DEFAULT_DOWNLOAD_NAME: &str = "downloaded_file.ext";

/// In-memory file part for multipart creates
#[derive(Debug, Clone)]
pub struct Upload {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read a local file into an upload named after the file
    pub async fn from_path(field: &str, path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                AlanaError::InvalidArgument(format!("{} does not name a file", path.display()))
            })?;
        let bytes = tokio::fs::read(path).await.map_err(|source| AlanaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(field, file_name, bytes))
    }
}

/// Build a multipart form from a JSON object of fields plus file parts
///
/// Scalars are encoded as in query strings (booleans as `True`/`False`),
/// arrays become one part per element and `null` fields are omitted.
pub fn build_form(fields: &Value, uploads: Vec<Upload>) -> Result<Form> {
    let map = fields
        .as_object()
        .ok_or_else(|| AlanaError::InvalidArgument("multipart fields must be a JSON object".into()))?;

    let mut form = Form::new();
    for (key, value) in map {
        let items = match value {
            Value::Array(arr) => arr.as_slice(),
            other => std::slice::from_ref(other),
        };
        for item in items {
            if let Some(text) = query_scalar(item) {
                form = form.text(key.clone(), text);
            }
        }
    }
    for upload in uploads {
        let part = Part::bytes(upload.bytes).file_name(upload.file_name);
        form = form.part(upload.field, part);
    }
    Ok(form)
}

/// CRUD handle for one resource type
#[derive(Debug, Clone)]
pub struct Resource<'a> {
    client: &'a AlanaClient,
    def: Cow<'static, ResourceDef>,
}

impl<'a> Resource<'a> {
    pub fn new(client: &'a AlanaClient, def: Cow<'static, ResourceDef>) -> Self {
        Self { client, def }
    }

    pub fn def(&self) -> &ResourceDef {
        &self.def
    }

    pub fn key(&self) -> &str {
        &self.def.key
    }

    /// Lookup cache for this resource, loaded on first use
    pub async fn lookup(&self) -> Result<Arc<LookupCache>> {
        self.client
            .registry()
            .lookup(self.client.session(), &self.def)
            .await
    }

    pub async fn resolve_id(&self, name: &str) -> Result<i64> {
        self.client
            .registry()
            .resolve_id(self.client.session(), &self.def, name)
            .await
    }

    pub async fn resolve_name(&self, id: i64) -> Result<String> {
        self.client
            .registry()
            .resolve_name(self.client.session(), &self.def, id)
            .await
    }

    /// Drop this resource's lookup cache
    pub async fn invalidate(&self) -> bool {
        self.client.registry().invalidate(&self.def.key).await
    }

    /// Whole collection
    pub async fn list(&self) -> Result<Value> {
        self.get_master(None).await
    }

    /// Collection filtered by query parameters
    pub async fn list_where(&self, query: &Value) -> Result<Value> {
        let value = self
            .client
            .session()
            .get(&self.def.collection_path(), Some(query))
            .await?;
        fk::denormalize(self.client, &self.def, value).await
    }

    /// Singleton when `id` is given, the collection otherwise
    pub async fn get_master(&self, id: Option<i64>) -> Result<Value> {
        let path = match id {
            Some(id) => self.def.item_path(id),
            None => self.def.collection_path(),
        };
        let value = self.client.session().get(&path, None).await?;
        fk::denormalize(self.client, &self.def, value).await
    }

    pub async fn get_master_by_name(&self, name: &str) -> Result<Value> {
        let id = self.resolve_id(name).await?;
        self.get_master(Some(id)).await
    }

    /// Fetch a record's file and write it under `dir`
    pub async fn download_master(&self, id: i64, dir: &Path) -> Result<PathBuf> {
        let download = self
            .client
            .session()
            .download(&self.def.download_path(id))
            .await?;

        let file_name = download
            .content_disposition
            .as_deref()
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| DEFAULT_DOWNLOAD_NAME.to_string());
        let path = dir.join(file_name);

        tokio::fs::write(&path, &download.bytes)
            .await
            .map_err(|source| AlanaError::Io {
                path: path.clone(),
                source,
            })?;

        info!(
            "{}: downloaded {} ({} bytes) to {}",
            self.def.key,
            id,
            download.bytes.len(),
            path.display()
        );
        Ok(path)
    }

    /// POST a JSON record to the collection
    pub async fn create_master(&self, record: &Value) -> Result<Value> {
        if !record.is_object() {
            return Err(AlanaError::InvalidArgument(format!(
                "{}: record must be a JSON object",
                self.def.key
            )));
        }

        let created = self
            .client
            .session()
            .post(&self.def.collection_path(), record)
            .await?;
        self.invalidate().await;

        let id = created.get("id").cloned().unwrap_or(Value::Null);
        info!("{}: created {}", self.def.key, id);
        Ok(created)
    }

    /// POST a multipart record carrying files
    pub async fn create_master_with_files(&self, fields: &Value, uploads: Vec<Upload>) -> Result<Value> {
        let form = build_form(fields, uploads)?;
        let created = self
            .client
            .session()
            .post_multipart(&self.def.collection_path(), form)
            .await?;
        self.invalidate().await;

        let id = created.get("id").cloned().unwrap_or(Value::Null);
        info!("{}: created {} with files", self.def.key, id);
        Ok(created)
    }

    pub async fn update_master(&self, id: i64, record: &Value) -> Result<Value> {
        let updated = self
            .client
            .session()
            .put(&self.def.item_path(id), record)
            .await?;
        self.invalidate().await;

        info!("{}: updated {}", self.def.key, id);
        Ok(updated)
    }

    pub async fn update_master_by_name(&self, name: &str, record: &Value) -> Result<Value> {
        let id = self.resolve_id(name).await?;
        self.update_master(id, record).await
    }

    /// DELETE a record; the cache is invalidated whatever the outcome
    pub async fn delete_master(&self, id: i64) -> Result<u16> {
        let result = self.client.session().delete(&self.def.item_path(id)).await;
        self.invalidate().await;

        let status = result?;
        if status == 204 {
            info!("{}: deleted {}", self.def.key, id);
        } else {
            warn!("{}: delete of {} returned {} instead of 204", self.def.key, id, status);
        }
        Ok(status)
    }

    pub async fn delete_master_by_name(&self, name: &str) -> Result<u16> {
        let id = self.resolve_id(name).await?;
        self.delete_master(id).await
    }

    /// Bulk-create child rows in one POST
    pub async fn create_cases(&self, records: Vec<Value>) -> Result<Value> {
        let count = records.len();
        let body = json!({ "instances": records, "has_many": true });
        let created = self
            .client
            .session()
            .post(&self.def.collection_path(), &body)
            .await?;
        self.invalidate().await;

        info!("{}: created {} cases", self.def.key, count);
        Ok(created)
    }

    /// Handle on the declared child table of a master resource
    pub fn cases(&self) -> Result<Resource<'a>> {
        let cases = self.def.cases.as_deref().ok_or_else(|| {
            AlanaError::InvalidArgument(format!("{} has no case table", self.def.key))
        })?;
        let def = get_resource(cases).ok_or_else(|| AlanaError::UnknownResource(cases.to_string()))?;
        Ok(Resource::new(self.client, Cow::Borrowed(def)))
    }

    /// Child rows of one master
    pub async fn get_cases(&self, master_id: i64) -> Result<Value> {
        let cases = self.cases()?;
        self.cases_of(&cases, master_id).await
    }

    /// Rows of `cases` pointing at `master_id` through this resource's fk
    pub async fn cases_of(&self, cases: &Resource<'_>, master_id: i64) -> Result<Value> {
        let mut query = serde_json::Map::new();
        query.insert(self.def.master_fk(), json!(master_id));
        query.insert("should_return_extra_field".to_string(), json!(true));
        cases.list_where(&Value::Object(query)).await
    }

    /// Create the master, then its declared cases stamped with the new id
    pub async fn create_master_then_cases(&self, master: &Value, cases: Vec<Value>) -> Result<(Value, Value)> {
        let case_resource = self.cases()?;
        self.create_master_then_cases_into(&case_resource, master, cases).await
    }

    /// Create the master, then bulk-create `cases` on `case_resource`
    ///
    /// Not transactional: when the child create fails the master stays and
    /// [`AlanaError::OrphanedMaster`] reports its id. A create response
    /// without an id yields `MalformedResponse`, but the master row may
    /// still exist on the server.
    pub async fn create_master_then_cases_into(
        &self,
        case_resource: &Resource<'_>,
        master: &Value,
        cases: Vec<Value>,
    ) -> Result<(Value, Value)> {
        let created = self.create_master(master).await?;
        let Some(id) = created.get("id").and_then(record_id) else {
            warn!(
                "{}: create response carries no id, master may exist without cases: {}",
                self.def.key, created
            );
            return Err(AlanaError::malformed(&self.def.key, "create response carries no id"));
        };

        let fk_field = self.def.master_fk();
        let stamped: Vec<Value> = cases
            .into_iter()
            .map(|mut case| {
                if let Some(obj) = case.as_object_mut() {
                    obj.insert(fk_field.clone(), json!(id));
                }
                case
            })
            .collect();
        debug!("{}: stamping {} on {} cases", self.def.key, fk_field, stamped.len());

        match case_resource.create_cases(stamped).await {
            Ok(created_cases) => Ok((created, created_cases)),
            Err(source) => {
                warn!(
                    "{}: cases failed after master {} was created; master left in place",
                    self.def.key, id
                );
                Err(AlanaError::OrphanedMaster {
                    resource: self.def.key.clone(),
                    id,
                    source: Box::new(source),
                })
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_form_rejects_non_object() {
        let err = build_form(&json!([1, 2]), Vec::new()).unwrap_err();
        assert!(matches!(err, AlanaError::InvalidArgument(_)));
    }

    #[test]
    fn test_build_form_accepts_fields_and_files() {
        let fields = json!({"name": "model", "version": 2, "note": null});
        let uploads = vec![Upload::new("file", "model.pkl", vec![1, 2, 3])];
        assert!(build_form(&fields, uploads).is_ok());
    }

    #[test]
    fn test_upload_from_missing_path_is_io_error() {
        tokio_test::block_on(async {
            let err = Upload::from_path("file", Path::new("/nonexistent/alana/model.pkl"))
                .await
                .unwrap_err();
            assert!(matches!(err, AlanaError::Io { .. }));
        });
    }

    #[test]
    fn test_upload_from_path_without_file_name_is_rejected() {
        tokio_test::block_on(async {
            let err = Upload::from_path("file", Path::new("/")).await.unwrap_err();
            assert!(matches!(err, AlanaError::InvalidArgument(_)));
        });
    }

    #[test]
    fn test_upload_from_path_uses_file_name() {
        tokio_test::block_on(async {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("wells.csv");
            std::fs::write(&path, b"well_name\nW1\n").unwrap();

            let upload = Upload::from_path("file_uploaded", &path).await.unwrap();
            assert_eq!(upload.file_name, "wells.csv");
            assert_eq!(upload.field, "file_uploaded");
            assert_eq!(upload.bytes, b"well_name\nW1\n");
        });
    }
}
