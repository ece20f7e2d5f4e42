//! Resource Catalog - Load resource definitions from JSON
//!
//! This module loads every Alana resource type (its app segment, table
//! segment, name key field and declared foreign keys) from embedded JSON
//! files and provides lookup functions for the rest of the library.

use serde::Deserialize;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[
    include_str!("../resources/datasource.json"),
    include_str!("../resources/dca.json"),
    include_str!("../resources/fdp.json"),
    include_str!("../resources/economics.json"),
    include_str!("../resources/models.json"),
];

/// Name key used when a resource does not declare one
pub const DEFAULT_NAME_FIELD: &str = "name";

fn default_name_field() -> String {
    DEFAULT_NAME_FIELD.to_string()
}

/// Foreign key declaration: `field` holds an id of `target`, shown as `display`
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ForeignKeyDef {
    pub field: String,
    pub target: String,
    pub display: String,
}

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ResourceDef {
    /// Catalog key; the table segment, or `app/table` for ad-hoc definitions
    #[serde(skip)]
    pub key: String,
    #[serde(default)]
    pub display_name: String,
    pub app: String,
    #[serde(skip)]
    pub table: String,
    /// JSON field holding the human-readable name
    #[serde(default = "default_name_field")]
    pub name_field: String,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDef>,
    /// Catalog key of the child table, for master resources
    #[serde(default)]
    pub cases: Option<String>,
}

impl ResourceDef {
    /// Definition for an `(app, table)` pair with no catalog entry
    ///
    /// The key carries the app segment so its lookup cache never shares a
    /// slot with a catalog entry of the same table name.
    pub fn adhoc(app: &str, table: &str) -> Self {
        Self {
            key: format!("{app}/{table}"),
            display_name: table.to_string(),
            app: app.to_string(),
            table: table.to_string(),
            name_field: default_name_field(),
            foreign_keys: Vec::new(),
            cases: None,
        }
    }

    /// `/api/{app}/{table}/`
    pub fn collection_path(&self) -> String {
        format!("/api/{}/{}/", self.app, self.table)
    }

    /// `/api/{app}/{table}/{id}/`
    pub fn item_path(&self, id: i64) -> String {
        format!("/api/{}/{}/{}/", self.app, self.table, id)
    }

    /// `/api/{app}/{table}/{id}/download/`
    pub fn download_path(&self, id: i64) -> String {
        format!("/api/{}/{}/{}/download/", self.app, self.table, id)
    }

    /// Field children carry to point at a row of this resource
    pub fn master_fk(&self) -> String {
        format!("{}_fk", self.table)
    }

    /// Declared foreign key for a field, if any
    pub fn foreign_key(&self, field: &str) -> Option<&ForeignKeyDef> {
        self.foreign_keys.iter().find(|fk| fk.field == field)
    }
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceCatalog {
    #[serde(default)]
    pub resources: HashMap<String, ResourceDef>,
}

/// Global catalog loaded from JSON
static CATALOG: OnceLock<ResourceCatalog> = OnceLock::new();

/// Get the resource catalog (loads from embedded JSON on first access)
pub fn get_catalog() -> &'static ResourceCatalog {
    CATALOG.get_or_init(|| {
        let mut final_catalog = ResourceCatalog {
            resources: HashMap::new(),
        };

        for content in RESOURCE_FILES {
            let partial: ResourceCatalog = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            for (key, mut def) in partial.resources {
                def.key = key.clone();
                def.table = key.clone();
                final_catalog.resources.insert(key, def);
            }
        }

        final_catalog
    })
}

/// Get a resource definition by key
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    get_catalog().resources.get(key)
}

/// Find the catalog entry for an `(app, table)` pair
pub fn find_resource(app: &str, table: &str) -> Option<&'static ResourceDef> {
    get_resource(table).filter(|def| def.app == app)
}

/// Catalog entry for `(app, table)`, or an ad-hoc definition when unregistered
pub fn resolve_def(app: &str, table: &str) -> Cow<'static, ResourceDef> {
    match find_resource(app, table) {
        Some(def) => Cow::Borrowed(def),
        None => Cow::Owned(ResourceDef::adhoc(app, table)),
    }
}

/// Get all resource keys, sorted
pub fn get_all_resource_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = get_catalog()
        .resources
        .keys()
        .map(|s| s.as_str())
        .collect();
    keys.sort_unstable();
    keys
}
