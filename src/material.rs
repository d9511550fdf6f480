//! Materials and their on-disk documents
//!
//! A material owns its node tree and a bag of custom properties. The catalog
//! identifier of a published material is kept there so the next export
//! updates it instead of creating a new entry.

use crate::constants::material::{CREATOR, FILE_VERSION, REMOTE_ID_KEY};
use crate::error::{Error, Result};
use crate::nodes::ShaderTree;
use crate::remote::RemoteId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub tree: ShaderTree,
    #[serde(default)]
    pub custom_properties: BTreeMap<String, Value>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_tree(mut self, tree: ShaderTree) -> Self {
        self.tree = tree;
        self
    }

    /// Catalog identifier remembered from the last successful export
    pub fn remote_id(&self) -> Option<RemoteId> {
        let id = match self.custom_properties.get(REMOTE_ID_KEY)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        };
        id.filter(|id| *id > 0)
    }

    pub fn set_remote_id(&mut self, id: RemoteId) {
        self.custom_properties.insert(REMOTE_ID_KEY.to_string(), Value::from(id));
    }

    /// Forgets the catalog identifier; the next export creates a new material
    pub fn clear_remote_id(&mut self) -> Option<RemoteId> {
        let previous = self.remote_id();
        self.custom_properties.remove(REMOTE_ID_KEY);
        previous
    }
}

/// Versioned material document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialDocument {
    pub version: String,
    pub metadata: DocumentMetadata,
    pub material: Material,
}

/// Metadata for material documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub created: String,  // ISO 8601 timestamp
    pub modified: String, // ISO 8601 timestamp
    pub creator: String,
}

/// Loads and saves material documents
#[derive(Debug, Default)]
pub struct MaterialFile {
    /// Path of the last loaded or saved document
    current_path: Option<PathBuf>,
    /// Creation timestamp carried over when re-saving a loaded document
    created: Option<String>,
}

impl MaterialFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_path(&self) -> Option<&PathBuf> {
        self.current_path.as_ref()
    }

    pub fn load(&mut self, path: &Path) -> Result<Material> {
        let content = std::fs::read_to_string(path)?;
        let document: MaterialDocument = serde_json::from_str(&content)?;
        if document.version != FILE_VERSION {
            return Err(Error::validation(format!(
                "unsupported material document version {}",
                document.version
            )));
        }
        self.current_path = Some(path.to_path_buf());
        self.created = Some(document.metadata.created);
        Ok(document.material)
    }

    pub fn save(&mut self, path: &Path, material: &Material) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let document = MaterialDocument {
            version: FILE_VERSION.to_string(),
            metadata: DocumentMetadata {
                created: self.created.clone().unwrap_or_else(|| now.clone()),
                modified: now,
                creator: CREATOR.to_string(),
            },
            material: material.clone(),
        };
        let json = serde_json::to_string_pretty(&document)?;
        std::fs::write(path, json)?;

        self.created = Some(document.metadata.created);
        self.current_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Saves back to the path the material was loaded from
    pub fn save_current(&mut self, material: &Material) -> Result<()> {
        let path = self
            .current_path
            .clone()
            .ok_or_else(|| Error::validation("no file path set"))?;
        self.save(&path, material)
    }
}
