//! Export, import and reset workflows for a single material
//!
//! The caller runs one workflow at a time per material; nothing here blocks
//! re-entrant use.

use crate::error::Result;
use crate::interchange::{ExportMetadata, GraphReconstructor, PackageAssembler};
use crate::material::Material;
use crate::remote::{CatalogClient, Category, RemoteId};
use log::info;

/// What the artist asked to publish
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportRequest {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<i64>,
}

/// Connects materials to a catalog
pub struct MaterialSync<C> {
    client: C,
    reconstructor: GraphReconstructor,
    known_categories: Option<Vec<Category>>,
}

impl<C: CatalogClient> MaterialSync<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            reconstructor: GraphReconstructor::default(),
            known_categories: None,
        }
    }

    /// Enables or disables the layout pass after imports
    pub fn with_auto_layout(mut self, enabled: bool) -> Self {
        self.reconstructor = GraphReconstructor::new(enabled);
        self
    }

    /// Validates export categories against this list instead of asking the catalog
    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.known_categories = Some(categories);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Publishes the material, remembering the returned identifier
    ///
    /// An existing identifier turns the upload into an update. On failure the
    /// material is left as it was.
    pub fn export(&self, material: &mut Material, request: &ExportRequest) -> Result<RemoteId> {
        let metadata = ExportMetadata {
            name: request.name.clone(),
            description: request.description.clone(),
            category: request.category,
            remote_id: material.remote_id(),
        };
        let assembler = PackageAssembler::new();
        assembler.validate(&metadata)?;
        let categories = match &self.known_categories {
            Some(categories) => categories.clone(),
            None => self.client.categories()?,
        };
        let package = assembler.with_categories(categories).assemble(&material.tree, &metadata)?;
        let id = self.client.publish(&package)?;

        material.set_remote_id(id);
        info!("Material was successfully added to Shader Cloud (id {})", id);
        Ok(id)
    }

    /// Downloads material `id` and rebuilds the material's node tree from it
    pub fn import(&self, material: &mut Material, id: RemoteId) -> Result<()> {
        let program = self.client.fetch(id)?;
        self.reconstructor.apply(&program, &mut material.tree)?;
        info!("Material {} was successfully imported", id);
        Ok(())
    }

    /// Forgets the material's catalog identifier
    pub fn reset(&self, material: &mut Material) -> Option<RemoteId> {
        material.clear_remote_id()
    }

    pub fn categories(&self) -> Result<Vec<Category>> {
        self.client.categories()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::interchange::{Instruction, MaterialPackage, RemoteProgram};
    use crate::nodes::{Node, NodeImage, PixelBuffer, ShaderTree};
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct FakeCatalog {
        fail_publish: bool,
        next_id: Cell<i64>,
        published: RefCell<Vec<MaterialPackage>>,
        program: String,
        fetches: Cell<usize>,
        category_requests: Cell<usize>,
    }

    impl CatalogClient for FakeCatalog {
        fn publish(&self, package: &MaterialPackage) -> Result<RemoteId> {
            if self.fail_publish {
                return Err(Error::Api {
                    code: 200,
                    message: "Name taken".into(),
                });
            }
            self.published.borrow_mut().push(package.clone());
            self.next_id.set(self.next_id.get() + 1);
            Ok(self.next_id.get())
        }

        fn fetch(&self, id: RemoteId) -> Result<RemoteProgram> {
            if id <= 0 {
                return Err(Error::validation("You must enter a material ID"));
            }
            self.fetches.set(self.fetches.get() + 1);
            Ok(RemoteProgram::new(self.program.clone()))
        }

        fn categories(&self) -> Result<Vec<Category>> {
            self.category_requests.set(self.category_requests.get() + 1);
            Ok(vec![Category { id: 7, name: "Stone".into() }])
        }
    }

    fn rock() -> Material {
        let mut tree = ShaderTree::new();
        let image = NodeImage::new("rock.png", "sRGB", PixelBuffer::filled(2, 2, [1.0; 4]));
        tree.root.add_node(Node::new_image_texture("T1", image));
        Material::new("Rock").with_tree(tree)
    }

    fn request() -> ExportRequest {
        ExportRequest {
            name: "Rock".into(),
            description: None,
            category: Some(7),
        }
    }

    #[test]
    fn test_first_export_creates_then_updates() {
        let sync = MaterialSync::new(FakeCatalog::default());
        let mut material = rock();

        assert_eq!(sync.export(&mut material, &request()).unwrap(), 1);
        assert_eq!(material.remote_id(), Some(1));

        sync.export(&mut material, &request()).unwrap();
        let published = sync.client().published.borrow();
        assert_eq!(published[0].remote_id, None);
        assert_eq!(published[1].remote_id, Some(1));
    }

    #[test]
    fn test_failed_export_keeps_remote_id() {
        let sync = MaterialSync::new(FakeCatalog {
            fail_publish: true,
            ..FakeCatalog::default()
        });
        let mut material = rock();
        material.set_remote_id(5);

        let err = sync.export(&mut material, &request()).unwrap_err();
        assert!(matches!(err, Error::Api { .. }));
        assert_eq!(material.remote_id(), Some(5));
    }

    #[test]
    fn test_invalid_request_never_publishes() {
        let sync = MaterialSync::new(FakeCatalog::default()).with_categories(vec![Category {
            id: 3,
            name: "Wood".into(),
        }]);
        let mut material = rock();

        assert!(matches!(sync.export(&mut material, &request()), Err(Error::Validation(_))));
        assert!(sync.client().published.borrow().is_empty());
        assert_eq!(material.remote_id(), None);
    }

    #[test]
    fn test_unknown_category_is_checked_against_catalog() {
        let sync = MaterialSync::new(FakeCatalog::default());
        let mut material = rock();
        let unknown = ExportRequest {
            category: Some(999),
            ..request()
        };

        assert!(matches!(sync.export(&mut material, &unknown), Err(Error::Validation(_))));
        assert_eq!(sync.client().category_requests.get(), 1);
        assert!(sync.client().published.borrow().is_empty());
        assert_eq!(material.remote_id(), None);
    }

    #[test]
    fn test_empty_name_fails_before_listing_categories() {
        let sync = MaterialSync::new(FakeCatalog::default());
        let mut material = rock();
        let unnamed = ExportRequest {
            name: " ".into(),
            ..request()
        };

        assert!(matches!(sync.export(&mut material, &unnamed), Err(Error::Validation(_))));
        assert_eq!(sync.client().category_requests.get(), 0);
        assert!(sync.client().published.borrow().is_empty());
    }

    #[test]
    fn test_import_rebuilds_tree() {
        let program = RemoteProgram::from_instructions(&[Instruction::CreateNode {
            graph: None,
            name: "Emission".into(),
            node_type: "ShaderNodeEmission".into(),
            group: None,
            label: None,
            location: None,
        }])
        .unwrap();
        let sync = MaterialSync::new(FakeCatalog {
            program: program.text().to_string(),
            ..FakeCatalog::default()
        })
        .with_auto_layout(false);
        let mut material = rock();

        sync.import(&mut material, 12).unwrap();
        assert!(material.tree.root.node_by_name("Emission").is_some());
        assert!(material.tree.root.node_by_name("T1").is_none());
    }

    #[test]
    fn test_import_rejects_bad_id_without_fetching() {
        let sync = MaterialSync::new(FakeCatalog::default());
        let mut material = rock();
        let before = material.clone();

        assert!(matches!(sync.import(&mut material, 0), Err(Error::Validation(_))));
        assert_eq!(sync.client().fetches.get(), 0);
        assert_eq!(material, before);
    }

    #[test]
    fn test_reset_clears_id() {
        let sync = MaterialSync::new(FakeCatalog::default());
        let mut material = rock();
        material.set_remote_id(3);
        assert_eq!(sync.reset(&mut material), Some(3));
        assert_eq!(material.remote_id(), None);
        assert_eq!(sync.categories().unwrap().len(), 1);
    }
}
