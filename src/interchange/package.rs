//! Assembly of the upload payload for one material

use super::image_codec::{EncodedImage, PngTextureEncoder, TextureEncoder};
use super::serializer::{serialize, SerializedGraph};
use crate::constants::{api, serialize::ROOT_LABEL};
use crate::error::{Error, Result};
use crate::nodes::{NodeGraph, ShaderTree};
use crate::remote::Category;
use log::debug;
use std::collections::BTreeMap;

/// Artist-supplied metadata for an export
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportMetadata {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<i64>,
    /// Catalog identifier from a previous export, if any
    pub remote_id: Option<i64>,
}

impl ExportMetadata {
    pub fn new(name: impl Into<String>, category: i64) -> Self {
        Self {
            name: name.into(),
            category: Some(category),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_remote_id(mut self, remote_id: Option<i64>) -> Self {
        self.remote_id = remote_id;
        self
    }
}

/// Everything sent to the catalog for one export
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialPackage {
    pub name: String,
    pub description: Option<String>,
    pub category: i64,
    pub remote_id: Option<i64>,
    pub graph: SerializedGraph,
    /// Encoded textures keyed by [`image_key`]
    pub images: BTreeMap<String, EncodedImage>,
}

impl MaterialPackage {
    /// Whether the catalog should update an existing material
    pub fn is_update(&self) -> bool {
        self.remote_id.is_some()
    }

    /// Form fields of the upload request
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            (api::FIELD_XML.to_string(), self.graph.as_str().to_string()),
            (api::FIELD_NAME.to_string(), self.name.clone()),
            (api::FIELD_CATEGORY.to_string(), self.category.to_string()),
        ];
        if let Some(description) = &self.description {
            fields.push((api::FIELD_DESCRIPTION.to_string(), description.clone()));
        }
        if let Some(id) = self.remote_id {
            fields.push((api::FIELD_MATERIAL_ID.to_string(), id.to_string()));
        }
        for (key, image) in &self.images {
            fields.push((format!("images[{}][image_data]", key), image.data_uri()));
            fields.push((format!("images[{}][color_space]", key), image.color_space.clone()));
        }
        fields
    }
}

/// Builds material packages
///
/// Metadata is validated before the graph is serialized, and the graph is
/// serialized before any texture is encoded.
pub struct PackageAssembler<E = PngTextureEncoder> {
    encoder: E,
    known_categories: Option<Vec<Category>>,
}

impl PackageAssembler<PngTextureEncoder> {
    pub fn new() -> Self {
        Self {
            encoder: PngTextureEncoder,
            known_categories: None,
        }
    }
}

impl Default for PackageAssembler<PngTextureEncoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: TextureEncoder> PackageAssembler<E> {
    /// Uses a different texture encoder
    pub fn with_encoder<F: TextureEncoder>(self, encoder: F) -> PackageAssembler<F> {
        PackageAssembler {
            encoder,
            known_categories: self.known_categories,
        }
    }

    /// Restricts categories to those listed by the catalog
    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.known_categories = Some(categories);
        self
    }

    pub fn assemble(&self, tree: &ShaderTree, metadata: &ExportMetadata) -> Result<MaterialPackage> {
        let (name, category) = self.validate(metadata)?;
        let graph = serialize(tree, ROOT_LABEL)?;

        let mut images = BTreeMap::new();
        self.encode_level(&tree.root, None, &mut images)?;
        for group in tree.reachable_groups() {
            let graph = tree.graph(Some(group))?;
            self.encode_level(graph, Some(group), &mut images)?;
        }
        debug!("Packaged '{}' with {} image(s)", name, images.len());

        Ok(MaterialPackage {
            name,
            description: metadata
                .description
                .as_ref()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            category,
            remote_id: metadata.remote_id,
            graph,
            images,
        })
    }

    /// Checks name, category and remote id without touching the tree
    pub fn validate(&self, metadata: &ExportMetadata) -> Result<(String, i64)> {
        let name = metadata.name.trim();
        if name.is_empty() {
            return Err(Error::validation("You must give your material a name"));
        }
        let category = match metadata.category {
            Some(id) if id > 0 => id,
            Some(id) => {
                return Err(Error::validation(format!("invalid category id {}", id)));
            }
            None => return Err(Error::validation("You must choose a category")),
        };
        if let Some(known) = &self.known_categories {
            if !known.iter().any(|c| c.id == category) {
                return Err(Error::validation(format!("unknown category id {}", category)));
            }
        }
        if let Some(id) = metadata.remote_id {
            if id <= 0 {
                return Err(Error::validation(format!("invalid remote material id {}", id)));
            }
        }
        Ok((name.to_string(), category))
    }

    fn encode_level(
        &self,
        graph: &NodeGraph,
        group: Option<&str>,
        images: &mut BTreeMap<String, EncodedImage>,
    ) -> Result<()> {
        for node in graph.nodes.values() {
            let Some(image) = node.image() else {
                continue;
            };
            images.insert(image_key(group, &node.name), self.encoder.encode(image)?);
        }
        Ok(())
    }
}

/// Key of a node's texture in [`MaterialPackage::images`]
///
/// Root nodes use their name and group nodes `group/node`. `%`, `/`, `[` and
/// `]` inside either name are percent-encoded, so keys never collide and stay
/// usable inside `images[<key>]` form field names.
pub fn image_key(group: Option<&str>, node: &str) -> String {
    match group {
        Some(group) => format!("{}/{}", escape_key_part(group), escape_key_part(node)),
        None => escape_key_part(node),
    }
}

fn escape_key_part(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    for c in part.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            '[' => out.push_str("%5B"),
            ']' => out.push_str("%5D"),
            c => out.push(c),
        }
    }
    out
}

/// Builds a package with the default PNG encoder
pub fn build_export_package(tree: &ShaderTree, metadata: &ExportMetadata) -> Result<MaterialPackage> {
    PackageAssembler::new().assemble(tree, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interchange::image_codec::decode_data_uri;
    use crate::nodes::{Node, NodeImage, PixelBuffer};
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingEncoder {
        calls: Cell<usize>,
    }

    impl TextureEncoder for &CountingEncoder {
        fn encode(&self, image: &NodeImage) -> Result<EncodedImage> {
            self.calls.set(self.calls.get() + 1);
            PngTextureEncoder.encode(image)
        }
    }

    fn white(name: &str) -> Node {
        let image = NodeImage::new(format!("{}.png", name), "sRGB", PixelBuffer::filled(2, 2, [1.0; 4]));
        Node::new_image_texture(name, image)
    }

    fn textured_tree() -> ShaderTree {
        let mut tree = ShaderTree::new();
        tree.root.add_node(white("T1"));
        tree
    }

    #[test]
    fn test_empty_name_encodes_nothing() {
        let counter = CountingEncoder::default();
        let assembler = PackageAssembler::new().with_encoder(&counter);

        let err = assembler
            .assemble(&textured_tree(), &ExportMetadata::new("   ", 7))
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(counter.calls.get(), 0);
    }

    #[test]
    fn test_missing_or_unknown_category() {
        let tree = textured_tree();
        let mut metadata = ExportMetadata::new("Rock", 7);
        metadata.category = None;
        assert!(matches!(build_export_package(&tree, &metadata), Err(Error::Validation(_))));

        assert!(matches!(
            build_export_package(&tree, &ExportMetadata::new("Rock", 0)),
            Err(Error::Validation(_))
        ));

        let assembler = PackageAssembler::new().with_categories(vec![Category {
            id: 3,
            name: "Stone".into(),
        }]);
        assert!(matches!(
            assembler.assemble(&tree, &ExportMetadata::new("Rock", 7)),
            Err(Error::Validation(_))
        ));
        assert!(assembler.assemble(&tree, &ExportMetadata::new("Rock", 3)).is_ok());
    }

    #[test]
    fn test_white_texture_package() {
        let package = build_export_package(&textured_tree(), &ExportMetadata::new("Rock", 7)).unwrap();

        assert_eq!(package.name, "Rock");
        assert_eq!(package.category, 7);
        assert!(!package.is_update());
        assert!(package.graph.as_str().contains("<Node name=\"T1\""));
        assert!(!package.graph.has_groups());

        let image = &package.images["T1"];
        assert_eq!(image.color_space, "sRGB");
        let decoded = decode_data_uri(&image.data_uri()).unwrap();
        assert_eq!(decoded, PixelBuffer::filled(2, 2, [1.0; 4]));
    }

    #[test]
    fn test_group_images_are_prefixed_and_encoded_once() {
        let counter = CountingEncoder::default();
        let mut tree = textured_tree();
        tree.root.add_node(Node::new_group("Group", "Bark"));
        tree.root.add_node(Node::new_group("Group", "Bark"));
        let mut bark = NodeGraph::new();
        bark.add_node(white("T1"));
        tree.add_group("Bark", bark).unwrap();

        let package = PackageAssembler::new()
            .with_encoder(&counter)
            .assemble(&tree, &ExportMetadata::new("Tree", 2))
            .unwrap();

        assert_eq!(counter.calls.get(), 2);
        let keys: Vec<_> = package.images.keys().cloned().collect();
        assert_eq!(keys, vec!["Bark/T1".to_string(), "T1".to_string()]);
    }

    #[test]
    fn test_root_name_with_slash_does_not_collide_with_group_image() {
        let mut tree = ShaderTree::new();
        tree.root.add_node(white("Bark/T1"));
        tree.root.add_node(Node::new_group("Group", "Bark"));
        let mut bark = NodeGraph::new();
        bark.add_node(white("T1"));
        tree.add_group("Bark", bark).unwrap();

        let package = build_export_package(&tree, &ExportMetadata::new("Tree", 2)).unwrap();

        let keys: Vec<_> = package.images.keys().cloned().collect();
        assert_eq!(keys, vec!["Bark%2FT1".to_string(), "Bark/T1".to_string()]);
    }

    #[test]
    fn test_image_key_escapes_form_brackets() {
        assert_eq!(image_key(None, "T1"), "T1");
        assert_eq!(image_key(Some("Bark"), "T1"), "Bark/T1");
        assert_eq!(image_key(None, "a[0]%"), "a%5B0%5D%25");
    }

    #[test]
    fn test_cyclic_graph_fails_before_encoding() {
        let counter = CountingEncoder::default();
        let mut tree = textured_tree();
        tree.root.add_node(Node::new_group("Group", "Loop"));
        let mut looped = NodeGraph::new();
        looped.add_node(Node::new_group("Group", "Loop"));
        tree.add_group("Loop", looped).unwrap();

        let result = PackageAssembler::new()
            .with_encoder(&counter)
            .assemble(&tree, &ExportMetadata::new("Rock", 7));

        assert!(matches!(result, Err(Error::Structural(_))));
        assert_eq!(counter.calls.get(), 0);
    }

    #[test]
    fn test_form_fields() {
        let metadata = ExportMetadata::new(" Rock ", 7)
            .with_description("Mossy rock")
            .with_remote_id(Some(42));
        let package = build_export_package(&textured_tree(), &metadata).unwrap();
        let fields = package.form_fields();
        let get = |key: &str| {
            fields
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("material_name"), Some("Rock"));
        assert_eq!(get("material_category"), Some("7"));
        assert_eq!(get("material_description"), Some("Mossy rock"));
        assert_eq!(get("material_id"), Some("42"));
        assert_eq!(get("images[T1][color_space]"), Some("sRGB"));
        assert!(get("images[T1][image_data]").unwrap().starts_with("data:image/png;base64,"));
        assert!(get("xml").unwrap().starts_with("<ShaderCloud>"));
    }
}
