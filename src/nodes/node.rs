//! Node types and core node functionality

use super::port::{Socket, SocketDirection, SocketType};
use super::texture::NodeImage;
use super::value::PropertyValue;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Unique identifier for a node within its graph
pub type NodeId = usize;

/// Node type string used for image texture nodes
pub const IMAGE_TEXTURE: &str = "ShaderNodeTexImage";

/// Node type string used for group reference nodes
pub const GROUP: &str = "ShaderNodeGroup";

/// Kind of node - regular shading node or a reference to a group graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// Regular shading node
    Regular,
    /// Group node pointing at an entry of the tree's group library
    Group {
        /// Key of the referenced group graph
        group: String,
    },
}

/// A shading node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Unique within the owning graph
    pub name: String,
    /// Host node type identifier, e.g. "ShaderNodeMath"
    pub node_type: String,
    pub label: String,
    pub location: Vec2,
    pub inputs: Vec<Socket>,
    pub outputs: Vec<Socket>,
    /// Settable properties in declaration order
    pub properties: Vec<(String, PropertyValue)>,
    pub kind: NodeKind,
    image: Option<NodeImage>,
}

impl Node {
    /// Creates a new regular node
    pub fn new(name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            node_type: node_type.into(),
            label: String::new(),
            location: Vec2::ZERO,
            inputs: vec![],
            outputs: vec![],
            properties: vec![],
            kind: NodeKind::Regular,
            image: None,
        }
    }

    /// Creates a group node referencing `group` in the tree's group library
    pub fn new_group(name: impl Into<String>, group: impl Into<String>) -> Self {
        let mut node = Self::new(name, GROUP);
        node.kind = NodeKind::Group { group: group.into() };
        node
    }

    /// Creates an image texture node with the standard sockets
    pub fn new_image_texture(name: impl Into<String>, image: NodeImage) -> Self {
        let mut node = Self::new(name, IMAGE_TEXTURE);
        node.add_input("Vector", SocketType::Vector)
            .add_output("Color", SocketType::Color)
            .add_output("Alpha", SocketType::Float);
        node.set_property("interpolation", PropertyValue::Enum("Linear".into()));
        node.set_property("extension", PropertyValue::Enum("REPEAT".into()));
        node.image = Some(image);
        node
    }

    /// Adds an input socket to the node
    pub fn add_input(&mut self, name: impl Into<String>, socket_type: SocketType) -> &mut Self {
        let id = self.inputs.len();
        self.inputs.push(Socket::new(id, name, socket_type, SocketDirection::Input));
        self
    }

    /// Adds an input socket with a default value
    pub fn add_input_with_default(
        &mut self,
        name: impl Into<String>,
        socket_type: SocketType,
        value: PropertyValue,
    ) -> &mut Self {
        self.add_input(name, socket_type);
        if let Some(socket) = self.inputs.last_mut() {
            socket.default_value = Some(value);
        }
        self
    }

    /// Adds an output socket to the node
    pub fn add_output(&mut self, name: impl Into<String>, socket_type: SocketType) -> &mut Self {
        let id = self.outputs.len();
        self.outputs.push(Socket::new(id, name, socket_type, SocketDirection::Output));
        self
    }

    /// Sets the location of the node
    pub fn with_location(mut self, x: f32, y: f32) -> Self {
        self.location = Vec2::new(x, y);
        self
    }

    /// Sets a property, keeping the position of an existing entry
    pub fn set_property(&mut self, name: impl Into<String>, value: PropertyValue) {
        let name = name.into();
        match self.properties.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.properties.push((name, value)),
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Finds a socket by name in the given direction
    pub fn socket(&self, direction: SocketDirection, name: &str) -> Option<&Socket> {
        self.sockets(direction).iter().find(|s| s.name == name)
    }

    pub fn socket_mut(&mut self, direction: SocketDirection, name: &str) -> Option<&mut Socket> {
        let sockets = match direction {
            SocketDirection::Input => &mut self.inputs,
            SocketDirection::Output => &mut self.outputs,
        };
        sockets.iter_mut().find(|s| s.name == name)
    }

    pub fn sockets(&self, direction: SocketDirection) -> &[Socket] {
        match direction {
            SocketDirection::Input => &self.inputs,
            SocketDirection::Output => &self.outputs,
        }
    }

    /// Whether this node carries a raster image
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn image(&self) -> Option<&NodeImage> {
        self.image.as_ref()
    }

    pub fn set_image(&mut self, image: NodeImage) {
        self.image = Some(image);
    }

    /// Check if this is a group node
    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group { .. })
    }

    /// Key of the referenced group if this is a group node
    pub fn group_key(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Group { group } => Some(group),
            NodeKind::Regular => None,
        }
    }
}
