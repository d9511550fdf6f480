//! Socket types and functionality for node connections

use super::value::PropertyValue;
use serde::{Deserialize, Serialize};

/// Unique identifier for a socket within its node and direction
pub type SocketId = usize;

/// Direction of a socket (input or output)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocketDirection {
    Input,
    Output,
}

impl SocketDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SocketDirection::Input => "input",
            SocketDirection::Output => "output",
        }
    }
}

/// Kind of data carried by a socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocketType {
    Float,
    Int,
    Bool,
    Vector,
    Color,
    String,
    Shader,
}

impl SocketType {
    /// Name used in serialized graphs
    pub fn name(&self) -> &'static str {
        match self {
            SocketType::Float => "VALUE",
            SocketType::Int => "INT",
            SocketType::Bool => "BOOLEAN",
            SocketType::Vector => "VECTOR",
            SocketType::Color => "RGBA",
            SocketType::String => "STRING",
            SocketType::Shader => "SHADER",
        }
    }

    /// Whether an output of this type may feed an input of `other`
    pub fn can_connect_to(&self, other: &SocketType) -> bool {
        match (self, other) {
            (SocketType::Shader, SocketType::Shader) => true,
            (SocketType::Shader, _) | (_, SocketType::Shader) => false,
            // Scalars, vectors and colors convert implicitly
            _ => true,
        }
    }
}

/// Represents a connection point on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Socket {
    pub id: SocketId,
    pub name: String,
    pub socket_type: SocketType,
    pub direction: SocketDirection,
    /// Value used when nothing is linked into the socket
    pub default_value: Option<PropertyValue>,
}

impl Socket {
    /// Creates a new socket
    pub fn new(
        id: SocketId,
        name: impl Into<String>,
        socket_type: SocketType,
        direction: SocketDirection,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            socket_type,
            direction,
            default_value: None,
        }
    }
}
