//! Node system - shading graphs, sockets, values and group trees

pub mod graph;
pub mod layout;
pub mod node;
pub mod port;
pub mod texture;
pub mod tree;
pub mod value;

// Re-export core types
pub use graph::{Link, NodeGraph};
pub use node::{Node, NodeId, NodeKind};
pub use port::{Socket, SocketDirection, SocketId, SocketType};
pub use texture::{NodeImage, PixelBuffer};
pub use tree::ShaderTree;
pub use value::PropertyValue;
