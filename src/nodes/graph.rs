//! Node graph data structures and operations

use super::node::{Node, NodeId};
use super::port::{SocketDirection, SocketId};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Represents a link between an output socket and an input socket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub from_node: NodeId,
    pub from_socket: SocketId,
    pub to_node: NodeId,
    pub to_socket: SocketId,
}

impl Link {
    /// Creates a new link
    pub fn new(from_node: NodeId, from_socket: SocketId, to_node: NodeId, to_socket: SocketId) -> Self {
        Self {
            from_node,
            from_socket,
            to_node,
            to_socket,
        }
    }
}

/// A graph containing nodes and their links
///
/// Nodes are kept in creation order, which is the enumeration order used by
/// serialization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeGraph {
    pub nodes: BTreeMap<NodeId, Node>,
    pub links: Vec<Link>,
    next_node_id: NodeId,
}

impl NodeGraph {
    /// Creates a new empty node graph
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a node to the graph and returns its ID
    ///
    /// A name already used in this graph gets a numeric suffix (`Name.001`).
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        let id = self.next_node_id;
        node.id = id;
        node.name = self.unique_name(&node.name);
        self.nodes.insert(id, node);
        self.next_node_id += 1;
        id
    }

    fn unique_name(&self, base: &str) -> String {
        if self.node_by_name(base).is_none() {
            return base.to_string();
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}.{:03}", base, n);
            if self.node_by_name(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.values().find(|n| n.name == name)
    }

    pub fn node_id_by_name(&self, name: &str) -> Option<NodeId> {
        self.node_by_name(name).map(|n| n.id)
    }

    /// Adds a link after checking that both endpoints exist
    pub fn add_link(&mut self, link: Link) -> Result<()> {
        self.check_link(&link)?;
        // An input accepts a single link
        self.links
            .retain(|l| !(l.to_node == link.to_node && l.to_socket == link.to_socket));
        self.links.push(link);
        Ok(())
    }

    /// Links two sockets addressed by node and socket names
    pub fn link_by_name(
        &mut self,
        from_node: &str,
        from_socket: &str,
        to_node: &str,
        to_socket: &str,
    ) -> Result<()> {
        let (from_id, from_socket_id) = self.resolve(from_node, SocketDirection::Output, from_socket)?;
        let (to_id, to_socket_id) = self.resolve(to_node, SocketDirection::Input, to_socket)?;
        self.add_link(Link::new(from_id, from_socket_id, to_id, to_socket_id))
    }

    fn resolve(&self, node: &str, direction: SocketDirection, socket: &str) -> Result<(NodeId, SocketId)> {
        let found = self
            .node_by_name(node)
            .ok_or_else(|| Error::structural(format!("no node named '{}'", node)))?;
        let socket_id = found
            .socket(direction, socket)
            .map(|s| s.id)
            .ok_or_else(|| {
                Error::structural(format!(
                    "node '{}' has no {} socket '{}'",
                    node,
                    direction.as_str(),
                    socket
                ))
            })?;
        Ok((found.id, socket_id))
    }

    /// Checks that a link connects an existing output to an existing input
    pub fn check_link(&self, link: &Link) -> Result<()> {
        if link.from_node == link.to_node {
            return Err(Error::structural("cannot link a node to itself"));
        }
        let from = self
            .nodes
            .get(&link.from_node)
            .ok_or_else(|| Error::structural(format!("link source node {} does not exist", link.from_node)))?;
        let to = self
            .nodes
            .get(&link.to_node)
            .ok_or_else(|| Error::structural(format!("link target node {} does not exist", link.to_node)))?;
        let out = from.outputs.get(link.from_socket).ok_or_else(|| {
            Error::structural(format!("node '{}' has no output {}", from.name, link.from_socket))
        })?;
        let input = to.inputs.get(link.to_socket).ok_or_else(|| {
            Error::structural(format!("node '{}' has no input {}", to.name, link.to_socket))
        })?;
        if !out.socket_type.can_connect_to(&input.socket_type) {
            return Err(Error::structural(format!(
                "cannot link {} output '{}' to {} input '{}'",
                out.socket_type.name(),
                out.name,
                input.socket_type.name(),
                input.name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::port::SocketType;

    fn bsdf() -> Node {
        let mut node = Node::new("Principled BSDF", "ShaderNodeBsdfPrincipled");
        node.add_input("Base Color", SocketType::Color)
            .add_input("Roughness", SocketType::Float)
            .add_output("BSDF", SocketType::Shader);
        node
    }

    fn output() -> Node {
        let mut node = Node::new("Material Output", "ShaderNodeOutputMaterial");
        node.add_input("Surface", SocketType::Shader);
        node
    }

    #[test]
    fn test_duplicate_names_get_suffix() {
        let mut graph = NodeGraph::new();
        graph.add_node(bsdf());
        let second = graph.add_node(bsdf());
        let third = graph.add_node(bsdf());
        assert_eq!(graph.node(second).unwrap().name, "Principled BSDF.001");
        assert_eq!(graph.node(third).unwrap().name, "Principled BSDF.002");
    }

    #[test]
    fn test_link_by_name() {
        let mut graph = NodeGraph::new();
        graph.add_node(bsdf());
        graph.add_node(output());
        graph
            .link_by_name("Principled BSDF", "BSDF", "Material Output", "Surface")
            .unwrap();
        assert_eq!(graph.links, vec![Link::new(0, 0, 1, 0)]);
    }

    #[test]
    fn test_link_rejects_missing_socket() {
        let mut graph = NodeGraph::new();
        graph.add_node(bsdf());
        graph.add_node(output());
        let err = graph
            .link_by_name("Principled BSDF", "Emission", "Material Output", "Surface")
            .unwrap_err();
        assert!(matches!(err, Error::Structural(_)));
        assert!(graph.links.is_empty());
    }

    #[test]
    fn test_link_rejects_incompatible_types() {
        let mut graph = NodeGraph::new();
        graph.add_node(bsdf());
        let mut value = Node::new("Value", "ShaderNodeValue");
        value.add_output("Value", SocketType::Float);
        graph.add_node(value);
        graph.add_node(output());
        assert!(graph.link_by_name("Value", "Value", "Material Output", "Surface").is_err());
    }

    #[test]
    fn test_input_keeps_single_link() {
        let mut graph = NodeGraph::new();
        let mut a = Node::new("A", "ShaderNodeValue");
        a.add_output("Value", SocketType::Float);
        let mut b = Node::new("B", "ShaderNodeValue");
        b.add_output("Value", SocketType::Float);
        graph.add_node(a);
        graph.add_node(b);
        graph.add_node(bsdf());
        graph.link_by_name("A", "Value", "Principled BSDF", "Roughness").unwrap();
        graph.link_by_name("B", "Value", "Principled BSDF", "Roughness").unwrap();
        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.links[0].from_node, 1);
    }
}
