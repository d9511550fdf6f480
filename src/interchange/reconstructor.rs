//! Rebuilding a node tree from a downloaded program

use super::image_codec::decode_data_uri;
use super::program::{Instruction, RemoteProgram};
use crate::constants::image::DEFAULT_COLOR_SPACE;
use crate::error::{Error, Result};
use crate::nodes::{layout, Node, NodeGraph, NodeImage, ShaderTree, SocketDirection};
use glam::Vec2;
use log::{debug, info, warn};

/// Replays programs into node trees
#[derive(Debug, Clone, Copy)]
pub struct GraphReconstructor {
    /// Run the cosmetic layout pass after a successful replay
    pub auto_layout: bool,
}

impl Default for GraphReconstructor {
    fn default() -> Self {
        Self { auto_layout: true }
    }
}

impl GraphReconstructor {
    pub fn new(auto_layout: bool) -> Self {
        Self { auto_layout }
    }

    /// Replaces `target` with the tree described by `program`
    ///
    /// The program is replayed into a fresh tree first, so a failing
    /// instruction leaves `target` untouched and the call can be retried. A
    /// blank program is a no-op.
    pub fn apply(&self, program: &RemoteProgram, target: &mut ShaderTree) -> Result<()> {
        let instructions = program.instructions()?;
        if instructions.is_empty() {
            debug!("Empty program, leaving node tree unchanged");
            return Ok(());
        }

        let mut scratch = ShaderTree::new();
        for (index, instruction) in instructions.iter().enumerate() {
            execute(&mut scratch, instruction).map_err(|e| {
                Error::structural(format!("instruction {} failed: {}", index + 1, e))
            })?;
        }
        info!(
            "Rebuilt node tree: {} root node(s), {} group(s)",
            scratch.root.nodes.len(),
            scratch.groups.len()
        );
        *target = scratch;

        if self.auto_layout {
            if let Err(e) = layout::arrange_tree(target) {
                warn!("Auto-layout skipped: {}", e);
            }
        }
        Ok(())
    }
}

/// Applies `program` to `target` and runs the layout pass
pub fn apply(program: &RemoteProgram, target: &mut ShaderTree) -> Result<()> {
    GraphReconstructor::default().apply(program, target)
}

fn node_mut<'a>(graph: &'a mut NodeGraph, name: &str) -> Result<&'a mut Node> {
    let id = graph
        .node_id_by_name(name)
        .ok_or_else(|| Error::structural(format!("no node named '{}'", name)))?;
    graph
        .node_mut(id)
        .ok_or_else(|| Error::structural(format!("no node named '{}'", name)))
}

fn execute(tree: &mut ShaderTree, instruction: &Instruction) -> Result<()> {
    match instruction {
        Instruction::CreateGroup { name } => tree.add_group(name.clone(), NodeGraph::new()),

        Instruction::CreateNode {
            graph,
            name,
            node_type,
            group,
            label,
            location,
        } => {
            if let Some(group) = group {
                if tree.group(group).is_none() {
                    return Err(Error::structural(format!(
                        "group '{}' must be created before nodes that use it",
                        group
                    )));
                }
            }
            let target = tree.graph_mut(graph.as_deref())?;
            if target.node_by_name(name).is_some() {
                return Err(Error::structural(format!("node '{}' already exists", name)));
            }
            let mut node = match group {
                Some(group) => Node::new_group(name.clone(), group.clone()),
                None => Node::new(name.clone(), node_type.clone()),
            };
            node.node_type = node_type.clone();
            if let Some(label) = label {
                node.label = label.clone();
            }
            if let Some([x, y]) = location {
                node.location = Vec2::new(*x, *y);
            }
            target.add_node(node);
            Ok(())
        }

        Instruction::AddSocket {
            graph,
            node,
            direction,
            name,
            socket_type,
        } => {
            let node = node_mut(tree.graph_mut(graph.as_deref())?, node)?;
            if node.socket(*direction, name).is_some() {
                return Err(Error::structural(format!(
                    "node '{}' already has {} socket '{}'",
                    node.name,
                    direction.as_str(),
                    name
                )));
            }
            match direction {
                SocketDirection::Input => node.add_input(name.clone(), *socket_type),
                SocketDirection::Output => node.add_output(name.clone(), *socket_type),
            };
            Ok(())
        }

        Instruction::SetProperty {
            graph,
            node,
            property,
            value,
        } => {
            node_mut(tree.graph_mut(graph.as_deref())?, node)?.set_property(property.clone(), value.clone());
            Ok(())
        }

        Instruction::SetInput {
            graph,
            node,
            socket,
            value,
        } => {
            let node = node_mut(tree.graph_mut(graph.as_deref())?, node)?;
            let node_name = node.name.clone();
            let input = node
                .socket_mut(SocketDirection::Input, socket)
                .ok_or_else(|| Error::structural(format!("node '{}' has no input '{}'", node_name, socket)))?;
            input.default_value = Some(value.clone());
            Ok(())
        }

        Instruction::Link {
            graph,
            from_node,
            from_socket,
            to_node,
            to_socket,
        } => tree
            .graph_mut(graph.as_deref())?
            .link_by_name(from_node, from_socket, to_node, to_socket),

        Instruction::SetImage {
            graph,
            node,
            name,
            color_space,
            data,
        } => {
            let buffer = decode_data_uri(data)?;
            let node = node_mut(tree.graph_mut(graph.as_deref())?, node)?;
            let color_space = if color_space.is_empty() {
                DEFAULT_COLOR_SPACE.to_string()
            } else {
                color_space.clone()
            };
            let image_name = name.clone().unwrap_or_else(|| node.name.clone());
            node.set_image(NodeImage::new(image_name, color_space, buffer));
            Ok(())
        }
    }
}
