//! Serialization of shading node trees into the catalog's XML form
//!
//! Each graph level lists its nodes in creation order, then its links, then
//! one `<GroupTree>` section per distinct group referenced on that level. A
//! group's section is complete before the level that references it closes.

use crate::error::{Error, Result};
use crate::nodes::{Link, Node, NodeGraph, ShaderTree, Socket};
use log::debug;
use std::collections::BTreeSet;
use std::fmt;

/// XML text of a serialized node tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedGraph(String);

impl SerializedGraph {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether the text contains at least one group section
    pub fn has_groups(&self) -> bool {
        self.0.contains("<GroupTree ")
    }
}

impl fmt::Display for SerializedGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serializes `tree` under a root element named `root_label`
pub fn serialize(tree: &ShaderTree, root_label: &str) -> Result<SerializedGraph> {
    if !is_element_name(root_label) {
        return Err(Error::validation(format!("invalid root label '{}'", root_label)));
    }
    let mut writer = XmlWriter::default();
    writer.open(root_label, &[]);
    {
        let mut walker = Walker {
            tree,
            stack: Vec::new(),
            writer: &mut writer,
        };
        walker.open_level("NodeTree", "root", &tree.root)?;
    }
    writer.close(root_label);
    Ok(SerializedGraph(writer.finish()?))
}

fn is_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

struct Walker<'a> {
    tree: &'a ShaderTree,
    /// Group keys currently being serialized, outermost first
    stack: Vec<&'a str>,
    writer: &'a mut XmlWriter,
}

impl<'a> Walker<'a> {
    fn open_level(&mut self, tag: &str, name: &str, graph: &'a NodeGraph) -> Result<()> {
        self.writer.open(tag, &[("name", name.to_string())]);

        for node in graph.nodes.values() {
            self.write_node(node);
        }
        for link in &graph.links {
            self.write_link(graph, link)?;
        }

        let mut emitted = BTreeSet::new();
        for key in graph.nodes.values().filter_map(Node::group_key) {
            if !emitted.insert(key) {
                continue;
            }
            if self.stack.contains(&key) {
                return Err(Error::structural(format!(
                    "group '{}' contains itself (via {})",
                    key,
                    self.stack.join(" > ")
                )));
            }
            let (key, group) = self
                .tree
                .groups
                .get_key_value(key)
                .ok_or_else(|| Error::structural(format!("group node references unknown group '{}'", key)))?;
            debug!("Serializing group '{}' at depth {}", key, self.stack.len() + 1);
            self.stack.push(key.as_str());
            self.open_level("GroupTree", key, group)?;
            self.stack.pop();
        }

        self.writer.close(tag);
        Ok(())
    }

    fn write_node(&mut self, node: &Node) {
        let mut attrs = vec![
            ("name", node.name.clone()),
            ("type", node.node_type.clone()),
            ("label", node.label.clone()),
            ("location", format!("{} {}", node.location.x, node.location.y)),
        ];
        if let Some(group) = node.group_key() {
            attrs.push(("group", group.to_string()));
        }
        self.writer.open("Node", &attrs);

        for (name, value) in &node.properties {
            self.writer.empty(
                "Property",
                &[
                    ("name", name.clone()),
                    ("type", value.type_name().to_string()),
                    ("value", value.to_portable()),
                ],
            );
        }
        for socket in &node.inputs {
            self.write_socket("Input", socket);
        }
        for socket in &node.outputs {
            self.write_socket("Output", socket);
        }
        if let Some(image) = node.image() {
            self.writer.empty(
                "Image",
                &[
                    ("name", image.name.clone()),
                    ("color_space", image.color_space.clone()),
                    ("width", image.buffer.width.to_string()),
                    ("height", image.buffer.height.to_string()),
                ],
            );
        }
        self.writer.close("Node");
    }

    fn write_socket(&mut self, tag: &str, socket: &Socket) {
        let mut attrs = vec![
            ("name", socket.name.clone()),
            ("type", socket.socket_type.name().to_string()),
        ];
        if let Some(value) = &socket.default_value {
            attrs.push(("value", value.to_portable()));
        }
        self.writer.empty(tag, &attrs);
    }

    fn write_link(&mut self, graph: &NodeGraph, link: &Link) -> Result<()> {
        graph
            .check_link(link)
            .map_err(|e| Error::structural(format!("invalid link: {}", e)))?;
        // check_link guarantees both endpoints exist
        let (Some(from), Some(to)) = (graph.node(link.from_node), graph.node(link.to_node)) else {
            return Err(Error::structural("dangling link"));
        };
        let (Some(out), Some(input)) = (from.outputs.get(link.from_socket), to.inputs.get(link.to_socket)) else {
            return Err(Error::structural("dangling link"));
        };
        self.writer.empty(
            "Link",
            &[
                ("from_node", from.name.clone()),
                ("from_socket", out.name.clone()),
                ("to_node", to.name.clone()),
                ("to_socket", input.name.clone()),
            ],
        );
        Ok(())
    }
}

/// Minimal indented XML writer
#[derive(Default)]
struct XmlWriter {
    out: String,
    depth: usize,
    /// First attribute character XML cannot carry
    rejected: Option<char>,
}

impl XmlWriter {
    fn start(&mut self, tag: &str, attrs: &[(&str, String)]) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push('<');
        self.out.push_str(tag);
        for (key, value) in attrs {
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push_str("=\"");
            if let Err(c) = escape_into(&mut self.out, value) {
                self.rejected.get_or_insert(c);
            }
            self.out.push('"');
        }
    }

    fn open(&mut self, tag: &str, attrs: &[(&str, String)]) {
        self.start(tag, attrs);
        self.out.push_str(">\n");
        self.depth += 1;
    }

    fn empty(&mut self, tag: &str, attrs: &[(&str, String)]) {
        self.start(tag, attrs);
        self.out.push_str("/>\n");
    }

    fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push_str(">\n");
    }

    fn finish(self) -> Result<String> {
        match self.rejected {
            Some(c) => Err(Error::structural(format!(
                "character U+{:04X} cannot be written to XML",
                c as u32
            ))),
            None => Ok(self.out),
        }
    }
}

fn escape_into(out: &mut String, value: &str) -> std::result::Result<(), char> {
    let mut rejected = None;
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            '\t' => out.push_str("&#9;"),
            '\r' => out.push_str("&#13;"),
            c if c < ' ' || c == '\u{FFFE}' || c == '\u{FFFF}' => {
                rejected.get_or_insert(c);
            }
            c => out.push(c),
        }
    }
    match rejected {
        Some(c) => Err(c),
        None => Ok(()),
    }
}
