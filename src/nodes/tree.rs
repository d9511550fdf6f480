//! A material's node tree: the root graph plus the group graphs it can reach

use super::graph::NodeGraph;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Root shading graph with a library of group graphs keyed by unique name
///
/// Group nodes refer to library entries by key, so one group may be used by
/// several nodes and graphs never hold pointers to each other.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShaderTree {
    pub root: NodeGraph,
    pub groups: BTreeMap<String, NodeGraph>,
}

impl ShaderTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_root(root: NodeGraph) -> Self {
        Self {
            root,
            groups: BTreeMap::new(),
        }
    }

    /// Registers a group graph, failing if the name is taken
    pub fn add_group(&mut self, name: impl Into<String>, graph: NodeGraph) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::structural("group name cannot be empty"));
        }
        if self.groups.contains_key(&name) {
            return Err(Error::structural(format!("group '{}' already exists", name)));
        }
        self.groups.insert(name, graph);
        Ok(())
    }

    pub fn group(&self, name: &str) -> Option<&NodeGraph> {
        self.groups.get(name)
    }

    /// Graph addressed by `level`: `None` is the root, `Some(name)` a group
    pub fn graph(&self, level: Option<&str>) -> Result<&NodeGraph> {
        match level {
            None => Ok(&self.root),
            Some(name) => self
                .groups
                .get(name)
                .ok_or_else(|| Error::structural(format!("no group named '{}'", name))),
        }
    }

    pub fn graph_mut(&mut self, level: Option<&str>) -> Result<&mut NodeGraph> {
        match level {
            None => Ok(&mut self.root),
            Some(name) => self
                .groups
                .get_mut(name)
                .ok_or_else(|| Error::structural(format!("no group named '{}'", name))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty() && self.groups.is_empty()
    }

    /// Groups reachable from the root, each listed once, in depth-first order
    ///
    /// References to unknown groups are skipped.
    pub fn reachable_groups(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        let mut order = Vec::new();
        let mut pending: Vec<&str> = group_refs(&self.root).into_iter().rev().collect();

        while let Some(name) = pending.pop() {
            let Some((key, graph)) = self.groups.get_key_value(name) else {
                continue;
            };
            if !seen.insert(key.as_str()) {
                continue;
            }
            order.push(key.as_str());
            pending.extend(group_refs(graph).into_iter().rev());
        }
        order
    }
}

fn group_refs(graph: &NodeGraph) -> Vec<&str> {
    graph.nodes.values().filter_map(|n| n.group_key()).collect()
}
