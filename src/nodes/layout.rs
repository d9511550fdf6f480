//! Cosmetic auto-layout for imported node trees
//!
//! Nodes are placed in columns by their distance (in links) from the end of
//! the graph, so data flows left to right into the output node.

use super::graph::NodeGraph;
use super::node::NodeId;
use super::tree::ShaderTree;
use crate::constants::layout::{COLUMN_SPACING, ROW_SPACING};
use crate::error::{Error, Result};
use glam::Vec2;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Arranges the root graph and every group graph of the tree
///
/// Every level is planned before any node moves, so a cycle in any graph
/// leaves the whole tree untouched.
pub fn arrange_tree(tree: &mut ShaderTree) -> Result<()> {
    let root = plan_graph(&tree.root)?;
    let mut groups = Vec::with_capacity(tree.groups.len());
    for (name, graph) in &tree.groups {
        let plan = plan_graph(graph).map_err(|e| Error::structural(format!("group '{}': {}", name, e)))?;
        groups.push((name.clone(), plan));
    }

    place(&mut tree.root, root);
    for (name, plan) in groups {
        if let Some(graph) = tree.groups.get_mut(&name) {
            place(graph, plan);
        }
    }
    Ok(())
}

/// Arranges one graph level; fails without moving anything if links form a cycle
pub fn arrange_graph(graph: &mut NodeGraph) -> Result<()> {
    let plan = plan_graph(graph)?;
    place(graph, plan);
    Ok(())
}

fn place(graph: &mut NodeGraph, plan: Vec<(NodeId, Vec2)>) {
    for (id, location) in plan {
        if let Some(node) = graph.nodes.get_mut(&id) {
            node.location = location;
        }
    }
}

/// Computes new locations from the longest link distance of each node to a sink
fn plan_graph(graph: &NodeGraph) -> Result<Vec<(NodeId, Vec2)>> {
    let mut upstream: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    let mut pending: HashMap<NodeId, usize> = graph.nodes.keys().map(|&id| (id, 0)).collect();
    for link in &graph.links {
        upstream.entry(link.to_node).or_default().push(link.from_node);
        *pending.entry(link.from_node).or_insert(0) += 1;
    }

    let mut depths: HashMap<NodeId, usize> = HashMap::new();
    let mut ready: VecDeque<NodeId> = pending
        .iter()
        .filter(|&(_, &count)| count == 0)
        .map(|(&id, _)| id)
        .collect();
    for &id in &ready {
        depths.insert(id, 0);
    }

    let mut settled = 0;
    while let Some(id) = ready.pop_front() {
        settled += 1;
        let depth = depths.get(&id).copied().unwrap_or(0);
        let Some(sources) = upstream.get(&id) else {
            continue;
        };
        for &source in sources {
            let entry = depths.entry(source).or_insert(0);
            *entry = (*entry).max(depth + 1);
            if let Some(count) = pending.get_mut(&source) {
                *count -= 1;
                if *count == 0 {
                    ready.push_back(source);
                }
            }
        }
    }

    if settled < pending.len() {
        let stuck = pending
            .iter()
            .filter(|&(_, &count)| count > 0)
            .map(|(&id, _)| id)
            .min()
            .unwrap_or_default();
        return Err(Error::structural(format!("links form a cycle through node {}", stuck)));
    }

    let mut columns: BTreeMap<usize, Vec<NodeId>> = BTreeMap::new();
    for &id in graph.nodes.keys() {
        columns.entry(depths.get(&id).copied().unwrap_or(0)).or_default().push(id);
    }

    let mut plan = Vec::with_capacity(graph.nodes.len());
    for (depth, ids) in columns {
        for (row, id) in ids.into_iter().enumerate() {
            plan.push((
                id,
                Vec2::new(-(depth as f32) * COLUMN_SPACING, -(row as f32) * ROW_SPACING),
            ));
        }
    }
    Ok(plan)
}
