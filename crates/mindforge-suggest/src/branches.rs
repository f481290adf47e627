use std::collections::{HashMap, HashSet};
use std::f64::consts::{FRAC_PI_2, TAU};

use mindforge_core::domains::BRANCH_ASPECTS;
use mindforge_core::{ConceptNode, FundamentalNodeSummary, Position, Provenance};

use crate::normalize::{normalize, PartialNode};

pub const MIN_BRANCH_IMPORTANCE: f64 = 4.0;
pub const MAX_BRANCH_IMPORTANCE: f64 = 8.0;
const RADIUS: f64 = 220.0;

fn parent_position(parent: &FundamentalNodeSummary, existing: &[ConceptNode]) -> Option<Position> {
    existing
        .iter()
        .find(|n| n.id == parent.id)
        .map(|n| n.position)
}

/// Evenly spread slot `index` of `count` on a circle, starting at 12 o'clock.
fn radial_position(center: Position, index: usize, count: usize) -> Position {
    let angle = TAU * index as f64 / count.max(1) as f64 - FRAC_PI_2;
    Position::new(center.x + RADIUS * angle.cos(), center.y + RADIUS * angle.sin())
}

fn branch_id(parent: &FundamentalNodeSummary, index: usize) -> String {
    format!("{}-branch-{}", parent.id, index + 1)
}

/// Shared shaping for both paths: importance kept in the branch band,
/// positions fanned around the parent when it is on the canvas.
fn prepare(
    mut partials: Vec<PartialNode>,
    parent: &FundamentalNodeSummary,
    existing: &[ConceptNode],
    max_branches: usize,
) -> Vec<PartialNode> {
    partials.truncate(max_branches);
    let center = parent_position(parent, existing);
    let count = partials.len();

    for (i, partial) in partials.iter_mut().enumerate() {
        partial.importance = partial
            .importance
            .map(|v| v.clamp(MIN_BRANCH_IMPORTANCE, MAX_BRANCH_IMPORTANCE));
        partial.parent_concept = Some(parent.label.clone());
        if partial.position.is_none() {
            partial.position = center.map(|c| radial_position(c, i, count));
        }
    }
    partials
}

/// Branches are subordinate by definition, whatever their importance. A
/// branch claiming an id already on the canvas is renamed, and sibling
/// connections to that id follow the rename.
fn subordinate(
    mut nodes: Vec<ConceptNode>,
    parent: &FundamentalNodeSummary,
    existing: &[ConceptNode],
) -> Vec<ConceptNode> {
    let mut taken: HashSet<String> = existing.iter().map(|n| n.id.clone()).collect();
    taken.insert(parent.id.clone());
    let mut renamed: HashMap<String, String> = HashMap::new();

    for (i, node) in nodes.iter_mut().enumerate() {
        if taken.contains(&node.id) {
            let mut n = i;
            while taken.contains(&branch_id(parent, n)) {
                n += 1;
            }
            let fresh = branch_id(parent, n);
            if node.id != parent.id {
                renamed
                    .entry(std::mem::replace(&mut node.id, fresh.clone()))
                    .or_insert(fresh);
            } else {
                node.id = fresh;
            }
        }
        taken.insert(node.id.clone());
    }

    for node in &mut nodes {
        node.metadata.is_fundamental = false;
        let mut seen = HashSet::new();
        let connections = std::mem::take(&mut node.connections);
        node.connections = connections
            .into_iter()
            .map(|c| renamed.get(&c).cloned().unwrap_or(c))
            .filter(|c| *c != node.id && seen.insert(c.clone()))
            .collect();
        if !node.connections.contains(&parent.id) {
            node.connections.insert(0, parent.id.clone());
        }
    }
    nodes
}

/// Fixed-aspect expansion used whenever the remote path gives nothing.
pub fn fallback_branches(
    parent: &FundamentalNodeSummary,
    existing: &[ConceptNode],
    max_branches: usize,
) -> Vec<ConceptNode> {
    let partials = BRANCH_ASPECTS
        .iter()
        .take(max_branches)
        .enumerate()
        .map(|(i, aspect)| PartialNode {
            id: Some(branch_id(parent, i)),
            label: Some(format!("{}: {}", parent.label, aspect)),
            category: Some("branch".to_string()),
            description: Some(format!("{} for {}", aspect, parent.label)),
            importance: Some(7.0 - (i / 3) as f64),
            connections: Some(vec![parent.id.clone()]),
            ..Default::default()
        })
        .collect();

    let partials = prepare(partials, parent, existing, max_branches);
    subordinate(
        normalize(partials, &parent.label, Provenance::BranchGenerated),
        parent,
        existing,
    )
}

/// Shape remote candidates into at most `max_branches` subordinate nodes.
pub fn remote_branches(
    partials: Vec<PartialNode>,
    parent: &FundamentalNodeSummary,
    existing: &[ConceptNode],
    max_branches: usize,
) -> Vec<ConceptNode> {
    let partials = prepare(partials, parent, existing, max_branches);
    subordinate(
        normalize(partials, &parent.label, Provenance::RemoteGenerated),
        parent,
        existing,
    )
}
