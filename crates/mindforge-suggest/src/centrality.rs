//! Local importance scoring for an existing node/edge set.
//!
//! `centralityScore = 2.5·connections + 2·min(in, out) + min(len(label)/12, 3) + 0.5·importance`
//! and hubs (already fundamental, or importance ≥ 8) get +4 on top for
//! `conceptualWeight`. The summary importance is rescored on its own scale.

use std::collections::{HashMap, HashSet};

use mindforge_core::{is_fundamental_importance, ConceptEdge, ConceptNode, FundamentalNodeSummary};

use crate::parse::{resolve_node_id, RawSummary};

pub const MAX_FUNDAMENTAL: usize = 5;

const CONNECTION_WEIGHT: f64 = 2.5;
const BALANCE_WEIGHT: f64 = 2.0;
const LABEL_CHARS_PER_POINT: f64 = 12.0;
const LABEL_CAP: f64 = 3.0;
const IMPORTANCE_WEIGHT: f64 = 0.5;
const HUB_BONUS: f64 = 4.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Degree {
    incoming: usize,
    outgoing: usize,
}

fn degrees<'a>(edges: &'a [ConceptEdge]) -> HashMap<&'a str, Degree> {
    let mut map: HashMap<&str, Degree> = HashMap::new();
    for edge in edges {
        map.entry(edge.source.as_str()).or_default().outgoing += 1;
        map.entry(edge.target.as_str()).or_default().incoming += 1;
    }
    map
}

fn summary_importance(connection_count: usize, marked: bool) -> u8 {
    let raw = 5 + connection_count + if marked { 3 } else { 0 };
    raw.clamp(3, 10) as u8
}

/// Score every node, in input order.
pub fn score_nodes(nodes: &[ConceptNode], edges: &[ConceptEdge]) -> Vec<FundamentalNodeSummary> {
    let degrees = degrees(edges);

    nodes
        .iter()
        .map(|node| {
            let degree = degrees.get(node.id.as_str()).copied().unwrap_or_default();
            let connection_count = degree.incoming + degree.outgoing;
            let label_term =
                (node.label.chars().count() as f64 / LABEL_CHARS_PER_POINT).min(LABEL_CAP);

            let centrality_score = CONNECTION_WEIGHT * connection_count as f64
                + BALANCE_WEIGHT * degree.incoming.min(degree.outgoing) as f64
                + label_term
                + IMPORTANCE_WEIGHT * f64::from(node.importance);

            let hub = node.metadata.is_fundamental || is_fundamental_importance(node.importance);
            let conceptual_weight = centrality_score + if hub { HUB_BONUS } else { 0.0 };

            FundamentalNodeSummary {
                id: node.id.clone(),
                label: node.label.clone(),
                importance: summary_importance(connection_count, node.metadata.is_fundamental),
                centrality_score,
                connection_count,
                conceptual_weight,
            }
        })
        .collect()
}

fn rank(mut summaries: Vec<FundamentalNodeSummary>) -> Vec<FundamentalNodeSummary> {
    // Stable: equal weights keep input order.
    summaries.sort_by(|a, b| b.conceptual_weight.total_cmp(&a.conceptual_weight));
    summaries.truncate(MAX_FUNDAMENTAL);
    summaries
}

/// The network-free analyzer: top nodes by conceptual weight.
pub fn local_fundamental(nodes: &[ConceptNode], edges: &[ConceptEdge]) -> Vec<FundamentalNodeSummary> {
    rank(score_nodes(nodes, edges))
}

/// Reconcile a remote ranking with the actual graph. Entries that do not
/// resolve to a node are dropped and missing numbers come from the local
/// scores. `None` when nothing usable is left.
pub fn merge_remote(
    raw: Vec<RawSummary>,
    nodes: &[ConceptNode],
    edges: &[ConceptEdge],
) -> Option<Vec<FundamentalNodeSummary>> {
    let local: HashMap<String, FundamentalNodeSummary> = score_nodes(nodes, edges)
        .into_iter()
        .map(|s| (s.id.clone(), s))
        .collect();
    let mut seen = HashSet::new();

    let merged: Vec<FundamentalNodeSummary> = raw
        .into_iter()
        .filter_map(|entry| {
            let id = [entry.id.as_deref(), entry.label.as_deref()]
                .into_iter()
                .flatten()
                .find_map(|reference| resolve_node_id(reference, nodes))?;
            if !seen.insert(id.clone()) {
                return None;
            }
            let base = local.get(&id)?;
            Some(FundamentalNodeSummary {
                id,
                label: base.label.clone(),
                importance: entry
                    .importance
                    .map(|v| v.round().clamp(1.0, 10.0) as u8)
                    .unwrap_or(base.importance),
                centrality_score: entry
                    .centrality_score
                    .filter(|v| *v >= 0.0)
                    .unwrap_or(base.centrality_score),
                connection_count: entry
                    .connection_count
                    .filter(|v| *v >= 0.0)
                    .map(|v| v.round() as usize)
                    .unwrap_or(base.connection_count),
                conceptual_weight: entry
                    .conceptual_weight
                    .filter(|v| *v >= 0.0)
                    .unwrap_or(base.conceptual_weight),
            })
        })
        .collect();

    if merged.is_empty() {
        None
    } else {
        Some(rank(merged))
    }
}
