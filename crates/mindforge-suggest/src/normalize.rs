//! Repairs candidate node records into [`ConceptNode`]s.
//!
//! Records are never dropped: anything missing or out of range is replaced
//! with a default, so a non-empty input always yields a non-empty output.
//! Dangling `connections` are kept as-is.

use std::collections::HashSet;

use mindforge_core::domains::palette_color;
use mindforge_core::{
    complexity_for, is_fundamental_importance, ConceptNode, NodeMetadata, Position, Provenance,
    MAX_IMPORTANCE, MIN_IMPORTANCE,
};

pub const DEFAULT_IMPORTANCE: u8 = 5;
pub const DEFAULT_CATEGORY: &str = "general";

const GRID_COLUMNS: usize = 4;
const GRID_ORIGIN: (f64, f64) = (200.0, 150.0);
const GRID_SPACING: (f64, f64) = (240.0, 180.0);

/// A node record as it arrives from any source, every field optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialNode {
    pub id: Option<String>,
    pub label: Option<String>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub importance: Option<f64>,
    pub connections: Option<Vec<String>>,
    pub position: Option<Position>,
    pub is_fundamental: Option<bool>,
    pub complexity: Option<f64>,
    pub parent_concept: Option<String>,
    pub suggested_branches: Option<Vec<String>>,
}

pub fn clamp_importance(raw: Option<f64>) -> u8 {
    match raw {
        Some(v) if v.is_finite() => v
            .round()
            .clamp(f64::from(MIN_IMPORTANCE), f64::from(MAX_IMPORTANCE)) as u8,
        _ => DEFAULT_IMPORTANCE,
    }
}

/// Grid slot for `index` plus a small index-derived offset so that nodes
/// never sit exactly on top of each other.
pub fn grid_position(index: usize) -> Position {
    let col = index % GRID_COLUMNS;
    let row = index / GRID_COLUMNS;
    let jitter_x = ((index * 37) % 41) as f64 - 20.0;
    let jitter_y = ((index * 53) % 29) as f64 - 14.0;
    Position::new(
        GRID_ORIGIN.0 + col as f64 * GRID_SPACING.0 + jitter_x,
        GRID_ORIGIN.1 + row as f64 * GRID_SPACING.1 + jitter_y,
    )
}

fn unique_id(candidate: String, used: &mut HashSet<String>) -> String {
    if used.insert(candidate.clone()) {
        return candidate;
    }
    let mut n = 2;
    loop {
        let next = format!("{candidate}-{n}");
        if used.insert(next.clone()) {
            return next;
        }
        n += 1;
    }
}

pub fn normalize(
    raw: Vec<PartialNode>,
    central_topic: &str,
    provenance: Provenance,
) -> Vec<ConceptNode> {
    let mut used = HashSet::with_capacity(raw.len());

    raw.into_iter()
        .enumerate()
        .map(|(index, partial)| {
            let id = partial
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| format!("{}-{}", provenance.id_prefix(), index + 1));
            let id = unique_id(id, &mut used);

            let importance = clamp_importance(partial.importance);
            let is_fundamental =
                partial.is_fundamental == Some(true) || is_fundamental_importance(importance);
            let complexity = match partial.complexity {
                Some(c) if c.is_finite() => c.round().clamp(1.0, 10.0) as u8,
                _ => complexity_for(importance),
            };
            let color = partial
                .color
                .and_then(|c| c.parse().ok())
                .unwrap_or_else(|| palette_color(index));

            ConceptNode {
                id,
                label: partial
                    .label
                    .unwrap_or_else(|| format!("Concept {}", index + 1)),
                category: partial
                    .category
                    .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
                color,
                description: partial.description,
                importance,
                connections: partial.connections.unwrap_or_default(),
                position: partial.position.unwrap_or_else(|| grid_position(index)),
                metadata: NodeMetadata {
                    is_fundamental,
                    complexity,
                    parent_concept: partial
                        .parent_concept
                        .unwrap_or_else(|| central_topic.to_string()),
                    suggested_branches: partial.suggested_branches.unwrap_or_default(),
                    provenance,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindforge_core::Hsl;
    use proptest::prelude::*;

    #[test]
    fn fills_every_default() {
        let nodes = normalize(vec![PartialNode::default()], "Topic", Provenance::RemoteGenerated);
        let node = &nodes[0];
        assert_eq!(node.id, "concept-1");
        assert_eq!(node.label, "Concept 1");
        assert_eq!(node.category, DEFAULT_CATEGORY);
        assert_eq!(node.importance, DEFAULT_IMPORTANCE);
        assert_eq!(node.metadata.complexity, 4);
        assert_eq!(node.metadata.parent_concept, "Topic");
        assert!(!node.metadata.is_fundamental);
        assert_eq!(node.metadata.provenance, Provenance::RemoteGenerated);
        assert_eq!(node.position, grid_position(0));
        assert_eq!(node.color, palette_color(0));
    }

    #[test]
    fn keeps_supplied_fields() {
        let partial = PartialNode {
            id: Some("n1".to_string()),
            label: Some("Growth".to_string()),
            color: Some("hsl(12, 50%, 40%)".to_string()),
            importance: Some(6.0),
            connections: Some(vec!["missing".to_string()]),
            position: Some(Position::new(1.0, 2.0)),
            complexity: Some(9.0),
            parent_concept: Some("Elsewhere".to_string()),
            ..Default::default()
        };
        let node = &normalize(vec![partial], "Topic", Provenance::TemplateGenerated)[0];
        assert_eq!(node.id, "n1");
        assert_eq!(node.color, Hsl::new(12, 50, 40));
        assert_eq!(node.connections, vec!["missing".to_string()]);
        assert_eq!(node.position, Position::new(1.0, 2.0));
        assert_eq!(node.metadata.complexity, 9);
        assert_eq!(node.metadata.parent_concept, "Elsewhere");
    }

    #[test]
    fn unparseable_color_falls_back_to_palette() {
        let partial = PartialNode {
            color: Some("cornflower".to_string()),
            ..Default::default()
        };
        let nodes = normalize(
            vec![PartialNode::default(), partial],
            "T",
            Provenance::RemoteGenerated,
        );
        assert_eq!(nodes[1].color, palette_color(1));
    }

    #[test]
    fn duplicate_and_blank_ids_become_unique() {
        let raw = vec![
            PartialNode {
                id: Some("a".to_string()),
                ..Default::default()
            },
            PartialNode {
                id: Some("a".to_string()),
                ..Default::default()
            },
            PartialNode {
                id: Some("  ".to_string()),
                ..Default::default()
            },
        ];
        let ids: Vec<String> = normalize(raw, "T", Provenance::BranchGenerated)
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec!["a", "a-2", "branch-3"]);
    }

    #[test]
    fn explicit_fundamental_survives_low_importance() {
        let partial = PartialNode {
            importance: Some(3.0),
            is_fundamental: Some(true),
            ..Default::default()
        };
        assert!(normalize(vec![partial], "T", Provenance::RemoteGenerated)[0].metadata.is_fundamental);
    }

    #[test]
    fn false_override_never_demotes_a_hub() {
        let partial = PartialNode {
            importance: Some(9.0),
            is_fundamental: Some(false),
            ..Default::default()
        };
        assert!(normalize(vec![partial], "T", Provenance::RemoteGenerated)[0].metadata.is_fundamental);
    }

    #[test]
    fn grid_positions_do_not_collide() {
        let positions: Vec<Position> = (0..40).map(grid_position).collect();
        for (i, a) in positions.iter().enumerate() {
            for b in &positions[i + 1..] {
                assert!(a != b);
            }
        }
    }

    proptest! {
        #[test]
        fn importance_is_always_clamped(raw in proptest::option::of(-1.0e6f64..1.0e6)) {
            let partial = PartialNode { importance: raw, ..Default::default() };
            let node = &normalize(vec![partial], "T", Provenance::RemoteGenerated)[0];
            prop_assert!((MIN_IMPORTANCE..=MAX_IMPORTANCE).contains(&node.importance));
        }

        #[test]
        fn hubs_are_always_fundamental(raw in -5.0f64..20.0, flag in proptest::option::of(any::<bool>())) {
            let partial = PartialNode { importance: Some(raw), is_fundamental: flag, ..Default::default() };
            let node = &normalize(vec![partial], "T", Provenance::FallbackGenerated)[0];
            if node.importance >= 8 {
                prop_assert!(node.metadata.is_fundamental);
            }
        }

        #[test]
        fn output_length_matches_input(count in 0usize..30) {
            let raw = vec![PartialNode::default(); count];
            prop_assert_eq!(normalize(raw, "T", Provenance::RemoteGenerated).len(), count);
        }
    }
}
