pub mod catalog;
pub mod domains;
pub mod settings;

pub use settings::{ai_configured, AiSettings};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

pub const MIN_IMPORTANCE: u8 = 1;
pub const MAX_IMPORTANCE: u8 = 10;
/// Importance at or above which a node is a hub.
pub const FUNDAMENTAL_IMPORTANCE: u8 = 8;

pub const DEFAULT_DOMAIN: &str = "General";
pub const DEFAULT_PURPOSE: &str = "Strategic exploration";
pub const DEFAULT_AUDIENCE: &str = "General audience";
pub const DEFAULT_DEPTH: &str = "Comprehensive";

// --- Color ---

/// A hue/saturation/lightness triple. Serialized as `hsl(H, S%, L%)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hsl {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl Hsl {
    pub const fn new(hue: u16, saturation: u8, lightness: u8) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }

    fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let r = f64::from(r) / 255.0;
        let g = f64::from(g) / 255.0;
        let b = f64::from(b) / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if (max - min).abs() < f64::EPSILON {
            return Self::new(0, 0, (l * 100.0).round() as u8);
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        Self::new(
            ((h * 60.0).round() as u16) % 360,
            (s * 100.0).round() as u8,
            (l * 100.0).round() as u8,
        )
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return None,
        };
        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
        Some(Self::from_rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    fn parse_functional(inner: &str) -> Option<Self> {
        let parts: Vec<&str> = inner
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() < 3 {
            return None;
        }
        let hue: f64 = parts[0].trim_end_matches("deg").parse().ok()?;
        let sat: f64 = parts[1].trim_end_matches('%').parse().ok()?;
        let light: f64 = parts[2].trim_end_matches('%').parse().ok()?;
        if !hue.is_finite() || !sat.is_finite() || !light.is_finite() {
            return None;
        }
        Some(Self::new(
            (hue.round() as i64).rem_euclid(360) as u16,
            sat.round().clamp(0.0, 100.0) as u8,
            light.round().clamp(0.0, 100.0) as u8,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized color: {0}")]
pub struct ColorParseError(pub String);

impl FromStr for Hsl {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        let parsed = if let Some(hex) = lower.strip_prefix('#') {
            Self::parse_hex(hex)
        } else {
            lower
                .strip_prefix("hsla(")
                .or_else(|| lower.strip_prefix("hsl("))
                .and_then(|rest| rest.strip_suffix(')'))
                .and_then(Self::parse_functional)
        };
        parsed.ok_or_else(|| ColorParseError(trimmed.to_string()))
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

impl Serialize for Hsl {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hsl {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// --- Nodes ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which code path produced a node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    RemoteGenerated,
    TemplateGenerated,
    FallbackGenerated,
    BranchGenerated,
}

impl Provenance {
    /// Prefix used for ids the normalizer has to invent.
    pub fn id_prefix(self) -> &'static str {
        match self {
            Provenance::RemoteGenerated => "concept",
            Provenance::TemplateGenerated => "template",
            Provenance::FallbackGenerated => "fallback",
            Provenance::BranchGenerated => "branch",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    pub is_fundamental: bool,
    pub complexity: u8,
    pub parent_concept: String,
    #[serde(default)]
    pub suggested_branches: Vec<String>,
    pub provenance: Provenance,
}

/// The unit every generation path produces.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConceptNode {
    pub id: String,
    pub label: String,
    pub category: String,
    #[schemars(with = "String")]
    pub color: Hsl,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub importance: u8,
    #[serde(default)]
    pub connections: Vec<String>,
    #[serde(default)]
    pub position: Position,
    pub metadata: NodeMetadata,
}

impl ConceptNode {
    pub fn is_fundamental(&self) -> bool {
        self.metadata.is_fundamental
    }
}

/// Whether an importance value alone makes a node fundamental.
pub fn is_fundamental_importance(importance: u8) -> bool {
    importance >= FUNDAMENTAL_IMPORTANCE
}

/// Default complexity derived from importance: `ceil(importance / 1.5)`.
pub fn complexity_for(importance: u8) -> u8 {
    (f64::from(importance) / 1.5).ceil() as u8
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConceptEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ConceptEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: make_edge_id(&source, &target),
            source,
            target,
            label: None,
        }
    }
}

/// Analysis-only projection of a node, recomputed from the current graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FundamentalNodeSummary {
    pub id: String,
    pub label: String,
    pub importance: u8,
    pub centrality_score: f64,
    pub connection_count: usize,
    pub conceptual_weight: f64,
}

// --- Generation context ---

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<String>,
}

/// A [`GenerationContext`] with every field filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContext {
    pub domain: String,
    pub purpose: String,
    pub audience: String,
    pub depth: String,
}

impl GenerationContext {
    pub fn with_domain(domain: impl Into<String>) -> Self {
        Self {
            domain: Some(domain.into()),
            ..Self::default()
        }
    }

    pub fn resolved(&self) -> ResolvedContext {
        fn pick(value: &Option<String>, default: &str) -> String {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        }
        ResolvedContext {
            domain: pick(&self.domain, DEFAULT_DOMAIN),
            purpose: pick(&self.purpose, DEFAULT_PURPOSE),
            audience: pick(&self.audience, DEFAULT_AUDIENCE),
            depth: pick(&self.depth, DEFAULT_DEPTH),
        }
    }
}

// --- Graph assembly helpers ---

/// Generate an edge ID from source and target node IDs.
pub fn make_edge_id(source: &str, target: &str) -> String {
    format!("edge-{}-{}", source, target)
}

/// Turn node `connections` into edges. Self-loops and repeated directed
/// pairs are skipped; targets missing from the batch are kept.
pub fn edges_from_connections(nodes: &[ConceptNode]) -> Vec<ConceptEdge> {
    let mut seen = HashSet::new();
    let mut edges = Vec::new();
    for node in nodes {
        for target in &node.connections {
            if *target == node.id {
                continue;
            }
            if seen.insert((node.id.as_str(), target.as_str())) {
                edges.push(ConceptEdge::new(node.id.clone(), target.clone()));
            }
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, connections: &[&str]) -> ConceptNode {
        ConceptNode {
            id: id.to_string(),
            label: id.to_uppercase(),
            category: "test".to_string(),
            color: Hsl::new(0, 0, 50),
            description: None,
            importance: 5,
            connections: connections.iter().map(|c| c.to_string()).collect(),
            position: Position::default(),
            metadata: NodeMetadata {
                is_fundamental: false,
                complexity: 4,
                parent_concept: "root".to_string(),
                suggested_branches: vec![],
                provenance: Provenance::FallbackGenerated,
            },
        }
    }

    #[test]
    fn parses_hsl_with_commas_and_spaces() {
        assert_eq!("hsl(210, 70%, 50%)".parse::<Hsl>(), Ok(Hsl::new(210, 70, 50)));
        assert_eq!("HSL(30 100% 45%)".parse::<Hsl>(), Ok(Hsl::new(30, 100, 45)));
        assert_eq!("hsla(-30deg, 120%, 50%, 0.5)".parse::<Hsl>(), Ok(Hsl::new(330, 100, 50)));
    }

    #[test]
    fn converts_hex_to_hsl() {
        assert_eq!("#ff0000".parse::<Hsl>(), Ok(Hsl::new(0, 100, 50)));
        assert_eq!("#00f".parse::<Hsl>(), Ok(Hsl::new(240, 100, 50)));
        assert_eq!("#808080".parse::<Hsl>(), Ok(Hsl::new(0, 0, 50)));
    }

    #[test]
    fn rejects_named_colors() {
        assert!("blue".parse::<Hsl>().is_err());
        assert!("hsl(12, 40%)".parse::<Hsl>().is_err());
        assert!("#aébcd".parse::<Hsl>().is_err());
    }

    #[test]
    fn node_serializes_camel_case() {
        let json = serde_json::to_value(node("a", &["b"])).unwrap();
        assert_eq!(json["color"], "hsl(0, 0%, 50%)");
        assert_eq!(json["metadata"]["isFundamental"], false);
        assert_eq!(json["metadata"]["provenance"], "fallback-generated");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn node_schema_uses_wire_names() {
        let schema = serde_json::to_string(&schemars::schema_for!(ConceptNode)).unwrap();
        assert!(schema.contains("isFundamental"));
        assert!(schema.contains("fallback-generated"));
    }

    #[test]
    fn complexity_rounds_up() {
        assert_eq!(complexity_for(1), 1);
        assert_eq!(complexity_for(5), 4);
        assert_eq!(complexity_for(10), 7);
    }

    #[test]
    fn context_defaults_fill_blanks() {
        let ctx = GenerationContext {
            purpose: Some("  ".to_string()),
            audience: Some("Executives".to_string()),
            ..Default::default()
        };
        let resolved = ctx.resolved();
        assert_eq!(resolved.domain, DEFAULT_DOMAIN);
        assert_eq!(resolved.purpose, DEFAULT_PURPOSE);
        assert_eq!(resolved.audience, "Executives");
        assert_eq!(resolved.depth, DEFAULT_DEPTH);
    }

    #[test]
    fn edges_skip_self_loops_and_duplicates() {
        let nodes = vec![node("a", &["b", "b", "a"]), node("b", &["a", "ghost"])];
        let edges = edges_from_connections(&nodes);
        let pairs: Vec<(&str, &str)> = edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(pairs, vec![("a", "b"), ("b", "a"), ("b", "ghost")]);
        assert_eq!(edges[0].id, "edge-a-b");
    }
}
