use serde_json::{Map, Value};

use mindforge_core::{ConceptNode, Position};

use crate::error::RemoteError;
use crate::normalize::PartialNode;

type Object = Map<String, Value>;

/// Index of the `]` closing the `[` at `start`, skipping string literals.
fn matching_bracket(raw: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + i);
                }
            }
            _ => {}
        }
    }
    None
}

fn holds_objects(candidate: &str) -> bool {
    match serde_json::from_str::<Vec<Value>>(candidate) {
        Ok(items) => items.is_empty() || items.iter().any(Value::is_object),
        Err(_) => false,
    }
}

/// Extract the array substring from raw model output: the first balanced
/// array that parses and holds objects, else everything between the first
/// `[` and the last `]` so individual objects can still be salvaged.
pub fn extract_json_array(raw: &str) -> Option<&str> {
    for (start, _) in raw.match_indices('[') {
        if let Some(end) = matching_bracket(raw, start) {
            let candidate = &raw[start..=end];
            if holds_objects(candidate) {
                return Some(candidate);
            }
        }
    }

    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Parse individual `{...}` objects out of a malformed array.
fn salvage_objects(json_str: &str) -> Vec<Object> {
    let mut objects = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in json_str.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        if let Ok(Value::Object(obj)) = serde_json::from_str(&json_str[s..=i]) {
                            objects.push(obj);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    objects
}

/// Phase one of defensive parsing: the objects of the first array in `raw`.
pub fn candidate_objects(raw: &str) -> Result<Vec<Object>, RemoteError> {
    let json_str = extract_json_array(raw)
        .ok_or_else(|| RemoteError::MalformedResponse("no array in response".to_string()))?;

    let objects: Vec<Object> = match serde_json::from_str::<Vec<Value>>(json_str) {
        Ok(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(obj) => Some(obj),
                _ => None,
            })
            .collect(),
        Err(_) => salvage_objects(json_str),
    };

    if objects.is_empty() {
        return Err(RemoteError::MalformedResponse(
            "array held no usable objects".to_string(),
        ));
    }
    Ok(objects)
}

// --- Structural field readers ---

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn boolean(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    match value? {
        Value::Array(items) => Some(items.iter().filter_map(|v| text(Some(v))).collect()),
        Value::String(s) => Some(
            s.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

fn position(value: Option<&Value>) -> Option<Position> {
    let obj = value?.as_object()?;
    Some(Position::new(number(obj.get("x"))?, number(obj.get("y"))?))
}

fn first<'a>(obj: &'a Object, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k))
}

/// Phase two: read every node field structurally. Unreadable fields are left
/// empty for the normalizer to fill.
pub fn partial_node(obj: &Object) -> PartialNode {
    let meta = obj.get("metadata").and_then(Value::as_object);
    let field = |key: &str| obj.get(key).or_else(|| meta.and_then(|m| m.get(key)));

    PartialNode {
        id: text(obj.get("id")),
        label: text(first(obj, &["label", "name", "title"])),
        category: text(obj.get("category")),
        color: text(obj.get("color")),
        description: text(obj.get("description")),
        importance: number(obj.get("importance")),
        connections: string_list(obj.get("connections")),
        position: position(obj.get("position")),
        is_fundamental: boolean(field("isFundamental")),
        complexity: number(field("complexity")),
        parent_concept: text(field("parentConcept")),
        suggested_branches: string_list(field("suggestedBranches")),
    }
}

/// Parse a node array out of model output.
pub fn parse_nodes(raw: &str) -> Result<Vec<PartialNode>, RemoteError> {
    Ok(candidate_objects(raw)?.iter().map(partial_node).collect())
}

/// A fundamental-node entry as reported by the model, before resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSummary {
    pub id: Option<String>,
    pub label: Option<String>,
    pub importance: Option<f64>,
    pub centrality_score: Option<f64>,
    pub connection_count: Option<f64>,
    pub conceptual_weight: Option<f64>,
}

pub fn parse_summaries(raw: &str) -> Result<Vec<RawSummary>, RemoteError> {
    Ok(candidate_objects(raw)?
        .iter()
        .map(|obj| RawSummary {
            id: text(obj.get("id")),
            label: text(first(obj, &["label", "name"])),
            importance: number(obj.get("importance")),
            centrality_score: number(obj.get("centralityScore")),
            connection_count: number(obj.get("connectionCount")),
            conceptual_weight: number(obj.get("conceptualWeight")),
        })
        .collect())
}

/// Match a node reference from model output to a node id.
/// Tries the id first, then exact, case-insensitive and substring label matches.
pub fn resolve_node_id(name: &str, nodes: &[ConceptNode]) -> Option<String> {
    if nodes.iter().any(|n| n.id == name) {
        return Some(name.to_string());
    }

    if let Some(n) = nodes.iter().find(|n| n.label == name) {
        return Some(n.id.clone());
    }

    let name_lower = name.to_lowercase();
    if let Some(n) = nodes.iter().find(|n| n.label.to_lowercase() == name_lower) {
        return Some(n.id.clone());
    }

    nodes
        .iter()
        .find(|n| {
            let label_lower = n.label.to_lowercase();
            !label_lower.is_empty()
                && (label_lower.contains(&name_lower) || name_lower.contains(&label_lower))
        })
        .map(|n| n.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindforge_core::{Hsl, NodeMetadata, Provenance};

    #[test]
    fn extracts_array_from_chatter() {
        let raw = "Sure! Here you go:\n```json\n[{\"label\":\"A\"}]\n```\nHope that helps [really].";
        assert_eq!(extract_json_array(raw), Some("[{\"label\":\"A\"}]"));
    }

    #[test]
    fn skips_bracketed_prose_before_the_array() {
        let raw = "Note [1]: nodes follow. [{\"label\":\"A\",\"connections\":[\"b\"]}]";
        assert_eq!(
            extract_json_array(raw),
            Some("[{\"label\":\"A\",\"connections\":[\"b\"]}]")
        );
    }

    #[test]
    fn brackets_inside_strings_do_not_end_the_array() {
        let raw = r#"[{"label":"Odd ] label","importance":7}]"#;
        let nodes = parse_nodes(raw).unwrap();
        assert_eq!(nodes[0].label.as_deref(), Some("Odd ] label"));
    }

    #[test]
    fn salvages_objects_from_broken_array() {
        let raw = r#"[{"label":"A","importance":9}, {"label": broken}, {"label":"C"},]"#;
        let nodes = parse_nodes(raw).unwrap();
        let labels: Vec<_> = nodes.iter().filter_map(|n| n.label.as_deref()).collect();
        assert_eq!(labels, vec!["A", "C"]);
    }

    #[test]
    fn no_array_is_malformed() {
        assert!(matches!(
            parse_nodes("I cannot help with that."),
            Err(RemoteError::MalformedResponse(_))
        ));
        assert!(matches!(parse_nodes("[1, 2, 3]"), Err(RemoteError::MalformedResponse(_))));
        assert!(matches!(parse_nodes("[]"), Err(RemoteError::MalformedResponse(_))));
    }

    #[test]
    fn reads_loosely_typed_fields() {
        let raw = r#"[{
            "id": 7,
            "name": "  Growth ",
            "importance": "12",
            "connections": [1, "node-2", null],
            "position": {"x": "10", "y": 20},
            "metadata": {"isFundamental": "yes", "suggestedBranches": "a, b"}
        }]"#;
        let node = &parse_nodes(raw).unwrap()[0];
        assert_eq!(node.id.as_deref(), Some("7"));
        assert_eq!(node.label.as_deref(), Some("Growth"));
        assert_eq!(node.importance, Some(12.0));
        assert_eq!(
            node.connections.as_deref(),
            Some(&["1".to_string(), "node-2".to_string()][..])
        );
        assert_eq!(node.position, Some(Position::new(10.0, 20.0)));
        assert_eq!(node.is_fundamental, Some(true));
        assert_eq!(
            node.suggested_branches,
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn bad_position_is_dropped() {
        let raw = r#"[{"label":"A","position":{"x":"left","y":2}}]"#;
        assert_eq!(parse_nodes(raw).unwrap()[0].position, None);
    }

    #[test]
    fn parses_summaries() {
        let raw = r#"[{"id":"n1","importance":9,"centralityScore":"14.5","connectionCount":3}]"#;
        let summaries = parse_summaries(raw).unwrap();
        assert_eq!(summaries[0].id.as_deref(), Some("n1"));
        assert_eq!(summaries[0].centrality_score, Some(14.5));
        assert_eq!(summaries[0].conceptual_weight, None);
    }

    fn node(id: &str, label: &str) -> ConceptNode {
        ConceptNode {
            id: id.to_string(),
            label: label.to_string(),
            category: "c".to_string(),
            color: Hsl::new(0, 0, 0),
            description: None,
            importance: 5,
            connections: vec![],
            position: Position::default(),
            metadata: NodeMetadata {
                is_fundamental: false,
                complexity: 4,
                parent_concept: String::new(),
                suggested_branches: vec![],
                provenance: Provenance::RemoteGenerated,
            },
        }
    }

    #[test]
    fn resolves_ids_then_labels() {
        let nodes = vec![node("n1", "Revenue Model"), node("n2", "Market Analysis")];
        assert_eq!(resolve_node_id("n2", &nodes).as_deref(), Some("n2"));
        assert_eq!(resolve_node_id("Revenue Model", &nodes).as_deref(), Some("n1"));
        assert_eq!(resolve_node_id("market analysis", &nodes).as_deref(), Some("n2"));
        assert_eq!(resolve_node_id("Revenue", &nodes).as_deref(), Some("n1"));
        assert_eq!(resolve_node_id("Hiring", &nodes), None);
    }
}
