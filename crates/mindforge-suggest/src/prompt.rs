use mindforge_core::{ConceptEdge, ConceptNode, FundamentalNodeSummary, GenerationContext};

use crate::engine::{ChatTurn, CompletionRequest};

/// Existing labels quoted back to the model for continuity.
pub const MAX_CONTEXT_LABELS: usize = 5;
const MAX_BRANCH_CONTEXT_LABELS: usize = 10;

struct Sampling {
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

const GENERATION: Sampling = Sampling {
    temperature: 0.7,
    max_tokens: 2000,
    top_p: 0.9,
    frequency_penalty: 0.1,
    presence_penalty: 0.1,
};

const ANALYSIS: Sampling = Sampling {
    temperature: 0.3,
    max_tokens: 1000,
    top_p: 0.9,
    frequency_penalty: 0.0,
    presence_penalty: 0.0,
};

const BRANCHING: Sampling = Sampling {
    temperature: 0.8,
    max_tokens: 1500,
    top_p: 0.9,
    frequency_penalty: 0.2,
    presence_penalty: 0.2,
};

fn request(model: &str, sampling: Sampling, system: String, user: String) -> CompletionRequest {
    CompletionRequest {
        model: model.to_string(),
        messages: vec![ChatTurn::system(system), ChatTurn::user(user)],
        temperature: sampling.temperature,
        max_tokens: sampling.max_tokens,
        top_p: sampling.top_p,
        frequency_penalty: sampling.frequency_penalty,
        presence_penalty: sampling.presence_penalty,
    }
}

fn quoted_labels(nodes: &[ConceptNode], max: usize) -> String {
    nodes
        .iter()
        .take(max)
        .map(|n| format!("\"{}\"", n.label))
        .collect::<Vec<_>>()
        .join(", ")
}

// --- Generation ---

pub fn generation_system_prompt() -> String {
    "You are a strategic thinking assistant that builds mind maps. Given a topic, produce \
the concept nodes of a well-structured map: one central node for the topic itself, a few \
fundamental pillars, and supporting concepts that connect to them.\n\n\
Rules:\n\
- Labels are short (2-5 words) and specific to the topic. No generic filler like \"Other\".\n\
- importance is an integer 1-10. Only the central node gets 10. Pillars get 8-9 and are fundamental.\n\
- connections lists ids of other nodes in the same array. Every node except the central one \
connects to at least one other node.\n\
- category is a single lower-case word grouping related nodes.\n\
- color is a CSS hsl() value; nodes in the same category share a hue.\n\
- Produce between 8 and 14 nodes.\n\n\
Output ONLY a JSON array. Each item: {\"id\":\"node-1\",\"label\":\"...\",\"category\":\"...\",\
\"color\":\"hsl(210, 70%, 50%)\",\"description\":\"...\",\"importance\":8,\
\"connections\":[\"node-2\"],\"isFundamental\":true,\"complexity\":5,\"suggestedBranches\":[\"...\"]}.\n\n\
Output ONLY the JSON array, nothing else."
        .to_string()
}

pub fn generation_user_message(
    topic: &str,
    existing: &[ConceptNode],
    context: &GenerationContext,
) -> String {
    let ctx = context.resolved();
    let mut out = String::with_capacity(512);
    out.push_str("TOPIC: ");
    out.push_str(topic);
    out.push('\n');
    out.push_str("DOMAIN: ");
    out.push_str(&ctx.domain);
    out.push('\n');
    out.push_str("PURPOSE: ");
    out.push_str(&ctx.purpose);
    out.push('\n');
    out.push_str("AUDIENCE: ");
    out.push_str(&ctx.audience);
    out.push('\n');
    out.push_str("DEPTH: ");
    out.push_str(&ctx.depth);
    out.push('\n');
    if !existing.is_empty() {
        out.push_str("EXISTING NODES (stay consistent, do not repeat): ");
        out.push_str(&quoted_labels(existing, MAX_CONTEXT_LABELS));
        out.push('\n');
    }
    out
}

pub fn generation_request(
    model: &str,
    topic: &str,
    existing: &[ConceptNode],
    context: &GenerationContext,
) -> CompletionRequest {
    request(
        model,
        GENERATION,
        generation_system_prompt(),
        generation_user_message(topic, existing, context),
    )
}

// --- Centrality analysis ---

/// Compact text form of a graph for model consumption.
pub fn serialize_graph(nodes: &[ConceptNode], edges: &[ConceptEdge]) -> String {
    let label_of = |id: &str| -> String {
        nodes
            .iter()
            .find(|n| n.id == id)
            .map(|n| n.label.clone())
            .unwrap_or_else(|| id.to_string())
    };

    let mut out = String::with_capacity(2048);
    out.push_str("NODES:\n");
    for node in nodes {
        out.push_str(&node.id);
        out.push_str(" \"");
        out.push_str(&node.label);
        out.push_str("\" (importance=");
        out.push_str(&node.importance.to_string());
        if node.metadata.is_fundamental {
            out.push_str(",fundamental");
        }
        out.push(',');
        out.push_str(&node.category);
        out.push(')');
        out.push('\n');
    }

    out.push_str("EDGES:\n");
    for edge in edges {
        out.push_str(&edge.source);
        out.push_str(" \"");
        out.push_str(&label_of(&edge.source));
        out.push_str("\" --> ");
        out.push_str(&edge.target);
        out.push_str(" \"");
        out.push_str(&label_of(&edge.target));
        out.push('"');
        out.push('\n');
    }
    out
}

pub fn analysis_system_prompt() -> String {
    let schema = serde_json::to_string(&schemars::schema_for!(FundamentalNodeSummary))
        .unwrap_or_default();
    format!(
        "You analyze concept maps. Identify the nodes that are structurally and semantically \
central: hubs many ideas depend on, concepts that bridge clusters, and foundational ideas \
the rest of the map elaborates.\n\n\
Return at most 5 nodes, most central first. Use the node ids exactly as given. \
importance is an integer 1-10; connectionCount is the number of edges touching the node; \
centralityScore and conceptualWeight are non-negative numbers, higher meaning more central.\n\n\
Output ONLY a JSON array of objects matching this schema:\n{}\n\n\
Output ONLY the JSON array, nothing else.",
        schema
    )
}

pub fn analysis_request(
    model: &str,
    nodes: &[ConceptNode],
    edges: &[ConceptEdge],
) -> CompletionRequest {
    request(
        model,
        ANALYSIS,
        analysis_system_prompt(),
        serialize_graph(nodes, edges),
    )
}

// --- Branch expansion ---

pub fn branch_system_prompt(max_branches: usize) -> String {
    format!(
        "You expand one node of a concept map into child concepts. Children must be actionable \
and specific to the given node, not generic management vocabulary, and must not repeat \
existing nodes.\n\n\
Produce at most {max_branches} children. importance is an integer between 4 and 8. \
Children are never fundamental.\n\n\
Output ONLY a JSON array. Each item: {{\"label\":\"...\",\"category\":\"...\",\
\"description\":\"...\",\"importance\":6,\"color\":\"hsl(150, 60%, 45%)\"}}.\n\n\
Output ONLY the JSON array, nothing else."
    )
}

pub fn branch_user_message(parent: &FundamentalNodeSummary, existing: &[ConceptNode]) -> String {
    let mut out = String::with_capacity(512);
    out.push_str("NODE: ");
    out.push_str(&parent.id);
    out.push_str(" \"");
    out.push_str(&parent.label);
    out.push_str("\" (importance=");
    out.push_str(&parent.importance.to_string());
    out.push_str(", connections=");
    out.push_str(&parent.connection_count.to_string());
    out.push_str(")\n");
    if !existing.is_empty() {
        out.push_str("EXISTING NODES: ");
        out.push_str(&quoted_labels(existing, MAX_BRANCH_CONTEXT_LABELS));
        out.push('\n');
    }
    out
}

pub fn branch_request(
    model: &str,
    parent: &FundamentalNodeSummary,
    existing: &[ConceptNode],
    max_branches: usize,
) -> CompletionRequest {
    request(
        model,
        BRANCHING,
        branch_system_prompt(max_branches),
        branch_user_message(parent, existing),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Role;
    use mindforge_core::{Hsl, NodeMetadata, Position, Provenance};

    fn node(id: &str, label: &str) -> ConceptNode {
        ConceptNode {
            id: id.to_string(),
            label: label.to_string(),
            category: "strategy".to_string(),
            color: Hsl::new(0, 0, 50),
            description: None,
            importance: 9,
            connections: vec![],
            position: Position::default(),
            metadata: NodeMetadata {
                is_fundamental: true,
                complexity: 6,
                parent_concept: "root".to_string(),
                suggested_branches: vec![],
                provenance: Provenance::RemoteGenerated,
            },
        }
    }

    #[test]
    fn generation_message_applies_context_defaults() {
        let msg = generation_user_message("Remote work", &[], &GenerationContext::default());
        assert!(msg.contains("TOPIC: Remote work"));
        assert!(msg.contains("DOMAIN: General"));
        assert!(msg.contains("PURPOSE: Strategic exploration"));
        assert!(!msg.contains("EXISTING"));
    }

    #[test]
    fn generation_message_quotes_at_most_five_labels() {
        let existing: Vec<ConceptNode> = (0..8).map(|i| node(&format!("n{i}"), &format!("L{i}"))).collect();
        let msg = generation_user_message("T", &existing, &GenerationContext::default());
        assert!(msg.contains("\"L4\""));
        assert!(!msg.contains("\"L5\""));
    }

    #[test]
    fn requests_carry_model_and_roles() {
        let req = generation_request("model-x", "T", &[], &GenerationContext::default());
        assert_eq!(req.model, "model-x");
        assert_eq!(req.messages[0].role, Role::System);
        assert_eq!(req.messages[1].role, Role::User);
        assert_eq!(req.max_tokens, 2000);
    }

    #[test]
    fn graph_serialization_names_both_ends() {
        let nodes = vec![node("a", "Alpha"), node("b", "Beta")];
        let edges = vec![ConceptEdge::new("a", "b"), ConceptEdge::new("a", "ghost")];
        let text = serialize_graph(&nodes, &edges);
        assert!(text.contains("a \"Alpha\" (importance=9,fundamental,strategy)"));
        assert!(text.contains("a \"Alpha\" --> b \"Beta\""));
        assert!(text.contains("--> ghost \"ghost\""));
    }

    #[test]
    fn analysis_prompt_embeds_summary_schema() {
        let prompt = analysis_system_prompt();
        assert!(prompt.contains("conceptualWeight"));
        assert!(prompt.contains("connectionCount"));
    }

    #[test]
    fn branch_prompt_states_bound() {
        let parent = FundamentalNodeSummary {
            id: "a".to_string(),
            label: "Alpha".to_string(),
            importance: 9,
            centrality_score: 10.0,
            connection_count: 2,
            conceptual_weight: 14.0,
        };
        let req = branch_request("m", &parent, &[], 3);
        assert!(req.messages[0].content.contains("at most 3 children"));
        assert!(req.messages[1].content.contains("NODE: a \"Alpha\""));
    }
}
