use rand::Rng;

use mindforge_core::domains::{detect_domain, palette_color, FallbackDomain};
use mindforge_core::{ConceptNode, GenerationContext, Position, Provenance};

use crate::normalize::{normalize, PartialNode};

/// Upper bound on the random offset applied to each grid slot, in pixels.
pub const MAX_JITTER: f64 = 40.0;

const ORIGIN: (f64, f64) = (150.0, 120.0);
const SPACING: (f64, f64) = (220.0, 170.0);

fn choose_domain(topic: &str, context: &GenerationContext) -> &'static FallbackDomain {
    let by_topic = detect_domain(topic);
    if !by_topic.keywords.is_empty() {
        return by_topic;
    }
    // A generic topic can still be steered by an explicit domain hint.
    match context.domain.as_deref() {
        Some(hint) if !hint.trim().is_empty() => detect_domain(hint),
        _ => by_topic,
    }
}

fn node_id(domain: &FallbackDomain, index: usize) -> String {
    format!("fallback-{}-{}", domain.name, index)
}

/// Keyword-driven generation with no network access.
pub fn fallback_generate(topic: &str, context: &GenerationContext) -> Vec<ConceptNode> {
    fallback_generate_with(topic, context, &mut rand::rng())
}

/// Same as [`fallback_generate`] with a caller-supplied jitter source. Only
/// positions depend on `rng`.
pub fn fallback_generate_with<R: Rng + ?Sized>(
    topic: &str,
    context: &GenerationContext,
    rng: &mut R,
) -> Vec<ConceptNode> {
    let domain = choose_domain(topic, context);
    let columns = if domain.nodes.len() > 8 { 5 } else { 4 };
    let hub = domain
        .nodes
        .iter()
        .position(|n| n.is_fundamental)
        .unwrap_or(0);
    let hub_id = node_id(domain, hub);

    tracing::debug!(domain = domain.name, nodes = domain.nodes.len(), "fallback generation");

    let partials = domain
        .nodes
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let col = (i % columns) as f64;
            let row = (i / columns) as f64;
            let position = Position::new(
                ORIGIN.0 + col * SPACING.0 + rng.random_range(-MAX_JITTER..=MAX_JITTER),
                ORIGIN.1 + row * SPACING.1 + rng.random_range(-MAX_JITTER..=MAX_JITTER),
            );
            let connections = if i == hub {
                vec![]
            } else {
                vec![hub_id.clone()]
            };

            PartialNode {
                id: Some(node_id(domain, i)),
                label: Some(spec.label.replace("{topic}", topic)),
                category: Some(spec.category.to_string()),
                color: Some(palette_color(i).to_string()),
                description: Some(spec.description.replace("{topic}", topic)),
                importance: Some(f64::from(spec.importance)),
                connections: Some(connections),
                position: Some(position),
                is_fundamental: Some(spec.is_fundamental),
                parent_concept: Some(topic.to_string()),
                ..Default::default()
            }
        })
        .collect();

    normalize(partials, topic, Provenance::FallbackGenerated)
}
