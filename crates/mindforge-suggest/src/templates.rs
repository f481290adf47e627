use std::collections::BTreeSet;

use mindforge_core::catalog::{DomainTemplate, TEMPLATES};
use mindforge_core::{ConceptNode, GenerationContext, Provenance};

use crate::normalize::{normalize, PartialNode};

pub const ACCEPT_THRESHOLD: f64 = 1.0;
const PHRASE_SCORE: f64 = 2.0;
const WORD_SCORE: f64 = 0.5;
const DOMAIN_SCORE: f64 = 1.0;

fn tokens(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '-'))
        .filter(|w| !w.is_empty())
        .collect()
}

/// Keyword-overlap score of one template for a topic. Each distinct trigger
/// word counts once, however many trigger phrases share it.
pub fn score_template(template: &DomainTemplate, topic: &str, context: &GenerationContext) -> f64 {
    let topic_lower = topic.to_lowercase();
    let topic_words: BTreeSet<&str> = tokens(&topic_lower).into_iter().collect();

    let phrases = template
        .trigger_keywords
        .iter()
        .filter(|keyword| topic_lower.contains(*keyword))
        .count();
    let trigger_words: BTreeSet<&str> = template
        .trigger_keywords
        .iter()
        .flat_map(|keyword| tokens(keyword))
        .collect();
    let overlap = trigger_words.intersection(&topic_words).count();

    let mut score = phrases as f64 * PHRASE_SCORE + overlap as f64 * WORD_SCORE;

    if let Some(domain) = context.domain.as_deref().map(|d| d.trim().to_lowercase()) {
        if !domain.is_empty() && template.domain.contains(&domain) {
            score += DOMAIN_SCORE;
        }
    }

    score
}

/// Highest-scoring template at or above the threshold. Ties keep the template
/// listed first in the catalog.
pub fn select_best_template(
    topic: &str,
    context: &GenerationContext,
) -> Option<&'static DomainTemplate> {
    let mut best: Option<(&'static DomainTemplate, f64)> = None;
    for template in TEMPLATES {
        let score = score_template(template, topic, context);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((template, score));
        }
    }
    best.filter(|(_, score)| *score >= ACCEPT_THRESHOLD)
        .map(|(template, _)| template)
}

fn adapt_label(label: &str, topic: &str) -> String {
    if label.contains("{topic}") {
        label.replace("{topic}", topic)
    } else if label.to_lowercase().contains(&topic.to_lowercase()) {
        label.to_string()
    } else {
        format!("{topic} {label}")
    }
}

/// Substitute the topic into a template's skeleton. Pure: the same template
/// and topic always give the same records.
pub fn adapt_template(template: &DomainTemplate, topic: &str) -> Vec<PartialNode> {
    let node_id = |i: usize| format!("{}-{}", template.id, i);

    template
        .node_structure
        .iter()
        .enumerate()
        .map(|(i, spec)| PartialNode {
            id: Some(node_id(i)),
            label: Some(adapt_label(spec.label, topic)),
            category: Some(spec.category.to_string()),
            description: Some(spec.description.replace("{topic}", topic)),
            importance: Some(f64::from(spec.importance)),
            connections: Some(spec.connects_to.iter().map(|&j| node_id(j)).collect()),
            is_fundamental: Some(spec.is_fundamental),
            parent_concept: Some(topic.to_string()),
            suggested_branches: (i == 0)
                .then(|| template.focus_areas.iter().map(|f| f.to_string()).collect()),
            ..Default::default()
        })
        .collect()
}

pub fn generate_from_template(template: &DomainTemplate, topic: &str) -> Vec<ConceptNode> {
    normalize(adapt_template(template, topic), topic, Provenance::TemplateGenerated)
}
