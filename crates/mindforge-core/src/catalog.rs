//! Domain template catalog. Read-only at generation time.
//!
//! Order is significant: when two templates score the same for a topic, the
//! one listed first wins. New domains are added by appending entries.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ComplexityLevel {
    Beginner,
    Intermediate,
    Advanced,
}

/// One node of a template skeleton. `connects_to` indexes into the same
/// template's `node_structure`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateNodeSpec {
    pub label: &'static str,
    pub category: &'static str,
    pub importance: u8,
    pub is_fundamental: bool,
    pub description: &'static str,
    pub connects_to: &'static [usize],
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub domain: &'static str,
    pub trigger_keywords: &'static [&'static str],
    pub node_structure: &'static [TemplateNodeSpec],
    pub complexity_level: ComplexityLevel,
    pub estimated_node_count: usize,
    pub focus_areas: &'static [&'static str],
}

const fn spec(
    label: &'static str,
    category: &'static str,
    importance: u8,
    is_fundamental: bool,
    description: &'static str,
    connects_to: &'static [usize],
) -> TemplateNodeSpec {
    TemplateNodeSpec {
        label,
        category,
        importance,
        is_fundamental,
        description,
        connects_to,
    }
}

pub static TEMPLATES: &[DomainTemplate] = &[
    DomainTemplate {
        id: "ai-implementation",
        name: "AI Implementation Roadmap",
        domain: "technology ai",
        trigger_keywords: &[
            "ai implementation",
            "artificial intelligence",
            "machine learning",
            "ai strategy",
            "ai adoption",
            "automation",
        ],
        node_structure: &[
            spec("{topic}", "core", 10, true, "Central objective: {topic}", &[]),
            spec("Use Case Discovery", "strategy", 9, true, "Where {topic} creates measurable value", &[0]),
            spec("Data Readiness", "data", 8, true, "Data quality, access and labeling needed for {topic}", &[0]),
            spec("Model Selection", "technology", 7, false, "Build, buy or fine-tune decisions", &[2]),
            spec("Pilot Program", "execution", 7, false, "A scoped first deployment to validate {topic}", &[1]),
            spec("Governance & Ethics", "governance", 6, false, "Bias, privacy and accountability guardrails", &[0]),
            spec("Change Enablement", "people", 6, false, "Training and adoption across teams", &[4]),
            spec("Success Metrics", "measurement", 5, false, "KPIs that show {topic} is working", &[1, 4]),
        ],
        complexity_level: ComplexityLevel::Advanced,
        estimated_node_count: 8,
        focus_areas: &["use cases", "data", "governance", "adoption"],
    },
    DomainTemplate {
        id: "digital-transformation",
        name: "Digital Transformation",
        domain: "technology",
        trigger_keywords: &[
            "digital transformation",
            "cloud migration",
            "legacy modernization",
            "digitalization",
        ],
        node_structure: &[
            spec("{topic}", "core", 10, true, "Transformation goal: {topic}", &[]),
            spec("Current State Assessment", "analysis", 8, true, "Systems, processes and pain points today", &[0]),
            spec("Target Architecture", "technology", 8, true, "The platform landscape {topic} aims for", &[0]),
            spec("Migration Waves", "execution", 7, false, "Sequenced moves from current to target state", &[1, 2]),
            spec("Process Redesign", "operations", 6, false, "Workflows rebuilt around new capabilities", &[0]),
            spec("Workforce Skills", "people", 6, false, "Capabilities teams need to operate the new stack", &[4]),
            spec("Value Tracking", "measurement", 5, false, "Benefits realized per wave", &[3]),
        ],
        complexity_level: ComplexityLevel::Advanced,
        estimated_node_count: 7,
        focus_areas: &["architecture", "migration", "process"],
    },
    DomainTemplate {
        id: "market-entry",
        name: "Market Entry Plan",
        domain: "business",
        trigger_keywords: &[
            "market entry",
            "international expansion",
            "go-to-market",
            "new market",
            "market launch",
        ],
        node_structure: &[
            spec("{topic}", "core", 10, true, "Entry objective: {topic}", &[]),
            spec("Market Sizing", "research", 8, true, "Addressable demand and growth in the target market", &[0]),
            spec("Entry Mode", "strategy", 8, true, "Direct, partnership, acquisition or licensing", &[0]),
            spec("Regulatory Landscape", "risk", 7, false, "Licenses, compliance and local law", &[2]),
            spec("Localization", "product", 6, false, "Adapting offer, pricing and messaging", &[2]),
            spec("Channel Partners", "network", 6, false, "Distributors and alliances that shorten ramp-up", &[2]),
            spec("Launch Milestones", "execution", 5, false, "Phased targets for {topic}", &[1, 2]),
        ],
        complexity_level: ComplexityLevel::Intermediate,
        estimated_node_count: 7,
        focus_areas: &["research", "entry mode", "compliance"],
    },
    DomainTemplate {
        id: "product-launch",
        name: "Product Launch",
        domain: "product",
        trigger_keywords: &[
            "product launch",
            "product development",
            "mvp",
            "product roadmap",
            "feature prioritization",
        ],
        node_structure: &[
            spec("{topic}", "core", 10, true, "Product goal: {topic}", &[]),
            spec("Customer Problem", "research", 9, true, "The pain {topic} removes and for whom", &[0]),
            spec("Solution Scope", "product", 8, true, "What ships first and what waits", &[1]),
            spec("Feature Prioritization", "product", 7, false, "Ranking by impact against effort", &[2]),
            spec("Pricing & Packaging", "business", 6, false, "How the product is sold", &[0]),
            spec("Launch Campaign", "marketing", 6, false, "Announcing {topic} to the right audience", &[0]),
            spec("Feedback Loop", "measurement", 5, false, "Signals that steer the next iteration", &[2, 5]),
        ],
        complexity_level: ComplexityLevel::Intermediate,
        estimated_node_count: 7,
        focus_areas: &["problem", "scope", "launch"],
    },
    DomainTemplate {
        id: "brand-campaign",
        name: "Brand Campaign",
        domain: "marketing",
        trigger_keywords: &[
            "brand campaign",
            "content marketing",
            "social media campaign",
            "brand awareness",
            "marketing campaign",
        ],
        node_structure: &[
            spec("{topic}", "core", 10, true, "Campaign goal: {topic}", &[]),
            spec("Audience Personas", "audience", 9, true, "Who {topic} has to reach", &[0]),
            spec("Core Message", "messaging", 8, true, "The single idea every asset repeats", &[0, 1]),
            spec("Channel Mix", "channels", 7, false, "Owned, earned and paid placements", &[1]),
            spec("Creative Assets", "content", 6, false, "Formats produced for each channel", &[2, 3]),
            spec("Budget & Timeline", "planning", 5, false, "Spend and flighting plan", &[3]),
            spec("Attribution", "measurement", 5, false, "Linking results back to {topic}", &[3]),
        ],
        complexity_level: ComplexityLevel::Beginner,
        estimated_node_count: 7,
        focus_areas: &["audience", "message", "channels"],
    },
    DomainTemplate {
        id: "change-management",
        name: "Organizational Change",
        domain: "organization",
        trigger_keywords: &[
            "change management",
            "organizational change",
            "team restructuring",
            "culture change",
        ],
        node_structure: &[
            spec("{topic}", "core", 10, true, "Change objective: {topic}", &[]),
            spec("Case for Change", "strategy", 9, true, "Why the organization cannot stay as it is", &[0]),
            spec("Stakeholder Map", "people", 8, true, "Who is affected and who has influence", &[0]),
            spec("Communication Plan", "communication", 7, false, "Cadence and channels for updates", &[2]),
            spec("Resistance Handling", "people", 6, false, "Surfacing and addressing concerns", &[2]),
            spec("Reinforcement", "operations", 5, false, "Incentives and rituals that make {topic} stick", &[1]),
        ],
        complexity_level: ComplexityLevel::Intermediate,
        estimated_node_count: 6,
        focus_areas: &["stakeholders", "communication", "adoption"],
    },
    DomainTemplate {
        id: "learning-plan",
        name: "Learning Plan",
        domain: "education",
        trigger_keywords: &[
            "learning plan",
            "study plan",
            "curriculum",
            "skill development",
            "course design",
        ],
        node_structure: &[
            spec("{topic}", "core", 10, true, "Learning goal: {topic}", &[]),
            spec("Prerequisites", "foundation", 8, true, "What to know before starting {topic}", &[0]),
            spec("Core Modules", "content", 8, true, "The main units of study", &[0, 1]),
            spec("Practice Projects", "practice", 7, false, "Hands-on work that applies each module", &[2]),
            spec("Resources", "resources", 5, false, "Books, courses and communities", &[2]),
            spec("Progress Checkpoints", "measurement", 5, false, "Milestones that confirm mastery", &[2, 3]),
        ],
        complexity_level: ComplexityLevel::Beginner,
        estimated_node_count: 6,
        focus_areas: &["foundations", "practice", "assessment"],
    },
];

pub fn find(id: &str) -> Option<&'static DomainTemplate> {
    TEMPLATES.iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<&str> = TEMPLATES.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), TEMPLATES.len());
    }

    #[test]
    fn every_template_has_a_single_root() {
        for template in TEMPLATES {
            let roots = template
                .node_structure
                .iter()
                .filter(|n| n.importance == 10)
                .count();
            assert_eq!(roots, 1, "{}", template.id);
            assert_eq!(template.node_structure[0].label, "{topic}", "{}", template.id);
            assert_eq!(template.estimated_node_count, template.node_structure.len());
        }
    }

    #[test]
    fn connections_stay_in_bounds() {
        for template in TEMPLATES {
            let len = template.node_structure.len();
            for node in template.node_structure {
                assert!(node.connects_to.iter().all(|&i| i < len), "{}", template.id);
                if node.importance >= 8 {
                    assert!(node.is_fundamental, "{} / {}", template.id, node.label);
                }
            }
        }
    }

    #[test]
    fn find_by_id() {
        assert_eq!(find("market-entry").map(|t| t.domain), Some("business"));
        assert!(find("nope").is_none());
    }
}
