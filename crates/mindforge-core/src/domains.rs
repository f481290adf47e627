//! Tables driving the network-free generators: keyword-triggered fallback
//! domains, the generic branch aspects and the shared color palette.

use crate::Hsl;

/// A node skeleton. `{topic}` in `label` or `description` is replaced with
/// the requested topic.
#[derive(Debug, Clone, Copy)]
pub struct FallbackNodeSpec {
    pub label: &'static str,
    pub category: &'static str,
    pub importance: u8,
    pub is_fundamental: bool,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct FallbackDomain {
    pub name: &'static str,
    /// Empty means "matches anything"; keep such a domain last.
    pub keywords: &'static [&'static str],
    pub nodes: &'static [FallbackNodeSpec],
}

const fn node(
    label: &'static str,
    category: &'static str,
    importance: u8,
    is_fundamental: bool,
    description: &'static str,
) -> FallbackNodeSpec {
    FallbackNodeSpec {
        label,
        category,
        importance,
        is_fundamental,
        description,
    }
}

/// Scanned in order, first match wins.
pub static FALLBACK_DOMAINS: &[FallbackDomain] = &[
    FallbackDomain {
        name: "business",
        keywords: &[
            "business",
            "startup",
            "company",
            "enterprise",
            "entrepreneur",
            "revenue",
            "venture",
        ],
        nodes: &[
            node("{topic}", "strategy", 10, true, "Core strategic focus for {topic}"),
            node("Market Analysis", "research", 9, true, "Size, trends and demand behind {topic}"),
            node("Value Proposition", "strategy", 9, true, "Why customers choose this over alternatives"),
            node("Revenue Model", "finance", 8, true, "How {topic} turns value into income"),
            node("Competitive Landscape", "research", 7, false, "Direct and indirect competitors"),
            node("Customer Segments", "market", 7, false, "Groups with distinct needs and willingness to pay"),
            node("Operations & Scaling", "operations", 6, false, "Processes that must hold up under growth"),
            node("Funding Strategy", "finance", 6, false, "Capital needed and where it comes from"),
            node("Key Partnerships", "network", 5, false, "Allies that extend reach or capability"),
            node("Risk Assessment", "risk", 5, false, "What could derail {topic} and how to hedge"),
        ],
    },
    FallbackDomain {
        name: "technology",
        keywords: &[
            "artificial intelligence",
            "machine learning",
            "ai",
            "ml",
            "technology",
            "software",
            "tech",
            "data",
            "automation",
            "digital",
        ],
        nodes: &[
            node("{topic}", "core", 10, true, "Central technology theme: {topic}"),
            node("{topic} Fundamentals", "foundation", 9, true, "Concepts everything else builds on"),
            node("Technical Architecture", "architecture", 8, true, "Components and how they fit together"),
            node("Data Strategy", "data", 8, true, "Collection, quality and ownership of data"),
            node("Implementation Roadmap", "execution", 7, false, "Phased delivery plan for {topic}"),
            node("Tooling & Platforms", "tools", 6, false, "Frameworks and services worth adopting"),
            node("Ethics & Governance", "governance", 6, false, "Responsible use and oversight"),
            node("Skills & Talent", "people", 5, false, "Expertise the team needs"),
            node("Integration Points", "integration", 5, false, "Where {topic} touches existing systems"),
            node("Future Trends", "trends", 4, false, "Developments likely to reshape {topic}"),
        ],
    },
    FallbackDomain {
        name: "marketing",
        keywords: &[
            "marketing",
            "brand",
            "advertising",
            "campaign",
            "social media",
            "seo",
            "content",
        ],
        nodes: &[
            node("{topic}", "core", 10, true, "Marketing objective: {topic}"),
            node("Target Audience", "audience", 9, true, "Who {topic} needs to reach"),
            node("Brand Positioning", "brand", 8, true, "The place the brand should own in people's minds"),
            node("Channel Strategy", "channels", 8, true, "Where the audience can be reached efficiently"),
            node("Content Plan", "content", 7, false, "Themes, formats and cadence"),
            node("Campaign Metrics", "measurement", 6, false, "Signals that show {topic} is working"),
            node("Customer Journey", "experience", 6, false, "Touchpoints from awareness to loyalty"),
            node("Budget Allocation", "planning", 5, false, "Spend split across channels"),
            node("Competitor Messaging", "research", 5, false, "What rivals are saying and where gaps are"),
        ],
    },
    FallbackDomain {
        name: "general",
        keywords: &[],
        nodes: &[
            node("{topic}", "core", 10, true, "Central idea: {topic}"),
            node("{topic} Fundamentals", "foundation", 8, true, "Essential building blocks of {topic}"),
            node("Key Concepts", "concept", 7, false, "Ideas worth understanding first"),
            node("Practical Applications", "application", 7, false, "Where {topic} is used in practice"),
            node("Challenges", "risk", 6, false, "Common obstacles and misconceptions"),
            node("Opportunities", "growth", 6, false, "Openings {topic} creates"),
            node("Resources & Tools", "resources", 5, false, "Material for going deeper"),
            node("Next Steps", "action", 5, false, "Concrete actions to move forward"),
        ],
    },
];

/// Generic expansion angles, applied in order.
pub static BRANCH_ASPECTS: [&str; 10] = [
    "Strategic Implementation",
    "Risk Mitigation",
    "Resource Allocation",
    "Performance Metrics",
    "Stakeholder Engagement",
    "Innovation Opportunities",
    "Market Analysis",
    "Operational Excellence",
    "Technology Integration",
    "Long-term Sustainability",
];

pub static PALETTE: [Hsl; 10] = [
    Hsl::new(210, 70, 50),
    Hsl::new(150, 60, 45),
    Hsl::new(30, 85, 55),
    Hsl::new(280, 55, 55),
    Hsl::new(0, 70, 55),
    Hsl::new(180, 60, 40),
    Hsl::new(50, 80, 50),
    Hsl::new(330, 65, 55),
    Hsl::new(100, 50, 45),
    Hsl::new(240, 50, 60),
];

pub fn palette_color(index: usize) -> Hsl {
    PALETTE[index % PALETTE.len()]
}

/// Short keywords ("ai", "ml") only count as whole words, longer ones as
/// substrings of the lower-cased topic.
pub fn keyword_matches(topic_lower: &str, keyword: &str) -> bool {
    if keyword.len() <= 3 {
        topic_lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|token| token == keyword)
    } else {
        topic_lower.contains(keyword)
    }
}

/// The first domain whose keywords hit the topic; the keyword-less domain
/// catches everything else.
pub fn detect_domain(topic: &str) -> &'static FallbackDomain {
    let lower = topic.to_lowercase();
    FALLBACK_DOMAINS
        .iter()
        .find(|d| d.keywords.is_empty() || d.keywords.iter().any(|k| keyword_matches(&lower, k)))
        .unwrap_or(&FALLBACK_DOMAINS[FALLBACK_DOMAINS.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_domain_is_last_and_catches_all() {
        let last = FALLBACK_DOMAINS.last().unwrap();
        assert!(last.keywords.is_empty());
        assert!(FALLBACK_DOMAINS[..FALLBACK_DOMAINS.len() - 1]
            .iter()
            .all(|d| !d.keywords.is_empty()));
        assert_eq!(detect_domain("Medieval poetry").name, "general");
    }

    #[test]
    fn first_matching_domain_wins() {
        assert_eq!(detect_domain("Business Strategy for Expansion").name, "business");
        assert_eq!(detect_domain("Startup marketing").name, "business");
        assert_eq!(detect_domain("AI in healthcare").name, "technology");
        assert_eq!(detect_domain("Brand storytelling").name, "marketing");
    }

    #[test]
    fn short_keywords_need_word_boundaries() {
        assert!(keyword_matches("ai ethics", "ai"));
        assert!(keyword_matches("gen-ai tools", "ai"));
        assert!(!keyword_matches("supply chain", "ai"));
        assert_eq!(detect_domain("Maintaining a garden").name, "general");
    }

    #[test]
    fn node_tables_follow_the_hub_rules() {
        for domain in FALLBACK_DOMAINS {
            assert!((8..=10).contains(&domain.nodes.len()), "{}", domain.name);
            let roots: Vec<_> = domain.nodes.iter().filter(|n| n.importance == 10).collect();
            assert_eq!(roots.len(), 1, "{}", domain.name);
            assert!(roots[0].label.contains("{topic}"));
            assert!(domain.nodes[0].is_fundamental);
            for n in domain.nodes {
                if n.importance >= 8 {
                    assert!(n.is_fundamental, "{} / {}", domain.name, n.label);
                }
            }
        }
    }

    #[test]
    fn palette_wraps() {
        assert_eq!(palette_color(0), palette_color(PALETTE.len()));
    }
}
