//! Keyword-based intent classification.
//!
//! Rules are evaluated top to bottom and the first match decides the
//! category, base tags and confidence. Secondary tags are then added
//! independently of which rule fired.

use metrics::counter;
use tracing::debug;

use crate::types::{IntentAnalysis, IntentCategory};

/// A primary classification rule.
///
/// Matches when every group has at least one keyword that occurs as a
/// substring of the lower-cased input.
#[derive(Debug, Clone, Copy)]
pub struct IntentRule {
    pub groups: &'static [&'static [&'static str]],
    pub category: IntentCategory,
    pub tags: &'static [&'static str],
    pub confidence: f64,
}

impl IntentRule {
    fn matches(&self, text: &str) -> bool {
        self.groups
            .iter()
            .all(|group| group.iter().any(|keyword| text.contains(keyword)))
    }
}

const AUTHORING: &[&str] = &["write", "create", "generate"];

/// Primary rules in priority order.
pub const RULES: &[IntentRule] = &[
    IntentRule {
        groups: &[AUTHORING, &["code", "function", "script"]],
        category: IntentCategory::CodeGeneration,
        tags: &["programming", "development", "code"],
        confidence: 0.9,
    },
    IntentRule {
        groups: &[AUTHORING, &["story", "poem", "article"]],
        category: IntentCategory::CreativeWriting,
        tags: &["creative", "writing", "content"],
        confidence: 0.85,
    },
    IntentRule {
        groups: &[AUTHORING],
        category: IntentCategory::CreativeWriting,
        tags: &["content-creation"],
        confidence: 0.7,
    },
    IntentRule {
        groups: &[&["analyze", "data", "chart"]],
        category: IntentCategory::DataAnalysis,
        tags: &["analytics", "data", "insights"],
        confidence: 0.8,
    },
    IntentRule {
        groups: &[&["summarize", "summary"]],
        category: IntentCategory::ContentSummarization,
        tags: &["summary", "condense", "extract"],
        confidence: 0.9,
    },
    IntentRule {
        groups: &[&["translate", "language"]],
        category: IntentCategory::Translation,
        tags: &["translation", "language", "multilingual"],
        confidence: 0.95,
    },
    IntentRule {
        groups: &[&["what", "how", "why", "?"]],
        category: IntentCategory::QuestionAnswering,
        tags: &["qa", "information", "help"],
        confidence: 0.8,
    },
    IntentRule {
        groups: &[&["brainstorm", "ideas", "suggest"]],
        category: IntentCategory::Brainstorming,
        tags: &["ideas", "creative", "suggestions"],
        confidence: 0.85,
    },
    IntentRule {
        groups: &[&["solve", "problem", "fix"]],
        category: IntentCategory::ProblemSolving,
        tags: &["problem-solving", "troubleshooting", "solution"],
        confidence: 0.8,
    },
];

/// Applied when no rule matches.
pub const FALLBACK: IntentRule = IntentRule {
    groups: &[],
    category: IntentCategory::Other,
    tags: &["general", "assistance"],
    confidence: 0.6,
};

/// Secondary tags: (keywords, tag).
const SECONDARY_TAGS: &[(&[&str], &str)] = &[
    (&["urgent", "quick"], "urgent"),
    (&["detailed", "comprehensive"], "detailed"),
    (&["simple", "basic"], "simple"),
];

/// Stateless intent classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify free text. Input length is checked by the caller.
    pub fn classify(&self, text: &str) -> IntentAnalysis {
        let lower = text.to_lowercase();

        let rule = RULES
            .iter()
            .find(|rule| rule.matches(&lower))
            .unwrap_or(&FALLBACK);

        let mut tags: Vec<String> = Vec::with_capacity(rule.tags.len() + SECONDARY_TAGS.len());
        let secondary = SECONDARY_TAGS
            .iter()
            .filter(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(_, tag)| *tag);

        for tag in rule.tags.iter().copied().chain(secondary) {
            if !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }

        counter!("cheato_intent_total", "category" => rule.category.as_str()).increment(1);
        debug!(
            category = %rule.category,
            confidence = rule.confidence,
            tags = ?tags,
            "Classified intent"
        );

        IntentAnalysis {
            intent_category: rule.category,
            tags,
            confidence: rule.confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> IntentAnalysis {
        IntentClassifier::new().classify(text)
    }

    #[test]
    fn test_code_generation() {
        let result = classify("Write a python function to calculate fibonacci");
        assert_eq!(result.intent_category, IntentCategory::CodeGeneration);
        assert_eq!(result.confidence, 0.9);
        for tag in ["programming", "development", "code"] {
            assert!(result.tags.iter().any(|t| t == tag));
        }
    }

    #[test]
    fn test_creative_and_generic_authoring() {
        let story = classify("Create a short story about dragons");
        assert_eq!(story.intent_category, IntentCategory::CreativeWriting);
        assert_eq!(story.confidence, 0.85);

        let generic = classify("Generate a tagline for my bakery");
        assert_eq!(generic.intent_category, IntentCategory::CreativeWriting);
        assert_eq!(generic.tags, vec!["content-creation"]);
        assert_eq!(generic.confidence, 0.7);
    }

    #[test]
    fn test_translation_request() {
        let analysis = classify("Translate this text to Spanish: Hello world");
        assert_eq!(analysis.intent_category, IntentCategory::Translation);
        assert_eq!(analysis.confidence, 0.95);
        assert_eq!(analysis.tags, vec!["translation", "language", "multilingual"]);
    }

    #[test]
    fn test_first_match_wins() {
        // "data" would match analysis, but authoring is checked first
        let result = classify("write about data");
        assert_eq!(result.intent_category, IntentCategory::CreativeWriting);

        // analysis outranks the question marker
        let result = classify("Can you analyze this chart?");
        assert_eq!(result.intent_category, IntentCategory::DataAnalysis);
    }

    #[test]
    fn test_each_category_reachable() {
        let cases = [
            ("please summarize the meeting", IntentCategory::ContentSummarization, 0.9),
            ("translate this to French", IntentCategory::Translation, 0.95),
            ("is it raining?", IntentCategory::QuestionAnswering, 0.8),
            ("brainstorm names for a cat", IntentCategory::Brainstorming, 0.85),
            ("my sink leaks, fix it", IntentCategory::ProblemSolving, 0.8),
            ("hello there", IntentCategory::Other, 0.6),
        ];
        for (text, category, confidence) in cases {
            let result = classify(text);
            assert_eq!(result.intent_category, category, "{}", text);
            assert_eq!(result.confidence, confidence, "{}", text);
        }
    }

    #[test]
    fn test_secondary_tags_and_dedup() {
        let result = classify("Give me a quick, detailed and simple breakdown");
        assert_eq!(result.intent_category, IntentCategory::Other);
        assert_eq!(
            result.tags,
            vec!["general", "assistance", "urgent", "detailed", "simple"]
        );

        let result = classify("brainstorm creative ideas");
        let creative = result.tags.iter().filter(|t| *t == "creative").count();
        assert_eq!(creative, 1);
    }

    #[test]
    fn test_case_insensitive_and_deterministic() {
        assert_eq!(classify("TRANSLATE this"), classify("translate this"));
    }

    #[test]
    fn test_confidence_in_unit_interval() {
        for rule in RULES.iter().chain(std::iter::once(&FALLBACK)) {
            assert!((0.0..=1.0).contains(&rule.confidence));
        }
    }
}
