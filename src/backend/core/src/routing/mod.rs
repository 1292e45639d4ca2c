//! Model recommendation.
//!
//! Maps an intent category to a baseline model from a static table, then
//! applies two overrides in order: a budget override that swaps in the first
//! affordable cheap model, and a speed override that swaps in a faster
//! variant of whatever model is current at that point.

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{IntentCategory, ModelName, ModelRecommendation, Provider, Speed};

/// Model tier, used for display and catalogue ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Cheapest, fastest models
    Economy,
    /// Mid-tier models
    Standard,
    /// Most capable models
    Premium,
}

/// Static catalogue entry for a model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    pub name: ModelName,
    pub provider: Provider,
    pub tier: ModelTier,
    /// Estimated cost per request in USD, where the recommendation tables know it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_request: Option<f64>,
}

/// Every model the API accepts, with its provider.
pub const MODEL_CATALOGUE: &[ModelConfig] = &[
    ModelConfig { name: ModelName::Gpt4o, provider: Provider::OpenAi, tier: ModelTier::Standard, cost_per_request: Some(0.03) },
    ModelConfig { name: ModelName::Gpt4oMini, provider: Provider::OpenAi, tier: ModelTier::Economy, cost_per_request: Some(0.01) },
    ModelConfig { name: ModelName::Gpt35Turbo, provider: Provider::OpenAi, tier: ModelTier::Economy, cost_per_request: Some(0.002) },
    ModelConfig { name: ModelName::Claude3Opus, provider: Provider::Anthropic, tier: ModelTier::Premium, cost_per_request: Some(0.06) },
    ModelConfig { name: ModelName::Claude3Sonnet, provider: Provider::Anthropic, tier: ModelTier::Standard, cost_per_request: Some(0.015) },
    ModelConfig { name: ModelName::Claude3Haiku, provider: Provider::Anthropic, tier: ModelTier::Economy, cost_per_request: Some(0.005) },
    ModelConfig { name: ModelName::GeminiPro, provider: Provider::Google, tier: ModelTier::Standard, cost_per_request: Some(0.02) },
    ModelConfig { name: ModelName::GeminiFlash, provider: Provider::Google, tier: ModelTier::Economy, cost_per_request: Some(0.008) },
    ModelConfig { name: ModelName::Llama31_8b, provider: Provider::Local, tier: ModelTier::Economy, cost_per_request: None },
    ModelConfig { name: ModelName::Llama31_70b, provider: Provider::Local, tier: ModelTier::Standard, cost_per_request: None },
];

/// Provider that serves `model`, if the model is in the catalogue.
pub fn provider_for(model: ModelName) -> Option<Provider> {
    MODEL_CATALOGUE
        .iter()
        .find(|m| m.name == model)
        .map(|m| m.provider)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Recommendation Tables
// ═══════════════════════════════════════════════════════════════════════════════

/// Baseline recommendation for one intent category.
#[derive(Debug, Clone, Copy)]
pub struct Baseline {
    pub category: IntentCategory,
    pub model: ModelName,
    pub provider: Provider,
    pub reasoning: &'static str,
    pub cost: f64,
    pub score: f64,
}

/// One entry per category, in [`IntentCategory::ALL`] order.
pub const BASELINES: [Baseline; 9] = [
    Baseline {
        category: IntentCategory::CreativeWriting,
        model: ModelName::Claude3Sonnet,
        provider: Provider::Anthropic,
        reasoning: "Claude excels at creative writing with nuanced understanding and engaging prose",
        cost: 0.015,
        score: 0.95,
    },
    Baseline {
        category: IntentCategory::CodeGeneration,
        model: ModelName::Gpt4o,
        provider: Provider::OpenAi,
        reasoning: "GPT-4o has excellent code generation capabilities with strong reasoning",
        cost: 0.03,
        score: 0.92,
    },
    Baseline {
        category: IntentCategory::DataAnalysis,
        model: ModelName::Gpt4o,
        provider: Provider::OpenAi,
        reasoning: "GPT-4o performs well on analytical tasks and data interpretation",
        cost: 0.03,
        score: 0.90,
    },
    Baseline {
        category: IntentCategory::ContentSummarization,
        model: ModelName::Gpt4oMini,
        provider: Provider::OpenAi,
        reasoning: "GPT-4o-mini is cost-effective for summarization tasks",
        cost: 0.01,
        score: 0.85,
    },
    Baseline {
        category: IntentCategory::Translation,
        model: ModelName::GeminiPro,
        provider: Provider::Google,
        reasoning: "Gemini has strong multilingual capabilities",
        cost: 0.02,
        score: 0.88,
    },
    Baseline {
        category: IntentCategory::QuestionAnswering,
        model: ModelName::Claude3Haiku,
        provider: Provider::Anthropic,
        reasoning: "Claude Haiku is fast and accurate for Q&A tasks",
        cost: 0.005,
        score: 0.87,
    },
    Baseline {
        category: IntentCategory::Brainstorming,
        model: ModelName::Gpt4o,
        provider: Provider::OpenAi,
        reasoning: "GPT-4o generates diverse and creative ideas",
        cost: 0.03,
        score: 0.93,
    },
    Baseline {
        category: IntentCategory::ProblemSolving,
        model: ModelName::Claude3Opus,
        provider: Provider::Anthropic,
        reasoning: "Claude Opus has superior reasoning capabilities for complex problems",
        cost: 0.06,
        score: 0.96,
    },
    Baseline {
        category: IntentCategory::Other,
        model: ModelName::Gpt35Turbo,
        provider: Provider::OpenAi,
        reasoning: "GPT-3.5-turbo is a reliable general-purpose model",
        cost: 0.002,
        score: 0.80,
    },
];

/// A budget-override candidate.
#[derive(Debug, Clone, Copy)]
pub struct CheapModel {
    pub model: ModelName,
    pub provider: Provider,
    pub cost: f64,
    pub score: f64,
}

/// Budget candidates, scanned in order.
pub const CHEAP_MODELS: [CheapModel; 3] = [
    CheapModel { model: ModelName::Gpt35Turbo, provider: Provider::OpenAi, cost: 0.002, score: 0.80 },
    CheapModel { model: ModelName::Claude3Haiku, provider: Provider::Anthropic, cost: 0.005, score: 0.87 },
    CheapModel { model: ModelName::GeminiFlash, provider: Provider::Google, cost: 0.008, score: 0.82 },
];

/// Faster variant of a model: (from, to, provider, score).
pub const FAST_ALTERNATIVES: [(ModelName, ModelName, Provider, f64); 3] = [
    (ModelName::Gpt4o, ModelName::Gpt4oMini, Provider::OpenAi, 0.85),
    (ModelName::Claude3Opus, ModelName::Claude3Haiku, Provider::Anthropic, 0.87),
    (ModelName::Claude3Sonnet, ModelName::Claude3Haiku, Provider::Anthropic, 0.87),
];

// ═══════════════════════════════════════════════════════════════════════════════
// Recommender
// ═══════════════════════════════════════════════════════════════════════════════

/// Recommends a model for an intent category.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelRecommender;

impl ModelRecommender {
    pub fn new() -> Self {
        Self
    }

    /// Unmodified table entry for `category`.
    pub fn baseline(&self, category: IntentCategory) -> ModelRecommendation {
        let entry = &BASELINES[category.index()];
        ModelRecommendation {
            model_name: entry.model,
            provider: entry.provider,
            reasoning: entry.reasoning.to_string(),
            estimated_cost: Some(entry.cost),
            performance_score: entry.score,
        }
    }

    /// Recommend a model. Never fails: an unsatisfiable budget keeps the baseline.
    pub fn recommend(
        &self,
        category: IntentCategory,
        budget: Option<f64>,
        speed: Option<Speed>,
    ) -> ModelRecommendation {
        let mut recommendation = self.baseline(category);

        if let Some(budget) = budget {
            let over_budget = recommendation.estimated_cost.is_some_and(|cost| budget < cost);
            if over_budget {
                if let Some(cheap) = CHEAP_MODELS.iter().find(|m| m.cost <= budget) {
                    recommendation = ModelRecommendation {
                        model_name: cheap.model,
                        provider: cheap.provider,
                        reasoning: format!(
                            "Budget-optimized choice: {} for cost efficiency",
                            cheap.model
                        ),
                        estimated_cost: Some(cheap.cost),
                        performance_score: cheap.score,
                    };
                }
            }
        }

        if speed.unwrap_or_default() == Speed::Fast {
            // Keyed on the current model, which the budget override may have changed
            if let Some((_, to, provider, score)) = FAST_ALTERNATIVES
                .iter()
                .find(|(from, ..)| *from == recommendation.model_name)
            {
                recommendation.model_name = *to;
                recommendation.provider = *provider;
                recommendation.performance_score = *score;
                recommendation.reasoning.push_str(" (speed-optimized variant)");
            }
        }

        counter!(
            "cheato_recommendations_total",
            "category" => category.as_str(),
            "model" => recommendation.model_name.as_str(),
        )
        .increment(1);
        debug!(
            category = %category,
            model = %recommendation.model_name,
            budget = ?budget,
            speed = ?speed,
            "Recommended model"
        );

        recommendation
    }

    /// Get model by name.
    pub fn model(&self, name: ModelName) -> Option<&'static ModelConfig> {
        MODEL_CATALOGUE.iter().find(|m| m.name == name)
    }

    /// The full model catalogue.
    pub fn models(&self) -> &'static [ModelConfig] {
        MODEL_CATALOGUE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_table_covers_every_category() {
        for (entry, category) in BASELINES.iter().zip(IntentCategory::ALL) {
            assert_eq!(entry.category, category);
            assert_eq!(provider_for(entry.model), Some(entry.provider));
        }
    }

    #[test]
    fn test_every_model_has_provider() {
        for model in ModelName::ALL {
            assert!(provider_for(model).is_some(), "{}", model);
        }
    }

    #[test]
    fn test_no_preferences_returns_baseline() {
        let recommender = ModelRecommender::new();
        for category in IntentCategory::ALL {
            assert_eq!(
                recommender.recommend(category, None, None),
                recommender.baseline(category)
            );
            assert_eq!(
                recommender.recommend(category, None, Some(Speed::Balanced)),
                recommender.baseline(category)
            );
        }
    }

    #[test]
    fn test_budget_override_picks_first_affordable() {
        let rec = ModelRecommender::new().recommend(IntentCategory::ProblemSolving, Some(0.01), None);
        assert_eq!(rec.model_name, ModelName::Gpt35Turbo);
        assert_eq!(rec.provider, Provider::OpenAi);
        assert_eq!(rec.estimated_cost, Some(0.002));
        assert_eq!(rec.performance_score, 0.80);
        assert_eq!(rec.reasoning, "Budget-optimized choice: gpt-3.5-turbo for cost efficiency");
    }

    #[test]
    fn test_unsatisfiable_budget_keeps_baseline() {
        let recommender = ModelRecommender::new();
        let rec = recommender.recommend(IntentCategory::CodeGeneration, Some(0.001), None);
        assert_eq!(rec, recommender.baseline(IntentCategory::CodeGeneration));
    }

    #[test]
    fn test_budget_at_or_above_cost_keeps_baseline() {
        let recommender = ModelRecommender::new();
        let rec = recommender.recommend(IntentCategory::CodeGeneration, Some(0.03), None);
        assert_eq!(rec.model_name, ModelName::Gpt4o);
    }

    #[test]
    fn test_fast_override() {
        let rec = ModelRecommender::new().recommend(IntentCategory::CodeGeneration, None, Some(Speed::Fast));
        assert_eq!(rec.model_name, ModelName::Gpt4oMini);
        assert_eq!(rec.performance_score, 0.85);
        assert_eq!(rec.estimated_cost, Some(0.03));
        assert!(rec.reasoning.ends_with(" (speed-optimized variant)"));
    }

    #[test]
    fn test_fast_without_alternative_is_unchanged() {
        let recommender = ModelRecommender::new();
        let rec = recommender.recommend(IntentCategory::Translation, None, Some(Speed::Fast));
        assert_eq!(rec, recommender.baseline(IntentCategory::Translation));
    }

    #[test]
    fn test_speed_lookup_uses_post_budget_model() {
        let recommender = ModelRecommender::new();

        // Alone, fast turns claude-3-sonnet into claude-3-haiku
        let fast = recommender.recommend(IntentCategory::CreativeWriting, None, Some(Speed::Fast));
        assert_eq!(fast.model_name, ModelName::Claude3Haiku);

        // Budget first swaps in gpt-3.5-turbo, which has no fast variant
        let rec = recommender.recommend(IntentCategory::CreativeWriting, Some(0.01), Some(Speed::Fast));
        assert_eq!(rec.model_name, ModelName::Gpt35Turbo);
        assert_eq!(rec.estimated_cost, Some(0.002));
        assert!(!rec.reasoning.contains("speed-optimized"));
    }

    #[test]
    fn test_scores_and_costs_in_range() {
        let recommender = ModelRecommender::new();
        for category in IntentCategory::ALL {
            for budget in [None, Some(0.0), Some(0.004), Some(1.0)] {
                for speed in [None, Some(Speed::Fast), Some(Speed::Quality)] {
                    let rec = recommender.recommend(category, budget, speed);
                    assert!((0.0..=1.0).contains(&rec.performance_score));
                    assert!(rec.estimated_cost.unwrap_or(0.0) >= 0.0);
                }
            }
        }
    }

    #[test]
    fn test_catalogue_lookup() {
        let recommender = ModelRecommender::new();
        let config = recommender.model(ModelName::Claude3Opus).unwrap();
        assert_eq!(config.tier, ModelTier::Premium);
        assert_eq!(recommender.models().len(), ModelName::ALL.len());
    }
}
