//! End-to-end tests of the pipeline stages driven in order, without HTTP.

use std::sync::Arc;

use cheato_core::error::ErrorCode;
use cheato_core::execution::{Dispatcher, MockGenerator};
use cheato_core::history::{HistoryRecorder, InMemoryStore};
use cheato_core::intent::IntentClassifier;
use cheato_core::prompt::PromptEngineer;
use cheato_core::routing::{provider_for, ModelRecommender, BASELINES};
use cheato_core::types::{
    Complexity, IntentCategory, InteractionLog, InteractionMetadata, LlmRequest, ModelName, Speed,
    Tone,
};

#[tokio::test]
async fn test_full_workflow() {
    let classifier = IntentClassifier::new();
    let recommender = ModelRecommender::new();
    let engineer = PromptEngineer::new();
    let dispatcher = Dispatcher::new(Arc::new(MockGenerator::new(0.0)));
    let history = HistoryRecorder::new(Arc::new(InMemoryStore::new()));

    let input = "Can you summarize this detailed report about solar panels?";

    let intent = classifier.classify(input);
    assert_eq!(intent.intent_category, IntentCategory::ContentSummarization);
    assert!(intent.tags.contains(&"detailed".to_string()));

    let recommendation = recommender.recommend(intent.intent_category, None, Some(Speed::Balanced));
    assert_eq!(recommendation.model_name, ModelName::Gpt4oMini);

    let generated = engineer.generate(recommendation.model_name, intent.intent_category, input);
    assert!(generated.raw_prompt.ends_with(input));

    let refined = engineer.refine(&generated.optimized_prompt, Tone::Professional, Complexity::Detailed);
    assert_eq!(refined.raw_prompt, generated.optimized_prompt);
    assert_eq!(
        refined.improvements,
        vec![
            "Applied professional tone",
            "Applied detailed complexity level",
            "Added detailed instruction",
            "Enhanced question structure",
        ]
    );

    let response = dispatcher
        .execute(&LlmRequest::new(recommendation.model_name, refined.optimized_prompt.clone()))
        .await
        .unwrap();
    assert_eq!(response.model, ModelName::Gpt4oMini);
    assert!(response.output.starts_with("[OpenAI Response]"));

    history
        .record(InteractionLog {
            user_id: "workflow-user".to_string(),
            model: response.model,
            prompt: refined.optimized_prompt,
            result: response.output,
            metadata: Some(InteractionMetadata {
                intent_category: Some(intent.intent_category),
                tags: Some(intent.tags),
                tone: Some(Tone::Professional),
                complexity: Some(Complexity::Detailed),
                model_provider: Some(recommendation.provider),
            }),
        })
        .await
        .unwrap();

    let analytics = history.analytics("workflow-user").await.unwrap();
    assert_eq!(analytics.total_interactions, 1);
    assert_eq!(analytics.model_usage["gpt-4o-mini"], 1);
    assert_eq!(analytics.intent_distribution["content_summarization"], 1);
}

#[test]
fn test_every_model_has_a_provider() {
    for model in ModelName::ALL {
        assert!(provider_for(model).is_some(), "{}", model);
    }
}

#[test]
fn test_every_category_has_one_baseline() {
    for category in IntentCategory::ALL {
        let entries = BASELINES.iter().filter(|b| b.category == category).count();
        assert_eq!(entries, 1, "{}", category);
    }
}

#[test]
fn test_recommendations_stay_in_bounds() {
    let recommender = ModelRecommender::new();
    for category in IntentCategory::ALL {
        for budget in [None, Some(0.0), Some(0.004), Some(1.0)] {
            for speed in [None, Some(Speed::Fast), Some(Speed::Quality)] {
                let r = recommender.recommend(category, budget, speed);
                assert!((0.0..=1.0).contains(&r.performance_score));
                assert!(r.estimated_cost.map_or(true, |c| c >= 0.0));
                assert_eq!(provider_for(r.model_name), Some(r.provider));
            }
        }
    }
}

#[test]
fn test_classifier_tags_are_unique() {
    let classifier = IntentClassifier::new();
    for text in [
        "brainstorm some creative ideas, quick and simple",
        "Analyze this data chart in a detailed, comprehensive way",
        "hello",
    ] {
        let analysis = classifier.classify(text);
        let mut tags = analysis.tags.clone();
        tags.sort();
        tags.dedup();
        assert_eq!(tags.len(), analysis.tags.len(), "{}", text);
        assert!((0.0..=1.0).contains(&analysis.confidence));
    }
}

#[test]
fn test_stages_are_pure() {
    let classifier = IntentClassifier::new();
    let recommender = ModelRecommender::new();
    let engineer = PromptEngineer::new();

    let text = "Write a quick Python script to fix my data export";
    assert_eq!(classifier.classify(text), classifier.classify(text));

    for category in IntentCategory::ALL {
        for budget in [None, Some(0.0), Some(0.004), Some(0.05)] {
            for speed in [None, Some(Speed::Fast), Some(Speed::Balanced), Some(Speed::Quality)] {
                assert_eq!(
                    recommender.recommend(category, budget, speed),
                    recommender.recommend(category, budget, speed),
                    "{} {:?} {:?}",
                    category,
                    budget,
                    speed
                );
            }
        }
    }

    let generated = engineer.generate(ModelName::Claude3Haiku, IntentCategory::Translation, "Hola");
    assert_eq!(
        generated,
        engineer.generate(ModelName::Claude3Haiku, IntentCategory::Translation, "Hola")
    );
    assert_eq!(
        engineer.refine("Why is the sky blue?", Tone::Technical, Complexity::Detailed),
        engineer.refine("Why is the sky blue?", Tone::Technical, Complexity::Detailed)
    );
}

#[tokio::test]
async fn test_batch_failure_code() {
    use async_trait::async_trait;
    use cheato_core::execution::{GenerationError, GenerationOptions, TextGenerator};
    use cheato_core::types::Provider;

    struct DownProvider;

    #[async_trait]
    impl TextGenerator for DownProvider {
        async fn generate(
            &self,
            provider: Provider,
            _prompt: &str,
            _options: &GenerationOptions,
        ) -> Result<String, GenerationError> {
            match provider {
                Provider::Google => Err(GenerationError::Unavailable(provider)),
                _ => Ok("fine".to_string()),
            }
        }
    }

    let dispatcher = Dispatcher::new(Arc::new(DownProvider));
    let requests = vec![
        LlmRequest::new(ModelName::Gpt4o, "a"),
        LlmRequest::new(ModelName::GeminiPro, "b"),
    ];

    let error = dispatcher.execute_batch(&requests).await.unwrap_err();
    assert_eq!(error.code(), ErrorCode::BatchExecutionFailed);
    assert!(error.user_message().contains("Batch request 1 failed"));
    assert!(error.user_message().contains("provider google is not available"));
}
