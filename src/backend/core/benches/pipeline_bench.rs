//! Benchmarks for the synchronous pipeline stages.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cheato_core::intent::IntentClassifier;
use cheato_core::prompt::PromptEngineer;
use cheato_core::routing::ModelRecommender;
use cheato_core::types::{Complexity, IntentCategory, ModelName, Speed, Tone};

const CODE_TEXT: &str = "Write a Python script that parses a CSV file and prints the totals";
const QUESTION_TEXT: &str = "How does a transformer model handle long context windows?";
const FALLBACK_TEXT: &str = "Hello there, nice weather today";

fn bench_intent_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("intent_classification");
    let classifier = IntentClassifier::new();
    for (label, text) in [("code", CODE_TEXT), ("question", QUESTION_TEXT), ("fallback", FALLBACK_TEXT)] {
        group.bench_with_input(BenchmarkId::from_parameter(label), text, |b, input| {
            b.iter(|| black_box(classifier.classify(input)));
        });
    }

    let long_text = FALLBACK_TEXT.repeat(300);
    group.throughput(Throughput::Bytes(long_text.len() as u64));
    group.bench_function("long_fallback", |b| b.iter(|| black_box(classifier.classify(&long_text))));
    group.finish();
}

fn bench_model_recommendation(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_recommendation");
    let recommender = ModelRecommender::new();
    for (label, budget, speed) in [
        ("baseline", None, None),
        ("budget", Some(0.004), None),
        ("fast", None, Some(Speed::Fast)),
        ("budget_fast", Some(0.01), Some(Speed::Fast)),
    ] {
        group.bench_function(label, |b| {
            b.iter(|| {
                for category in IntentCategory::ALL {
                    black_box(recommender.recommend(category, budget, speed));
                }
            })
        });
    }
    group.finish();
}

fn bench_prompt_engineering(c: &mut Criterion) {
    let mut group = c.benchmark_group("prompt_engineering");
    let engineer = PromptEngineer::new();
    group.bench_function("generate", |b| {
        b.iter(|| black_box(engineer.generate(ModelName::Gpt4o, IntentCategory::CodeGeneration, CODE_TEXT)))
    });
    for (label, tone, complexity) in [
        ("casual_simple", Tone::Casual, Complexity::Simple),
        ("technical_detailed", Tone::Technical, Complexity::Detailed),
    ] {
        group.bench_with_input(BenchmarkId::new("refine", label), QUESTION_TEXT, |b, prompt| {
            b.iter(|| black_box(engineer.refine(prompt, tone, complexity)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_intent_classification, bench_model_recommendation, bench_prompt_engineering);
criterion_main!(benches);
