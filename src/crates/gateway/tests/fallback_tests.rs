//! Integration tests for primary/secondary fallback and cost reporting

mod common;

use common::{approx_eq, config, template, test_prices, variables, StubModel};
use gateway::{
    FallbackOrchestrator, ModelSlot, PriceTable, SettingsLoader, Slot, TimeoutSettings,
    ALL_MODELS_FAILED,
};
use llm::{ModelConfig, Provider};
use std::time::Duration;
use tempfile::TempDir;

fn no_credentials(_: &str) -> Option<String> {
    None
}

fn all_credentials(name: &str) -> Option<String> {
    name.ends_with("_API_KEY").then(|| "sk-test".to_string())
}

#[tokio::test]
async fn test_primary_success_is_priced() {
    let primary = StubModel::reply("hello", 100, 20);
    let secondary = StubModel::reply("unused", 5, 5);
    let orchestrator = FallbackOrchestrator::builder()
        .primary_model(config("A"), primary.clone())
        .secondary_model(config("B"), secondary.clone())
        .prices(test_prices())
        .build();

    let (text, cost) = orchestrator.generate(&template(), &variables("fractions")).await;

    assert_eq!(text, "hello");
    assert!(approx_eq(cost, 0.000014), "cost was {}", cost);
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 0);
}

#[tokio::test]
async fn test_rate_limited_primary_falls_back() {
    let primary = StubModel::rate_limited();
    let secondary = StubModel::reply("fallback text", 50, 30);
    let orchestrator = FallbackOrchestrator::builder()
        .primary_model(config("A"), primary.clone())
        .secondary_model(config("B"), secondary.clone())
        .prices(test_prices())
        .build();

    let (text, cost) = orchestrator.generate(&template(), &variables("fractions")).await;

    assert_eq!(text, "fallback text");
    assert_eq!(cost, 0.0);
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test]
async fn test_unavailable_primary_is_never_invoked() {
    let secondary = StubModel::reply("from secondary", 100, 20);
    let orchestrator = FallbackOrchestrator::builder()
        .primary(ModelSlot::new(config("A"), None))
        .secondary_model(config("A"), secondary.clone())
        .prices(test_prices())
        .build();

    let generation = orchestrator
        .generate_detailed(&template(), &variables("fractions"))
        .await;

    assert_eq!(generation.text, "from secondary");
    assert_eq!(generation.served_by, Some(Slot::Secondary));
    assert!(approx_eq(generation.cost.dollars, 0.000014));
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test]
async fn test_missing_primary_credential_falls_back() {
    let primary = ModelSlot::connect_with(
        ModelConfig::new(Provider::OpenAi, "A", 0.0),
        no_credentials,
    );
    assert!(!primary.is_available());

    let secondary = StubModel::reply("from secondary", 100, 20);
    let orchestrator = FallbackOrchestrator::builder()
        .primary(primary)
        .secondary_model(config("A"), secondary.clone())
        .prices(test_prices())
        .build();

    let generation = orchestrator
        .generate_detailed(&template(), &variables("fractions"))
        .await;

    assert_eq!(generation.text, "from secondary");
    assert_eq!(generation.served_by, Some(Slot::Secondary));
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test]
async fn test_unsupported_primary_provider_falls_back() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("gateway.toml");
    std::fs::write(
        &path,
        r#"
        [primary]
        provider = "Gemini"
        model_name = "gemini-pro"
        temperature = 0.0
        "#,
    )
    .expect("Failed to write settings");

    let settings = SettingsLoader::with_paths(None, None)
        .load(Some(&path))
        .await
        .expect("settings with an unknown provider still load");

    let primary = ModelSlot::connect_with(settings.primary.clone(), all_credentials);
    assert!(!primary.is_available());

    let secondary = StubModel::reply("fallback text", 10, 10);
    let orchestrator = FallbackOrchestrator::builder()
        .primary(primary)
        .secondary_model(settings.secondary.clone(), secondary.clone())
        .prices(settings.price_table())
        .build();

    let generation = orchestrator
        .generate_detailed(&template(), &variables("fractions"))
        .await;

    assert_eq!(generation.text, "fallback text");
    assert_eq!(generation.served_by, Some(Slot::Secondary));
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test]
async fn test_slot_built_with_credentials_is_available() {
    let slot = ModelSlot::connect_with(
        ModelConfig::new(Provider::Claude, "claude-3-haiku-20240307", 0.0),
        all_credentials,
    );
    assert!(slot.is_available());
}

#[tokio::test(start_paused = true)]
async fn test_hanging_primary_falls_back_within_secondary_timeout() {
    let primary = StubModel::hang();
    let secondary = StubModel::delayed("late but in time", Duration::from_secs(10));
    let orchestrator = FallbackOrchestrator::builder()
        .primary_model(config("A"), primary.clone())
        .secondary_model(config("B"), secondary.clone())
        .prices(test_prices())
        .build();

    let started = tokio::time::Instant::now();
    let generation = orchestrator
        .generate_detailed(&template(), &variables("fractions"))
        .await;
    let elapsed = started.elapsed();

    assert_eq!(generation.text, "late but in time");
    assert_eq!(generation.served_by, Some(Slot::Secondary));
    assert!(elapsed >= Duration::from_secs(50), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(55), "elapsed {:?}", elapsed);
    assert_eq!(primary.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_slow_secondary_times_out() {
    let orchestrator = FallbackOrchestrator::builder()
        .primary_model(config("A"), StubModel::rate_limited())
        .secondary_model(config("B"), StubModel::delayed("too slow", Duration::from_secs(16)))
        .build();

    let (text, cost) = orchestrator.generate(&template(), &variables("fractions")).await;

    assert_eq!(text, ALL_MODELS_FAILED);
    assert_eq!(cost, 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_configured_timeouts_apply() {
    let orchestrator = FallbackOrchestrator::builder()
        .primary_model(config("A"), StubModel::delayed("primary", Duration::from_secs(5)))
        .secondary_model(config("B"), StubModel::reply("secondary", 1, 1))
        .timeouts(TimeoutSettings {
            primary_secs: 2,
            secondary_secs: 1,
        })
        .build();

    let generation = orchestrator
        .generate_detailed(&template(), &variables("fractions"))
        .await;

    assert_eq!(generation.text, "secondary");
    assert_eq!(generation.served_by, Some(Slot::Secondary));
}

#[tokio::test]
async fn test_both_fail() {
    let primary = StubModel::rate_limited();
    let secondary = StubModel::rate_limited();
    let orchestrator = FallbackOrchestrator::builder()
        .primary_model(config("A"), primary.clone())
        .secondary_model(config("B"), secondary.clone())
        .build();

    let generation = orchestrator
        .generate_detailed(&template(), &variables("fractions"))
        .await;

    assert_eq!(generation.text, "Error: All models failed to generate a response.");
    assert_eq!(generation.cost.dollars, 0.0);
    assert_eq!(generation.served_by, None);
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test]
async fn test_both_unavailable() {
    let orchestrator = FallbackOrchestrator::builder()
        .primary(ModelSlot::new(config("A"), None))
        .secondary(ModelSlot::new(config("B"), None))
        .build();

    let (text, cost) = orchestrator.generate(&template(), &variables("fractions")).await;

    assert_eq!(text, ALL_MODELS_FAILED);
    assert_eq!(cost, 0.0);
}

#[tokio::test]
async fn test_pricing_miss_returns_text_at_zero_cost() {
    let orchestrator = FallbackOrchestrator::builder()
        .primary_model(config("not-in-table"), StubModel::reply("priced at nothing", 900, 900))
        .prices(PriceTable::new())
        .build();

    let generation = orchestrator
        .generate_detailed(&template(), &variables("fractions"))
        .await;

    assert_eq!(generation.text, "priced at nothing");
    assert_eq!(generation.cost.dollars, 0.0);
    assert_eq!(generation.served_by, Some(Slot::Primary));
    assert_eq!(generation.input_tokens, 900);
}

#[tokio::test]
async fn test_template_is_rendered_for_the_model() {
    let orchestrator = FallbackOrchestrator::builder()
        .primary_model(config("A"), StubModel::echo())
        .build();

    let (text, _) = orchestrator.generate(&template(), &variables("volcanoes")).await;

    assert_eq!(text, "Explain volcanoes to a 5th grade student.");
}

#[tokio::test]
async fn test_no_state_carried_between_calls() {
    let primary = StubModel::reply("hello", 100, 20);
    let orchestrator = FallbackOrchestrator::builder()
        .primary_model(config("A"), primary.clone())
        .prices(test_prices())
        .build();

    let first = orchestrator.generate(&template(), &variables("a")).await;
    let second = orchestrator.generate(&template(), &variables("b")).await;

    assert_eq!(first, second);
    assert_eq!(primary.calls(), 2);
}
