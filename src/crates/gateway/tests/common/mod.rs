//! Common test utilities: stub chat models and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use gateway::{ModelPrice, PriceTable, PromptTemplate, Variables};
use llm::{ChatModel, ChatRequest, ChatResponse, LlmError, ModelConfig, Provider, UsageMetadata};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

enum Behavior {
    Reply {
        text: String,
        usage: Option<UsageMetadata>,
        delay: Duration,
    },
    Echo,
    Metered { fail_on: Option<String> },
    RateLimited,
    Hang,
}

/// A chat model with scripted behavior that counts its invocations.
pub struct StubModel {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl StubModel {
    fn with(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    /// Reply with `text` and the given token usage.
    pub fn reply(text: &str, input_tokens: usize, output_tokens: usize) -> Arc<Self> {
        Self::with(Behavior::Reply {
            text: text.to_string(),
            usage: Some(UsageMetadata::new(input_tokens, output_tokens)),
            delay: Duration::ZERO,
        })
    }

    /// Reply with `text` after sleeping for `delay`.
    pub fn delayed(text: &str, delay: Duration) -> Arc<Self> {
        Self::with(Behavior::Reply {
            text: text.to_string(),
            usage: Some(UsageMetadata::new(10, 10)),
            delay,
        })
    }

    /// Reply with the rendered human message.
    pub fn echo() -> Arc<Self> {
        Self::with(Behavior::Echo)
    }

    /// Echo the rendered human message, reporting one input token per word
    /// of it and a single output token.
    pub fn metered() -> Arc<Self> {
        Self::with(Behavior::Metered { fail_on: None })
    }

    /// Like [`StubModel::metered`], but rate limited whenever the rendered
    /// message contains `marker`.
    pub fn metered_failing_on(marker: &str) -> Arc<Self> {
        Self::with(Behavior::Metered {
            fail_on: Some(marker.to_string()),
        })
    }

    /// Fail every call with a rate limit error.
    pub fn rate_limited() -> Arc<Self> {
        Self::with(Behavior::RateLimited)
    }

    /// Never answer.
    pub fn hang() -> Arc<Self> {
        Self::with(Behavior::Hang)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatModel for StubModel {
    async fn chat(&self, request: ChatRequest) -> llm::Result<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Reply { text, usage, delay } => {
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                Ok(ChatResponse::new(text.clone(), *usage))
            }
            Behavior::Echo => {
                let text = request
                    .messages
                    .last()
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                Ok(ChatResponse::new(text, Some(UsageMetadata::new(1, 1))))
            }
            Behavior::Metered { fail_on } => {
                let text = request
                    .messages
                    .last()
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                if fail_on.as_deref().is_some_and(|marker| text.contains(marker)) {
                    return Err(LlmError::RateLimitExceeded("rate limited".to_string()));
                }
                let input_tokens = word_count(&text);
                Ok(ChatResponse::new(text, Some(UsageMetadata::new(input_tokens, 1))))
            }
            Behavior::RateLimited => Err(LlmError::RateLimitExceeded("rate limited".to_string())),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(ChatResponse::new("too late", None))
            }
        }
    }
}

/// Model config for a stub; provider is irrelevant to stubs.
pub fn config(model_name: &str) -> ModelConfig {
    ModelConfig::new(Provider::OpenAi, model_name, 0.0)
}

/// "A" at $1e-7/$2e-7 per token, "B" free.
pub fn test_prices() -> PriceTable {
    PriceTable::new()
        .with_price("A", ModelPrice::new(0.0000001, 0.0000002))
        .with_price("B", ModelPrice::new(0.0, 0.0))
}

pub fn template() -> PromptTemplate {
    PromptTemplate::new("Explain {topic} to a {grade} student.")
}

pub fn variables(topic: &str) -> Variables {
    let mut vars = Variables::new();
    vars.insert("topic".to_string(), topic.to_string());
    vars.insert("grade".to_string(), "5th grade".to_string());
    vars
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}
