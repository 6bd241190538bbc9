//! Timed invocation of a single model.
//!
//! The provider call runs on its own tokio task so the deadline holds even if
//! the client never returns. On timeout the task is detached, not aborted; it
//! owns everything it touches, so a late result is dropped with it.

use crate::error::GatewayError;
use crate::prompt::InvocationRequest;
use llm::ChatModel;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Which of the two configured models an attempt used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Primary,
    Secondary,
}

impl Slot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Primary => "primary",
            Slot::Secondary => "secondary",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Result of one attempt. Exactly one is produced per invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationOutcome {
    Success {
        text: String,
        input_tokens: usize,
        output_tokens: usize,
    },
    Error {
        message: String,
    },
    Timeout,
}

impl InvocationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InvocationOutcome::Success { .. })
    }
}

/// Run `request` against `model`, waiting at most `timeout`.
///
/// Never fails: render errors, provider errors and worker panics become
/// [`InvocationOutcome::Error`], an elapsed deadline becomes
/// [`InvocationOutcome::Timeout`]. Token counts default to zero when the
/// response carries no usage metadata.
pub async fn invoke_with_timeout(
    model: &Arc<dyn ChatModel>,
    request: &InvocationRequest<'_>,
    temperature: f32,
    timeout: Duration,
    slot: Slot,
) -> InvocationOutcome {
    let chat_request = match request.to_chat_request(temperature) {
        Ok(chat_request) => chat_request,
        Err(e) => {
            warn!(slot = %slot, error = %e, "Failed to render prompt");
            return InvocationOutcome::Error {
                message: e.to_string(),
            };
        }
    };

    let model = Arc::clone(model);
    let worker = tokio::spawn(async move { model.chat(chat_request).await });

    match tokio::time::timeout(timeout, worker).await {
        Err(_) => {
            let err = GatewayError::Timeout(timeout);
            warn!(slot = %slot, error = %err, "Abandoning model worker");
            InvocationOutcome::Timeout
        }
        Ok(Err(join_error)) => {
            warn!(slot = %slot, error = %join_error, "Model worker failed");
            InvocationOutcome::Error {
                message: format!("worker failed: {}", join_error),
            }
        }
        Ok(Ok(Err(e))) => {
            let err = GatewayError::from(e);
            warn!(slot = %slot, error = %err, "Model call failed");
            InvocationOutcome::Error {
                message: err.to_string(),
            }
        }
        Ok(Ok(Ok(response))) => {
            let (input_tokens, output_tokens) = response.token_counts();
            debug!(
                slot = %slot,
                input_tokens = input_tokens,
                output_tokens = output_tokens,
                "Model call succeeded"
            );
            InvocationOutcome::Success {
                text: response.message.content,
                input_tokens,
                output_tokens,
            }
        }
    }
}
