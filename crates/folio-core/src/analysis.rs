//! Language-model analysis collaborator.
//!
//! The pipeline talks to the model through [`TextCompletionService`] so the
//! numeric core can be tested with an in-memory fake. The shipped client
//! speaks the OpenAI chat-completions wire format over the shared
//! [`HttpClient`] transport. One call, no retries; a failure is terminal.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::http_client::{HttpClient, HttpRequest};
use crate::stats::SummaryStatistics;

const SYSTEM_PROMPT: &str = "You are a financial analyst.";
const MAX_COMPLETION_TOKENS: u32 = 500;

/// Build the fixed analysis prompt around the statistics table.
pub fn build_prompt(stats: &SummaryStatistics) -> String {
    format!(
        "Analyze the following portfolio returns statistics and provide insights:\n{}\n\n\
         Provide a detailed analysis of the portfolio's performance, risk, and any recommendations.",
        stats.to_text()
    )
}

/// Single completion request: system framing plus user prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// The request shape used for portfolio analysis.
    pub fn analysis(user_prompt: impl Into<String>) -> Self {
        Self {
            system: SYSTEM_PROMPT.to_owned(),
            user: user_prompt.into(),
            max_tokens: MAX_COMPLETION_TOKENS,
        }
    }
}

/// Completion collaborator failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionError {
    message: String,
}

impl CompletionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for CompletionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CompletionError {}

/// Text completion contract.
pub trait TextCompletionService: Send + Sync {
    fn complete<'a>(
        &'a self,
        req: CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, CompletionError>> + Send + 'a>>;
}

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAiChatClient {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiChatClient {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl TextCompletionService for OpenAiChatClient {
    fn complete<'a>(
        &'a self,
        req: CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, CompletionError>> + Send + 'a>> {
        Box::pin(async move {
            let payload = ChatRequest {
                model: self.model.clone(),
                messages: vec![
                    ChatMessage {
                        role: "system".to_owned(),
                        content: req.system,
                    },
                    ChatMessage {
                        role: "user".to_owned(),
                        content: req.user,
                    },
                ],
                max_tokens: req.max_tokens,
            };

            let body = serde_json::to_string(&payload)
                .map_err(|e| CompletionError::new(format!("failed to encode request: {e}")))?;

            debug!(model = %self.model, "requesting portfolio analysis completion");

            let request = HttpRequest::post(self.completions_url())
                .with_bearer_token(&self.api_key)
                .with_json_body(body);

            let response = self
                .http_client
                .execute(request)
                .await
                .map_err(|e| CompletionError::new(format!("transport error: {}", e.message())))?;

            if !response.is_success() {
                return Err(CompletionError::new(format!(
                    "completion endpoint returned status {}: {}",
                    response.status, response.body
                )));
            }

            let parsed: ChatResponse = serde_json::from_str(&response.body)
                .map_err(|e| CompletionError::new(format!("failed to parse response: {e}")))?;

            let content = parsed
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .ok_or_else(|| CompletionError::new("completion response contained no choices"))?;

            info!("portfolio analysis completion received");
            Ok(content)
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
