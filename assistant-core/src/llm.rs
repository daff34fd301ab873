//! Chat-completion client for the hosted language model.
//!
//! The wire types mirror the OpenAI chat-completions schema: messages carry
//! an optional `tool_calls` list on the way back, and tool results are sent
//! as `tool`-role messages keyed by call id.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::error::AssistantError;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

/// One message on the chat-completions wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: Some(text.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: Some(text.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: Some(text.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Result of one tool invocation, tied back to the call that asked for
    /// it.
    pub fn tool_result(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Tool,
            content: Some(output.into()),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, passed through verbatim.
    pub arguments: String,
}

/// Request-side description of a callable tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: FunctionSchema,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSchema]>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Seam over the hosted model, so the reasoning loop and the advisor can be
/// exercised against stubs.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One function-calling round against the completion endpoint.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolSchema]>,
    ) -> Result<ChatMessage, AssistantError>;

    /// Single-shot completion: one user message, no tools, no system
    /// instruction.
    async fn complete(&self, prompt: &str) -> Result<String, AssistantError> {
        let reply = self.chat(&[ChatMessage::user(prompt)], None).await?;

        reply.content.ok_or_else(|| {
            AssistantError::ModelInvocation("model returned an empty completion".to_string())
        })
    }
}

/// Client for an OpenAI-compatible chat-completions endpoint. Model and
/// temperature are fixed at construction from config.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    api_key: String,
    model: String,
    temperature: f64,
    http: Client,
}

impl OpenAiClient {
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_key: config.llm_api_key.clone().unwrap_or_default(),
            model: config.model.clone(),
            temperature: config.temperature,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolSchema]>,
    ) -> Result<ChatMessage, AssistantError> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages,
            tools,
        };

        let res = self
            .http
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AssistantError::ModelInvocation(format!("request failed: {e}")))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            AssistantError::ModelInvocation(format!("failed to read response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(AssistantError::ModelInvocation(format!(
                "completion request failed with status {}: {}",
                status.as_u16(),
                truncate_body(&body),
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            AssistantError::ModelInvocation(format!("failed to parse completion JSON: {e}"))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| {
                AssistantError::ModelInvocation(
                    "completion response contained no choices".to_string(),
                )
            })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}
