//! Conversation state and the reasoning loop that drives tool selection.

use std::sync::Arc;

use crate::error::AssistantError;
use crate::llm::{ChatMessage, LlmClient, ToolCall};
use crate::model::{ConversationTurn, TurnRole};
use crate::tool::ToolRegistry;

/// Reply used whenever an exchange fails; the underlying error only goes to
/// the log.
const APOLOGY: &str =
    "I'm sorry, I ran into a problem handling that. Please try again with a different query.";

/// Conversational orchestrator: owns the history and runs the
/// tool-selection loop for each user utterance.
pub struct Assistant {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    history: Vec<ConversationTurn>,
    max_tool_rounds: usize,
}

impl Assistant {
    pub fn new(llm: Arc<dyn LlmClient>, tools: ToolRegistry, max_tool_rounds: usize) -> Self {
        Self {
            llm,
            tools,
            history: Vec::new(),
            max_tool_rounds,
        }
    }

    /// Full conversation so far, oldest first.
    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// Handle one user utterance. The user turn is always recorded; an
    /// assistant turn is recorded only when reasoning produced a reply, so a
    /// failed exchange leaves the history one turn longer, not two.
    pub async fn handle(&mut self, utterance: &str) -> String {
        self.history.push(ConversationTurn::user(utterance));

        match self.reason().await {
            Ok(reply) => {
                self.history.push(ConversationTurn::assistant(reply.clone()));
                reply
            }
            Err(err) => {
                tracing::warn!(error = %err, "exchange failed");
                APOLOGY.to_string()
            }
        }
    }

    /// One pass of the reasoning state machine: replay the conversation, let
    /// the model pick tools, run them strictly in order, feed results back,
    /// stop at the first plain-text reply.
    async fn reason(&self) -> Result<String, AssistantError> {
        let mut messages = self.transcript();
        let schemas = self.tools.schemas();

        for round in 0..self.max_tool_rounds {
            tracing::debug!(round, "reasoning round");

            let reply = self.llm.chat(&messages, Some(schemas.as_slice())).await?;

            let tool_calls = reply.tool_calls.clone().unwrap_or_default();
            if tool_calls.is_empty() {
                return reply.content.ok_or_else(|| {
                    AssistantError::Reasoning(
                        "model returned neither text nor tool calls".to_string(),
                    )
                });
            }

            messages.push(reply);
            for call in &tool_calls {
                let output = self.dispatch(call).await;
                messages.push(ChatMessage::tool_result(call.id.clone(), output));
            }
        }

        Err(AssistantError::Reasoning(format!(
            "no reply after {} tool rounds",
            self.max_tool_rounds
        )))
    }

    /// Run a single tool call. Failures are rendered to their display string
    /// and fed back to the model rather than aborting the exchange.
    async fn dispatch(&self, call: &ToolCall) -> String {
        let name = call.function.name.as_str();
        let input = extract_input(&call.function.arguments);

        tracing::debug!(tool = name, input = %input, "invoking tool");

        let Some(tool) = self.tools.get(name) else {
            return format!("Error: unknown tool '{name}'");
        };

        match tool.invoke(&input).await {
            Ok(output) => output,
            Err(err) => format!("Error: {err}"),
        }
    }

    /// System prompt plus the whole history replayed as chat messages.
    /// Transient tool traffic is never part of the persisted history.
    fn transcript(&self) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(system_prompt(&self.tools))];

        messages.extend(self.history.iter().map(|turn| match turn.role {
            TurnRole::User => ChatMessage::user(turn.text.clone()),
            TurnRole::Assistant => ChatMessage::assistant(turn.text.clone()),
        }));

        messages
    }
}

/// Model arguments arrive as a JSON object with a single `input` field; fall
/// back to the raw text when they don't.
fn extract_input(arguments: &str) -> String {
    serde_json::from_str::<serde_json::Value>(arguments)
        .ok()
        .and_then(|v| v.get("input").and_then(|i| i.as_str()).map(str::to_string))
        .unwrap_or_else(|| arguments.to_string())
}

fn system_prompt(tools: &ToolRegistry) -> String {
    let tool_descriptions = tools
        .list()
        .iter()
        .map(|t| format!("- {}: {}", t.name(), t.description()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a friendly weather assistant. You answer weather questions and \
         suggest what to wear.\n\n\
         You have access to the following tools:\n{tool_descriptions}\n\n\
         Call a tool when you need live weather data or clothing advice; pass it a \
         single short string (a location, or the weather data you were given). \
         When you have what you need, reply to the user in plain text."
    )
}
