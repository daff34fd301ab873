use thiserror::Error;

/// Failure taxonomy for the assistant.
///
/// Every component contains its own failures and converts them into one of
/// these variants. At the tool boundary the value is rendered to its display
/// string, which is what the reasoning loop (and ultimately the user) sees —
/// no structured error crosses that boundary.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// The weather API returned a non-2xx status or the request itself
    /// failed. The message embeds the numeric status code when one exists.
    #[error("weather service error: {0}")]
    ExternalService(String),

    /// A payload could not be parsed into the expected shape.
    #[error("invalid data: {0}")]
    DataFormat(String),

    /// The language-model completion endpoint call failed.
    #[error("model invocation error: {0}")]
    ModelInvocation(String),

    /// The reasoning loop failed to produce a reply.
    #[error("reasoning error: {0}")]
    Reasoning(String),
}
