use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::error::AssistantError;
use crate::llm::{FunctionSchema, ToolSchema};

/// A named, described callable the reasoning loop may invoke with a single
/// string argument.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    async fn invoke(&self, input: &str) -> Result<String, AssistantError>;
}

/// Fixed set of tools, constructed once at startup.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn list(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// Function-calling schemas for the registered tools. Every tool takes a
    /// single required `input` string.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools
            .iter()
            .map(|tool| ToolSchema {
                kind: "function",
                function: FunctionSchema {
                    name: tool.name().to_string(),
                    description: tool.description().to_string(),
                    parameters: json!({
                        "type": "object",
                        "properties": {
                            "input": {
                                "type": "string",
                                "description": "Argument passed to the tool"
                            }
                        },
                        "required": ["input"]
                    }),
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool {
        name: &'static str,
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "Echoes its input"
        }

        async fn invoke(&self, input: &str) -> Result<String, AssistantError> {
            Ok(input.to_string())
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool { name: "alpha" }));
        registry.register(Arc::new(EchoTool { name: "beta" }));
        registry
    }

    #[test]
    fn lookup_by_name() {
        let registry = registry();

        assert!(registry.get("alpha").is_some());
        assert!(registry.get("beta").is_some());
        assert!(registry.get("gamma").is_none());
    }

    #[test]
    fn schemas_expose_one_string_input_per_tool() {
        let schemas = registry().schemas();

        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas[0].function.name, "alpha");
        assert_eq!(schemas[0].kind, "function");

        let params = &schemas[0].function.parameters;
        assert_eq!(params["properties"]["input"]["type"], "string");
        assert_eq!(params["required"][0], "input");
    }

    #[tokio::test]
    async fn registered_tool_is_invokable() {
        let registry = registry();
        let tool = registry.get("alpha").expect("alpha registered");

        let output = tool.invoke("hello").await.expect("echo cannot fail");
        assert_eq!(output, "hello");
    }
}
