use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use inquire::{InquireError, Text};

use assistant_core::llm::LlmClient;
use assistant_core::{
    Assistant, ClothingAdvisor, Config, OpenAiClient, ToolRegistry, WeatherLookup,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "assistant", version, about = "Conversational weather assistant")]
pub struct Cli {}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;

        let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::from_config(&config));

        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(WeatherLookup::from_config(&config)));
        tools.register(Arc::new(ClothingAdvisor::new(llm.clone())));

        let mut assistant = Assistant::new(llm, tools, config.max_tool_rounds);

        println!("🌤️ Weather AI Assistant 🌤️");
        println!("Ask for weather information and clothing recommendations for any location.");
        println!("Type 'exit' to quit.");
        println!("{}", "-".repeat(50));

        loop {
            let line = match Text::new("You:").prompt() {
                Ok(line) => line,
                // Ctrl-C / Ctrl-D end the conversation like `exit` does.
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
                Err(err) => return Err(err.into()),
            };

            if is_exit(&line) {
                break;
            }

            let reply = assistant.handle(&line).await;
            println!("\nAssistant: {reply}");
        }

        println!("Thank you for using Weather AI Assistant. Goodbye!");
        Ok(())
    }
}

/// The sentinel is matched case-insensitively, ignoring surrounding
/// whitespace. The orchestrator is never invoked for it.
fn is_exit(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("exit")
}

#[cfg(test)]
mod tests {
    use super::is_exit;

    #[test]
    fn exit_sentinel_matches_any_case() {
        assert!(is_exit("exit"));
        assert!(is_exit("EXIT"));
        assert!(is_exit("Exit"));
        assert!(is_exit("  exit "));
    }

    #[test]
    fn ordinary_input_is_not_the_sentinel() {
        assert!(!is_exit("exit now"));
        assert!(!is_exit("weather in Paris"));
        assert!(!is_exit(""));
    }
}
