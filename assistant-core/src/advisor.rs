use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AssistantError;
use crate::llm::LlmClient;
use crate::model::WeatherRecord;
use crate::tool::Tool;

/// Turns a serialized weather record into clothing advice via a single-shot
/// completion.
pub struct ClothingAdvisor {
    llm: Arc<dyn LlmClient>,
}

impl ClothingAdvisor {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Parse the weather payload, render the advice prompt and ask the
    /// model. The model text is returned verbatim; a payload that does not
    /// parse never reaches the model.
    pub async fn recommend(&self, weather_payload: &str) -> Result<String, AssistantError> {
        let record = WeatherRecord::from_payload(weather_payload)?;
        let prompt = render_prompt(&record);

        self.llm.complete(&prompt).await
    }
}

fn render_prompt(record: &WeatherRecord) -> String {
    format!(
        "Based on the following weather conditions, provide clothing recommendations:\n\
         \n\
         Location: {location}, {country}\n\
         Temperature: {temperature}°C (feels like {feels_like}°C)\n\
         Humidity: {humidity}%\n\
         Weather: {description}\n\
         Wind Speed: {wind_speed} m/s\n\
         \n\
         Provide specific clothing recommendations for these conditions.\n\
         Include suggestions for top, bottom, footwear, and accessories if needed.\n\
         Format your response in a friendly, helpful manner.",
        location = record.location,
        country = record.country,
        temperature = record.temperature_c,
        feels_like = record.feels_like_c,
        humidity = record.humidity_pct,
        description = record.description,
        wind_speed = record.wind_speed_mps,
    )
}

#[async_trait]
impl Tool for ClothingAdvisor {
    fn name(&self) -> &str {
        "clothing_recommendation_tool"
    }

    fn description(&self) -> &str {
        "Use this tool to get clothing recommendations based on weather conditions"
    }

    async fn invoke(&self, input: &str) -> Result<String, AssistantError> {
        self.recommend(input).await
    }
}
