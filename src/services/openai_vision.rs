use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::NutritionResult;
use crate::services::ai_service::{FoodRecognizer, VisionError};

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const ANALYSIS_PROMPT: &str = "Проанализируй это блюдо и верни ТОЧНЫЕ данные в JSON формате:\n\
{\n\
  \"name\": \"название блюда на русском\",\n\
  \"calories\": число_калорий,\n\
  \"protein\": граммы_белка,\n\
  \"carbs\": граммы_углеводов,\n\
  \"fats\": граммы_жиров,\n\
  \"portion_size\": \"размер порции (например: 250г, 1 тарелка)\"\n\
}\n\
\n\
Важно:\n\
- Оцени размер порции визуально\n\
- Укажи реалистичные значения КБЖУ\n\
- Название должно быть конкретным и понятным\n\
- Только JSON, никакого дополнительного текста";

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        #[serde(rename = "type")]
        content_type: String,
        text: String
    },
    ImageUrl {
        #[serde(rename = "type")]
        content_type: String,
        image_url: ImageData
    },
}

#[derive(Debug, Serialize)]
struct ImageData {
    url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: String,
}

/// OpenAI-compatible chat completions client used as the food recognizer.
pub struct OpenAiVisionService {
    api_key: String,
    model: String,
    api_url: String,
    client: reqwest::Client,
}

impl OpenAiVisionService {
    pub fn new(api_key: String, model: String, api_url: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            model,
            api_url,
            client,
        })
    }

    fn build_request(&self, image_base64: &str) -> ChatRequest {
        let data_url = format!("data:image/jpeg;base64,{}", image_base64);

        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        content_type: "text".to_string(),
                        text: ANALYSIS_PROMPT.to_string(),
                    },
                    ContentPart::ImageUrl {
                        content_type: "image_url".to_string(),
                        image_url: ImageData { url: data_url },
                    },
                ],
            }],
            max_tokens: 500,
        }
    }
}

#[async_trait::async_trait]
impl FoodRecognizer for OpenAiVisionService {
    async fn analyze_food_image(&self, image_base64: &str) -> Result<NutritionResult, VisionError> {
        log::debug!("🔄 Base64 payload size: {} bytes", image_base64.len());

        let request = self.build_request(image_base64);

        log::info!("🤖 Sending food photo to {} with model: {}", self.api_url, self.model);

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 Vision API response status: {}", status);

        if !status.is_success() {
            let body = response.text().await?;
            log::error!("❌ Vision API error response: {}", body);
            return Err(VisionError::Status { status, body });
        }

        let chat_response: ChatResponse = response.json().await?;
        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(VisionError::EmptyResponse)?;

        log::info!("💬 Vision API response content: {}", content);

        parse_nutrition(&content)
    }
}

/// Pulls the JSON out of a model reply that may be wrapped in a markdown code fence.
fn extract_json_block(content: &str) -> &str {
    let fenced = content
        .split_once("```json")
        .or_else(|| content.split_once("```"))
        .map(|(_, rest)| rest);

    match fenced {
        Some(rest) => rest.split("```").next().unwrap_or(rest).trim(),
        None => content.trim(),
    }
}

fn parse_nutrition(content: &str) -> Result<NutritionResult, VisionError> {
    let json = extract_json_block(content);
    Ok(serde_json::from_str(json)?)
}
