use crate::error::AnalysisError;
use crate::models::NutritionResult;

/// Failures talking to the vision model behind the analyze-food service.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("OpenAI API error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OpenAI API error: {status} {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("OpenAI API error: response contained no choices")]
    EmptyResponse,

    #[error("Failed to parse AI response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Vision model that turns a food photo into a nutrition estimate (server side).
#[async_trait::async_trait]
pub trait FoodRecognizer: Send + Sync {
    /// `image_base64` is the bare base64 payload, without a data-URI prefix.
    async fn analyze_food_image(&self, image_base64: &str) -> Result<NutritionResult, VisionError>;
}

/// Remote analyze-food endpoint as seen from the client flow.
#[async_trait::async_trait]
pub trait NutritionEstimator: Send + Sync {
    async fn estimate(&self, image_data_url: &str) -> Result<NutritionResult, AnalysisError>;
}
