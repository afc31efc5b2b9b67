pub mod ai_service;
pub mod analysis_client; // Client for the hosted analyze-food endpoint
pub mod notifier;
pub mod openai_vision; // Vision model behind the analyze-food service

pub use ai_service::{FoodRecognizer, NutritionEstimator, VisionError};
pub use analysis_client::{AnalysisClient, ANALYZE_FOOD_ENDPOINT};
pub use notifier::{LogNotifier, Notification, NotificationVariant, Notifier, RecordingNotifier};
pub use openai_vision::OpenAiVisionService;
