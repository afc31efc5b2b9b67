pub mod analyze_food; // Analyze-food HTTP service
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

pub use error::AnalysisError;
pub use handlers::{FoodPhotoAnalyzer, MealDiary};
pub use models::{AnalysisState, ImageInput, NutritionResult};
