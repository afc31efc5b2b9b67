pub mod diary;
pub mod food_photo;

pub use diary::MealDiary;
pub use food_photo::{AnalysisCompleteCallback, FoodPhotoAnalyzer};
