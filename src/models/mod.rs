use base64::{engine::general_purpose, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Nutrition estimate returned by the analyze-food service.
///
/// Values are taken as-is: the service is a model estimate, so negative or
/// implausibly large numbers are passed through without validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionResult {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portion_size: Option<String>,  // e.g. "250г", "1 тарелка"
}

/// A user-selected photo, held only for the duration of one analysis attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInput {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl ImageInput {
    pub fn new(media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Reads a photo from disk, deriving the media type from the file extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(media_type_for_path(path), bytes))
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    /// `data:<media-type>;base64,<payload>`, the form the analyze-food endpoint expects.
    pub fn to_data_url(&self) -> String {
        let encoded = general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.media_type, encoded)
    }
}

fn media_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Where a single photo analysis currently stands.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnalysisState {
    #[default]
    Idle,
    Analyzing,
    Succeeded(NutritionResult),
    Failed(String),
}

impl AnalysisState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisState::Idle => "idle",
            AnalysisState::Analyzing => "analyzing",
            AnalysisState::Succeeded(_) => "succeeded",
            AnalysisState::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: i64,
    pub meal_type: MealType,
    pub time: String,  // HH:MM
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub portion_size: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl std::fmt::Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MealType::Breakfast => "Завтрак",
            MealType::Lunch => "Обед",
            MealType::Dinner => "Ужин",
            MealType::Snack => "Перекус",
        };
        write!(f, "{}", s)
    }
}

impl MealType {
    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "завтрак" | "breakfast" => Some(MealType::Breakfast),
            "обед" | "lunch" => Some(MealType::Lunch),
            "ужин" | "dinner" => Some(MealType::Dinner),
            "перекус" | "snack" => Some(MealType::Snack),
            _ => None,
        }
    }

    /// Meal slot for a local hour of day, following the default plan
    /// (08:00 breakfast, 14:00 lunch, 19:00 dinner, snacks in between).
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            5..=10 => MealType::Breakfast,
            12..=15 => MealType::Lunch,
            18..=21 => MealType::Dinner,
            _ => MealType::Snack,
        }
    }
}

/// Glasses of water drunk today against the daily goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterTracker {
    pub goal: u32,
    pub current: u32,
}

impl WaterTracker {
    pub fn new(goal: u32) -> Self {
        Self { goal, current: 0 }
    }

    /// Returns false once the goal is already reached.
    pub fn add_glass(&mut self) -> bool {
        if self.current < self.goal {
            self.current += 1;
            true
        } else {
            false
        }
    }
}

impl Default for WaterTracker {
    fn default() -> Self {
        Self::new(8)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DailySummary {
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fats: f64,
    pub meals_completed: usize,
    pub water: WaterTracker,
}
