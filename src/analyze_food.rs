use serde::Deserialize;

use crate::models::NutritionResult;
use crate::services::{FoodRecognizer, VisionError};

/// Photos arrive base64-encoded inside JSON, so allow well beyond axum's 2 MiB default.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Body of `POST /analyze-food`.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeFoodRequest {
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeFoodError {
    #[error("Invalid JSON body")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Image required")]
    ImageRequired,

    #[error("OPENAI_API_KEY not configured")]
    NotConfigured,

    #[error(transparent)]
    Vision(#[from] VisionError),
}

impl AnalyzeFoodError {
    pub fn status_code(&self) -> u16 {
        match self {
            AnalyzeFoodError::InvalidJson(_) | AnalyzeFoodError::ImageRequired => 400,
            AnalyzeFoodError::NotConfigured | AnalyzeFoodError::Vision(_) => 500,
        }
    }
}

/// Drops a `data:<type>;base64,` prefix, leaving the bare base64 payload.
fn strip_data_url_prefix(image: &str) -> &str {
    image.split(',').nth(1).unwrap_or(image)
}

/// Handles one analyze-food request body. `recognizer` is `None` when no API key is set.
pub async fn analyze_food(
    recognizer: Option<&dyn FoodRecognizer>,
    body: &[u8],
) -> Result<NutritionResult, AnalyzeFoodError> {
    // Non-UTF-8 input is reported as `InvalidJson` like any other malformed body.
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) { b"{}" } else { body };
    let request: AnalyzeFoodRequest =
        serde_json::from_slice(body).map_err(AnalyzeFoodError::InvalidJson)?;

    let image = request
        .image
        .filter(|image| !image.is_empty())
        .ok_or(AnalyzeFoodError::ImageRequired)?;

    let recognizer = recognizer.ok_or(AnalyzeFoodError::NotConfigured)?;

    let image_base64 = strip_data_url_prefix(&image);
    log::debug!("📊 Received photo payload: {} base64 bytes", image_base64.len());

    let result = recognizer.analyze_food_image(image_base64).await?;
    log::info!("✅ Recognized '{}' ({} kcal)", result.name, result.calories);

    Ok(result)
}

// Axum integration
#[cfg(feature = "analyze-server")]
pub mod server {
    use super::*;
    use axum::{
        body::Bytes,
        extract::{DefaultBodyLimit, State},
        http::{header, Method, StatusCode},
        response::{IntoResponse, Response},
        routing::{get, post},
        Json, Router,
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceBuilder;
    use tower_http::cors::{Any, CorsLayer};

    pub struct AppState {
        pub recognizer: Option<Arc<dyn FoodRecognizer>>,
    }

    pub fn create_analyze_router(recognizer: Option<Arc<dyn FoodRecognizer>>) -> Router {
        let state = Arc::new(AppState { recognizer });

        // Answers every OPTIONS request itself, before routing.
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .max_age(Duration::from_secs(86400));

        Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_check))
            .route(
                "/analyze-food",
                post(analyze_food_handler).fallback(method_not_allowed),
            )
            .layer(
                ServiceBuilder::new()
                    .layer(cors)
                    .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
            )
            .with_state(state)
    }

    fn error_response(status: StatusCode, message: &str) -> Response {
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }

    async fn analyze_food_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
        log::info!("🔔 Analyze-food request received ({} bytes)", body.len());

        match analyze_food(state.recognizer.as_deref(), &body).await {
            Ok(result) => (StatusCode::OK, Json(result)).into_response(),
            Err(e) => {
                log::error!("❌ Analyze-food failed: {}", e);
                let status = StatusCode::from_u16(e.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                error_response(status, &e.to_string())
            }
        }
    }

    async fn method_not_allowed() -> Response {
        error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    }

    async fn root_handler() -> &'static str {
        "FitLife Food Lens - POST a photo to /analyze-food"
    }

    async fn health_check() -> &'static str {
        "OK"
    }
}
