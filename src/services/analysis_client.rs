use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, GENERIC_ANALYSIS_FAILURE};
use crate::models::NutritionResult;
use crate::services::ai_service::NutritionEstimator;

/// Hosted analyze-food function the dashboard talks to.
pub const ANALYZE_FOOD_ENDPOINT: &str =
    "https://functions.poehali.dev/027d88c8-dd12-442f-88e1-f99c54dbf703";

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    image: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// HTTP client for the analyze-food endpoint.
pub struct AnalysisClient {
    endpoint: String,
    client: reqwest::Client,
}

impl AnalysisClient {
    pub fn new() -> Self {
        Self::with_endpoint(ANALYZE_FOOD_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for AnalysisClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Message from a failed response body, or the generic fallback.
fn service_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| GENERIC_ANALYSIS_FAILURE.to_string())
}

#[async_trait::async_trait]
impl NutritionEstimator for AnalysisClient {
    async fn estimate(&self, image_data_url: &str) -> Result<NutritionResult, AnalysisError> {
        log::debug!("📤 Posting photo to {} ({} bytes)", self.endpoint, image_data_url.len());

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&AnalyzeRequest { image: image_data_url })
            .send()
            .await
            .map_err(AnalysisError::transport)?;

        let status = response.status();
        log::debug!("📥 Analyze-food response status: {}", status);

        if !status.is_success() {
            // An unreadable error body still counts as a service failure.
            let body = response.text().await.unwrap_or_default();
            log::error!("❌ Analyze-food error response ({}): {}", status, body);
            return Err(AnalysisError::Service(service_error_message(&body)));
        }

        let body = response.text().await.map_err(AnalysisError::transport)?;

        serde_json::from_str(&body).map_err(|e| {
            log::error!("❌ Could not parse analyze-food response: {}", e);
            AnalysisError::transport(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_message() {
        assert_eq!(service_error_message(r#"{"error":"Image required"}"#), "Image required");
        assert_eq!(service_error_message(r#"{"error":""}"#), GENERIC_ANALYSIS_FAILURE);
        assert_eq!(service_error_message(r#"{"error":42}"#), GENERIC_ANALYSIS_FAILURE);
        assert_eq!(service_error_message(r#"{"detail":"nope"}"#), GENERIC_ANALYSIS_FAILURE);
        assert_eq!(service_error_message("<html>Bad Gateway</html>"), GENERIC_ANALYSIS_FAILURE);
        assert_eq!(service_error_message(""), GENERIC_ANALYSIS_FAILURE);
    }

    #[test]
    fn test_default_endpoint() {
        assert_eq!(AnalysisClient::new().endpoint(), ANALYZE_FOOD_ENDPOINT);
    }

    #[tokio::test]
    async fn test_truncated_error_body_is_service_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.ends_with(b"\"}") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }
            // Promise 100 bytes, send a few, then hang up.
            socket
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\n\r\n{\"err")
                .await
                .unwrap();
        });
        let client = AnalysisClient::with_endpoint(format!("http://{}/", addr));

        let err = client.estimate("data:image/png;base64,AAAA").await.unwrap_err();

        assert!(matches!(&err, AnalysisError::Service(m) if m == GENERIC_ANALYSIS_FAILURE));
    }

    #[cfg(feature = "analyze-server")]
    mod against_local_server {
        use super::*;
        use axum::{http::StatusCode, routing::post, Json, Router};
        use std::sync::{Arc, Mutex};

        type Captured = Arc<Mutex<Vec<serde_json::Value>>>;

        /// Serves `status`/`body` for every POST and records what it received.
        async fn spawn_stub(status: StatusCode, body: &'static str) -> (String, Captured) {
            let captured: Captured = Arc::new(Mutex::new(Vec::new()));
            let sink = captured.clone();

            let app = Router::new().route(
                "/",
                post(move |Json(payload): Json<serde_json::Value>| {
                    let sink = sink.clone();
                    async move {
                        sink.lock().unwrap().push(payload);
                        (status, body)
                    }
                }),
            );

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            (format!("http://{}/", addr), captured)
        }

        #[tokio::test]
        async fn test_success_body_is_returned_unchanged() {
            let (url, captured) = spawn_stub(
                StatusCode::OK,
                r#"{"name":"Apple","calories":95,"protein":0.5,"carbs":25,"fats":0.3}"#,
            )
            .await;
            let client = AnalysisClient::with_endpoint(url);

            let result = client.estimate("data:image/png;base64,AAAA").await.unwrap();

            assert_eq!(
                result,
                NutritionResult {
                    name: "Apple".to_string(),
                    calories: 95.0,
                    protein: 0.5,
                    carbs: 25.0,
                    fats: 0.3,
                    portion_size: None,
                }
            );
            let requests = captured.lock().unwrap();
            assert_eq!(requests.len(), 1);
            assert_eq!(
                requests[0],
                serde_json::json!({"image": "data:image/png;base64,AAAA"})
            );
        }

        #[tokio::test]
        async fn test_service_error_message_is_surfaced() {
            let (url, _) = spawn_stub(StatusCode::BAD_REQUEST, r#"{"error":"Unrecognized food"}"#).await;
            let client = AnalysisClient::with_endpoint(url);

            let err = client.estimate("data:image/png;base64,AAAA").await.unwrap_err();

            assert!(matches!(&err, AnalysisError::Service(m) if m == "Unrecognized food"));
            assert_eq!(err.to_string(), "Unrecognized food");
        }

        #[tokio::test]
        async fn test_unparseable_error_body_uses_fallback() {
            let (url, _) = spawn_stub(StatusCode::BAD_GATEWAY, "upstream timed out").await;
            let client = AnalysisClient::with_endpoint(url);

            let err = client.estimate("data:image/png;base64,AAAA").await.unwrap_err();

            assert_eq!(err.to_string(), GENERIC_ANALYSIS_FAILURE);
        }

        #[tokio::test]
        async fn test_malformed_success_body_is_transport_error() {
            let (url, _) = spawn_stub(StatusCode::OK, r#"{"name":"Apple"}"#).await;
            let client = AnalysisClient::with_endpoint(url);

            let err = client.estimate("data:image/png;base64,AAAA").await.unwrap_err();

            assert!(matches!(err, AnalysisError::Transport(_)));
        }

        #[tokio::test]
        async fn test_unreachable_endpoint_is_transport_error() {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);
            let client = AnalysisClient::with_endpoint(format!("http://{}/", addr));

            let err = client.estimate("data:image/png;base64,AAAA").await.unwrap_err();

            assert!(matches!(err, AnalysisError::Transport(_)));
            assert!(std::error::Error::source(&err).is_some());
        }
    }
}
