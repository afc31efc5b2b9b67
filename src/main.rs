use anyhow::Result;
use dotenv::dotenv;
use std::env;
use std::sync::Arc;

use food_lens::services::{openai_vision, FoodRecognizer, OpenAiVisionService};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables first so RUST_LOG from .env applies
    dotenv().ok();
    env_logger::init();

    log::info!("🚀 Starting FitLife Food Lens...");

    let openai_model = env::var("OPENAI_MODEL")
        .unwrap_or_else(|_| openai_vision::DEFAULT_MODEL.to_string());
    let openai_api_url = env::var("OPENAI_API_URL")
        .unwrap_or_else(|_| openai_vision::DEFAULT_API_URL.to_string());

    // A missing key is reported per request rather than at startup
    let recognizer: Option<Arc<dyn FoodRecognizer>> = match env::var("OPENAI_API_KEY") {
        Ok(api_key) if !api_key.is_empty() => {
            let service = OpenAiVisionService::new(api_key, openai_model.clone(), openai_api_url)?;
            log::info!("✅ Vision service initialized with model: {}", openai_model);
            Some(Arc::new(service))
        }
        _ => {
            log::warn!("⚠️ OPENAI_API_KEY not set, /analyze-food will answer 500");
            None
        }
    };

    #[cfg(feature = "analyze-server")]
    {
        use food_lens::analyze_food::server::create_analyze_router;

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let app = create_analyze_router(recognizer);

        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
        log::info!("🌐 Analyze-food server listening on {}", bind_addr);
        log::info!("📸 POST {{\"image\": \"data:image/jpeg;base64,...\"}} to /analyze-food");

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                log::info!("🛑 Shutting down...");
            })
            .await?;
    }

    #[cfg(not(feature = "analyze-server"))]
    {
        drop(recognizer);
        log::warn!("⚠️ Built without the analyze-server feature, nothing to serve");
    }

    Ok(())
}
