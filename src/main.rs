use anyhow::{Context, Result};
use std::sync::Arc;

use ichef::services::{GeminiService, GenerativeModel, IngredientRecognizer, PromptStyle, RecipeService};
use ichef::web::{create_router, AppState};
use ichef::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    log::info!("🚀 Starting iChef web server...");

    let config = Config::load()?;

    let gemini: Arc<dyn GenerativeModel> = Arc::new(GeminiService::with_base_url(
        config.api_key.clone(),
        config.model.clone(),
        config.base_url.clone(),
    ));
    log::info!("✅ Gemini service initialized with model: {}", config.model);

    let recipes = Arc::new(RecipeService::new(gemini.clone(), PromptStyle::Markdown).with_cache());
    let recognizer = Arc::new(IngredientRecognizer::new(gemini));

    let app = create_router(Arc::new(AppState::new(recipes, recognizer)));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind web server on {}", config.bind_addr))?;

    log::info!("🌐 Web server listening on {}", config.bind_addr);
    println!("\n👨‍🍳 iChef is ready: http://{}", config.bind_addr);
    println!("🛑 Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            log::info!("🛑 Shutting down...");
        })
        .await
        .context("Web server failed")?;

    Ok(())
}
