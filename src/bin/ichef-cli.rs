use anyhow::Result;
use std::io;
use std::sync::Arc;

use ichef::handlers::cli;
use ichef::services::{GeminiService, PromptStyle, RecipeService};
use ichef::Config;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // A missing API key ends the process here with a non-zero status.
    let config = Config::load()?;

    let gemini = Arc::new(GeminiService::with_base_url(
        config.api_key,
        config.model,
        config.base_url,
    ));
    let recipes = RecipeService::new(gemini, PromptStyle::Plain);

    cli::run(io::stdin().lock(), io::stdout().lock(), &recipes).await
}
