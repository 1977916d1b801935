use anyhow::Result;

use crate::models::ImageUpload;

/// One request to a generative model: the prompt, an optional photo and the sampling temperature.
#[derive(Debug, Clone)]
pub struct ContentRequest {
    pub prompt: String,
    pub image: Option<ImageUpload>,
    pub temperature: f32,
}

impl ContentRequest {
    pub fn text(prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
            temperature,
        }
    }

    pub fn with_image(prompt: impl Into<String>, image: ImageUpload, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            image: Some(image),
            temperature,
        }
    }
}

/// Trait for hosted LLM backends (Gemini, test doubles, ...)
#[async_trait::async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Returns the model's text, or an error for any transport/provider/decoding failure.
    async fn generate_content(&self, request: ContentRequest) -> Result<String>;

    /// Identifier reported in logs.
    fn model_name(&self) -> &str;
}
