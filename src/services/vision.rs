use std::sync::Arc;

use crate::models::{ImageUpload, RecognitionOutcome};

use super::ai_service::{ContentRequest, GenerativeModel};
use super::prompt::RECOGNITION_PROMPT;

/// Sampling temperature for recognition; extraction wants determinism.
pub const RECOGNITION_TEMPERATURE: f32 = 0.3;

/// Phrases the model uses when it sees no ingredients. Matched case-insensitively.
const NOTHING_FOUND_PHRASES: &[&str] = &[
    "cannot identify",
    "can't identify",
    "unable to identify",
    "無法辨識",
];

/// Turns a photo into a comma-separated ingredient list. Never memoised.
pub struct IngredientRecognizer {
    model: Arc<dyn GenerativeModel>,
}

impl IngredientRecognizer {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    pub async fn recognize(&self, image: &ImageUpload) -> RecognitionOutcome {
        log::debug!(
            "📸 Starting ingredient recognition for: {} ({})",
            image.file_name,
            image.mime_type
        );

        let request = ContentRequest::with_image(
            RECOGNITION_PROMPT,
            image.clone(),
            RECOGNITION_TEMPERATURE,
        );

        match self.model.generate_content(request).await {
            Ok(text) => {
                let outcome = interpret_recognition(&text);
                match &outcome {
                    RecognitionOutcome::Ingredients(list) => {
                        log::info!("🥕 Recognised ingredients in {}: {}", image.file_name, list)
                    }
                    _ => log::warn!("⚠️ No ingredients recognised in {}", image.file_name),
                }
                outcome
            }
            Err(e) => {
                log::error!("❌ Image recognition failed for {}: {:#}", image.file_name, e);
                RecognitionOutcome::Failed(format!("{:#}", e))
            }
        }
    }
}

fn interpret_recognition(text: &str) -> RecognitionOutcome {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return RecognitionOutcome::NothingFound;
    }

    let lowered = trimmed.to_lowercase();
    if NOTHING_FOUND_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
    {
        return RecognitionOutcome::NothingFound;
    }

    RecognitionOutcome::Ingredients(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FAILURE_MARKER;
    use crate::services::mock::MockModel;

    fn photo() -> ImageUpload {
        ImageUpload::new("fridge.jpg", vec![0xFF, 0xD8, 0xFF]).unwrap()
    }

    #[tokio::test]
    async fn test_recognize_trims_response() {
        let model = MockModel::replying("  egg, tomato, scallion \n");
        let recognizer = IngredientRecognizer::new(model.clone());

        let outcome = recognizer.recognize(&photo()).await;

        assert_eq!(
            outcome,
            RecognitionOutcome::Ingredients("egg, tomato, scallion".to_string())
        );
        let requests = model.requests.lock().unwrap();
        assert_eq!(requests[0].prompt, RECOGNITION_PROMPT);
        assert!((requests[0].temperature - RECOGNITION_TEMPERATURE).abs() < f32::EPSILON);
        assert_eq!(requests[0].image.as_ref().unwrap().file_name, "fridge.jpg");
    }

    #[tokio::test]
    async fn test_whitespace_response_is_nothing_found() {
        let recognizer = IngredientRecognizer::new(MockModel::replying("  "));
        let outcome = recognizer.recognize(&photo()).await;
        assert_eq!(outcome, RecognitionOutcome::NothingFound);
        assert_eq!(outcome.into_text(), "");
    }

    #[tokio::test]
    async fn test_cannot_identify_is_nothing_found() {
        for reply in [
            "cannot identify",
            "Sorry, I Cannot Identify any food here.",
            "無法辨識",
        ] {
            let recognizer = IngredientRecognizer::new(MockModel::replying(reply));
            assert_eq!(
                recognizer.recognize(&photo()).await.into_text(),
                "",
                "reply {:?}",
                reply
            );
        }
    }

    #[tokio::test]
    async fn test_failure_uses_marker() {
        let recognizer = IngredientRecognizer::new(MockModel::failing("permission denied"));

        let outcome = recognizer.recognize(&photo()).await;

        assert!(outcome.is_failure());
        let text = outcome.into_text();
        assert!(text.starts_with(FAILURE_MARKER));
        assert!(text.contains("permission denied"));
    }

    #[tokio::test]
    async fn test_repeated_calls_are_not_memoised() {
        let model = MockModel::replying("egg");
        let recognizer = IngredientRecognizer::new(model.clone());

        recognizer.recognize(&photo()).await;
        recognizer.recognize(&photo()).await;
        assert_eq!(model.call_count(), 2);
    }
}
