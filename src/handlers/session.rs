use crate::models::{ImageUpload, RecipeOutcome, RecognitionOutcome};
use crate::services::{IngredientRecognizer, RecipeService};

/// Where the current upload is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    ImageReceived,
    Recognizing,
    Populated,
    NothingFound,
    Failed,
}

/// One-shot message shown on the next render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Warning(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadDecision {
    /// Same file as last time: show it again, do not call the model.
    Redisplay,
    /// New file: run recognition.
    Recognize,
}

/// Side effect the presentation layer has to carry out after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderRequest {
    Unchanged,
    Rerender,
}

/// Per-user state for the web page, kept across re-renders.
#[derive(Debug, Default)]
pub struct SessionController {
    ingredients_text: String,
    preference_text: String,
    last_upload_id: Option<String>,
    image: Option<ImageUpload>,
    phase: UploadPhase,
    notice: Option<Notice>,
    recipe: Option<RecipeOutcome>,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingredients_text(&self) -> &str {
        &self.ingredients_text
    }

    pub fn preference_text(&self) -> &str {
        &self.preference_text
    }

    pub fn last_upload_id(&self) -> Option<&str> {
        self.last_upload_id.as_deref()
    }

    pub fn image(&self) -> Option<&ImageUpload> {
        self.image.as_ref()
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn recipe(&self) -> Option<&RecipeOutcome> {
        self.recipe.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Notices are shown once.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Record a new upload. The id is stored before any recognition starts so a
    /// slow or failing call never causes the same file to be processed twice.
    pub fn begin_upload(&mut self, image: ImageUpload) -> UploadDecision {
        if self.last_upload_id.as_deref() == Some(image.file_name.as_str()) {
            log::debug!("🖼️ {} already processed, redisplaying", image.file_name);
            self.image = Some(image);
            return UploadDecision::Redisplay;
        }

        log::info!("📥 New upload received: {}", image.file_name);
        self.last_upload_id = Some(image.file_name.clone());
        self.image = Some(image);
        self.phase = UploadPhase::ImageReceived;
        UploadDecision::Recognize
    }

    pub fn apply_recognition(&mut self, outcome: RecognitionOutcome) -> RenderRequest {
        match outcome {
            RecognitionOutcome::Ingredients(text) => {
                self.ingredients_text = text;
                self.phase = UploadPhase::Populated;
                self.notice = Some(Notice::Success(
                    "Recognition complete! The ingredient list has been filled in.".to_string(),
                ));
            }
            failed @ RecognitionOutcome::Failed(_) => {
                self.phase = UploadPhase::Failed;
                self.notice = Some(Notice::Error(failed.to_string()));
            }
            RecognitionOutcome::NothingFound => {
                self.ingredients_text.clear();
                self.phase = UploadPhase::NothingFound;
                self.notice = Some(Notice::Warning(
                    "No clear ingredients were recognised in the photo. Please enter them by hand."
                        .to_string(),
                ));
            }
        }
        RenderRequest::Rerender
    }

    pub async fn handle_upload(
        &mut self,
        image: ImageUpload,
        recognizer: &IngredientRecognizer,
    ) -> RenderRequest {
        if self.begin_upload(image) == UploadDecision::Redisplay {
            return RenderRequest::Unchanged;
        }

        self.phase = UploadPhase::Recognizing;
        let outcome = match self.image.as_ref() {
            Some(image) => recognizer.recognize(image).await,
            None => return RenderRequest::Unchanged,
        };
        self.apply_recognition(outcome)
    }

    /// An upload that could not be accepted (wrong type, unreadable body). Leaves the upload id alone.
    pub fn reject_upload(&mut self, reason: &anyhow::Error) -> RenderRequest {
        log::warn!("⚠️ Upload rejected: {}", reason);
        self.notice = Some(Notice::Error(reason.to_string()));
        RenderRequest::Rerender
    }

    pub async fn submit(
        &mut self,
        ingredients_text: String,
        preference_text: String,
        recipes: &RecipeService,
    ) -> RenderRequest {
        self.ingredients_text = ingredients_text;
        self.preference_text = preference_text;

        if self.ingredients_text.trim().is_empty() {
            self.notice = Some(Notice::Warning(
                "No ingredients entered. Nothing to cook but air!".to_string(),
            ));
            return RenderRequest::Rerender;
        }

        let outcome = recipes
            .generate(&self.ingredients_text, &self.preference_text)
            .await;
        self.recipe = Some(outcome);
        RenderRequest::Rerender
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FAILURE_MARKER;
    use crate::services::mock::MockModel;
    use crate::services::PromptStyle;

    fn upload(name: &str) -> ImageUpload {
        ImageUpload::new(name, vec![0x89, 0x50, 0x4E, 0x47]).unwrap()
    }

    #[tokio::test]
    async fn test_same_upload_is_recognised_once() {
        let model = MockModel::replying("egg, tomato");
        let recognizer = IngredientRecognizer::new(model.clone());
        let mut session = SessionController::new();

        let first = session.handle_upload(upload("A.jpg"), &recognizer).await;
        let second = session.handle_upload(upload("A.jpg"), &recognizer).await;

        assert_eq!(first, RenderRequest::Rerender);
        assert_eq!(second, RenderRequest::Unchanged);
        assert_eq!(model.call_count(), 1);
        assert_eq!(session.image().unwrap().file_name, "A.jpg");
    }

    #[tokio::test]
    async fn test_new_file_triggers_recognition_again() {
        let model = MockModel::replying("milk");
        let recognizer = IngredientRecognizer::new(model.clone());
        let mut session = SessionController::new();

        session.handle_upload(upload("A.jpg"), &recognizer).await;
        session.handle_upload(upload("B.png"), &recognizer).await;
        session.handle_upload(upload("A.jpg"), &recognizer).await;

        assert_eq!(model.call_count(), 3);
        assert_eq!(session.last_upload_id(), Some("A.jpg"));
    }

    #[tokio::test]
    async fn test_success_populates_ingredients() {
        let recognizer = IngredientRecognizer::new(MockModel::replying("egg, tomato"));
        let mut session = SessionController::new();

        session.handle_upload(upload("A.jpg"), &recognizer).await;

        assert_eq!(session.ingredients_text(), "egg, tomato");
        assert_eq!(session.phase(), UploadPhase::Populated);
        assert!(matches!(session.take_notice(), Some(Notice::Success(_))));
        assert!(session.take_notice().is_none());
    }

    #[tokio::test]
    async fn test_failure_keeps_ingredients_and_upload_id() {
        let recognizer = IngredientRecognizer::new(MockModel::failing("quota exhausted"));
        let mut session = SessionController::new();
        session.ingredients_text = "rice".to_string();

        session.handle_upload(upload("A.jpg"), &recognizer).await;

        assert_eq!(session.ingredients_text(), "rice");
        assert_eq!(session.phase(), UploadPhase::Failed);
        assert_eq!(session.last_upload_id(), Some("A.jpg"));
        match session.notice() {
            Some(Notice::Error(text)) => {
                assert!(text.starts_with(FAILURE_MARKER));
                assert!(text.contains("quota exhausted"));
            }
            other => panic!("expected error notice, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_nothing_found_clears_ingredients() {
        let recognizer = IngredientRecognizer::new(MockModel::replying("cannot identify"));
        let mut session = SessionController::new();
        session.ingredients_text = "rice".to_string();

        session.handle_upload(upload("A.jpg"), &recognizer).await;

        assert_eq!(session.ingredients_text(), "");
        assert_eq!(session.phase(), UploadPhase::NothingFound);
        assert!(matches!(session.notice(), Some(Notice::Warning(_))));
    }

    #[test]
    fn test_begin_upload_records_id_before_recognition() {
        let mut session = SessionController::new();
        assert_eq!(session.begin_upload(upload("A.jpg")), UploadDecision::Recognize);
        assert_eq!(session.last_upload_id(), Some("A.jpg"));
        assert_eq!(session.phase(), UploadPhase::ImageReceived);
        assert_eq!(session.begin_upload(upload("A.jpg")), UploadDecision::Redisplay);
    }

    #[test]
    fn test_reject_upload_leaves_id_untouched() {
        let mut session = SessionController::new();
        let err = ImageUpload::new("menu.gif", vec![]).unwrap_err();

        assert_eq!(session.reject_upload(&err), RenderRequest::Rerender);
        assert!(session.last_upload_id().is_none());
        assert!(matches!(session.notice(), Some(Notice::Error(_))));
    }

    #[tokio::test]
    async fn test_submit_blank_ingredients_warns_without_calling_model() {
        let model = MockModel::replying("# Soup");
        let recipes = RecipeService::new(model.clone(), PromptStyle::Markdown);
        let mut session = SessionController::new();

        session
            .submit("   ".to_string(), "vegan".to_string(), &recipes)
            .await;

        assert_eq!(model.call_count(), 0);
        assert!(session.recipe().is_none());
        assert!(matches!(session.notice(), Some(Notice::Warning(_))));
        assert_eq!(session.preference_text(), "vegan");
    }

    #[tokio::test]
    async fn test_submit_stores_recipe() {
        let model = MockModel::replying("# Tomato Egg");
        let recipes = RecipeService::new(model.clone(), PromptStyle::Markdown);
        let mut session = SessionController::new();

        session
            .submit("egg, tomato".to_string(), "low-carb".to_string(), &recipes)
            .await;

        assert_eq!(
            session.recipe(),
            Some(&RecipeOutcome::Recipe("# Tomato Egg".to_string()))
        );
        assert_eq!(session.ingredients_text(), "egg, tomato");
    }
}
