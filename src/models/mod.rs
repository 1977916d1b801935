use std::fmt;

/// Prefix every failure is rendered with, on both surfaces.
pub const FAILURE_MARKER: &str = "❌";

/// Fixed reply for an ingredient list that is empty after parsing.
pub const EMPTY_INPUT_MESSAGE: &str = "🚨 Please enter at least one ingredient!";

/// Ordered, trimmed, non-empty ingredient names parsed from free text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IngredientList(Vec<String>);

impl IngredientList {
    /// Split on commas (ASCII, full-width and the CJK enumeration comma),
    /// trim each entry and drop the blank ones.
    pub fn parse(raw: &str) -> Self {
        let items = raw
            .split(|c: char| c == ',' || c == '，' || c == '、')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();
        Self(items)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn to_joined(&self) -> String {
        self.0.join(", ")
    }
}

/// An uploaded photo. `file_name` doubles as the upload identity inside a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Accepts jpg/jpeg/png by extension; anything else is rejected.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> anyhow::Result<Self> {
        let file_name = file_name.into();
        let mime_type = mime_type_for(&file_name).ok_or_else(|| {
            anyhow::anyhow!(
                "Unsupported image type for '{}'. Please upload a JPG, JPEG or PNG file.",
                file_name
            )
        })?;

        Ok(Self {
            file_name,
            mime_type: mime_type.to_string(),
            bytes,
        })
    }
}

pub fn mime_type_for(file_name: &str) -> Option<&'static str> {
    let extension = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

/// Result of a recipe generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeOutcome {
    /// Markdown text exactly as the model returned it.
    Recipe(String),
    /// No ingredients were supplied; the model was not contacted.
    EmptyInput,
    /// The provider call failed; carries the error detail.
    Failed(String),
}

impl RecipeOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, RecipeOutcome::Failed(_))
    }
}

impl fmt::Display for RecipeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeOutcome::Recipe(text) => f.write_str(text),
            RecipeOutcome::EmptyInput => f.write_str(EMPTY_INPUT_MESSAGE),
            RecipeOutcome::Failed(detail) => {
                write!(f, "{} Recipe generation failed. Error: {}", FAILURE_MARKER, detail)
            }
        }
    }
}

/// Result of recognising ingredients in a photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// Comma-separated ingredient names.
    Ingredients(String),
    /// The model saw nothing it could name. Not an error.
    NothingFound,
    Failed(String),
}

impl RecognitionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, RecognitionOutcome::Failed(_))
    }

    /// The text a caller gets when it only wants a string: ingredients, empty, or marked failure.
    pub fn into_text(self) -> String {
        match self {
            RecognitionOutcome::Ingredients(text) => text,
            RecognitionOutcome::NothingFound => String::new(),
            failed @ RecognitionOutcome::Failed(_) => failed.to_string(),
        }
    }
}

impl fmt::Display for RecognitionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecognitionOutcome::Ingredients(text) => f.write_str(text),
            RecognitionOutcome::NothingFound => Ok(()),
            RecognitionOutcome::Failed(detail) => write!(
                f,
                "{} Image recognition failed. Check API permissions or the image format. Error: {}",
                FAILURE_MARKER, detail
            ),
        }
    }
}
