pub mod ai_service;
pub mod gemini; // Google Gemini generateContent client
pub mod prompt;
pub mod recipe;
pub mod vision; // Ingredient recognition from photos

#[cfg(test)]
pub(crate) mod mock;

pub use ai_service::{ContentRequest, GenerativeModel};
pub use gemini::GeminiService;
pub use prompt::PromptStyle;
pub use recipe::RecipeService;
pub use vision::IngredientRecognizer;
