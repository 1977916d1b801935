use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::{IngredientList, RecipeOutcome};

use super::ai_service::{ContentRequest, GenerativeModel};
use super::prompt::{build_recipe_prompt, PromptStyle};

/// Sampling temperature for recipes; favours creative variation.
pub const RECIPE_TEMPERATURE: f32 = 0.7;

pub struct RecipeService {
    model: Arc<dyn GenerativeModel>,
    style: PromptStyle,
    cache: Option<Mutex<HashMap<(String, String), String>>>,
}

impl RecipeService {
    pub fn new(model: Arc<dyn GenerativeModel>, style: PromptStyle) -> Self {
        Self {
            model,
            style,
            cache: None,
        }
    }

    /// Memoise successful recipes per exact (ingredients, preference) pair for the life of this service.
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(Mutex::new(HashMap::new()));
        self
    }

    pub async fn generate(&self, ingredients_text: &str, preference_text: &str) -> RecipeOutcome {
        let ingredients = IngredientList::parse(ingredients_text);
        if ingredients.is_empty() {
            log::warn!("⚠️ No ingredients supplied, skipping recipe generation");
            return RecipeOutcome::EmptyInput;
        }

        let key = (ingredients_text.to_string(), preference_text.to_string());
        if let Some(recipe) = self.cached(&key) {
            log::debug!("♻️ Serving cached recipe for [{}]", ingredients.to_joined());
            return RecipeOutcome::Recipe(recipe);
        }

        let prompt = build_recipe_prompt(ingredients.as_slice(), preference_text, self.style);
        log::info!(
            "🍳 Generating recipe for {} ingredient(s) with {}",
            ingredients.len(),
            self.model.model_name()
        );

        match self
            .model
            .generate_content(ContentRequest::text(prompt, RECIPE_TEMPERATURE))
            .await
        {
            Ok(recipe) => {
                self.remember(key, &recipe);
                RecipeOutcome::Recipe(recipe)
            }
            Err(e) => {
                log::error!("❌ Recipe generation failed: {:#}", e);
                RecipeOutcome::Failed(format!("{:#}", e))
            }
        }
    }

    fn cached(&self, key: &(String, String)) -> Option<String> {
        let cache = self.cache.as_ref()?;
        let guard = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.get(key).cloned()
    }

    fn remember(&self, key: (String, String), recipe: &str) {
        if let Some(cache) = &self.cache {
            let mut guard = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.insert(key, recipe.to_string());
        }
    }
}
