/// Instruction sent alongside a photo for ingredient recognition.
pub const RECOGNITION_PROMPT: &str = "Carefully identify every food ingredient visible in this image. \
List only the ingredient names, separated by commas. \
Do not give cooking suggestions; output nothing but the ingredient list. \
If you cannot see any ingredients, answer exactly: cannot identify";

/// How the recipe sections are requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// Markdown headings, rendered as rich text by the web page.
    Markdown,
    /// Numbered plain sections for terminal output.
    Plain,
}

pub fn build_recipe_prompt(ingredients: &[String], preference: &str, style: PromptStyle) -> String {
    let ingredients_str = ingredients.join(", ");

    let sections = match style {
        PromptStyle::Markdown => {
            "Use Markdown and produce a clear, structured recipe with these sections:\n\
             # Recipe name (creative and appealing)\n\
             \n\
             ## Customization notes\n\
             (Explain how you adapted the recipe to my preference and to the ingredients I have)\n\
             \n\
             ## Ingredients\n\
             (List every ingredient needed, seasonings included, with quantities)\n\
             \n\
             ## Nutrition at a glance\n\
             (Estimated calories, protein, fat and carbohydrates)\n\
             \n\
             ## Cooking steps\n\
             (Numbered, clear and easy to follow)"
        }
        PromptStyle::Plain => {
            "Produce a clear, structured recipe with these sections:\n\
             1. Recipe name (creative and appealing)\n\
             2. Customization notes (explain how you adapted the recipe to my preference)\n\
             3. Ingredients (list every ingredient needed, seasonings included, with quantities)\n\
             4. Nutrition at a glance (estimated calories, protein, fat and carbohydrates)\n\
             5. Cooking steps (numbered, clear and easy to follow)"
        }
    };

    format!(
        "You are a professional recipe designer and nutritionist.\n\
         \n\
         Based on the ingredients I have: [{}], and my dietary preference: [{}], \
         design a complete recipe for me.\n\
         \n\
         {}\n\
         \n\
         Make sure the recipe is healthy and easy to make.",
        ingredients_str, preference, sections
    )
}
