use anyhow::Result;
use std::io::{BufRead, Write};

use crate::models::FAILURE_MARKER;
use crate::services::RecipeService;

const RULE_WIDTH: usize = 45;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn prompt_line(input: &mut impl BufRead, output: &mut impl Write, question: &str) -> Result<String> {
    write!(output, "{}", question)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Interactive session: ask for ingredients and a preference, print one recipe, return.
pub async fn run(
    mut input: impl BufRead,
    mut output: impl Write,
    recipes: &RecipeService,
) -> Result<()> {
    writeln!(output, "{}", rule())?;
    writeln!(output, "✨ iChef Recipe Customizer (CLI) ✨")?;
    writeln!(output, "{}", rule())?;

    let ingredients = prompt_line(
        &mut input,
        &mut output,
        "Enter the ingredients you have, comma-separated (e.g. egg, tomato, flour): ",
    )?;
    let preference = prompt_line(
        &mut input,
        &mut output,
        "Enter your dietary preference or requests (e.g. low-carb, less oil): ",
    )?;

    if ingredients.is_empty() {
        log::warn!("⚠️ Empty ingredient input, exiting without a request");
        writeln!(
            output,
            "\n{} Invalid input: the ingredient list cannot be empty.",
            FAILURE_MARKER
        )?;
        return Ok(());
    }

    writeln!(output, "\n🔄 Generating your customized recipe, please wait...")?;
    let outcome = recipes.generate(&ingredients, &preference).await;

    writeln!(output, "\n{}", rule())?;
    writeln!(output, "✅ Customized recipe:")?;
    writeln!(output, "{}", rule())?;
    writeln!(output, "{}", outcome)?;
    writeln!(output, "{}", rule())?;
    output.flush()?;

    Ok(())
}
