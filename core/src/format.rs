use std::sync::LazyLock;

use regex::Regex;

use crate::models::GeneratedRecipe;

static STEP_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(\d+\.)").expect("step marker pattern is valid"));

/// Render a generated recipe as the four-section text shown in the output pane.
#[must_use]
pub fn format_recipe(recipe: &GeneratedRecipe) -> String {
    let ingredients = format_ingredients(&recipe.ingredients);
    let instructions = format_instructions(&recipe.recipe_text);
    let name = &recipe.name;
    let calories = recipe.calories;
    format!(
        "Recipe Name: {name}\n\nIngredients:\n{ingredients}\n\nCalories: {calories}\n\nInstructions:\n{instructions}"
    )
}

/// One trimmed ingredient per line.
#[must_use]
pub fn format_ingredients(ingredients: &str) -> String {
    ingredients
        .split(',')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Start every numbered step (`1.`, `12.`) on its own line.
#[must_use]
pub fn format_instructions(text: &str) -> String {
    STEP_MARKER
        .replace_all(text.trim(), "\n$1")
        .trim()
        .to_string()
}
