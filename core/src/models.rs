use serde::{Deserialize, Serialize};

/// Name stored when the save form's name field is left blank.
pub const UNNAMED_RECIPE: &str = "Unnamed Recipe";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub ingredients: String,
    pub recipe_text: String,
    pub calories: i64,
}

/// Row shown in the recipe book list. Carries no instructions text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    pub calories: i64,
    pub ingredients: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    pub name: String,
    pub ingredients: String,
    pub recipe_text: String,
    pub calories: i64,
}

/// Filters for `RecipeStore::list`. Both are optional and combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub search: Option<String>,
    pub max_calories: Option<i64>,
}

impl RecipeFilter {
    /// Build a filter from the raw text of the search and calorie-ceiling inputs.
    ///
    /// The search text is trimmed and ignored when empty. The ceiling only
    /// applies when the field holds nothing but ASCII digits.
    #[must_use]
    pub fn from_inputs(search: &str, max_calories: &str) -> Self {
        let search = search.trim();
        Self {
            search: (!search.is_empty()).then(|| search.to_string()),
            max_calories: parse_calorie_ceiling(max_calories),
        }
    }
}

#[must_use]
pub fn parse_calorie_ceiling(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parse the calories field of the save form, falling back to zero.
#[must_use]
pub fn parse_calories(s: &str) -> i64 {
    s.trim().parse().unwrap_or(0)
}

/// A recipe as returned by the generation service, after strict validation of
/// its four keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedRecipe {
    pub name: String,
    pub ingredients: String,
    pub calories: i64,
    pub recipe_text: String,
}

/// The most recent generation result, kept only to pre-fill the save form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedDraft {
    recipe: Option<GeneratedRecipe>,
}

impl GeneratedDraft {
    pub fn replace(&mut self, recipe: Option<GeneratedRecipe>) {
        self.recipe = recipe;
    }

    #[must_use]
    pub fn recipe(&self) -> Option<&GeneratedRecipe> {
        self.recipe.as_ref()
    }

    #[must_use]
    pub fn save_form(&self) -> SaveForm {
        self.recipe
            .as_ref()
            .map_or_else(SaveForm::default, SaveForm::from_recipe)
    }
}

/// User-editable fields of the save dialog, as raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveForm {
    pub name: String,
    pub ingredients: String,
    pub calories: String,
}

impl SaveForm {
    #[must_use]
    pub fn from_recipe(recipe: &GeneratedRecipe) -> Self {
        Self {
            name: recipe.name.clone(),
            ingredients: recipe.ingredients.clone(),
            calories: recipe.calories.to_string(),
        }
    }

    /// Apply the save-time defaults and pair the form with the displayed text.
    #[must_use]
    pub fn into_new_recipe(self, recipe_text: String) -> NewRecipe {
        let name = self.name.trim();
        NewRecipe {
            name: if name.is_empty() {
                UNNAMED_RECIPE.to_string()
            } else {
                name.to_string()
            },
            ingredients: self.ingredients.trim().to_string(),
            recipe_text,
            calories: parse_calories(&self.calories),
        }
    }
}
