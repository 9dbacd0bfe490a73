use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use tracing::debug;

use crate::models::{NewRecipe, Recipe, RecipeFilter, RecipeSummary};

/// Handle to the on-disk recipe book.
///
/// Only the path is held; every operation opens its own connection and drops
/// it before returning.
#[derive(Debug, Clone)]
pub struct RecipeStore {
    path: PathBuf,
}

impl RecipeStore {
    pub fn open(path: &Path) -> Result<Self> {
        let store = RecipeStore {
            path: path.to_path_buf(),
        };
        store.initialize()?;
        Ok(store)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.path)
            .with_context(|| format!("Failed to open database: {}", self.path.display()))
    }

    /// Create the `recipes` table if it does not exist yet.
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS recipes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT,
                ingredients TEXT,
                recipe_text TEXT,
                calories INTEGER
            );",
        )
        .context("Failed to create recipes table")?;
        Ok(())
    }

    // --- Row mapping helpers ---

    // Columns are nullable so rows written by other tools still load.
    fn recipe_from_row(row: &rusqlite::Row) -> rusqlite::Result<Recipe> {
        Ok(Recipe {
            id: row.get(0)?,
            name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            ingredients: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            recipe_text: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            calories: row.get::<_, Option<i64>>(4)?.unwrap_or(0),
        })
    }

    fn summary_from_row(row: &rusqlite::Row) -> rusqlite::Result<RecipeSummary> {
        Ok(RecipeSummary {
            id: row.get(0)?,
            name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            calories: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
            ingredients: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        })
    }

    // --- Recipes ---

    pub fn create(&self, recipe: &NewRecipe) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO recipes (name, ingredients, recipe_text, calories) VALUES (?1, ?2, ?3, ?4)",
            params![
                recipe.name,
                recipe.ingredients,
                recipe.recipe_text,
                recipe.calories,
            ],
        )
        .context("Failed to save recipe")?;
        let id = conn.last_insert_rowid();
        debug!(id, name = %recipe.name, "recipe saved");
        Ok(id)
    }

    /// List recipe summaries matching `filter`, in insertion order.
    ///
    /// The search text matches as a case-sensitive substring of the name,
    /// ingredients, or instructions. `%` and `_` are not wildcards.
    pub fn list(&self, filter: &RecipeFilter) -> Result<Vec<RecipeSummary>> {
        let mut sql = String::from("SELECT id, name, calories, ingredients FROM recipes WHERE 1=1");
        let mut args: Vec<Value> = Vec::new();

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            sql.push_str(
                " AND (instr(name, ?) > 0 OR instr(ingredients, ?) > 0 OR instr(recipe_text, ?) > 0)",
            );
            for _ in 0..3 {
                args.push(Value::Text(search.to_string()));
            }
        }
        if let Some(max) = filter.max_calories {
            sql.push_str(" AND calories <= ?");
            args.push(Value::Integer(max));
        }
        sql.push_str(" ORDER BY id");

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(args), Self::summary_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = rows.len(), ?filter, "listed recipes");
        Ok(rows)
    }

    /// Full instructions text for one recipe, or `None` if the id is unknown.
    pub fn fetch_detail(&self, id: i64) -> Result<Option<String>> {
        let conn = self.connect()?;
        let text = conn
            .query_row(
                "SELECT recipe_text FROM recipes WHERE id = ?1",
                params![id],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()
            .context("Failed to load recipe")?;
        Ok(text.map(Option::unwrap_or_default))
    }

    pub fn get(&self, id: i64) -> Result<Option<Recipe>> {
        let conn = self.connect()?;
        conn.query_row(
            "SELECT id, name, ingredients, recipe_text, calories FROM recipes WHERE id = ?1",
            params![id],
            Self::recipe_from_row,
        )
        .optional()
        .context("Failed to load recipe")
    }

    /// Returns `false` when no recipe had that id.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let conn = self.connect()?;
        let rows = conn
            .execute("DELETE FROM recipes WHERE id = ?1", params![id])
            .context("Failed to delete recipe")?;
        debug!(id, deleted = rows > 0, "recipe delete");
        Ok(rows > 0)
    }
}
