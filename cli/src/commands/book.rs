use anyhow::Result;
use std::process;

use cookbook_core::db::RecipeStore;
use cookbook_core::format::format_ingredients;
use cookbook_core::models::RecipeFilter;

use super::helpers::{json_error, print_recipe_table};

pub(crate) fn cmd_list(
    store: &RecipeStore,
    search: Option<&str>,
    max_calories: Option<i64>,
    json: bool,
) -> Result<()> {
    let filter = RecipeFilter {
        search: search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        max_calories,
    };
    let recipes = store.list(&filter)?;

    if recipes.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No recipes found");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&recipes)?);
    } else {
        print_recipe_table(&recipes);
    }
    Ok(())
}

pub(crate) fn cmd_show(store: &RecipeStore, id: i64, json: bool) -> Result<()> {
    let Some(recipe) = store.get(id)? else {
        if json {
            println!("{}", json_error(&format!("Recipe {id} not found")));
        } else {
            eprintln!("Recipe {id} not found");
        }
        process::exit(2);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
        return Ok(());
    }

    let name = &recipe.name;
    let calories = recipe.calories;
    println!("{name} ({calories} kcal)");
    println!();
    println!("Ingredients:");
    println!("{}", format_ingredients(&recipe.ingredients));
    println!();
    println!("{}", recipe.recipe_text);
    Ok(())
}

pub(crate) fn cmd_delete(store: &RecipeStore, id: i64, json: bool) -> Result<()> {
    let deleted = store.delete(id)?;
    if json {
        println!("{}", serde_json::json!({ "id": id, "deleted": deleted }));
    } else if deleted {
        println!("Deleted recipe {id}");
    } else {
        println!("No recipe with id {id}; nothing deleted");
    }
    Ok(())
}
