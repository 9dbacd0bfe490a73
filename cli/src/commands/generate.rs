use anyhow::{Result, bail};
use std::process;

use cookbook_core::db::RecipeStore;
use cookbook_core::generate::{CompletionProvider, OutcomeKind, generate, validate_prompt};
use cookbook_core::models::GeneratedDraft;

/// Generate one recipe and print it. With `save`, store it the way the save
/// form would with its pre-filled values accepted.
pub(crate) fn cmd_generate(
    store: &RecipeStore,
    provider: &dyn CompletionProvider,
    model: &str,
    prompt: &str,
    save: bool,
) -> Result<()> {
    let Some(prompt) = validate_prompt(prompt) else {
        bail!("Please enter a recipe prompt or modification instruction.");
    };

    let outcome = generate(provider, model, prompt);
    if outcome.kind == OutcomeKind::Failed {
        eprintln!("{}", outcome.display_text);
        process::exit(1);
    }
    println!("{}", outcome.display_text);

    if save {
        let mut draft = GeneratedDraft::default();
        draft.replace(outcome.recipe);
        let recipe = draft
            .save_form()
            .into_new_recipe(outcome.display_text.trim().to_string());
        let id = store.create(&recipe)?;
        let name = &recipe.name;
        eprintln!("Saved recipe: {name} (id: {id})");
    }
    Ok(())
}
