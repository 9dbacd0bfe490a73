use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::{Modifier, Style};
use tracing::{error, info};
use tui_textarea::TextArea;

use cookbook_core::db::RecipeStore;
use cookbook_core::error::GenerateError;
use cookbook_core::generate::{CompletionProvider, GenerationOutcome, generate, validate_prompt};
use cookbook_core::models::{GeneratedDraft, RecipeFilter, RecipeSummary, SaveForm};

pub(crate) const EMPTY_PROMPT_NOTICE: &str =
    "Please enter a recipe prompt or modification instruction.";
pub(crate) const NOTHING_TO_SAVE_NOTICE: &str = "No recipe available to save.";
pub(crate) const STILL_GENERATING_NOTICE: &str = "A recipe is still being generated.";
pub(crate) const SAVED_NOTICE: &str = "Recipe saved successfully!";
pub(crate) const GENERATING_TEXT: &str = "Generating recipe...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Generate,
    Book,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Generate, Tab::Book];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Generate => "Generate Recipe",
            Tab::Book => "Recipe Book",
        }
    }
}

/// Input that receives key presses. Cycling focus past the last input of a
/// tab moves to the other tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Prompt,
    Search,
    MaxCalories,
    List,
}

impl Focus {
    const ORDER: [Focus; 4] = [Focus::Prompt, Focus::Search, Focus::MaxCalories, Focus::List];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn tab(self) -> Tab {
        match self {
            Focus::Prompt => Tab::Generate,
            Focus::Search | Focus::MaxCalories | Focus::List => Tab::Book,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Generating,
}

pub(crate) const SAVE_FIELD_LABELS: [&str; 3] = [
    "Recipe Name",
    "Ingredients (comma-separated)",
    "Estimated Calories",
];

/// Modal form collecting the fields stored alongside the displayed text.
pub struct SaveDialog {
    pub(super) fields: [TextArea<'static>; 3],
    pub(super) focus: usize,
    recipe_text: String,
}

impl SaveDialog {
    fn new(form: SaveForm, recipe_text: String) -> Self {
        let mut dialog = Self {
            fields: [
                single_line(&form.name, ""),
                single_line(&form.ingredients, ""),
                single_line(&form.calories, ""),
            ],
            focus: 0,
            recipe_text,
        };
        dialog.sync_cursors();
        dialog
    }

    fn form(&self) -> SaveForm {
        SaveForm {
            name: field_text(&self.fields[0]),
            ingredients: field_text(&self.fields[1]),
            calories: field_text(&self.fields[2]),
        }
    }

    fn cycle(&mut self, forward: bool) {
        let len = self.fields.len();
        self.focus = if forward {
            (self.focus + 1) % len
        } else {
            (self.focus + len - 1) % len
        };
        self.sync_cursors();
    }

    fn sync_cursors(&mut self) {
        for (i, field) in self.fields.iter_mut().enumerate() {
            show_cursor(field, i == self.focus);
        }
    }
}

pub struct App {
    store: RecipeStore,
    provider: Arc<dyn CompletionProvider>,
    model: String,
    results_tx: Sender<GenerationOutcome>,
    results_rx: Receiver<GenerationOutcome>,
    draft: GeneratedDraft,

    pub(super) focus: Focus,
    pub(super) generation: GenerationState,
    pub(super) prompt: TextArea<'static>,
    pub(super) output: String,
    pub(super) output_scroll: u16,

    pub(super) search: TextArea<'static>,
    pub(super) max_calories: TextArea<'static>,
    pub(super) recipes: Vec<RecipeSummary>,
    pub(super) selected: Option<usize>,
    pub(super) detail: String,

    pub(super) save_dialog: Option<SaveDialog>,
    pub(super) notice: Option<String>,
}

impl App {
    pub fn new(store: RecipeStore, provider: Arc<dyn CompletionProvider>, model: String) -> Self {
        let (results_tx, results_rx) = mpsc::channel();
        let mut app = Self {
            store,
            provider,
            model,
            results_tx,
            results_rx,
            draft: GeneratedDraft::default(),
            focus: Focus::Prompt,
            generation: GenerationState::Idle,
            prompt: single_line("", "Enter recipe prompt or modifications..."),
            output: String::new(),
            output_scroll: 0,
            search: single_line("", "Search by name or ingredient"),
            max_calories: single_line("", "Max calories (optional)"),
            recipes: Vec::new(),
            selected: None,
            detail: String::new(),
            save_dialog: None,
            notice: None,
        };
        app.set_focus(Focus::Prompt);
        app.refresh_recipes();
        app
    }

    pub fn tab(&self) -> Tab {
        self.focus.tab()
    }

    /// Handle one key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c' | 'q'))
        {
            return true;
        }

        if self.notice.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.notice = None;
            }
            return false;
        }

        if self.save_dialog.is_some() {
            self.handle_dialog_key(key);
            return false;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Tab, _) => self.set_focus(self.focus.next()),
            (KeyCode::BackTab, _) => self.set_focus(self.focus.prev()),
            (KeyCode::Char('s'), KeyModifiers::CONTROL) => self.open_save_dialog(),
            (KeyCode::Char('d'), KeyModifiers::CONTROL) if self.tab() == Tab::Book => {
                self.delete_selected();
            }
            _ => match self.focus {
                Focus::Prompt => self.handle_prompt_key(key),
                Focus::Search | Focus::MaxCalories => self.handle_filter_key(key),
                Focus::List => self.handle_list_key(key),
            },
        }
        false
    }

    /// Insert pasted text into the focused input as a single line.
    pub fn handle_paste(&mut self, text: &str) {
        if self.notice.is_some() {
            return;
        }
        let text = text.replace("\r\n", " ").replace(['\r', '\n'], " ");

        if let Some(dialog) = self.save_dialog.as_mut() {
            dialog.fields[dialog.focus].insert_str(&text);
            return;
        }
        match self.focus {
            Focus::Prompt => {
                self.prompt.insert_str(&text);
            }
            Focus::Search => {
                if self.search.insert_str(&text) {
                    self.refresh_recipes();
                }
            }
            Focus::MaxCalories => {
                if self.max_calories.insert_str(&text) {
                    self.refresh_recipes();
                }
            }
            Focus::List => {}
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.start_generation(),
            KeyCode::PageUp => self.output_scroll = self.output_scroll.saturating_sub(5),
            KeyCode::PageDown => self.output_scroll = self.output_scroll.saturating_add(5),
            _ => {
                self.prompt.input(key);
            }
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Enter => {}
            _ => {
                let field = if self.focus == Focus::Search {
                    &mut self.search
                } else {
                    &mut self.max_calories
                };
                if field.input(key) {
                    self.refresh_recipes();
                }
            }
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Home if !self.recipes.is_empty() => self.select(0),
            KeyCode::End if !self.recipes.is_empty() => self.select(self.recipes.len() - 1),
            KeyCode::Delete => self.delete_selected(),
            _ => {}
        }
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) {
        let Some(dialog) = self.save_dialog.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.save_dialog = None;
                info!("save cancelled");
            }
            KeyCode::Enter => self.confirm_save(),
            KeyCode::Tab | KeyCode::Down => dialog.cycle(true),
            KeyCode::BackTab | KeyCode::Up => dialog.cycle(false),
            _ => {
                dialog.fields[dialog.focus].input(key);
            }
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        show_cursor(&mut self.prompt, focus == Focus::Prompt);
        show_cursor(&mut self.search, focus == Focus::Search);
        show_cursor(&mut self.max_calories, focus == Focus::MaxCalories);
    }

    // --- Generation ---

    /// Send the prompt to the generation service on a worker thread.
    ///
    /// Ignored while a request is in flight; the result comes back through
    /// [`App::drain_results`].
    pub fn start_generation(&mut self) {
        if self.generation == GenerationState::Generating {
            return;
        }
        let text = field_text(&self.prompt);
        let Some(prompt) = validate_prompt(&text) else {
            self.notice = Some(EMPTY_PROMPT_NOTICE.to_string());
            return;
        };

        let prompt = prompt.to_string();
        let provider = Arc::clone(&self.provider);
        let model = self.model.clone();
        let tx = self.results_tx.clone();
        let spawned = thread::Builder::new()
            .name("generate".to_string())
            .spawn(move || {
                // A panic still has to hand the shell an outcome or it stays in Generating.
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    generate(provider.as_ref(), &model, &prompt)
                }))
                .unwrap_or_else(|_| GenerationOutcome::failed(&GenerateError::Aborted));
                // The receiver is gone only once the UI has shut down.
                let _ = tx.send(outcome);
            });

        match spawned {
            Ok(_) => {
                self.generation = GenerationState::Generating;
                self.output = GENERATING_TEXT.to_string();
                self.output_scroll = 0;
            }
            Err(err) => {
                error!(error = %err, "failed to spawn generation worker");
                self.notice = Some(format!("Could not start generation: {err}"));
            }
        }
    }

    /// Apply any generation results that have arrived. Called every tick.
    pub fn drain_results(&mut self) {
        while let Ok(outcome) = self.results_rx.try_recv() {
            self.finish_generation(outcome);
        }
    }

    fn finish_generation(&mut self, outcome: GenerationOutcome) {
        info!(kind = ?outcome.kind, "generation finished");
        self.output = outcome.display_text;
        self.output_scroll = 0;
        self.draft.replace(outcome.recipe);
        self.generation = GenerationState::Idle;
    }

    // --- Saving ---

    pub fn open_save_dialog(&mut self) {
        if self.generation == GenerationState::Generating {
            self.notice = Some(STILL_GENERATING_NOTICE.to_string());
            return;
        }
        let text = self.output.trim();
        if text.is_empty() {
            self.notice = Some(NOTHING_TO_SAVE_NOTICE.to_string());
            return;
        }
        self.save_dialog = Some(SaveDialog::new(self.draft.save_form(), text.to_string()));
    }

    fn confirm_save(&mut self) {
        let Some(dialog) = self.save_dialog.take() else {
            return;
        };
        let recipe = dialog.form().into_new_recipe(dialog.recipe_text);
        match self.store.create(&recipe) {
            Ok(id) => {
                info!(id, "recipe saved from form");
                self.notice = Some(SAVED_NOTICE.to_string());
                self.refresh_recipes();
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), "failed to save recipe");
                self.notice = Some(format!("Could not save recipe: {err:#}"));
            }
        }
    }

    // --- Recipe book ---

    fn filter(&self) -> RecipeFilter {
        RecipeFilter::from_inputs(&field_text(&self.search), &field_text(&self.max_calories))
    }

    /// Re-run the list query and replace the rows. Clears the selection.
    pub fn refresh_recipes(&mut self) {
        self.selected = None;
        self.detail.clear();
        match self.store.list(&self.filter()) {
            Ok(rows) => self.recipes = rows,
            Err(err) => {
                error!(error = %format!("{err:#}"), "failed to list recipes");
                self.recipes.clear();
                self.notice = Some(format!("Could not load recipes: {err:#}"));
            }
        }
    }

    fn move_selection(&mut self, delta: isize) {
        if self.recipes.is_empty() {
            return;
        }
        let last = self.recipes.len() - 1;
        let index = match self.selected {
            None if delta < 0 => last,
            None => 0,
            Some(i) => i.saturating_add_signed(delta).min(last),
        };
        self.select(index);
    }

    fn select(&mut self, index: usize) {
        let Some(summary) = self.recipes.get(index) else {
            return;
        };
        self.selected = Some(index);
        match self.store.fetch_detail(summary.id) {
            Ok(text) => self.detail = text.unwrap_or_default(),
            Err(err) => {
                error!(error = %format!("{err:#}"), "failed to load recipe detail");
                self.notice = Some(format!("Could not load recipe: {err:#}"));
            }
        }
    }

    fn delete_selected(&mut self) {
        let Some(id) = self
            .selected
            .and_then(|i| self.recipes.get(i))
            .map(|r| r.id)
        else {
            return;
        };
        match self.store.delete(id) {
            Ok(_) => {
                info!(id, "recipe deleted");
                self.refresh_recipes();
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), "failed to delete recipe");
                self.notice = Some(format!("Could not delete recipe: {err:#}"));
            }
        }
    }
}

fn single_line(text: &str, placeholder: &str) -> TextArea<'static> {
    let mut area = TextArea::new(vec![text.to_string()]);
    area.move_cursor(tui_textarea::CursorMove::End);
    area.set_cursor_line_style(Style::default());
    if !placeholder.is_empty() {
        area.set_placeholder_text(placeholder);
    }
    area
}

fn field_text(area: &TextArea<'_>) -> String {
    area.lines().join("\n")
}

fn show_cursor(area: &mut TextArea<'_>, visible: bool) {
    area.set_cursor_style(if visible {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use cookbook_core::generate::CompletionRequest;
    use cookbook_core::models::NewRecipe;
    use std::fs;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    const SOUP_JSON: &str = r#"{"name": "Soup", "ingredients": "salt, water", "calories": 50, "recipe_text": "1. Boil. 2. Season."}"#;

    struct FakeProvider {
        reply: Result<String, String>,
        calls: AtomicUsize,
        gate: Option<Mutex<mpsc::Receiver<()>>>,
    }

    impl FakeProvider {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
                gate: None,
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                calls: AtomicUsize::new(0),
                gate: None,
            })
        }

        fn gated(text: &str) -> (Arc<Self>, mpsc::Sender<()>) {
            let (tx, rx) = mpsc::channel();
            let provider = Arc::new(Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
                gate: Some(Mutex::new(rx)),
            });
            (provider, tx)
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl CompletionProvider for FakeProvider {
        fn complete(&self, _request: &CompletionRequest) -> Result<String, GenerateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.lock().unwrap().recv().unwrap();
            }
            self.reply.clone().map_err(GenerateError::Transport)
        }
    }

    fn app_with(provider: Arc<FakeProvider>) -> (TempDir, App) {
        let tmp = TempDir::new().unwrap();
        let store = RecipeStore::open(&tmp.path().join("recipes.db")).unwrap();
        let app = App::new(store, provider, "gpt-4".to_string());
        (tmp, app)
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(app: &mut App, c: char) -> bool {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn wait_until_idle(app: &mut App) {
        for _ in 0..400 {
            app.drain_results();
            if app.generation == GenerationState::Idle {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("generation did not finish");
    }

    fn generate_with_prompt(app: &mut App, prompt: &str) {
        type_text(app, prompt);
        press(app, KeyCode::Enter);
        wait_until_idle(app);
    }

    fn seed(app: &App, name: &str, ingredients: &str, calories: i64) -> i64 {
        app.store
            .create(&NewRecipe {
                name: name.to_string(),
                ingredients: ingredients.to_string(),
                recipe_text: format!("How to make {name}."),
                calories,
            })
            .unwrap()
    }

    #[test]
    fn test_whitespace_prompt_makes_no_call() {
        let provider = FakeProvider::replying(SOUP_JSON);
        let (_tmp, mut app) = app_with(Arc::clone(&provider));

        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.notice.as_deref(), Some(EMPTY_PROMPT_NOTICE));
        assert_eq!(app.generation, GenerationState::Idle);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(provider.calls(), 0);
    }

    #[test]
    fn test_generation_displays_formatted_recipe() {
        let provider = FakeProvider::replying(SOUP_JSON);
        let (_tmp, mut app) = app_with(Arc::clone(&provider));

        generate_with_prompt(&mut app, "soup");

        assert!(app.output.starts_with("Recipe Name: Soup"));
        assert!(app.output.contains("Ingredients:\nsalt\nwater"));
        assert_eq!(provider.calls(), 1);
    }

    #[test]
    fn test_single_request_in_flight() {
        let (provider, release) = FakeProvider::gated(SOUP_JSON);
        let (_tmp, mut app) = app_with(Arc::clone(&provider));

        type_text(&mut app, "soup");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.generation, GenerationState::Generating);
        assert_eq!(app.output, GENERATING_TEXT);

        // a second press while generating is ignored
        press(&mut app, KeyCode::Enter);
        app.drain_results();
        assert_eq!(app.generation, GenerationState::Generating);

        release.send(()).unwrap();
        wait_until_idle(&mut app);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(provider.calls(), 1);
    }

    #[test]
    fn test_failure_is_shown_and_controls_restored() {
        let provider = FakeProvider::failing("connection refused");
        let (_tmp, mut app) = app_with(provider);

        generate_with_prompt(&mut app, "soup");

        assert_eq!(app.generation, GenerationState::Idle);
        assert_eq!(
            app.output,
            "Error generating recipe: request failed: connection refused"
        );

        // still usable: another request can be started
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.generation, GenerationState::Generating);
        wait_until_idle(&mut app);
    }

    #[test]
    fn test_save_prefills_from_parsed_recipe() {
        let provider = FakeProvider::replying(SOUP_JSON);
        let (_tmp, mut app) = app_with(provider);
        generate_with_prompt(&mut app, "soup");

        ctrl(&mut app, 's');
        let dialog = app.save_dialog.as_ref().unwrap();
        assert_eq!(dialog.form().name, "Soup");
        assert_eq!(dialog.form().ingredients, "salt, water");
        assert_eq!(dialog.form().calories, "50");

        press(&mut app, KeyCode::Enter);
        assert!(app.save_dialog.is_none());
        assert_eq!(app.notice.as_deref(), Some(SAVED_NOTICE));

        let rows = app.store.list(&RecipeFilter::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Soup");
        assert_eq!(rows[0].calories, 50);
        let text = app.store.fetch_detail(rows[0].id).unwrap().unwrap();
        assert_eq!(text, app.output.trim());
        // the recipe book list was refreshed
        assert_eq!(app.recipes.len(), 1);
    }

    #[test]
    fn test_unparsed_output_saves_with_empty_form() {
        let provider = FakeProvider::replying("Here is a stew: beef, carrots. Simmer for hours.");
        let (_tmp, mut app) = app_with(provider);
        generate_with_prompt(&mut app, "stew");

        assert_eq!(app.output, "Here is a stew: beef, carrots. Simmer for hours.");
        ctrl(&mut app, 's');
        assert_eq!(app.save_dialog.as_ref().unwrap().form(), SaveForm::default());

        // only the calories field gets a value that does not parse
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "lots");
        press(&mut app, KeyCode::Enter);

        let rows = app.store.list(&RecipeFilter::default()).unwrap();
        assert_eq!(rows[0].name, "Unnamed Recipe");
        assert_eq!(rows[0].calories, 0);
    }

    #[test]
    fn test_user_edits_are_saved() {
        let provider = FakeProvider::replying(SOUP_JSON);
        let (_tmp, mut app) = app_with(provider);
        generate_with_prompt(&mut app, "soup");

        ctrl(&mut app, 's');
        type_text(&mut app, " Deluxe");
        press(&mut app, KeyCode::Enter);

        let rows = app.store.list(&RecipeFilter::default()).unwrap();
        assert_eq!(rows[0].name, "Soup Deluxe");
    }

    #[test]
    fn test_cancel_save_persists_nothing() {
        let provider = FakeProvider::replying(SOUP_JSON);
        let (_tmp, mut app) = app_with(provider);
        generate_with_prompt(&mut app, "soup");

        ctrl(&mut app, 's');
        press(&mut app, KeyCode::Esc);

        assert!(app.save_dialog.is_none());
        assert!(app.store.list(&RecipeFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn test_save_without_output_shows_notice() {
        let (_tmp, mut app) = app_with(FakeProvider::replying(SOUP_JSON));

        ctrl(&mut app, 's');

        assert!(app.save_dialog.is_none());
        assert_eq!(app.notice.as_deref(), Some(NOTHING_TO_SAVE_NOTICE));
        // notice is modal until dismissed
        type_text(&mut app, "x");
        assert_eq!(field_text(&app.prompt), "");
        press(&mut app, KeyCode::Esc);
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_new_generation_replaces_draft() {
        let provider = FakeProvider::replying(SOUP_JSON);
        let (_tmp, mut app) = app_with(Arc::clone(&provider));
        generate_with_prompt(&mut app, "soup");
        assert!(app.draft.recipe().is_some());

        let replacement: Arc<dyn CompletionProvider> = FakeProvider::replying("not a recipe");
        app.provider = replacement;
        press(&mut app, KeyCode::Enter);
        wait_until_idle(&mut app);
        assert!(app.draft.recipe().is_none());
    }

    #[test]
    fn test_search_and_calorie_filters_refresh_list() {
        let (_tmp, mut app) = app_with(FakeProvider::replying(SOUP_JSON));
        seed(&app, "Tomato Soup", "tomatoes, salt", 180);
        seed(&app, "Pancakes", "flour, eggs", 520);
        seed(&app, "Green Salad", "lettuce, salt", 90);
        app.refresh_recipes();
        assert_eq!(app.recipes.len(), 3);

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Search);
        assert_eq!(app.tab(), Tab::Book);
        type_text(&mut app, "salt");
        let names: Vec<_> = app.recipes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Tomato Soup", "Green Salad"]);

        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "100");
        let names: Vec<_> = app.recipes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Green Salad"]);

        // a non-numeric ceiling is ignored
        type_text(&mut app, "x");
        assert_eq!(app.recipes.len(), 2);
    }

    #[test]
    fn test_selection_shows_detail_and_refresh_clears_it() {
        let (_tmp, mut app) = app_with(FakeProvider::replying(SOUP_JSON));
        seed(&app, "Tomato Soup", "tomatoes", 180);
        seed(&app, "Pancakes", "flour", 520);
        app.refresh_recipes();

        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.focus, Focus::List);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected, Some(0));
        assert_eq!(app.detail, "How to make Tomato Soup.");
        press(&mut app, KeyCode::Down);
        assert_eq!(app.detail, "How to make Pancakes.");
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected, Some(1));

        app.refresh_recipes();
        assert_eq!(app.selected, None);
        assert!(app.detail.is_empty());
    }

    #[test]
    fn test_delete_selected_recipe() {
        let (_tmp, mut app) = app_with(FakeProvider::replying(SOUP_JSON));
        let doomed = seed(&app, "Tomato Soup", "tomatoes", 180);
        seed(&app, "Pancakes", "flour", 520);
        app.refresh_recipes();

        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::Down);
        ctrl(&mut app, 'd');

        assert_eq!(app.recipes.len(), 1);
        assert_eq!(app.recipes[0].name, "Pancakes");
        assert!(app.store.fetch_detail(doomed).unwrap().is_none());
    }

    #[test]
    fn test_quit_keys() {
        let (_tmp, mut app) = app_with(FakeProvider::replying(SOUP_JSON));
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert!(ctrl(&mut app, 'q'));
        assert!(ctrl(&mut app, 'c'));
    }

    struct PanickingProvider;

    impl CompletionProvider for PanickingProvider {
        fn complete(&self, _request: &CompletionRequest) -> Result<String, GenerateError> {
            panic!("provider blew up");
        }
    }

    /// Swap the database file for a directory so every later connection fails.
    fn break_store(tmp: &TempDir) {
        let path = tmp.path().join("recipes.db");
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
    }

    #[test]
    fn test_save_error_is_shown_as_notice() {
        let (tmp, mut app) = app_with(FakeProvider::replying(SOUP_JSON));
        generate_with_prompt(&mut app, "soup");
        ctrl(&mut app, 's');
        break_store(&tmp);

        press(&mut app, KeyCode::Enter);

        assert!(app.save_dialog.is_none());
        let notice = app.notice.clone().unwrap();
        assert!(notice.starts_with("Could not save recipe"), "{notice}");

        // the shell keeps running once the notice is dismissed
        press(&mut app, KeyCode::Esc);
        assert!(app.notice.is_none());
        type_text(&mut app, "x");
        assert_eq!(field_text(&app.prompt), "soupx");
    }

    #[test]
    fn test_list_error_is_shown_as_notice() {
        let (tmp, mut app) = app_with(FakeProvider::replying(SOUP_JSON));
        seed(&app, "Tomato Soup", "tomatoes", 180);
        app.refresh_recipes();
        assert_eq!(app.recipes.len(), 1);
        break_store(&tmp);

        app.refresh_recipes();

        assert!(app.recipes.is_empty());
        let notice = app.notice.clone().unwrap();
        assert!(notice.starts_with("Could not load recipes"), "{notice}");
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Search);
    }

    #[test]
    fn test_delete_error_is_shown_as_notice() {
        let (tmp, mut app) = app_with(FakeProvider::replying(SOUP_JSON));
        seed(&app, "Tomato Soup", "tomatoes", 180);
        seed(&app, "Pancakes", "flour", 520);
        app.refresh_recipes();
        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::Down);
        break_store(&tmp);

        ctrl(&mut app, 'd');

        let notice = app.notice.clone().unwrap();
        assert!(notice.starts_with("Could not delete recipe"), "{notice}");
        assert_eq!(app.recipes.len(), 2);
    }

    #[test]
    fn test_panicking_provider_restores_controls() {
        let (_tmp, mut app) = app_with(FakeProvider::replying(SOUP_JSON));
        app.provider = Arc::new(PanickingProvider);

        generate_with_prompt(&mut app, "soup");

        assert_eq!(app.generation, GenerationState::Idle);
        assert_eq!(
            app.output,
            "Error generating recipe: generation stopped unexpectedly"
        );
    }

    #[test]
    fn test_pasted_newline_does_not_start_generation() {
        let provider = FakeProvider::replying(SOUP_JSON);
        let (_tmp, mut app) = app_with(Arc::clone(&provider));

        app.handle_paste("tomato\nsoup\r\nwith basil");

        assert_eq!(field_text(&app.prompt), "tomato soup with basil");
        assert_eq!(app.generation, GenerationState::Idle);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(provider.calls(), 0);
    }

    #[test]
    fn test_paste_into_search_refreshes_list() {
        let (_tmp, mut app) = app_with(FakeProvider::replying(SOUP_JSON));
        seed(&app, "Tomato Soup", "tomatoes", 180);
        seed(&app, "Pancakes", "flour", 520);
        app.refresh_recipes();

        press(&mut app, KeyCode::Tab);
        app.handle_paste("Soup\n");

        let names: Vec<_> = app.recipes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Tomato Soup"]);
    }
}
