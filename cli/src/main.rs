mod commands;
mod config;
mod logging;
mod openai;
mod tui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::info;

use crate::commands::{cmd_delete, cmd_generate, cmd_list, cmd_show};
use crate::config::{Config, Overrides};
use crate::openai::OpenAiClient;
use cookbook_core::db::RecipeStore;

#[derive(Parser)]
#[command(
    name = "cookbook",
    version,
    about = "Generate recipes with a language model and keep the good ones",
    long_about = "Generate recipes with a language model and keep the good ones.\n\n\
                  Run without a subcommand to open the two-tab recipe generator and recipe book."
)]
struct Cli {
    /// Path to the recipe database (default: <data dir>/recipes.db)
    #[arg(long, global = true, env = "COOKBOOK_DB", value_name = "PATH")]
    db: Option<PathBuf>,
    /// Model identifier sent to the generation service
    #[arg(long, global = true, env = "COOKBOOK_MODEL")]
    model: Option<String>,
    /// Base URL of an OpenAI-compatible API
    #[arg(long, global = true, env = "OPENAI_BASE_URL", value_name = "URL")]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved recipes
    List {
        /// Only recipes whose name, ingredients, or instructions contain this text
        #[arg(short, long)]
        search: Option<String>,
        /// Only recipes with at most this many calories
        #[arg(short = 'c', long)]
        max_calories: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a saved recipe
    Show {
        /// Recipe ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a saved recipe
    Delete {
        /// Recipe ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a recipe and print it
    Generate {
        /// What to cook, or how to change the last idea
        prompt: String,
        /// Save the result to the recipe book
        #[arg(long)]
        save: bool,
    },
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(Overrides {
        db_path: cli.db,
        model: cli.model,
        base_url: cli.base_url,
    })?;
    logging::init(&config.data_dir)?;
    let store = RecipeStore::open(&config.db_path)?;
    info!(db = %config.db_path.display(), "recipe store ready");

    match cli.command {
        Some(Commands::List {
            search,
            max_calories,
            json,
        }) => cmd_list(&store, search.as_deref(), max_calories, json),
        Some(Commands::Show { id, json }) => cmd_show(&store, id, json),
        Some(Commands::Delete { id, json }) => cmd_delete(&store, id, json),
        Some(Commands::Generate { prompt, save }) => {
            let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
            let client = OpenAiClient::new(&config.generation_settings()?, runtime.handle().clone())?;
            cmd_generate(&store, &client, &config.model, &prompt, save)
        }
        None => {
            let settings = config.generation_settings()?;
            let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
            let client = OpenAiClient::new(&settings, runtime.handle().clone())?;
            let mut app = tui::App::new(store, Arc::new(client), settings.model);
            info!("starting interactive session");
            tui::run_app(&mut app)
        }
    }
}
