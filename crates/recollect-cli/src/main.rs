//! recollect - remember facts from conversations and feed them back into
//! prompts.
//!
//! # Configuration
//!
//! Settings come from an optional config file (`--config`, TOML/JSON/YAML),
//! then `RECOLLECT_*` environment variables (a `.env` file is honoured).
//! The database defaults to `~/.recollect/memories.db`.
//!
//! # Usage
//!
//! ```text
//! recollect ingest "My name is Alice and I live in Boston."
//! echo "where should I eat tonight?" | recollect enhance
//! recollect search boston --limit 5
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use recollect_core::{
    Category, FormatOptions, Memory, MemoryManager, RecollectConfig, RecollectError,
    SearchOptions,
};
use recollect_stores::SqliteMemoryStore;
use tokio::io::{AsyncReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod surface;

use surface::StdioSurface;

const DAY_MS: i64 = 86_400_000;

/// recollect - conversational memory for chat prompts.
#[derive(Parser, Debug)]
#[command(name = "recollect", version, about, long_about = None)]
struct Cli {
    /// Config file (.toml, .json, .yaml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path, overriding the configuration.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract and store memories from text (argument or stdin).
    Ingest {
        /// Text to learn from; read from stdin when omitted.
        text: Option<String>,
        /// Platform the text came from.
        #[arg(long)]
        platform: Option<String>,
    },
    /// Save a snippet verbatim.
    Remember {
        /// Text to save.
        text: String,
        /// Category; guessed from the text when omitted.
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,
        /// Platform the text came from.
        #[arg(long)]
        platform: Option<String>,
    },
    /// Ranked search over stored memories.
    Search {
        /// Query text.
        query: String,
        #[command(flatten)]
        filters: SearchArgs,
        /// Print results as JSON lines.
        #[arg(long)]
        json: bool,
    },
    /// Print the context block for a query.
    Context {
        /// Query text.
        query: String,
        #[command(flatten)]
        filters: SearchArgs,
        #[command(flatten)]
        format: FormatArgs,
    },
    /// Read a prompt from stdin and print it with context appended.
    Enhance {
        /// Prompt text; read from stdin when omitted.
        #[arg(long)]
        prompt: Option<String>,
        /// Platform label of the prompt.
        #[arg(long)]
        platform: Option<String>,
    },
    /// List every stored memory.
    List {
        /// Print memories as JSON lines.
        #[arg(long)]
        json: bool,
    },
    /// Delete one memory.
    Delete {
        /// Memory id.
        id: String,
    },
    /// Delete every memory.
    Clear {
        /// Required confirmation.
        #[arg(long)]
        yes: bool,
    },
    /// Show memory counts and usage counters.
    Stats,
    /// Export memories as JSON Lines.
    Export {
        /// Output file; stdout when omitted.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Import memories from a JSON Lines file.
    Import {
        /// Input file.
        path: PathBuf,
    },
}

/// Search filters shared by `search` and `context`.
#[derive(Args, Debug, Default)]
struct SearchArgs {
    /// Maximum number of results.
    #[arg(long)]
    limit: Option<usize>,
    /// Minimum raw relevance in [0, 1].
    #[arg(long)]
    threshold: Option<f32>,
    /// Only memories from this platform (repeatable).
    #[arg(long = "platform")]
    platforms: Vec<String>,
    /// Only memories in this category (repeatable).
    #[arg(long = "category", value_parser = parse_category)]
    categories: Vec<Category>,
    /// Leave out general memories.
    #[arg(long)]
    exclude_general: bool,
    /// Only memories from the last N days.
    #[arg(long)]
    days: Option<i64>,
}

impl SearchArgs {
    fn apply(&self, mut options: SearchOptions) -> SearchOptions {
        if let Some(limit) = self.limit {
            options.limit = limit;
        }
        if let Some(threshold) = self.threshold {
            options.threshold = threshold;
        }
        for platform in &self.platforms {
            options = options.with_platform(platform.as_str());
        }
        for category in &self.categories {
            options = options.with_category(category.as_str());
        }
        if self.exclude_general {
            options.include_general = false;
        }
        if let Some(days) = self.days {
            options = options.with_time_range_ms(days.saturating_mul(DAY_MS));
        }
        options
    }
}

/// Output formatting for `context`.
#[derive(Args, Debug, Default)]
struct FormatArgs {
    /// Group memories under category headers.
    #[arg(long)]
    group: bool,
    /// Show the memory type after each line.
    #[arg(long)]
    metadata: bool,
    /// Maximum length of the block in characters.
    #[arg(long)]
    max_length: Option<usize>,
}

impl FormatArgs {
    fn apply(&self, mut options: FormatOptions) -> FormatOptions {
        options.group_by_category |= self.group;
        options.include_metadata |= self.metadata;
        if let Some(max_length) = self.max_length {
            options.max_length = max_length;
        }
        options
    }
}

fn parse_category(value: &str) -> Result<Category, String> {
    Category::from_str(&value.to_lowercase()).map_err(|_| {
        format!(
            "unknown category '{}', expected one of: {}",
            value,
            Category::all_names().join(", ")
        )
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.db)?;

    let store = SqliteMemoryStore::open(&config.db_path)
        .with_context(|| format!("opening database {}", config.db_path.display()))?;
    let manager = MemoryManager::new(Arc::new(store), config);

    let result = run(&manager, cli.command).await;
    manager.flush_access().await;
    if let Some(hint) = result.as_ref().err().and_then(hint_for) {
        eprintln!("hint: {}", hint);
    }
    result
}

/// Suggestion and code of the first recollect error in the chain.
fn hint_for(error: &anyhow::Error) -> Option<String> {
    let error = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<RecollectError>())?;
    error
        .suggestion()
        .map(|suggestion| format!("{} [{}]", suggestion, error.code().as_str()))
}

/// Resolve configuration: file (if any), then environment, then `--db`.
fn load_config(path: Option<&Path>, db: Option<PathBuf>) -> Result<RecollectConfig> {
    dotenvy::dotenv().ok();

    let mut config = match path {
        Some(path) => RecollectConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?
            .with_env_overrides(),
        None => RecollectConfig::from_env(),
    };
    if let Some(db) = db {
        config.db_path = db;
    }
    config.validate()?;
    Ok(config)
}

async fn run(manager: &MemoryManager, command: Commands) -> Result<()> {
    let default_platform = manager.config().platform.clone();

    match command {
        Commands::Ingest { text, platform } => {
            let text = match text {
                Some(text) => text,
                None => read_stdin().await?,
            };
            let platform = platform.unwrap_or(default_platform);
            let stored = manager.store_from_text(&text, &platform).await;
            if stored.is_empty() {
                println!("No memories found in input");
            }
            for memory in &stored {
                print_memory(memory);
            }
        }
        Commands::Remember {
            text,
            category,
            platform,
        } => {
            let platform = platform.unwrap_or(default_platform);
            match manager.store_manual(&text, &platform, category).await {
                Some(memory) => print_memory(&memory),
                None => bail!("nothing to remember"),
            }
        }
        Commands::Search {
            query,
            filters,
            json,
        } => {
            let options = filters.apply(manager.default_search_options());
            for result in manager.search(&query, &options).await {
                if json {
                    println!("{}", serde_json::to_string(&result)?);
                } else {
                    println!(
                        "{:.3}\t{:.2}\t{}\t{}\t{}",
                        result.score,
                        result.raw_score,
                        result.memory.id,
                        result.memory.category(),
                        result.memory.content
                    );
                }
            }
        }
        Commands::Context {
            query,
            filters,
            format,
        } => {
            let options = filters.apply(manager.default_search_options());
            let format = format.apply(manager.default_format_options());
            let context = manager.get_context(&query, &options, &format).await;
            if !context.is_empty() {
                println!("{}", context);
            }
        }
        Commands::Enhance { prompt, platform } => {
            let platform = platform.unwrap_or(default_platform);
            let surface = match prompt {
                Some(prompt) => StdioSurface::new(platform, prompt),
                None => StdioSurface::from_reader(platform, tokio::io::stdin()).await?,
            };
            let changed = manager.enhance_prompt(&surface).await;
            tracing::debug!(changed, "Prompt enhancement finished");
            println!("{}", surface.current()?);
        }
        Commands::List { json } => {
            for memory in manager.list().await {
                if json {
                    println!("{}", serde_json::to_string(&memory)?);
                } else {
                    print_memory(&memory);
                }
            }
        }
        Commands::Delete { id } => {
            if !manager.delete(&id).await {
                return Err(RecollectError::not_found(id).into());
            }
            println!("Deleted {}", id);
        }
        Commands::Clear { yes } => {
            if !yes {
                bail!("refusing to delete every memory without --yes");
            }
            if !manager.clear().await {
                bail!("failed to clear memories");
            }
            println!("Cleared all memories");
        }
        Commands::Stats => {
            println!("{}", serde_json::to_string_pretty(&manager.stats().await)?);
        }
        Commands::Export { output } => {
            let stats = match output {
                Some(path) => {
                    let file = tokio::fs::File::create(&path)
                        .await
                        .with_context(|| format!("creating {}", path.display()))?;
                    manager.export_jsonl(file).await
                }
                None => manager.export_jsonl(tokio::io::stdout()).await,
            };
            eprintln!("Exported {}/{} memories", stats.exported, stats.total);
            for error in &stats.errors {
                eprintln!("  {}", error);
            }
        }
        Commands::Import { path } => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            let stats = manager.import_jsonl(BufReader::new(file)).await;
            println!(
                "Imported {} of {} ({} skipped, {} errors)",
                stats.imported,
                stats.total,
                stats.skipped,
                stats.errors.len()
            );
            for error in &stats.errors {
                eprintln!("  {}", error);
            }
        }
    }
    Ok(())
}

async fn read_stdin() -> Result<String> {
    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .context("reading stdin")?;
    Ok(text)
}

fn print_memory(memory: &Memory) {
    println!(
        "{}\t{}\t{:.2}\t{}",
        memory.id,
        memory.category(),
        memory.metadata.confidence,
        memory.content
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_hint_for_recollect_errors() {
        let error = anyhow::Error::from(RecollectError::not_found("abc"))
            .context("deleting memory");
        let hint = hint_for(&error).unwrap();
        assert!(hint.contains("memory ID"));
        assert!(hint.ends_with("[MEM_001]"));

        assert!(hint_for(&anyhow::anyhow!("plain failure")).is_none());
    }

    #[test]
    fn test_parse_search_filters() {
        let cli = Cli::try_parse_from([
            "recollect",
            "--db",
            "/tmp/m.db",
            "search",
            "boston",
            "--limit",
            "3",
            "--platform",
            "claude",
            "--category",
            "Location",
            "--days",
            "2",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/m.db")));

        let Commands::Search { query, filters, .. } = cli.command else {
            panic!("expected search");
        };
        assert_eq!(query, "boston");
        let options = filters.apply(SearchOptions::default());
        assert_eq!(options.limit, 3);
        assert!(options.platforms.contains("claude"));
        assert!(options.categories.contains("location"));
        assert_eq!(options.time_range_ms, Some(2 * DAY_MS));
    }

    #[test]
    fn test_unknown_category_rejected() {
        assert!(Cli::try_parse_from(["recollect", "remember", "x", "--category", "misc"]).is_err());
    }

    #[test]
    fn test_format_args_override() {
        let args = FormatArgs {
            group: true,
            metadata: false,
            max_length: Some(200),
        };
        let options = args.apply(FormatOptions::default());
        assert!(options.group_by_category);
        assert!(!options.include_metadata);
        assert_eq!(options.max_length, 200);
    }

    #[test]
    fn test_load_config_db_override() {
        let config = load_config(None, Some(PathBuf::from("/tmp/override.db"))).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/override.db"));
    }
}
