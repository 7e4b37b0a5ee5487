use anyhow::Result;
use clap::Parser;
use forum_thread_filter::cli::{self, Cli, Commands, Report};
use forum_thread_filter::config::Config;
use forum_thread_filter::error::FilterError;
use forum_thread_filter::preferences::preference_kind;
use forum_thread_filter::presentation::LogPresenter;
use forum_thread_filter::session::ThreadFilter;
use forum_thread_filter::state::{FilterState, StateStore};
use forum_thread_filter::store::JsonFileStore;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Exit with proper code on error
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        eprintln!("\nFor help, run: thread-filter --help");
        process::exit(1);
    }
}

async fn open_state(config: &Config) -> Result<FilterState<JsonFileStore>> {
    let store = JsonFileStore::load(&config.store.path).await?;
    let store = StateStore::new(store, &config.store.module_id);
    Ok(FilterState::load(store, config.store.user_id.as_deref()))
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing with level based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("forum_thread_filter=debug,info"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("forum_thread_filter=info,warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    if let Commands::InitConfig { output, force } = &cli.command {
        tracing::info!("Generating example configuration file");

        if output.exists() && !force {
            return Err(FilterError::ConfigError(format!(
                "Configuration file already exists at {:?}. Use --force to overwrite.",
                output
            ))
            .into());
        }

        Config::create_example(output).await?;

        println!("Created example configuration file at: {:?}", output);
        println!("\nKey settings to review:");
        println!("  - store.path: JSON file holding preferences, favorites and hidden threads");
        println!("  - store.user_id: forum user id, to migrate favorites saved by older versions");
        println!("  - quick_filter.debounce_ms: delay before a typed query is applied");
        return Ok(());
    }

    let mut config = Config::load(&cli.config).await?;
    if let Some(store) = cli.store {
        config.store.path = store;
    }

    match cli.command {
        Commands::Classify { rows, page } => {
            let mut snapshot = cli::load_snapshot(&rows).await?;
            if let Some(page) = page {
                snapshot.page = page.into();
            }

            let state = open_state(&config).await?;
            let mut filter = ThreadFilter::new(state, LogPresenter::new(), &config.quick_filter);
            let summary = filter.load(&snapshot);

            print!("{}", Report::from_filter(&filter, summary).to_text());
            Ok(())
        }

        Commands::Filter { rows, query } => {
            let snapshot = cli::load_snapshot(&rows).await?;

            let state = open_state(&config).await?;
            let mut filter = ThreadFilter::new(state, LogPresenter::new(), &config.quick_filter);
            let summary = filter.load(&snapshot);
            let visible = filter.apply_quick_filter(&query)?;

            print!("{}", Report::from_filter(&filter, summary).to_text());
            println!("\n{} thread(s) match '{}'", visible, query);
            Ok(())
        }

        Commands::Favorite { id } => {
            let mut state = open_state(&config).await?;
            if state.is_hidden(id) && !state.is_favorite(id) {
                return Err(FilterError::InvalidTransition(format!(
                    "thread {} is hidden and cannot be marked as favorite",
                    id
                ))
                .into());
            }

            if state.toggle_favorite(id) {
                println!("Thread {} added to favorites", id);
            } else {
                println!("Thread {} removed from favorites", id);
            }
            Ok(())
        }

        Commands::Hide { id } => {
            let mut state = open_state(&config).await?;
            if state.toggle_hidden(id) {
                println!("Thread {} hidden", id);
            } else {
                println!("Thread {} no longer hidden", id);
            }
            Ok(())
        }

        Commands::Set { key, value } => {
            let mut state = open_state(&config).await?;
            forum_thread_filter::preferences::set_preference(state.store_mut(), &key, &value)?;
            println!("{} = {}", key, value);
            Ok(())
        }

        Commands::Get { key } => {
            if preference_kind(&key).is_none() {
                return Err(FilterError::ConfigError(format!("Unknown preference: {}", key)).into());
            }

            let state = open_state(&config).await?;
            match state.store().get_raw(&key) {
                Some(value) => println!("{} = {}", key, value),
                None => println!("{} is not set", key),
            }
            Ok(())
        }

        Commands::InitConfig { .. } => Ok(()),
    }
}
