//! randwiki CLI
//!
//! Command-line interface for randwiki - random Wikipedia articles, a reading
//! log and saved links.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use randwiki_core::{Config, Session};

mod commands;
mod editor;
mod output;

use commands::roll::PickAction;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "randwiki")]
#[command(about = "randwiki - Random Wikipedia articles, a reading log and saved links")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick a random article
    Roll {
        /// Sources: category keys, `my_links`, or `linklist:<id>`
        sources: Vec<String>,
        /// Use the sources of a saved preset
        #[arg(short, long, conflicts_with = "sources")]
        preset: Option<String>,
        /// Log the picked article
        #[arg(long, conflicts_with = "reading")]
        log: bool,
        /// Add the picked article to the reading queue
        #[arg(long)]
        reading: bool,
        /// Open the picked article in the browser
        #[arg(long)]
        open: bool,
    },
    /// List the available categories
    Categories,
    /// Manage the read log
    Log {
        #[command(subcommand)]
        command: Option<LogCommands>,
    },
    /// Manage saved links
    Links {
        #[command(subcommand)]
        command: Option<LinkCommands>,
    },
    /// Manage link lists
    Lists {
        #[command(subcommand)]
        command: Option<ListCommands>,
    },
    /// Manage source presets
    Presets {
        #[command(subcommand)]
        command: Option<PresetCommands>,
    },
    /// Manage the currently-reading queue
    Reading {
        #[command(subcommand)]
        command: Option<ReadingCommands>,
    },
    /// Log in to the account backend
    Login {
        username: Option<String>,
        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and log in
    Register {
        username: Option<String>,
        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Log out of the account backend
    Logout,
    /// Show session and collection status
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum LogCommands {
    /// Show the read log
    #[command(alias = "ls")]
    List,
    /// Log an article by URL
    Add {
        url: String,
        /// Title (derived from the URL when omitted)
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// Category key
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Set the notes of an entry (opens editor if no text given)
    Note {
        /// Entry number as shown by `log list`
        index: usize,
        text: Option<String>,
    },
    /// Rename an entry
    Title { index: usize, title: String },
    /// Remove an entry
    #[command(alias = "remove")]
    Rm { index: usize },
    /// Move an entry to the reading queue
    ToReading { index: usize },
    /// Move an entry to saved links
    ToLinks { index: usize },
}

#[derive(Subcommand)]
enum LinkCommands {
    /// Show saved links
    #[command(alias = "ls")]
    List,
    /// Save links (comma-separated URLs)
    Add {
        urls: String,
        /// Also add the links to this list (id or name)
        #[arg(short, long)]
        list: Vec<String>,
    },
    /// Set the notes of a link (opens editor if no text given)
    Note { index: usize, text: Option<String> },
    /// Rename a link; without a title the derived title is restored
    Title { index: usize, title: Option<String> },
    /// Remove a link
    #[command(alias = "remove")]
    Rm { index: usize },
    /// Move a link to the reading queue
    ToReading { index: usize },
    /// Move a link to the read log
    ToLog { index: usize },
}

#[derive(Subcommand)]
enum ListCommands {
    /// Show link lists
    #[command(alias = "ls")]
    List,
    /// Show the links of a list
    Show { list: String },
    /// Create a list
    Create { name: String },
    /// Rename a list
    Rename { list: String, name: String },
    /// Delete a list (its links stay saved)
    #[command(alias = "rm")]
    Delete { list: String },
    /// Add a URL to a list
    Add { list: String, url: String },
    /// Remove a URL from a list
    Remove { list: String, url: String },
    /// Add or remove a URL
    Toggle { list: String, url: String },
}

#[derive(Subcommand)]
enum PresetCommands {
    /// Show presets
    #[command(alias = "ls")]
    List,
    /// Save sources as a preset
    Save {
        name: String,
        /// Sources: category keys, `my_links`, or `linklist:<id>`
        #[arg(required = true)]
        sources: Vec<String>,
    },
    /// Delete a preset
    #[command(alias = "rm")]
    Delete { name: String },
}

#[derive(Subcommand)]
enum ReadingCommands {
    /// Show the reading queue
    #[command(alias = "ls")]
    List,
    /// Queue an article by URL
    Add {
        url: String,
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// Category key
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Remove an entry
    #[command(alias = "remove")]
    Rm { index: usize },
    /// Move an entry to the read log
    ToLog { index: usize },
    /// Move an entry to saved links
    ToLinks { index: usize },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, api_url, wiki_api_url, wiki_base_url,
        /// default_sources, storage_quota_bytes, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands work without a session
    if let Commands::Config { command } = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(&output),
            Some(ConfigCommands::Set { key, value }) => commands::config::set(key, value, &output),
        };
    }

    let config = Config::load().context("Failed to load configuration")?;
    init_logging(&config, cli.verbose);

    let mut session = Session::open(&config);
    session.probe().await;

    let result = run(cli.command, &mut session, &config, &output).await;

    // Write-behind pushes must land before the process exits
    session.flush().await;
    result
}

async fn run(
    command: Commands,
    session: &mut Session,
    config: &Config,
    output: &Output,
) -> Result<()> {
    match command {
        Commands::Roll {
            sources,
            preset,
            log,
            reading,
            open,
        } => {
            let action = PickAction::from_flags(log, reading);
            commands::roll::roll(session, config, sources, preset, action, open, output).await
        }
        Commands::Categories => commands::roll::categories(output),
        Commands::Log { command } => handle_log_command(command, session, output),
        Commands::Links { command } => handle_link_command(command, session, output),
        Commands::Lists { command } => handle_list_command(command, session, output),
        Commands::Presets { command } => handle_preset_command(command, session, output),
        Commands::Reading { command } => handle_reading_command(command, session, output),
        Commands::Login { username, password } => {
            commands::auth::login(session, username, password, output).await
        }
        Commands::Register { username, password } => {
            commands::auth::register(session, username, password, output).await
        }
        Commands::Logout => commands::auth::logout(session, output).await,
        Commands::Status => commands::status::show(session, config, output),
        Commands::Config { .. } => unreachable!(), // Handled in main
    }
}

fn handle_log_command(
    command: Option<LogCommands>,
    session: &mut Session,
    output: &Output,
) -> Result<()> {
    use commands::log;

    match command {
        Some(LogCommands::List) | None => log::list(session, output),
        Some(LogCommands::Add {
            url,
            title,
            category,
        }) => log::add(session, url, title, category, output),
        Some(LogCommands::Note { index, text }) => log::note(session, index, text, output),
        Some(LogCommands::Title { index, title }) => log::title(session, index, title, output),
        Some(LogCommands::Rm { index }) => log::remove(session, index, output),
        Some(LogCommands::ToReading { index }) => log::to_reading(session, index, output),
        Some(LogCommands::ToLinks { index }) => log::to_links(session, index, output),
    }
}

fn handle_link_command(
    command: Option<LinkCommands>,
    session: &mut Session,
    output: &Output,
) -> Result<()> {
    use commands::links;

    match command {
        Some(LinkCommands::List) | None => links::list(session, output),
        Some(LinkCommands::Add { urls, list }) => links::add(session, urls, list, output),
        Some(LinkCommands::Note { index, text }) => links::note(session, index, text, output),
        Some(LinkCommands::Title { index, title }) => links::title(session, index, title, output),
        Some(LinkCommands::Rm { index }) => links::remove(session, index, output),
        Some(LinkCommands::ToReading { index }) => links::to_reading(session, index, output),
        Some(LinkCommands::ToLog { index }) => links::to_log(session, index, output),
    }
}

fn handle_list_command(
    command: Option<ListCommands>,
    session: &mut Session,
    output: &Output,
) -> Result<()> {
    use commands::lists;

    match command {
        Some(ListCommands::List) | None => lists::list(session, output),
        Some(ListCommands::Show { list }) => lists::show(session, list, output),
        Some(ListCommands::Create { name }) => lists::create(session, name, output),
        Some(ListCommands::Rename { list, name }) => lists::rename(session, list, name, output),
        Some(ListCommands::Delete { list }) => lists::delete(session, list, output),
        Some(ListCommands::Add { list, url }) => lists::add_url(session, list, url, output),
        Some(ListCommands::Remove { list, url }) => lists::remove_url(session, list, url, output),
        Some(ListCommands::Toggle { list, url }) => lists::toggle_url(session, list, url, output),
    }
}

fn handle_preset_command(
    command: Option<PresetCommands>,
    session: &mut Session,
    output: &Output,
) -> Result<()> {
    use commands::presets;

    match command {
        Some(PresetCommands::List) | None => presets::list(session, output),
        Some(PresetCommands::Save { name, sources }) => {
            presets::save(session, name, sources, output)
        }
        Some(PresetCommands::Delete { name }) => presets::delete(session, name, output),
    }
}

fn handle_reading_command(
    command: Option<ReadingCommands>,
    session: &mut Session,
    output: &Output,
) -> Result<()> {
    use commands::reading;

    match command {
        Some(ReadingCommands::List) | None => reading::list(session, output),
        Some(ReadingCommands::Add {
            url,
            title,
            category,
        }) => reading::add(session, url, title, category, output),
        Some(ReadingCommands::Rm { index }) => reading::remove(session, index, output),
        Some(ReadingCommands::ToLog { index }) => reading::to_log(session, index, output),
        Some(ReadingCommands::ToLinks { index }) => reading::to_links(session, index, output),
    }
}

/// Initialize logging
///
/// `RUST_LOG` wins when set; otherwise warnings only, or debug with
/// `--verbose`. Logs go to `config.log_file` when set, stderr otherwise.
fn init_logging(config: &Config, verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("randwiki_core={},randwiki_cli={}", level, level))
    });

    if let Some(ref log_path) = config.log_file {
        match OpenOptions::new().create(true).append(true).open(log_path) {
            Ok(file) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(env_filter)
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .try_init();
                return;
            }
            Err(e) => {
                eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            }
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
