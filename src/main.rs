use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use paper_catalog::api::{ApiClient, PaperApi};
use paper_catalog::config::{
    find_config_file, load_config, parse_header_arg, write_config_file, Config,
    LOCAL_CONFIG_FILE,
};
use paper_catalog::models::{
    ExternalCandidate, Paper, PaperDraft, PaperUpdate, DEFAULT_SEARCH_LIMIT,
};
use paper_catalog::ui::list::{LoadState, RETRY_LABEL};
use paper_catalog::ui::terminal::{self, Spinner, Status};
use paper_catalog::ui::{html, render_card, App};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Paper Catalog - manage your research papers from the terminal
#[derive(Parser, Debug)]
#[command(name = "paper-catalog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Manage a personal catalog of research papers", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog service endpoint (overrides the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Extra request header, e.g. -H "Authorization: Bearer xyz"
    #[arg(short = 'H', long = "header", global = true, value_parser = parse_header_arg)]
    headers: Vec<(String, String)>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List stored papers (default)
    #[command(alias = "ls")]
    List,

    /// Show one paper
    Show {
        /// Paper ID
        id: i64,
    },

    /// Add a paper to the catalog
    Add {
        #[arg(long)]
        title: String,
        #[command(flatten)]
        fields: PaperFields,
    },

    /// Update fields of a stored paper
    #[command(alias = "edit")]
    Update {
        /// Paper ID
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: PaperFields,
    },

    /// Delete a paper
    #[command(alias = "rm")]
    Delete {
        /// Paper ID
        id: i64,
    },

    /// Search OpenAlex for papers to import
    #[command(alias = "s")]
    Search {
        /// Search query string
        query: String,

        /// Maximum number of results
        #[arg(long, short, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },

    /// Import a paper from OpenAlex
    Import {
        /// OpenAlex work ID (e.g. W2194775991 or https://openalex.org/W2194775991)
        openalex_id: String,

        /// Personal notes to attach
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Open a paper's URL in the browser
    Open {
        /// Paper ID
        id: i64,
    },

    /// Write the paper list as a standalone HTML page
    Export {
        /// Output file
        path: PathBuf,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

/// Optional paper fields shared by `add` and `update`
#[derive(clap::Args, Debug, Default)]
struct PaperFields {
    #[arg(long)]
    authors: Option<String>,
    #[arg(long)]
    year: Option<i32>,
    #[arg(long = "abstract")]
    abstract_text: Option<String>,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long)]
    url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Write a default configuration file
    Init {
        /// Where to write it (default: the user config directory)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_path) = resolve_config(&cli)?;

    // Initialize tracing based on verbosity
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("paper_catalog={}", level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let format = resolve_format(cli.output);
    let command = cli.command.unwrap_or(Commands::List);

    if let Commands::Config { action } = command {
        return run_config(action, &config);
    }

    let api: Arc<dyn PaperApi> = Arc::new(ApiClient::new(&config.api)?);
    tracing::debug!(base_url = %config.api.base_url, "catalog client ready");

    match command {
        Commands::List => run_list(api, format).await?,

        Commands::Show { id } => {
            let paper = api.get_paper(id).await?;
            output_paper(&paper, format)?;
        }

        Commands::Add { title, fields } => {
            let draft = draft_from(title, fields);
            let paper = api.create_paper(&draft).await?;
            if format != OutputFormat::Json {
                terminal::print_status(Status::Success, format!("Added paper #{}", paper.id));
            }
            output_paper(&paper, format)?;
        }

        Commands::Update { id, title, fields } => {
            let update = update_from(title, fields);
            if update.is_empty() {
                bail!("Nothing to update; pass at least one field");
            }
            let paper = api.update_paper(id, &update).await?;
            if format != OutputFormat::Json {
                terminal::print_status(Status::Success, format!("Updated paper #{}", paper.id));
            }
            output_paper(&paper, format)?;
        }

        Commands::Delete { id } => {
            api.delete_paper(id).await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::json!({ "deleted": id })),
                _ => terminal::print_status(Status::Success, format!("Deleted paper #{}", id)),
            }
        }

        Commands::Search { query, limit } => {
            let spinner = spinner_for(format, &format!("Searching OpenAlex for \"{}\"...", query));
            let result = api.search_external_index(&query, limit).await;
            if let Some(spinner) = spinner {
                spinner.finish();
            }
            output_candidates(&result?, format)?;
        }

        Commands::Import { openalex_id, notes } => {
            let spinner = spinner_for(format, &format!("Importing {}...", openalex_id));
            let result = api.import_from_external_index(&openalex_id, &notes).await;
            if let Some(spinner) = spinner {
                spinner.finish();
            }
            let paper = result?;
            if format != OutputFormat::Json {
                terminal::print_status(
                    Status::Success,
                    format!("Imported \"{}\" as paper #{}", paper.title, paper.id),
                );
            }
            output_paper(&paper, format)?;
        }

        Commands::Open { id } => {
            let paper = api.get_paper(id).await?;
            let card = render_card(&paper);
            let Some(link) = card.link else {
                bail!("Paper #{} has no URL", id);
            };
            link.open()
                .with_context(|| format!("Failed to open {}", link.href))?;
            terminal::print_status(Status::Info, format!("Opened {}", link.href));
        }

        Commands::Export { path } => {
            let (app, initial) = App::mount(api);
            initial.await?;
            if let LoadState::Error(message) = app.list().state() {
                bail!("Failed to load papers: {}", message);
            }
            let page = html::render_page(&app.view()).context("Failed to render HTML")?;
            tokio::fs::write(&path, page)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            terminal::print_status(Status::Success, format!("Wrote {}", path.display()));
        }

        Commands::Config { .. } => unreachable!(),
    }

    Ok(())
}

/// Load config from the file (explicit or discovered), then apply CLI overrides
fn resolve_config(cli: &Cli) -> Result<(Config, Option<PathBuf>)> {
    let path = cli.config.clone().or_else(find_config_file);
    let mut config = load_config(path.as_deref()).with_context(|| match &path {
        Some(path) => format!("Failed to load config from {}", path.display()),
        None => "Failed to load config from the environment".to_string(),
    })?;

    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.api.timeout_secs = Some(timeout);
    }
    for (name, value) in &cli.headers {
        config.api.headers.insert(name.clone(), value.clone());
    }

    Ok((config, path))
}

fn resolve_format(format: OutputFormat) -> OutputFormat {
    if format == OutputFormat::Auto {
        if terminal::is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    } else {
        format
    }
}

fn spinner_for(format: OutputFormat, msg: &str) -> Option<Spinner> {
    (format == OutputFormat::Table && terminal::is_terminal()).then(|| Spinner::new(msg))
}

fn draft_from(title: String, fields: PaperFields) -> PaperDraft {
    PaperDraft {
        title,
        authors: fields.authors,
        year: fields.year,
        r#abstract: fields.abstract_text,
        notes: fields.notes,
        url: fields.url,
    }
}

fn update_from(title: Option<String>, fields: PaperFields) -> PaperUpdate {
    PaperUpdate {
        title,
        authors: fields.authors,
        year: fields.year,
        r#abstract: fields.abstract_text,
        notes: fields.notes,
        url: fields.url,
    }
}

/// Mount the shell, show it, and offer a retry while the load keeps failing
async fn run_list(api: Arc<dyn PaperApi>, format: OutputFormat) -> Result<()> {
    let interactive = format != OutputFormat::Json
        && terminal::is_terminal()
        && std::io::stdin().is_terminal();

    let (app, initial) = App::mount(api);
    let spinner = spinner_for(format, paper_catalog::ui::list::LOADING_MESSAGE);
    initial.await?;
    if let Some(spinner) = spinner {
        spinner.finish();
    }

    loop {
        let state = app.list().state();
        output_list(&app, &state, format)?;

        let LoadState::Error(message) = state else {
            return Ok(());
        };
        if !interactive || !prompt_retry().await? {
            bail!("Failed to load papers: {}", message);
        }

        let Some(retry) = app.list().retry() else {
            continue;
        };
        let spinner = spinner_for(format, paper_catalog::ui::list::LOADING_MESSAGE);
        retry.await?;
        if let Some(spinner) = spinner {
            spinner.finish();
        }
    }
}

async fn prompt_retry() -> Result<bool> {
    print!("{}? [y/N] ", RETRY_LABEL);
    std::io::stdout().flush()?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;
    Ok(matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn output_list(app: &App, state: &LoadState, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            if let LoadState::Ready(papers) = state {
                println!("{}", serde_json::to_string_pretty(papers)?);
            }
        }
        OutputFormat::Plain => match state {
            LoadState::Ready(papers) if !papers.is_empty() => {
                for paper in papers {
                    println!("{}", render_card(paper));
                }
            }
            LoadState::Error(message) => eprintln!("Error: {}", message),
            _ => {
                if let paper_catalog::ui::ListView::Empty { message } = app.view().main {
                    println!("{}", message);
                }
            }
        },
        _ => terminal::print_app(&app.view()),
    }
    Ok(())
}

fn output_paper(paper: &Paper, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(paper)?),
        OutputFormat::Plain => print!("{}", render_card(paper)),
        _ => terminal::print_card(&render_card(paper)),
    }
    Ok(())
}

fn output_candidates(candidates: &[ExternalCandidate], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(candidates)?),
        OutputFormat::Plain => {
            for candidate in candidates {
                println!(
                    "{}\t{}\t{}",
                    candidate.work_id(),
                    candidate.title.as_deref().unwrap_or("(untitled)"),
                    candidate.year.map(|y| y.to_string()).unwrap_or_default()
                );
            }
        }
        _ => {
            if candidates.is_empty() {
                terminal::print_status(Status::Search, "No results");
            } else {
                println!("{}", terminal::candidates_table(candidates));
            }
        }
    }
    Ok(())
}

fn run_config(action: ConfigCommand, config: &Config) -> Result<()> {
    match action {
        ConfigCommand::Show => {
            print!("{}", toml::to_string_pretty(config)?);
        }
        ConfigCommand::Init { path, force } => {
            let path = path
                .or_else(|| dirs::config_dir().map(|d| d.join("paper-catalog").join("config.toml")))
                .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE));
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            write_config_file(&Config::default(), &path)?;
            terminal::print_status(Status::Success, format!("Wrote {}", path.display()));
        }
    }
    Ok(())
}
