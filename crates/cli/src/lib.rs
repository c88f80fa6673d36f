use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gis_analysis::{BufferAnalysisEngine, QueryPipeline};
use gis_catalog::{CatalogBuilder, CatalogMatcher};
use gis_layer_store::{LayerInfo, LayerStore};
use gis_protocol::{
    buffer_tool_declaration, serialize_json, serialize_json_pretty, ChatResponse, QueryParams,
};
use serde::Serialize;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

pub mod config;

use config::AppConfig;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "gis-query")]
#[command(about = "Answer proximity questions over local GIS layers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (overrides GIS_CONFIG; built-in defaults otherwise)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every layer folder under the data directory into the store
    Load(LoadArgs),

    /// Print the layer catalog, or rank layers against a term
    Catalog(CatalogArgs),

    /// Run a buffer analysis from explicit parameters
    Buffer(BufferArgs),

    /// Run a buffer analysis from a JSON query ({target_layer, buffer_layer, distance, unit})
    Query(QueryArgs),

    /// Answer a natural-language proximity question
    Ask(AskArgs),

    /// Print the buffer_analysis tool declaration
    Schema,
}

#[derive(Args)]
struct LoadArgs {
    /// Data directory to scan (overrides the configured one)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Args)]
struct CatalogArgs {
    /// Rank layer names against this term instead of printing the catalog
    #[arg(long = "match", value_name = "TERM")]
    term: Option<String>,
}

#[derive(Args)]
struct BufferArgs {
    /// Layer whose features are selected
    #[arg(long)]
    target: String,

    /// Layer whose features are buffered
    #[arg(long)]
    buffer: String,

    /// Buffer distance
    #[arg(long, allow_negative_numbers = true)]
    distance: f64,

    /// miles, kilometers, meters or feet
    #[arg(long)]
    unit: String,
}

#[derive(Args)]
struct QueryArgs {
    /// Inline JSON query (mutually exclusive with --file; stdin when neither)
    #[arg(long, conflicts_with = "file")]
    json: Option<String>,

    /// Path to file containing the JSON query
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Args)]
struct AskArgs {
    /// The question, e.g. "schools within 1 mile of pipelines"
    question: String,
}

#[derive(Serialize)]
struct LoadOutput {
    loaded: usize,
    layers: Vec<LayerInfo>,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = AppConfig::load(cli.config.as_deref())?;
    log::debug!("Effective config: {config:?}");

    let store = Arc::new(
        LayerStore::open(&config.store_dir)
            .with_context(|| format!("Failed to open store {}", config.store_dir.display()))?,
    );
    let pipeline = QueryPipeline::new(
        BufferAnalysisEngine::with_projection(Arc::clone(&store), config.projection),
        CatalogBuilder::new(&config.tokenizer, config.synonyms.clone()),
    );

    match cli.command {
        Commands::Load(args) => {
            let data_dir = args.data_dir.unwrap_or_else(|| config.data_dir.clone());
            let loaded = store
                .load_all(&data_dir)
                .with_context(|| format!("Failed to load layers from {}", data_dir.display()))?;
            let output = LoadOutput {
                loaded,
                layers: store.layer_infos()?,
            };
            emit(&output, cli.pretty)
        }
        Commands::Catalog(args) => {
            let catalog = pipeline.catalog();
            match args.term {
                Some(term) => {
                    let ranked = CatalogMatcher::new().rank(&term, &catalog);
                    emit(&ranked, cli.pretty)
                }
                None => emit(&catalog, cli.pretty),
            }
        }
        Commands::Buffer(args) => {
            let question = format!(
                "{} within {} {} of {}",
                args.target, args.distance, args.unit, args.buffer
            );
            let candidate = QueryParams::new(args.target, args.buffer, args.distance, args.unit);
            let response = pipeline.run_candidate(&question, candidate).await;
            emit(&response, cli.pretty)
        }
        Commands::Query(args) => {
            let raw = read_query(&args)?;
            let response = match serde_json::from_str::<QueryParams>(&raw) {
                Ok(candidate) => pipeline.run_candidate(&raw, candidate).await,
                Err(err) => {
                    log::warn!("Rejected query JSON: {err}");
                    ChatResponse::message_only(format!("Could not read the query: {err}"))
                }
            };
            emit(&response, cli.pretty)
        }
        Commands::Ask(args) => {
            let response = pipeline.answer(&args.question).await;
            emit(&response, cli.pretty)
        }
        Commands::Schema => emit(&buffer_tool_declaration()?, cli.pretty),
    }
}

fn read_query(args: &QueryArgs) -> Result<String> {
    if let Some(json) = &args.json {
        return Ok(json.clone());
    }
    if let Some(path) = &args.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read query file {}", path.display()));
    }
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read query from stdin")?;
    Ok(buffer)
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serialize_json_pretty(value)?
    } else {
        serialize_json(value)?
    };
    print_stdout(&text)
}
