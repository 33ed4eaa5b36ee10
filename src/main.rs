use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use dataset_insight::insight::MockInsightService;
use dataset_insight::{
    Config, FsBlobStore, InsightService, ItemStore, OpenAiClient, OutputFormat, ParserRegistry,
    Pipeline, PromptStrategy, RetryingService, SqliteItemStore, UploadEvent, default_codec,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Augment uploaded datasets with language-model insights
#[derive(Parser)]
#[command(name = "dataset-insight", version)]
struct Cli {
    /// Debug-level logs for this crate
    #[arg(long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process one uploaded object from a directory-backed bucket layout
    Process(ProcessArgs),
    /// List supported input extensions and output formats
    Formats,
}

#[derive(Args)]
struct ProcessArgs {
    /// Directory holding one sub-directory per bucket
    #[arg(long)]
    root: PathBuf,

    /// Upload event JSON file
    #[arg(long, conflicts_with_all = ["bucket", "key"])]
    event: Option<PathBuf>,

    /// Source bucket, used with --key instead of --event
    #[arg(long, requires = "key")]
    bucket: Option<String>,

    /// Source object key
    #[arg(long, requires = "bucket")]
    key: Option<String>,

    /// SQLite file receiving items when an item table is configured
    #[arg(long)]
    items_db: Option<PathBuf>,

    /// Overrides OUTPUT_BUCKET_NAME
    #[arg(long)]
    output_bucket: Option<String>,

    /// Overrides OUTPUT_FORMAT
    #[arg(long)]
    output_format: Option<OutputFormat>,

    /// Overrides PROMPT_STRATEGY
    #[arg(long)]
    strategy: Option<PromptStrategy>,

    /// Answer prompts locally instead of calling the insight service
    #[arg(long)]
    offline: bool,
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "dataset_insight=debug,info"
        } else {
            "info"
        })
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    match cli.command {
        Command::Process(args) => process(args).await,
        Command::Formats => {
            formats();
            Ok(())
        }
    }
}

async fn process(args: ProcessArgs) -> Result<()> {
    let bucket_override = args.output_bucket.clone();
    let mut config = Config::from_lookup(|var| match (var, &bucket_override) {
        ("OUTPUT_BUCKET_NAME", Some(bucket)) => Some(bucket.clone()),
        _ => std::env::var(var).ok(),
    })
    .context("Failed to load configuration")?;
    if let Some(format) = args.output_format {
        config.output_format = format;
    }
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }

    let event = match (&args.event, &args.bucket, &args.key) {
        (Some(path), _, _) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read event file {}", path.display()))?;
            UploadEvent::from_json(&bytes)?
        }
        (None, Some(bucket), Some(key)) => UploadEvent::single(bucket, key),
        _ => bail!("either --event or --bucket with --key is required"),
    };

    let insight: Arc<dyn InsightService> = if args.offline {
        info!("offline mode: insights are generated locally");
        Arc::new(MockInsightService::echo())
    } else {
        let client = OpenAiClient::new(&config.insight)?;
        info!(model = client.model(), "using insight service");
        Arc::new(RetryingService::new(client, config.insight.retry))
    };

    let items: Option<Arc<dyn ItemStore>> = match &args.items_db {
        Some(path) => Some(Arc::new(SqliteItemStore::open(&path.to_string_lossy())?)),
        None => None,
    };

    let blobs = Arc::new(FsBlobStore::new(&args.root));
    let pipeline = Pipeline::new(config, blobs, items, insight, default_codec())?;
    let outcome = pipeline.run(&event).await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn formats() {
    let registry = ParserRegistry::default();
    println!("input:  {}", registry.registered_extensions().join(", "));

    let mut outputs = vec![OutputFormat::Json, OutputFormat::Csv];
    if default_codec().is_some() {
        outputs.push(OutputFormat::Parquet);
    }
    let outputs: Vec<&str> = outputs.iter().map(OutputFormat::as_str).collect();
    println!("output: {}", outputs.join(", "));
}
