use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use stockline_common::observability::{init_logging, LogConfig, LogFormat};
use stockline_config::{StocklineConfig, StocklineConfigLoader};

mod pipeline;

#[derive(Parser)]
#[command(name = "stockline", about = "Inventory feed retrieval pipeline")]
struct Cli {
    /// YAML config file
    #[arg(short, long, default_value = "stockline.yaml")]
    config: PathBuf,
    /// Override the entry URL from config
    #[arg(long)]
    url: Option<String>,
    /// Override the local output path from config
    #[arg(long)]
    out: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: fetch the entry page, download the feed, print rows
    Run {
        /// Max records to print (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Fetch the entry page and print the extracted storage parameters
    Extract,
    /// Parse an already-downloaded local feed file
    Parse {
        /// Path to the local pipe-delimited feed
        path: PathBuf,
        /// Max records to print (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { limit } => {
            let cfg = load_config(&cli.config)?;
            init_logging(log_config(&cfg))?;

            let out = cli
                .out
                .unwrap_or_else(|| PathBuf::from(&cfg.output_path));
            let records =
                pipeline::run(&cfg, cli.url.as_deref(), &out, limit).await?;
            print_records(&records)?;
            tracing::info!(count = records.len(), out = %out.display(), "pipeline.done");
            Ok(())
        }
        Commands::Extract => {
            let cfg = load_config(&cli.config)?;
            init_logging(log_config(&cfg))?;

            let details = pipeline::fetch_entry_details(&cfg, cli.url.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&details)?);
            Ok(())
        }
        Commands::Parse { path, limit } => {
            init_logging(LogConfig::default())?;

            let file = std::fs::File::open(&path)?;
            let mut records = stockline_feed::read_records(file)?;
            if let Some(n) = limit {
                records.truncate(n);
            }
            print_records(&records)?;
            Ok(())
        }
    }
}

fn load_config(path: &PathBuf) -> Result<StocklineConfig> {
    let cfg = StocklineConfigLoader::new().with_file(path).load()?;
    Ok(cfg)
}

fn log_config(cfg: &StocklineConfig) -> LogConfig {
    LogConfig {
        log_dir: cfg.log.dir.as_ref().map(PathBuf::from),
        emit_stderr: cfg.log.stderr,
        format: match cfg.log.format.as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        },
        default_filter: cfg
            .log
            .filter
            .clone()
            .unwrap_or_else(|| "info".to_string()),
        ..Default::default()
    }
}

fn print_records(records: &[stockline_feed::InventoryRecord]) -> Result<()> {
    for record in records {
        println!("{}", serde_json::to_string(record)?);
    }
    Ok(())
}
