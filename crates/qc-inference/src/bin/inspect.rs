//! qc-inspect: Command-line front end for grounded defect inspection.
//!
//! Lists the reference catalog, runs one image through the vision model
//! against designated sources, or extracts a report from saved reply text.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qc_inference::prompt::{TAG_CATEGORY, TAG_DEFECT_TYPE, TAG_EVIDENCE, TAG_RECOMMENDATIONS};
use qc_inference::{
    extract, AnalysisResult, DefectInspector, Error, GeminiVisionBackend, ImagePayload,
    InspectorConfig, ResponseMode, SessionContext, SourceCatalog, StaticSourceCatalog,
};

#[derive(Parser)]
#[command(name = "qc-inspect")]
#[command(author, version, about = "Grounded visual defect inspection")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the reference sources available for designation
    Sources {
        /// Only show sources whose name contains this text
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Inspect one image against the designated sources
    Analyze {
        /// Image file to inspect
        #[arg(short, long)]
        image: PathBuf,

        /// Reference source ids to designate (can specify multiple)
        #[arg(short, long = "source")]
        sources: Vec<String>,

        /// Request a schema-constrained JSON reply from the model
        #[arg(long)]
        structured: bool,

        /// Print the inspection record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract a report from saved model reply text
    Extract {
        /// File holding the reply text (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Try the reply as structured JSON before the tagged scan
        #[arg(long)]
        structured: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<Error>().and_then(Error::user_notice) {
                Some(notice) => {
                    tracing::debug!(error = %e, "Inspection ended with a user notice");
                    eprintln!("{}", notice);
                }
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so reports on stdout stay pipeable.
///
/// Environment variables:
///   LOG_FORMAT - "json" or "text" (default: "text")
///   RUST_LOG   - standard env filter (default: "qc_inference=info,qc_core=info")
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "qc_inference=info,qc_core=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Sources { query } => cmd_sources(query.as_deref()).await,
        Commands::Analyze {
            image,
            sources,
            structured,
            json,
        } => cmd_analyze(&image, sources, structured, json).await,
        Commands::Extract { input, structured } => cmd_extract(input.as_deref(), structured).await,
    }
}

async fn cmd_sources(query: Option<&str>) -> anyhow::Result<()> {
    let catalog = StaticSourceCatalog::demo();
    let sources = catalog.search(query.unwrap_or_default()).await?;

    if sources.is_empty() {
        println!("No matching sources.");
        return Ok(());
    }

    for source in sources {
        println!(
            "{:<6} {} {:<40} {:>8}  {}",
            source.id,
            source.kind.marker(),
            source.name,
            source.size.as_deref().unwrap_or("-"),
            source.last_modified.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

async fn cmd_analyze(
    image_path: &Path,
    source_ids: Vec<String>,
    structured: bool,
    json: bool,
) -> anyhow::Result<()> {
    let mut session = SessionContext::new();
    if !source_ids.is_empty() {
        let ids: HashSet<String> = source_ids.into_iter().collect();
        let sources = StaticSourceCatalog::demo().confirm_selection(&ids).await?;
        session.complete_setup(sources)?;
    }

    // Refuse before any file or network access.
    session.require_connected()?;

    let mut config = InspectorConfig::load().context("Failed to load inspector config")?;
    if structured {
        config.response_mode = ResponseMode::Structured;
    }

    let bytes = tokio::fs::read(image_path)
        .await
        .with_context(|| format!("Failed to read image {}", image_path.display()))?;
    let data_uri = ImagePayload::from_bytes(bytes)?.to_data_uri();

    let backend = GeminiVisionBackend::new(config.gemini_config())?;
    let inspector = DefectInspector::new(Arc::new(backend), config.inspector_settings());
    let record = inspector.inspect(&mut session, &data_uri).await?;

    if json {
        let summary = serde_json::json!({
            "id": record.id,
            "capturedAt": record.captured_at,
            "result": record.result,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{} ({})", record.id, record.captured_at.to_rfc3339());
        print_report(&record.result);
    }
    Ok(())
}

async fn cmd_extract(input: Option<&Path>, structured: bool) -> anyhow::Result<()> {
    let text = match input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("Failed to read stdin")?;
            buf
        }
    };

    let mode = if structured {
        ResponseMode::Structured
    } else {
        ResponseMode::Tagged
    };
    let extraction = extract(&text, mode);
    if !extraction.is_complete() {
        tracing::warn!(missing_fields = ?extraction.missing, "Sections missing from reply");
    }
    print_report(&extraction.result);
    Ok(())
}

fn print_report(result: &AnalysisResult) {
    println!("{}: {}", TAG_DEFECT_TYPE, result.defect_type);
    println!("{}: {}", TAG_CATEGORY, result.category);
    println!("{}: {}", TAG_EVIDENCE, result.evidence);
    println!("{}: {}", TAG_RECOMMENDATIONS, result.recommendations);
}
