//! CLI binary for drivetext.
//!
//! A thin shim over the library crate: `serve` runs the HTTP service,
//! `extract` runs the pipeline once and prints the text.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use drivetext::pipeline::fetch::spool_dir;
use drivetext::pipeline::ocr::OcrExtractor;
use drivetext::{DownloadStorage, DriveTextService, ExtractionStrategy, ServiceConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve both HTTP contracts on 0.0.0.0:5000
  drivetext serve

  # OCR deployment with an explicit engine path
  drivetext serve --strategy ocr --tesseract-cmd /usr/bin/tesseract

  # One-shot extraction to stdout
  drivetext extract https://drive.google.com/file/d/ABC123/view

  # JSON output with stats
  drivetext extract --json "https://drive.google.com/open?id=ABC123"

ENDPOINTS:
  POST /extract_text/   {"url": "<link>"}         → {"extracted_text": "..."}
  POST /extract-text    {"drive_link": "<link>"}  → {"success": true, "text": "..."}
  GET  /health                                    → {"status": "healthy", ...}

ENVIRONMENT VARIABLES:
  RUST_LOG                 Log filter (overrides -v / -q)
  PDFIUM_LIB_PATH          Directory containing libpdfium (ocr / auto strategies)
  DRIVETEXT_*              Every flag has a DRIVETEXT_ variable, see --help
"#;

/// Extract text from shared Google Drive documents.
#[derive(Parser, Debug)]
#[command(
    name = "drivetext",
    version,
    about = "Extract text from shared Google Drive documents",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DRIVETEXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DRIVETEXT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service.
    Serve(ServeArgs),
    /// Extract one document and print its text.
    Extract(ExtractArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind.
    #[arg(long, env = "DRIVETEXT_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(short, long, env = "DRIVETEXT_PORT", default_value_t = 5000)]
    port: u16,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Shared Drive link (…/file/d/<ID>/… or …?id=<ID>).
    link: String,

    /// Print the full ExtractionOutput as JSON instead of plain text.
    #[arg(long, env = "DRIVETEXT_JSON")]
    json: bool,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(Args, Debug)]
struct PipelineArgs {
    /// Extraction strategy: embedded, ocr, auto.
    #[arg(long, env = "DRIVETEXT_STRATEGY", value_enum, default_value = "embedded")]
    strategy: StrategyArg,

    /// Tesseract executable name or path.
    #[arg(long, env = "DRIVETEXT_TESSERACT_CMD", default_value = "tesseract")]
    tesseract_cmd: PathBuf,

    /// Tesseract language code(s), e.g. eng or eng+deu.
    #[arg(long, env = "DRIVETEXT_OCR_LANG", default_value = "eng")]
    ocr_lang: String,

    /// Rendering DPI for OCR (72–400). 72 is the page's intrinsic size.
    #[arg(long, env = "DRIVETEXT_OCR_DPI", default_value_t = 72,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    ocr_dpi: u32,

    /// Directory containing the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Spool downloads to temp files instead of memory.
    #[arg(long, env = "DRIVETEXT_SPOOL_TO_DISK")]
    spool_to_disk: bool,

    /// Directory for spool files (implies --spool-to-disk). Default: OS temp dir.
    #[arg(long, env = "DRIVETEXT_SPOOL_DIR")]
    spool_dir: Option<PathBuf>,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "DRIVETEXT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Reject documents larger than this many bytes.
    #[arg(long, env = "DRIVETEXT_MAX_BYTES")]
    max_bytes: Option<u64>,

    /// Base URL for direct downloads.
    #[arg(long, env = "DRIVETEXT_DRIVE_BASE_URL", default_value = drivetext::config::DEFAULT_DRIVE_BASE_URL)]
    drive_base_url: String,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum StrategyArg {
    Embedded,
    Ocr,
    Auto,
}

impl From<StrategyArg> for ExtractionStrategy {
    fn from(v: StrategyArg) -> Self {
        match v {
            StrategyArg::Embedded => ExtractionStrategy::Embedded,
            StrategyArg::Ocr => ExtractionStrategy::Ocr,
            StrategyArg::Auto => ExtractionStrategy::Auto,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The one-shot spinner already reports progress, so library INFO logs
    // are only shown for the server unless -v is given.
    let show_spinner = match &cli.command {
        Command::Extract(args) => !cli.quiet && !args.json,
        Command::Serve(_) => false,
    };
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_spinner {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve(args) => run_serve(args).await,
        Command::Extract(args) => run_extract(args, cli.quiet, show_spinner).await,
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = build_config(&args.pipeline)?;
    check_ocr_engine(&config);
    if let Some(dir) = spool_dir(&config.storage) {
        tracing::info!("Spooling downloads under {}", dir.display());
    }

    let service = DriveTextService::from_config(&config).context("Failed to build service")?;
    let addr = SocketAddr::new(args.host, args.port);
    drivetext::serve(addr, service)
        .await
        .with_context(|| format!("Server on {} failed", addr))?;
    Ok(())
}

async fn run_extract(args: ExtractArgs, quiet: bool, show_spinner: bool) -> Result<()> {
    let config = build_config(&args.pipeline)?;
    let service = DriveTextService::from_config(&config).context("Failed to build service")?;

    let spinner = show_spinner.then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_message(format!("Extracting with {} strategy…", service.strategy()));
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let result = service.extract(&args.link).await;
    if let Some(bar) = &spinner {
        bar.finish_and_clear();
    }
    let output = result.context("Extraction failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.text.as_bytes())
            .context("Failed to write to stdout")?;
        if !output.text.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    if !quiet && !args.json {
        eprintln!(
            "Extracted {} pages ({} bytes downloaded) in {}ms",
            output.page_count, output.stats.bytes_downloaded, output.stats.total_duration_ms
        );
    }

    Ok(())
}

/// Map CLI args to `ServiceConfig`.
fn build_config(args: &PipelineArgs) -> Result<ServiceConfig> {
    let storage = if args.spool_to_disk || args.spool_dir.is_some() {
        DownloadStorage::TempFile {
            dir: args.spool_dir.clone(),
        }
    } else {
        DownloadStorage::Memory
    };

    let mut builder = ServiceConfig::builder()
        .drive_base_url(&args.drive_base_url)
        .strategy(args.strategy.clone().into())
        .ocr_command(&args.tesseract_cmd)
        .ocr_language(&args.ocr_lang)
        .ocr_dpi(args.ocr_dpi)
        .storage(storage)
        .download_timeout_secs(args.download_timeout);

    if let Some(ref dir) = args.pdfium_lib {
        builder = builder.pdfium_library(dir);
    }
    if let Some(limit) = args.max_bytes {
        builder = builder.max_document_bytes(limit);
    }

    builder.build().context("Invalid configuration")
}

/// Warn at startup when the configured strategy needs tesseract and it is missing.
fn check_ocr_engine(config: &ServiceConfig) {
    if config.strategy == ExtractionStrategy::Embedded {
        return;
    }
    match OcrExtractor::new(config.ocr.clone()).probe() {
        Ok(version) => tracing::info!("OCR engine: {}", version),
        Err(e) => tracing::warn!("{}; OCR requests will fail until it is installed", e),
    }
}
