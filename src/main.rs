use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use near_white::Tolerance;
use whiteout::api;
use whiteout::models::AppConfig;
use whiteout::rendering::PngOptions;
use whiteout::server;
use whiteout::services::{export_zip, FileOrchestrator};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

#[derive(Parser)]
#[command(name = "whiteout")]
#[command(about = "Strip near-white backgrounds from images to transparency")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Strip one image and write <processed_dir>/<stem>.png
    Strip {
        /// Input image (png, jpg, jpeg, gif, bmp)
        input: PathBuf,

        /// How far below 255 a channel may be and still count as white
        #[arg(short, long, allow_hyphen_values = true)]
        tolerance: Option<i64>,

        /// Do not keep a copy of the original in the archive directory
        #[arg(long)]
        no_archive: bool,
    },
    /// Bundle processed images into a zip file
    Export {
        /// Output zip path
        #[arg(short, long)]
        output: PathBuf,

        /// Processed file names; missing ones are skipped
        #[arg(required = true)]
        names: Vec<String>,
    },
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Whiteout API",
        description = "Strip near-white backgrounds from uploaded images",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(
        api::handle_upload,
        api::handle_process,
        api::handle_upload_file,
        api::handle_processed_file,
        api::handle_original_file,
        api::handle_download,
        api::handle_download_all,
    ),
    components(schemas(
        api::UploadForm,
        api::UploadResponse,
        api::ProcessItem,
        api::ProcessRequest,
        api::ProcessResult,
        api::ProcessResponse,
        api::ExportRequest,
        whiteout::services::StoredUpload,
    )),
    tags(
        (name = "Upload", description = "Stage images for processing"),
        (name = "Processing", description = "Background stripping"),
        (name = "Files", description = "Originals, results and downloads")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) => run_server().await,
        Some(Commands::Strip {
            input,
            tolerance,
            no_archive,
        }) => run_strip_command(&input, tolerance, !no_archive),
        Some(Commands::Export { output, names }) => run_export_command(&output, &names),
        None => {
            run_status_command();
            Ok(())
        }
    }
}

fn config_file() -> Option<PathBuf> {
    std::env::var("CONFIG_FILE").ok().map(PathBuf::from)
}

/// Minimal logging for CLI commands
fn init_cli_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "whiteout=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Strip a single image (no server needed)
fn run_strip_command(
    input: &Path,
    tolerance: Option<i64>,
    archive_original: bool,
) -> anyhow::Result<()> {
    init_cli_tracing();

    let config = AppConfig::load(config_file().as_deref());
    let tolerance = tolerance
        .map(Tolerance::saturating)
        .unwrap_or(Tolerance::new(config.default_tolerance));
    let orchestrator = FileOrchestrator::new(
        config.archive_dir.clone(),
        config.processed_dir.clone(),
        PngOptions {
            optimize: config.optimize_png,
        },
    );

    match orchestrator.process(input, tolerance, archive_original) {
        Ok(stored) => {
            println!("Processed {}", stored.processed.display());
            if let Some(archived) = stored.archived.filter(|_| stored.archived_now) {
                println!("Archived original to {}", archived.display());
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Write a zip of processed images
fn run_export_command(output: &Path, names: &[String]) -> anyhow::Result<()> {
    init_cli_tracing();

    let config = AppConfig::load(config_file().as_deref());
    let file = std::fs::File::create(output)?;
    let (report, _) = export_zip(&config.processed_dir, names, file)?;

    println!(
        "Wrote {} ({} {})",
        output.display(),
        report.written.len(),
        plural(report.written.len())
    );
    if !report.skipped.is_empty() {
        println!("\nSkipped {} not found:", report.skipped.len());
        for name in &report.skipped {
            println!("  - {name}");
        }
    }

    Ok(())
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        "file"
    } else {
        "files"
    }
}

/// Display status and configuration information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    // Config load warnings must reach stderr
    init_cli_tracing();

    let bind_addr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| format!("{DEFAULT_BIND_ADDR} (default)"));
    let config_path = config_file();

    // Header
    println!("Whiteout v{VERSION}");
    println!("Strip near-white backgrounds from images\n");

    // Environment variables section
    println!("Environment Variables:");
    println!("  BIND_ADDR   = {bind_addr}");
    println!(
        "  CONFIG_FILE = {}",
        config_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    );

    let config = AppConfig::load(config_path.as_deref());

    println!("\nConfiguration:");
    println!("  Upload dir:     {}", config.upload_dir.display());
    println!("  Archive dir:    {}", config.archive_dir.display());
    println!("  Processed dir:  {}", config.processed_dir.display());
    println!("  Tolerance:      {}", config.default_tolerance);
    println!("  Extensions:     {}", config.allowed_extensions.join(", "));
    println!("  Optimize PNG:   {}", config.optimize_png);

    let processed = std::fs::read_dir(&config.processed_dir)
        .map(|entries| entries.filter_map(Result::ok).count())
        .unwrap_or(0);
    println!("  Processed:      {processed} {}", plural(processed));

    // Commands section
    println!("\nCommands:");
    println!("  whiteout serve    Start the HTTP server");
    println!("  whiteout strip    Strip one image from the command line");
    println!("  whiteout export   Bundle processed images into a zip");
    println!("\nRun 'whiteout --help' for more details.");
}

/// Run the HTTP server
async fn run_server() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "whiteout=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let config = AppConfig::load(config_file().as_deref());

    tracing::info!(
        upload_dir = %config.upload_dir.display(),
        archive_dir = %config.archive_dir.display(),
        processed_dir = %config.processed_dir.display(),
        default_tolerance = config.default_tolerance,
        "Working directories configured"
    );

    let state = server::create_app_state(config)?;

    let app = server::build_router(state)
        // OpenAPI documentation (production only)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Whiteout server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
