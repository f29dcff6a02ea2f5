use anyhow::Context;
use clap::Parser;

use tower_lsp::{LspService, Server};

use tracing::{debug, info};

use hanami_language_server::logging::init_logger;
use hanami_language_server::lsp::backend::HanamiBackend;

#[derive(Parser, Debug)]
#[command(
    name = "hanami-language-server",
    version,
    about = "Go-to-definition for Hanami Deps and slices, over LSP on stdio"
)]
struct Args {
    /// Log level for stderr (overrides RUST_LOG), e.g. "debug" or "hanami_language_server=trace"
    #[arg(long = "log-level")]
    log_level: Option<String>,

    /// Disable ANSI colors in stderr output.
    #[arg(long = "no-color")]
    no_color: bool,

    /// Do not write a per-session log file to the user cache directory.
    #[arg(long = "no-file-logging")]
    no_file_logging: bool,

    /// Serve over stdin/stdout. Accepted for editor compatibility; stdio is the only transport.
    #[arg(long)]
    stdio: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = init_logger(args.no_color, args.log_level.as_deref(), !args.no_file_logging)
        .context("failed to initialize logging")?;

    info!("Starting {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    if args.stdio {
        debug!("--stdio given; serving on stdin/stdout");
    }

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(HanamiBackend::new);

    Server::new(stdin, stdout, socket)
        .serve(service)
        .await;

    info!("Server stopped");
    Ok(())
}
