use crate::infra::LeadSettings;
use crate::report::{run_export, run_report, ExportArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use lead_quality::config::AppConfig;
use lead_quality::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Lead Quality Analytics",
    about = "Synthesize lead populations and serve quality and marketing analytics",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print analytics views for a synthesized population or CSV snapshot
    Report(ReportArgs),
    /// Write a synthesized population to a CSV snapshot
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(&offline_settings()?, args),
        Command::Export(args) => run_export(&offline_settings()?, args),
    }
}

/// Offline commands only need the engine defaults; tracing stays quiet unless
/// `RUST_LOG` asks for it.
fn offline_settings() -> Result<LeadSettings, AppError> {
    let config = AppConfig::load()?;
    if std::env::var_os("RUST_LOG").is_some() {
        lead_quality::telemetry::init(&config.telemetry)?;
    }
    Ok(LeadSettings::new(config.engine))
}
