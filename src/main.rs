use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tannoy_gateway::{Config, Daemon};

/// Tannoy - push-to-talk voice gateway for networked speakers
#[derive(Parser)]
#[command(name = "tannoy", version, about)]
struct Cli {
    /// TCP port for audio intake
    #[arg(long, env = "TANNOY_TCP_PORT")]
    tcp_port: Option<u16>,

    /// HTTP port for artifact serving
    #[arg(long, env = "TANNOY_HTTP_PORT")]
    http_port: Option<u16>,

    /// Speaker IP address (skips discovery)
    #[arg(short, long, env = "TANNOY_SPEAKER")]
    speaker: Option<String>,

    /// Directory for synthesized artifacts
    #[arg(long, env = "TANNOY_ARTIFACT_DIR")]
    artifact_dir: Option<std::path::PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,tannoy_gateway=info",
        1 => "info,tannoy_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    // CLI flags override file and defaults
    if let Some(port) = cli.tcp_port {
        config.tcp_port = port;
    }
    if let Some(port) = cli.http_port {
        config.http_port = port;
    }
    if let Some(speaker) = cli.speaker {
        config.speaker_addr = Some(speaker);
    }
    if let Some(dir) = cli.artifact_dir {
        config.artifact_dir = dir;
    }

    tracing::info!(
        tcp_port = config.tcp_port,
        http_port = config.http_port,
        speaker = ?config.speaker_addr,
        "starting tannoy gateway"
    );

    Daemon::new(config).run().await?;

    Ok(())
}
