mod cli;
mod config;
mod dispatch;
mod error;
mod local_k8s;

use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use cli::PodCli;
use config::Config;
use dispatch::ExecDispatcher;
use error::Error;
use local_k8s::KubeSession;

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let default = if verbose { "kube_select_exec=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))
}

async fn run(config: Config) -> error::Result<()> {
    let session = KubeSession::connect(&config.session).await?;

    // Nothing cancels this yet; a hung remote command hangs the tool.
    let cancel = CancellationToken::new();
    let mut stdout = tokio::io::stdout();
    let mut stderr = tokio::io::stderr();

    ExecDispatcher::new(&session)
        .dispatch(&config.target, &mut stdout, &mut stderr, &cancel)
        .await
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = PodCli::parse();
    init_logging(cli.verbose)?;

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return Ok(ExitCode::from(e.exit_code()));
        }
    };

    match run(config).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(Error::RemoteExit { status }) => {
            tracing::debug!("remote command exited with status {}", status);
            Ok(ExitCode::from(Error::RemoteExit { status }.exit_code()))
        }
        Err(e) => {
            if e.is_session_setup() {
                tracing::error!("could not establish cluster session: {}", e);
            } else {
                tracing::error!("{}", e);
            }
            Ok(ExitCode::from(e.exit_code()))
        }
    }
}
