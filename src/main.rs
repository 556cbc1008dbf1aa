use std::io::{self, IsTerminal};

use chrono::Local;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use graytail::app::AppContext;
use graytail::cli::options::{search_options, tail_enabled};
use graytail::cli::{commands, Cli};
use graytail::config::{expand_path, Config};
use graytail::tail::cancel_on_shutdown;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr so they never mix with log output
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref().map(expand_path);
    let config = Config::load(config_path.as_deref())?;

    let interactive = io::stdout().is_terminal();
    let options = search_options(&cli, Local::now().naive_local(), interactive)?;
    let mut ctx = AppContext::new(&config, options.output, options.color)?;

    let mut stdout = io::stdout();
    let cancel = CancellationToken::new();
    cancel_on_shutdown(cancel.clone());

    if cli.list_streams {
        commands::list_streams(&mut ctx, options.color, &mut stdout).await?;
    } else if tail_enabled(&cli) {
        commands::tail(&mut ctx, &options, cancel, &mut stdout).await?;
    } else {
        tokio::select! {
            result = commands::list_messages(&mut ctx, &options, &mut stdout) => result?,
            _ = cancel.cancelled() => {}
        }
    }

    Ok(())
}
