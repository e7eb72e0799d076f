use clap::Parser;
use color_eyre::eyre::Result;
use std::io::{self, Write};
use tracing::{error, info, warn};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use videotree_config::Settings;
use videotree_core::{AggregateError, TraversalSession};

mod cli;
mod render;
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Install error hooks
    color_eyre::install()?;

    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        return Err(e);
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    use std::env;

    let log_dir = env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("videotree.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&log_path)?;

    let writer = if verbose {
        BoxMakeWriter::new(log_file.and(io::stderr))
    } else {
        BoxMakeWriter::new(log_file)
    };

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_env_filter("videotree=debug,info")
        .with_target(true)
        .with_line_number(true)
        .with_thread_ids(false)
        .init();

    info!("Starting videotree...");
    info!("Log file: {}", log_path.display());
    info!("Working directory: {}", env::current_dir()?.display());

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path).await?,
        None => Settings::load().await?,
    };
    cli.apply(&mut settings);

    let session = TraversalSession::open(&cli.path, &settings)?;
    let cancel = session.cancel_handle();
    let mut walk = session.spawn();

    let result = tokio::select! {
        result = &mut walk => result?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, cancelling session {}", session.id());
            cancel.cancel();
            walk.await?
        }
    };

    let traversal = match result {
        Ok(traversal) => traversal,
        Err(AggregateError::Cancelled) => {
            eprintln!("Cancelled");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut stdout = io::stdout().lock();
    if cli.json {
        render::write_json(&mut stdout, &traversal)?;
    } else {
        render::write_tree(&mut stdout, &traversal)?;
    }
    stdout.flush()?;

    render::write_summary(&mut io::stderr().lock(), &traversal)?;
    Ok(())
}
