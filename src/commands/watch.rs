use crate::WatcherContext;
use crate::config::LogLevel;
use crate::lock::OutputLock;
use crate::logging;
use crate::output::FileSink;
use crate::tracker;
use anyhow::{Context, Result};
use std::sync::mpsc;
use tracing::{debug, info};

/// Execute watch command - keep the output listing current until interrupted
///
/// Holds the output lock for the whole session. Returns once SIGINT has been
/// received and the tracker has stopped.
///
/// # Errors
///
/// Returns an error if:
/// - The log file cannot be opened
/// - Another watcher holds the output lock
/// - A watch root cannot be subscribed
/// - The initial snapshot cannot be written
pub fn execute(ctx: &WatcherContext, verbose: bool) -> Result<()> {
    let settings = &ctx.settings;
    let level = if verbose {
        LogLevel::Debug
    } else {
        settings.log_level
    };
    logging::init(&settings.log_path, level).context("Failed to initialize logging")?;
    debug!(
        config = %ctx.config_path.display(),
        log = %settings.log_path.display(),
        %level,
        "Configuration loaded"
    );

    let lock = OutputLock::acquire(&settings.output_path)?;
    debug!(lock = %lock.path().display(), "Output lock acquired");

    let (interrupt_tx, interrupt_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = interrupt_tx.send(());
    })
    .context("Failed to install interrupt handler")?;

    let handle = tracker::start(
        settings.roots.clone(),
        settings.recursive,
        FileSink::new(settings.output_path.clone()),
    )?;
    for root in handle.roots() {
        info!(
            recursive = settings.recursive,
            "Watching {}",
            root.display()
        );
    }

    // A closed channel means the handler is gone; stop the same way.
    let _ = interrupt_rx.recv();
    info!("Received interrupt signal. Stopping observer...");

    handle.stop();
    drop(lock);
    Ok(())
}
