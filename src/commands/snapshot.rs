use crate::WatcherContext;
use crate::lock::OutputLock;
use crate::logging;
use crate::output::{FileSink, SnapshotSink};
use crate::snapshot::Snapshot;
use crate::tracker::report_problems;
use anyhow::{Context, Result};
use tracing::level_filters::LevelFilter;

/// Execute snapshot command - write the listing once and exit
///
/// With `to_stdout` the listing is printed and the output file is left alone.
///
/// # Errors
///
/// Returns an error if:
/// - Another watcher holds the output lock
/// - The output file cannot be written
pub fn execute(ctx: &WatcherContext, to_stdout: bool, verbose: bool) -> Result<()> {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    logging::init_console(default_level).context("Failed to initialize logging")?;

    let settings = &ctx.settings;
    let mut sink = FileSink::new(settings.output_path.clone());
    let mut snapshot = Snapshot::new(settings.roots.clone(), settings.recursive);
    snapshot.exclude(sink.artifacts());
    report_problems(snapshot.rebuild_all());

    if to_stdout {
        let rendered = snapshot.render();
        if !rendered.is_empty() {
            println!("{rendered}");
        }
        return Ok(());
    }

    let _lock = OutputLock::acquire(&settings.output_path)?;
    let lines = snapshot.lines();
    sink.write_snapshot(&lines)?;

    super::print_success(&format!(
        "Wrote {} entries to {}",
        lines.len(),
        settings.output_path.display()
    ));
    if lines.is_empty() {
        super::print_info("Watch roots are empty");
    }
    Ok(())
}
