use color_eyre::{Result, eyre::WrapErr};
use std::{fs, path::Path};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, prelude::*, util::SubscriberInitExt};

pub const LOG_ENV: &str = "PRESALE_TUI_LOG";
const DEFAULT_FILTER: &str = "presale_tui=info";

/// Routes tracing output to a daily rolling file under `dir`. The terminal is
/// owned by the UI, so nothing is written to stdout.
pub fn setup_tracing(dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(dir)
        .wrap_err_with(|| format!("failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(dir, "presale-tui.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(filter);

    tracing_subscriber::registry().with(file_layer).try_init()?;

    Ok(guard)
}
