use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use log::LevelFilter;

pub const ENV_LOG_LEVEL: &str = "PARSER_LOG_LEVEL";
pub const ENV_LOG_FILE: &str = "PARSER_LOG_FILE";

/// Level from `PARSER_LOG_LEVEL`, `info` when unset or unknown
pub fn level_from_env() -> LevelFilter {
    std::env::var(ENV_LOG_LEVEL)
        .ok()
        .and_then(|value| LevelFilter::from_str(value.trim()).ok())
        .unwrap_or(LevelFilter::Info)
}

/// Install the global logger.
///
/// Stdout carries the MCP protocol, so records go to stderr and, when
/// `log_file` is given, to that file as well.
pub fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        // Parser backends are chatty below warn
        .level_for("lopdf", LevelFilter::Warn)
        .level_for("pdf_extract", LevelFilter::Warn)
        .chain(std::io::stderr());

    if let Some(path) = log_file {
        let file = fern::log_file(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        dispatch = dispatch.chain(file);
    }

    dispatch.apply().context("Logger already initialised")?;
    Ok(())
}
