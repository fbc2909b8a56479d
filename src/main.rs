use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;

use nexaris_file_parser::logging::{ENV_LOG_FILE, init_logging, level_from_env};
use nexaris_file_parser::{Limits, start_server};

fn main() -> Result<()> {
    let log_file = std::env::var_os(ENV_LOG_FILE).map(PathBuf::from);
    init_logging(level_from_env(), log_file.as_deref())?;

    // Read once; shared read-only with every request
    let limits = Arc::new(Limits::from_env());

    let rt = Runtime::new().context("Failed to create Tokio runtime")?;

    rt.block_on(async { start_server(limits).await })?;

    Ok(())
}
