use std::sync::Arc;

use anyhow::Result;

use vigil::config::LogConfig;
use vigil::guardian::Guardian;
use vigil::logging::{Level, Logger};

#[tokio::main]
async fn main() -> Result<()> {
    // Build the six level sinks once, before anything logs
    let logger = Arc::new(Logger::new(LogConfig::default())?);

    // Crash handling must be in place before any real work starts
    let guardian = Guardian::new(Arc::clone(&logger));
    guardian.install();

    if let Some(path) = logger.current_segment() {
        logger.verbose(&format!("Logging to {}", path.display()));
    }

    // One line per level, demonstrating the fixed level -> color table
    for level in Level::ALL {
        logger.log(level, &format!("sample {} line", level));
    }

    logger.info("vigil running, press Ctrl-C to exit");

    // Park forever; the guardian owns termination
    std::future::pending::<()>().await;
    Ok(())
}
