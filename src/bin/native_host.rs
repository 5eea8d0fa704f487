//! Native-messaging host launched by the browser extension.
//!
//! stdout is the message channel, so all logging goes to a file.

use anyhow::{Context, Result};
use extensions_bridge::NativeHost;
use formfill::telemetry::{host_log_dir, init_file_logging};
use formfill::{AppConfig, BrowserRequestHandler};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _guard = init_file_logging(&host_log_dir(), "info")?;
    info!("Starting formfill native host v{}", formfill::long_version());

    let config = AppConfig::load(None).context("Failed to load configuration")?;
    let handler = BrowserRequestHandler::new(config);

    let mut host = NativeHost::new(tokio::io::stdin(), tokio::io::stdout());
    match host.serve(&handler).await {
        Ok(summary) => {
            info!(
                handled = summary.handled,
                failed = summary.failed,
                "Native host exiting"
            );
            Ok(())
        }
        Err(err) => {
            error!(%err, "Native host stream failed");
            Err(err).context("Native messaging stream failed")
        }
    }
}
