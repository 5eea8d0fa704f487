use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use cdp_adapter::CdpAdapter;
use clap::Parser;
use formfill::telemetry::init_logging;
use formfill::{AppConfig, PageSelection, RunReport, SubmissionPayload, Workflow};
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version = formfill::long_version(), about, long_about = None)]
struct Cli {
    /// Submission payload (JSON)
    #[arg(value_name = "PAYLOAD_JSON")]
    payload: PathBuf,

    /// Fill only this page
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=2))]
    page: Option<u8>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Remote debugging address of the running browser
    #[arg(long, value_name = "HOST:PORT")]
    debugger_addr: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable debug mode
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.debug)?;
    info!("Starting formfill v{}", formfill::long_version());

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(addr) = cli.debugger_addr {
        config.browser.debugger_addr = addr;
    }

    let payload = SubmissionPayload::from_path(&cli.payload)
        .with_context(|| format!("Failed to load payload {}", cli.payload.display()))?;
    let selection = PageSelection::from_page_number(cli.page)?;

    let adapter = CdpAdapter::attach(config.browser.clone())
        .await
        .with_context(|| {
            format!(
                "Failed to attach to the browser at {}",
                config.browser.debugger_addr
            )
        })?;

    match Workflow::new(Arc::new(adapter), config)
        .run(&payload, selection)
        .await
    {
        Ok(report) => {
            print_summary(&report);
            Ok(())
        }
        Err(failure) => {
            error!("Form filling failed: {}", failure.error);
            print_summary(&failure.partial);
            Err(failure.error.into())
        }
    }
}

fn print_summary(report: &RunReport) {
    let pages: Vec<String> = report
        .pages_completed
        .iter()
        .map(ToString::to_string)
        .collect();
    println!(
        "Pages completed: {}",
        if pages.is_empty() {
            "none".to_string()
        } else {
            pages.join(", ")
        }
    );
    println!("{}", report.stats);
    println!("Elapsed: {} ms", report.elapsed().num_milliseconds());
}
