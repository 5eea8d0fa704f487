//! formfill library
//!
//! Fills the RVO eLoket subsidy form in a Chrome session that is already
//! logged in, either from a JSON payload on the command line or on request
//! of the browser extension through the native-messaging host.

pub mod config;
pub mod errors;
pub mod field_map;
pub mod filler;
pub mod host;
pub mod pages;
pub mod payload;
pub mod telemetry;
pub mod workflow;

pub use config::AppConfig;
pub use errors::{FormFillError, FormFillResult};
pub use field_map::FormLayout;
pub use filler::fill_form;
pub use host::BrowserRequestHandler;
pub use payload::SubmissionPayload;
pub use workflow::{FormPage, PageSelection, RunReport, Workflow, WorkflowFailure};

/// Version string with build metadata from `build.rs`.
pub fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("FORMFILL_GIT_HASH"),
        " ",
        env!("FORMFILL_BUILD_DATE"),
        ")"
    )
}
