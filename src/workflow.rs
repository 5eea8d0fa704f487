//! Page sequencing for a full submission.

use std::fmt;
use std::sync::Arc;

use cdp_adapter::Cdp;
use chrono::{DateTime, Utc};
use formfill_core_types::RunStats;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::errors::{FormFillError, FormFillResult};
use crate::field_map::FormLayout;
use crate::pages::{fill_installation_address, fill_personal_details, PageContext};
use crate::payload::SubmissionPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormPage {
    PersonalDetails,
    InstallationAddress,
}

impl FormPage {
    pub fn number(&self) -> u8 {
        match self {
            FormPage::PersonalDetails => 1,
            FormPage::InstallationAddress => 2,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(FormPage::PersonalDetails),
            2 => Some(FormPage::InstallationAddress),
            _ => None,
        }
    }
}

impl fmt::Display for FormPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormPage::PersonalDetails => write!(f, "page 1 (personal details)"),
            FormPage::InstallationAddress => write!(f, "page 2 (installation address)"),
        }
    }
}

/// Which pages a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSelection {
    #[default]
    All,
    Only(FormPage),
}

impl PageSelection {
    /// `None` selects every page.
    pub fn from_page_number(page: Option<u8>) -> FormFillResult<Self> {
        match page {
            None => Ok(PageSelection::All),
            Some(number) => FormPage::from_number(number)
                .map(PageSelection::Only)
                .ok_or_else(|| FormFillError::Payload(format!("page must be 1 or 2, got {number}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub pages_completed: Vec<FormPage>,
    pub stats: RunStats,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Fail-fast failure that still carries what was done before it.
#[derive(Debug)]
pub struct WorkflowFailure {
    pub error: FormFillError,
    pub partial: RunReport,
}

impl fmt::Display for WorkflowFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.error, self.partial.stats)
    }
}

impl std::error::Error for WorkflowFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

pub struct Workflow {
    port: Arc<dyn Cdp>,
    config: AppConfig,
    layout: FormLayout,
}

impl Workflow {
    pub fn new(port: Arc<dyn Cdp>, config: AppConfig) -> Self {
        Self::with_layout(port, config, FormLayout::rvo())
    }

    pub fn with_layout(port: Arc<dyn Cdp>, config: AppConfig, layout: FormLayout) -> Self {
        Self {
            port,
            config,
            layout,
        }
    }

    /// Fill the selected pages in order.
    ///
    /// A single page is filled in place and only page 2 presses "next" on
    /// its own; a full run presses "next" after each page.
    pub async fn run(
        &self,
        payload: &SubmissionPayload,
        selection: PageSelection,
    ) -> Result<RunReport, WorkflowFailure> {
        let started_at = Utc::now();
        let mut ctx = PageContext::new(self.port.clone(), &self.config);
        let mut completed = Vec::new();

        let outcome = self
            .run_pages(&mut ctx, payload, selection, &mut completed)
            .await;
        let report = RunReport {
            pages_completed: completed,
            stats: ctx.stats(),
            started_at,
            finished_at: Utc::now(),
        };

        match outcome {
            Ok(()) => {
                info!(stats = %report.stats, pages = report.pages_completed.len(), "Workflow complete");
                Ok(report)
            }
            Err(error) => {
                error!(%error, stats = %report.stats, "Workflow aborted");
                Err(WorkflowFailure {
                    error,
                    partial: report,
                })
            }
        }
    }

    async fn run_pages(
        &self,
        ctx: &mut PageContext,
        payload: &SubmissionPayload,
        selection: PageSelection,
        completed: &mut Vec<FormPage>,
    ) -> FormFillResult<()> {
        let personal = &self.layout.personal;
        let installation = &self.layout.installation;

        match selection {
            PageSelection::Only(FormPage::PersonalDetails) => {
                fill_personal_details(ctx, personal, payload.personal_details()?).await?;
                completed.push(FormPage::PersonalDetails);
            }
            PageSelection::Only(FormPage::InstallationAddress) => {
                fill_installation_address(ctx, installation, payload.installation_address()?)
                    .await?;
                ctx.click_next(&installation.next).await?;
                completed.push(FormPage::InstallationAddress);
            }
            PageSelection::All => {
                fill_personal_details(ctx, personal, payload.personal_details()?).await?;
                ctx.click_next(&personal.next).await?;
                completed.push(FormPage::PersonalDetails);

                fill_installation_address(ctx, installation, payload.installation_address()?)
                    .await?;
                ctx.click_next(&installation.next).await?;
                completed.push(FormPage::InstallationAddress);
            }
        }
        Ok(())
    }
}
