//! Listing spot check.

use console::style;

use crate::api::AdminApiClient;
use crate::config::Settings;
use crate::import::{verify_listing, ListingSummary};

pub(super) const VERIFY_SAMPLE: usize = 3;

/// Fetch the public listing and show the first few prompts.
pub async fn cmd_verify(settings: &Settings, sample: usize) -> anyhow::Result<()> {
    let api = AdminApiClient::from_settings(settings)?;
    println!(
        "{} Checking prompts stored at {}",
        style("→").cyan(),
        api.base_url()
    );

    let summary = verify_listing(&api, sample).await?;
    print_listing(&summary);
    Ok(())
}

pub(super) fn print_listing(summary: &ListingSummary) {
    println!(
        "{} Backend lists {} prompts",
        style("✓").green(),
        summary.total
    );
    for (i, prompt) in summary.sample.iter().enumerate() {
        println!(
            "  {}. {} [{}]",
            i + 1,
            prompt.title.as_deref().unwrap_or("(untitled)"),
            prompt.category_name.as_deref().unwrap_or("-")
        );
    }
}
