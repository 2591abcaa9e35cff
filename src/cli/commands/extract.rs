//! Stage 1: page extraction.

use std::path::Path;

use console::style;
use indicatif::ProgressBar;

use crate::config::Settings;
use crate::extract::{CardSelectors, Extractor};
use crate::http_client::HttpClient;

use super::path_or;

const TOP_CATEGORIES: usize = 10;

/// Extract prompt cards and download their images.
pub async fn cmd_extract(
    settings: &Settings,
    html: Option<&Path>,
    output: Option<&Path>,
    progress: ProgressBar,
) -> anyhow::Result<()> {
    let html_path = path_or(html, &settings.source_html);
    let output = path_or(output, &settings.extracted_checkpoint);

    println!(
        "{} Extracting prompts from {}",
        style("→").cyan(),
        html_path.display()
    );

    let fetcher = HttpClient::new(settings.download_timeout, &settings.user_agent)?;
    let selectors = CardSelectors::from_config(&settings.selectors)?;
    let extractor = Extractor::new(
        &fetcher,
        selectors,
        &settings.images_dir,
        &settings.project_root,
    )
    .with_progress(progress);

    let report = extractor.run(&html_path, &output).await?;

    if report.rows.is_empty() {
        println!(
            "{} No prompts extracted from {} cards",
            style("!").yellow(),
            report.cards_seen
        );
        return Ok(());
    }

    println!(
        "{} Wrote {} prompts to {}",
        style("✓").green(),
        report.rows.len(),
        output.display()
    );
    println!("  {:<20} {}", "Cards found:", report.cards_seen);
    println!("  {:<20} {}", "Cards skipped:", report.skipped.len());
    println!("  {:<20} {}", "Categories:", report.category_count());
    println!("  {:<20} {}", "Images downloaded:", report.downloaded);
    if report.download_failures > 0 {
        println!(
            "  {:<20} {}",
            "Download failures:",
            style(report.download_failures).red()
        );
    }

    for skipped in &report.skipped {
        println!(
            "  {} card {} ({}): missing {}",
            style("!").yellow(),
            skipped.position,
            if skipped.title.is_empty() {
                "untitled"
            } else {
                skipped.title.as_str()
            },
            skipped.missing
        );
    }

    println!("\n{}", style("Top categories").bold());
    for (category, count) in report.top_categories(TOP_CATEGORIES) {
        println!("  {:<30} {}", category, count);
    }

    Ok(())
}
