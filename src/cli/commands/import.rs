//! Stage 3: batched import.

use std::path::Path;

use console::style;

use crate::api::AdminApiClient;
use crate::config::Settings;
use crate::import::{verify_listing, BatchStatus, Importer};

use super::path_or;
use super::verify::{print_listing, VERIFY_SAMPLE};

/// Import the promoted checkpoint in batches and reconcile the totals.
pub async fn cmd_import(
    settings: &Settings,
    input: Option<&Path>,
    batch_size: Option<usize>,
    dry_run: bool,
    verify: bool,
) -> anyhow::Result<()> {
    let input = path_or(input, &settings.promoted_checkpoint);
    let batch_size = match batch_size {
        Some(0) => anyhow::bail!("--batch-size must be at least 1"),
        Some(size) => size,
        None => settings.batch_size,
    };

    let api = AdminApiClient::from_settings(settings)?;
    let importer = Importer::new(&api, batch_size);
    let prepared = importer.load(&input)?;

    println!(
        "{} {} rows in {}: {} ready, {} skipped",
        style("→").cyan(),
        prepared.total_rows,
        input.display(),
        prepared.prompts.len(),
        prepared.skipped.len()
    );
    for skipped in &prepared.skipped {
        println!(
            "  {} row {}: {}",
            style("!").yellow(),
            skipped.line,
            skipped.reason
        );
    }

    if prepared.prompts.is_empty() {
        println!("{} Nothing to import", style("!").yellow());
        return Ok(());
    }

    if dry_run {
        let plan = importer.plan(&prepared.prompts);
        println!(
            "{} Dry run: {} batches of up to {}",
            style("→").cyan(),
            plan.len(),
            batch_size
        );
        for (i, size) in plan.iter().enumerate() {
            println!("  batch {}: {} prompts", i + 1, size);
        }
        return Ok(());
    }

    let report = importer.submit(prepared).await;

    for batch in &report.batches {
        if let BatchStatus::Failed(reason) = &batch.status {
            println!(
                "  {} batch {} ({} prompts): {}",
                style("✗").red(),
                batch.number,
                batch.size,
                reason
            );
        }
    }

    println!("\n{}", style("Import summary").bold());
    println!("  {:<12} {}", "Submitted:", report.submitted);
    println!("  {:<12} {}", "Succeeded:", style(report.success).green());
    println!("  {:<12} {}", "Failed:", style(report.failure).red());
    if !report.errors.is_empty() {
        println!("\n{}", style("Backend errors").bold());
        for error in &report.errors {
            println!("  - {}", error);
        }
    }
    if !report.is_reconciled() {
        println!(
            "{} Reported totals do not add up to the {} prompts submitted ({} unaccounted)",
            style("!").yellow(),
            report.submitted,
            report.unaccounted()
        );
    }

    if !report.is_success() {
        anyhow::bail!(
            "{} of {} prompts were not imported",
            report.not_imported(),
            report.submitted
        );
    }

    println!("{} All {} prompts imported", style("✓").green(), report.success);

    if verify {
        match verify_listing(&api, VERIFY_SAMPLE).await {
            Ok(summary) => print_listing(&summary),
            Err(e) => println!("{} Listing check failed: {}", style("!").yellow(), e),
        }
    }

    Ok(())
}
