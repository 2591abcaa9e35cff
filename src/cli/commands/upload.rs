//! Stage 2: asset promotion.

use std::path::Path;

use console::style;
use indicatif::ProgressBar;

use crate::api::AdminApiClient;
use crate::config::Settings;
use crate::promote::AssetPromoter;

use super::path_or;

/// Upload every downloaded image and write the promoted checkpoint.
pub async fn cmd_upload(
    settings: &Settings,
    input: Option<&Path>,
    output: Option<&Path>,
    progress: ProgressBar,
) -> anyhow::Result<()> {
    let input = path_or(input, &settings.extracted_checkpoint);
    let output = path_or(output, &settings.promoted_checkpoint);

    println!(
        "{} Uploading images listed in {} to {}",
        style("→").cyan(),
        input.display(),
        settings.api_base
    );

    let api = AdminApiClient::from_settings(settings)?;
    let promoter = AssetPromoter::new(&api, &settings.project_root).with_progress(progress);
    let report = promoter.run(&input, &output).await?;

    println!(
        "{} Wrote {} rows to {}",
        style("✓").green(),
        report.rows.len(),
        output.display()
    );
    println!("  {:<16} {}", "Uploaded:", report.uploaded);
    println!("  {:<16} {}", "No image:", report.no_asset);
    if report.missing_files > 0 {
        println!(
            "  {:<16} {}",
            "Missing files:",
            style(report.missing_files).yellow()
        );
    }
    if report.failed > 0 {
        println!("  {:<16} {}", "Failed:", style(report.failed).red());
    }

    Ok(())
}
