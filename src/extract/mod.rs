//! Stage 1: prompt cards in a static HTML page → checkpoint C1.
//!
//! Every card with the required fields becomes a row. Cards with an image get
//! it downloaded into the images directory under a collision-safe name; a
//! failed download only blanks that row's `local_image_path`.

mod cards;
mod naming;

pub use cards::{parse_cards, CardOutcome, CardSelectors};
pub use naming::{base_filename, sanitize_filename, AssetNamer};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use indicatif::ProgressBar;
use tracing::{info, warn};

use crate::checkpoint;
use crate::error::{PipelineError, Result};
use crate::http_client::ImageFetcher;
use crate::models::{ExtractedRow, PromptRecord, RequiredField};

/// Result of acquiring one card's image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    /// Saved at this path (as stored in the checkpoint).
    Downloaded(String),
    /// The card has no image URL.
    NoImage,
    Failed(String),
}

impl AssetOutcome {
    pub fn local_path(&self) -> &str {
        match self {
            Self::Downloaded(path) => path,
            Self::NoImage | Self::Failed(_) => "",
        }
    }
}

/// A card that did not become a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCard {
    /// Position of the card in the document, starting at 1.
    pub position: usize,
    pub title: String,
    pub missing: RequiredField,
}

/// Everything the extractor produced in one run.
#[derive(Debug, Clone, Default)]
pub struct ExtractReport {
    pub cards_seen: usize,
    pub rows: Vec<ExtractedRow>,
    pub skipped: Vec<SkippedCard>,
    pub downloaded: usize,
    pub download_failures: usize,
}

impl ExtractReport {
    /// Number of distinct categories among extracted rows.
    pub fn category_count(&self) -> usize {
        self.top_categories(usize::MAX).len()
    }

    /// Categories by descending row count (ties alphabetical), at most `limit`.
    pub fn top_categories(&self, limit: usize) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for row in &self.rows {
            *counts.entry(row.category.as_str()).or_default() += 1;
        }
        let mut sorted: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(category, count)| (category.to_string(), count))
            .collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        sorted.truncate(limit);
        sorted
    }
}

/// Drives stage 1.
pub struct Extractor<'a, F: ImageFetcher + ?Sized> {
    fetcher: &'a F,
    selectors: CardSelectors,
    namer: AssetNamer,
    project_root: PathBuf,
    progress: ProgressBar,
}

impl<'a, F: ImageFetcher + ?Sized> Extractor<'a, F> {
    pub fn new(
        fetcher: &'a F,
        selectors: CardSelectors,
        images_dir: impl Into<PathBuf>,
        project_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            selectors,
            namer: AssetNamer::new(images_dir),
            project_root: project_root.into(),
            progress: ProgressBar::hidden(),
        }
    }

    /// Report per-card progress on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Read `html_path`, extract, and write the checkpoint to `output`.
    pub async fn run(&self, html_path: &Path, output: &Path) -> Result<ExtractReport> {
        if !html_path.exists() {
            return Err(PipelineError::MissingInput(html_path.to_path_buf()));
        }
        let html = tokio::fs::read_to_string(html_path).await?;

        let report = self.extract(&html).await;
        checkpoint::write_rows(output, ExtractedRow::COLUMNS, &report.rows)?;
        info!(
            "Extracted {} prompts from {} cards into {}",
            report.rows.len(),
            report.cards_seen,
            output.display()
        );
        Ok(report)
    }

    /// Extract every card in `html`, downloading images one at a time.
    pub async fn extract(&self, html: &str) -> ExtractReport {
        let outcomes = parse_cards(html, &self.selectors);
        let mut report = ExtractReport {
            cards_seen: outcomes.len(),
            ..Default::default()
        };
        self.progress.set_length(outcomes.len() as u64);

        for (index, outcome) in outcomes.into_iter().enumerate() {
            let position = index + 1;
            match outcome {
                CardOutcome::Skipped { title, missing } => {
                    warn!(
                        "Skipping card {} ({:?}): missing {}",
                        position, title, missing
                    );
                    report.skipped.push(SkippedCard {
                        position,
                        title,
                        missing,
                    });
                }
                CardOutcome::Extracted(record) => {
                    self.progress.set_message(record.title.clone());
                    let asset = self.acquire_asset(&record).await;
                    match &asset {
                        AssetOutcome::Downloaded(_) => report.downloaded += 1,
                        AssetOutcome::Failed(_) => report.download_failures += 1,
                        AssetOutcome::NoImage => {}
                    }
                    let local = asset.local_path().to_string();
                    report.rows.push(ExtractedRow::new(record, local));
                }
            }
            self.progress.inc(1);
        }

        self.progress.finish_and_clear();
        report
    }

    /// Download the card's image to a fresh path.
    pub async fn acquire_asset(&self, record: &PromptRecord) -> AssetOutcome {
        if record.image_url.is_empty() {
            return AssetOutcome::NoImage;
        }

        let path = self
            .namer
            .next_path(&record.image_url, &record.title, Utc::now());

        match self.download_to(&record.image_url, &path).await {
            Ok(()) => {
                let stored = self.checkpoint_path(&path);
                info!("Downloaded image for {:?}: {}", record.title, stored);
                AssetOutcome::Downloaded(stored)
            }
            Err(e) => {
                warn!("Error downloading image {}: {}", record.image_url, e);
                AssetOutcome::Failed(e.to_string())
            }
        }
    }

    async fn download_to(&self, url: &str, path: &Path) -> Result<()> {
        let bytes = self.fetcher.fetch(url).await?;
        tokio::fs::create_dir_all(self.namer.dir()).await?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    /// Path as recorded in the checkpoint: relative to the project root when
    /// the image lives under it.
    fn checkpoint_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.project_root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectorConfig;
    use crate::http_client::ImageFetcher;
    use async_trait::async_trait;
    use tempfile::tempdir;

    struct StaticFetcher;

    #[async_trait]
    impl ImageFetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            if url.contains("broken") {
                Err(PipelineError::Status {
                    status: 404,
                    body: "not found".to_string(),
                })
            } else {
                Ok(b"\x89PNG".to_vec())
            }
        }
    }

    fn card(title: &str, category: &str, img: &str) -> String {
        format!(
            r#"<div class="bg-white rounded-xl overflow-hidden shadow-lg flex flex-col h-full">
                 <img src="{img}" alt="alt">
                 <span class="bg-blue-500 rounded-full">{category}</span>
                 <h3 class="text-lg font-bold">{title}</h3>
                 <p class="whitespace-pre-wrap">prompt for {title}</p>
               </div>"#
        )
    }

    fn extractor<'a>(fetcher: &'a StaticFetcher, root: &Path) -> Extractor<'a, StaticFetcher> {
        let selectors = CardSelectors::from_config(&SelectorConfig::default()).unwrap();
        Extractor::new(fetcher, selectors, root.join("images"), root)
    }

    #[tokio::test]
    async fn test_downloads_are_stored_relative_to_root() {
        let dir = tempdir().unwrap();
        let fetcher = StaticFetcher;
        let report = extractor(&fetcher, dir.path())
            .extract(&card("A", "Cat", "https://cdn.example.com/a.png"))
            .await;

        assert_eq!(report.downloaded, 1);
        let local = &report.rows[0].local_image_path;
        assert!(local.starts_with("images"));
        assert!(dir.path().join(local).exists());
    }

    #[tokio::test]
    async fn test_download_failure_keeps_the_row() {
        let dir = tempdir().unwrap();
        let fetcher = StaticFetcher;
        let html = format!(
            "{}{}",
            card("A", "Cat", "https://cdn.example.com/broken.png"),
            card("B", "Dog", "")
        );
        let report = extractor(&fetcher, dir.path()).extract(&html).await;

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.download_failures, 1);
        assert_eq!(report.downloaded, 0);
        assert!(report.rows.iter().all(|r| r.local_image_path.is_empty()));
    }

    #[tokio::test]
    async fn test_top_categories() {
        let dir = tempdir().unwrap();
        let fetcher = StaticFetcher;
        let html = format!(
            "{}{}{}",
            card("A", "Dog", ""),
            card("B", "Cat", ""),
            card("C", "Dog", "")
        );
        let report = extractor(&fetcher, dir.path()).extract(&html).await;

        assert_eq!(report.category_count(), 2);
        assert_eq!(
            report.top_categories(1),
            vec![("Dog".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn test_missing_html_is_fatal() {
        let dir = tempdir().unwrap();
        let fetcher = StaticFetcher;
        let err = extractor(&fetcher, dir.path())
            .run(&dir.path().join("missing.html"), &dir.path().join("c1.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput(_)));
    }
}
