//! Stage 2: upload each downloaded image and record its short reference.
//!
//! Reads checkpoint C1 and writes C2 as a new file with one extra column,
//! `remote_reference`. Rows without a local image, or whose upload fails, get
//! an empty reference and are otherwise copied through untouched.

use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use tracing::{info, warn};

use crate::api::ContentApi;
use crate::checkpoint;
use crate::error::{PipelineError, Result};
use crate::models::{ExtractedRow, PromotedRow};
use crate::utils::encode_data_uri;

/// What happened to one row's image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromoteOutcome {
    Uploaded(String),
    /// The row has no local image path.
    NoAsset,
    /// The recorded path does not exist on disk.
    MissingFile(PathBuf),
    Failed(String),
}

impl PromoteOutcome {
    pub fn reference(&self) -> &str {
        match self {
            Self::Uploaded(reference) => reference,
            _ => "",
        }
    }
}

/// Tally of one promotion run.
#[derive(Debug, Clone, Default)]
pub struct PromoteReport {
    pub rows: Vec<PromotedRow>,
    pub uploaded: usize,
    pub no_asset: usize,
    pub missing_files: usize,
    pub failed: usize,
}

impl PromoteReport {
    fn record(&mut self, outcome: &PromoteOutcome) {
        match outcome {
            PromoteOutcome::Uploaded(_) => self.uploaded += 1,
            PromoteOutcome::NoAsset => self.no_asset += 1,
            PromoteOutcome::MissingFile(_) => self.missing_files += 1,
            PromoteOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Drives stage 2.
pub struct AssetPromoter<'a, A: ContentApi + ?Sized> {
    api: &'a A,
    project_root: PathBuf,
    progress: ProgressBar,
}

impl<'a, A: ContentApi + ?Sized> AssetPromoter<'a, A> {
    pub fn new(api: &'a A, project_root: impl Into<PathBuf>) -> Self {
        Self {
            api,
            project_root: project_root.into(),
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Promote every row of `input` and write the result to `output`.
    ///
    /// `output` must differ from `input`; C1 stays as a rollback point.
    pub async fn run(&self, input: &Path, output: &Path) -> Result<PromoteReport> {
        if same_file(input, output) {
            return Err(PipelineError::Config(format!(
                "refusing to overwrite input checkpoint {}",
                input.display()
            )));
        }

        let rows: Vec<ExtractedRow> = checkpoint::read_rows(input, ExtractedRow::COLUMNS)?;
        info!("Read {} rows from {}", rows.len(), input.display());

        let report = self.promote(rows).await;
        checkpoint::write_rows(output, PromotedRow::COLUMNS, &report.rows)?;
        info!("Saved promoted checkpoint to {}", output.display());
        Ok(report)
    }

    /// Upload images for `rows` in order, one request at a time.
    pub async fn promote(&self, rows: Vec<ExtractedRow>) -> PromoteReport {
        let mut report = PromoteReport::default();
        self.progress.set_length(rows.len() as u64);

        for (index, row) in rows.into_iter().enumerate() {
            let outcome = self.promote_row(index + 1, &row).await;
            report.record(&outcome);
            let reference = outcome.reference().to_string();
            report.rows.push(PromotedRow::from_extracted(row, reference));
            self.progress.inc(1);
        }

        self.progress.finish_and_clear();
        report
    }

    /// Upload one row's image. `line` is the 1-based row number for logging.
    pub async fn promote_row(&self, line: usize, row: &ExtractedRow) -> PromoteOutcome {
        if !row.has_local_image() {
            warn!("Row {}: no local image path", line);
            return PromoteOutcome::NoAsset;
        }

        let path = self.resolve_asset_path(&row.local_image_path);
        if !path.is_file() {
            warn!("Row {}: image file does not exist: {}", line, path.display());
            return PromoteOutcome::MissingFile(path);
        }

        self.progress.set_message(row.title.clone());
        info!("Row {}: uploading {}", line, path.display());

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Row {}: failed to read {}: {}", line, path.display(), e);
                return PromoteOutcome::Failed(e.to_string());
            }
        };
        let data_uri = encode_data_uri(&path, &bytes);

        match self.api.upload_image(&data_uri).await {
            Ok(reference) => {
                info!("Row {}: uploaded {} -> {}", line, path.display(), reference);
                PromoteOutcome::Uploaded(reference)
            }
            Err(e) => {
                warn!("Row {}: upload failed for {}: {}", line, path.display(), e);
                PromoteOutcome::Failed(e.to_string())
            }
        }
    }

    /// Relative paths are resolved against the project root, never the
    /// working directory.
    pub fn resolve_asset_path(&self, local: &str) -> PathBuf {
        let path = Path::new(local.trim());
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BatchResult, ImportPrompt, ListedPrompt};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingApi {
        uploads: Mutex<Vec<String>>,
        reject: bool,
    }

    #[async_trait]
    impl ContentApi for RecordingApi {
        async fn upload_image(&self, data_uri: &str) -> Result<String> {
            if self.reject {
                return Err(PipelineError::Api("code 500: oss down".to_string()));
            }
            let mut uploads = self.uploads.lock().unwrap();
            uploads.push(data_uri.to_string());
            Ok(format!("ref-{}", uploads.len()))
        }

        async fn submit_batch(&self, _prompts: &[ImportPrompt]) -> Result<BatchResult> {
            unreachable!("promoter never imports")
        }

        async fn list_prompts(&self) -> Result<Vec<ListedPrompt>> {
            unreachable!("promoter never lists")
        }
    }

    fn row(title: &str, local: &str) -> ExtractedRow {
        ExtractedRow {
            title: title.to_string(),
            category: "Cat".to_string(),
            prompt_text: "text".to_string(),
            image_url: "https://cdn.example.com/x.png".to_string(),
            image_alt: "alt".to_string(),
            local_image_path: local.to_string(),
        }
    }

    #[tokio::test]
    async fn test_uploads_relative_path_from_project_root() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images/a.png"), b"GIF89a").unwrap();

        let api = RecordingApi::default();
        let promoter = AssetPromoter::new(&api, dir.path());
        let outcome = promoter.promote_row(1, &row("A", "images/a.png")).await;

        assert_eq!(outcome, PromoteOutcome::Uploaded("ref-1".to_string()));
        assert_eq!(
            api.uploads.lock().unwrap()[0],
            "data:image/png;base64,R0lGODlh"
        );
    }

    #[tokio::test]
    async fn test_rows_without_asset_pass_through() {
        let dir = tempdir().unwrap();
        let api = RecordingApi::default();
        let input = row("A", "");

        let report = AssetPromoter::new(&api, dir.path())
            .promote(vec![input.clone()])
            .await;

        assert_eq!(report.no_asset, 1);
        assert_eq!(
            report.rows[0],
            PromotedRow::from_extracted(input, String::new())
        );
        assert!(api.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_and_rejected_upload_leave_reference_empty() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"jpeg").unwrap();
        let api = RecordingApi {
            reject: true,
            ..Default::default()
        };

        let report = AssetPromoter::new(&api, dir.path())
            .promote(vec![row("A", "gone.png"), row("B", "b.jpg")])
            .await;

        assert_eq!(report.missing_files, 1);
        assert_eq!(report.failed, 1);
        assert!(report.rows.iter().all(|r| r.remote_reference.is_empty()));
    }

    #[tokio::test]
    async fn test_refuses_to_overwrite_input() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c1.csv");
        checkpoint::write_rows(&path, ExtractedRow::COLUMNS, &[row("A", "")]).unwrap();

        let api = RecordingApi::default();
        let err = AssetPromoter::new(&api, dir.path())
            .run(&path, &path)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
