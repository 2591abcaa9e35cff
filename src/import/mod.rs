//! Stage 3: submit checkpoint C2 to the content API in fixed-size batches.
//!
//! Rows that fail validation are skipped before batching and never count as
//! failures. For submitted rows the backend's own per-batch tally is trusted;
//! a batch that errors at the HTTP or application level counts entirely as
//! failed.

mod rows;

pub use rows::{decide_row, split_references, RowDecision, SkipReason};

use std::path::Path;

use tracing::{error, info, warn};

use crate::api::{ContentApi, ImportPrompt, ListedPrompt};
use crate::checkpoint;
use crate::error::Result;
use crate::models::PromotedRow;

/// How one batch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    /// The backend accepted the request and reported its own tally.
    Reported {
        success: usize,
        failure: usize,
        errors: Vec<String>,
    },
    /// Transport, HTTP, or application error; the whole batch failed.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// 1-based batch number.
    pub number: usize,
    pub size: usize,
    pub status: BatchStatus,
}

/// A row left out of the import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based row number in the checkpoint.
    pub line: usize,
    pub reason: SkipReason,
}

/// Aggregate result of an import run.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub total_rows: usize,
    pub skipped: Vec<SkippedRow>,
    pub submitted: usize,
    pub success: usize,
    pub failure: usize,
    /// Per-item messages returned by the backend, verbatim.
    pub errors: Vec<String>,
    pub batches: Vec<BatchOutcome>,
}

impl ImportReport {
    /// True when every submitted row landed in the success tally.
    pub fn is_success(&self) -> bool {
        self.failure == 0 && self.success == self.submitted
    }

    /// True when the tallies account for every submitted row.
    pub fn is_reconciled(&self) -> bool {
        self.reported() == self.submitted
    }

    /// Submitted rows the backend did not count as either outcome.
    pub fn unaccounted(&self) -> usize {
        self.submitted.saturating_sub(self.reported())
    }

    /// Submitted rows that were not imported, including unaccounted ones.
    pub fn not_imported(&self) -> usize {
        self.submitted.saturating_sub(self.success)
    }

    fn reported(&self) -> usize {
        self.success.saturating_add(self.failure)
    }

    fn record(&mut self, outcome: BatchOutcome) {
        match &outcome.status {
            BatchStatus::Reported {
                success,
                failure,
                errors,
            } => {
                self.success = self.success.saturating_add(*success);
                self.failure = self.failure.saturating_add(*failure);
                self.errors.extend(errors.iter().cloned());
            }
            BatchStatus::Failed(_) => self.failure = self.failure.saturating_add(outcome.size),
        }
        self.batches.push(outcome);
    }
}

/// Rows that passed validation, ready to batch.
#[derive(Debug, Clone, Default)]
pub struct PreparedImport {
    pub total_rows: usize,
    pub prompts: Vec<ImportPrompt>,
    pub skipped: Vec<SkippedRow>,
}

/// Validate rows in order, logging each skip.
pub fn prepare(rows: &[PromotedRow]) -> PreparedImport {
    let mut prepared = PreparedImport {
        total_rows: rows.len(),
        ..Default::default()
    };

    for (index, row) in rows.iter().enumerate() {
        let line = index + 1;
        match decide_row(row) {
            RowDecision::Submit(prompt) => {
                info!("Row {}: {} - {}", line, prompt.title, prompt.category_name);
                prepared.prompts.push(prompt);
            }
            RowDecision::Skip(reason) => {
                warn!("Row {}: skipped ({})", line, reason);
                prepared.skipped.push(SkippedRow { line, reason });
            }
        }
    }

    info!(
        "{} of {} rows are valid for import",
        prepared.prompts.len(),
        prepared.total_rows
    );
    prepared
}

/// Drives stage 3.
pub struct Importer<'a, A: ContentApi + ?Sized> {
    api: &'a A,
    batch_size: usize,
}

impl<'a, A: ContentApi + ?Sized> Importer<'a, A> {
    /// `batch_size` of zero is treated as one.
    pub fn new(api: &'a A, batch_size: usize) -> Self {
        Self {
            api,
            batch_size: batch_size.max(1),
        }
    }

    /// Read `input` (checkpoint C2) and import every valid row.
    pub async fn run(&self, input: &Path) -> Result<ImportReport> {
        let prepared = self.load(input)?;
        Ok(self.submit(prepared).await)
    }

    /// Read and validate `input` without submitting anything.
    pub fn load(&self, input: &Path) -> Result<PreparedImport> {
        let rows: Vec<PromotedRow> = checkpoint::read_rows(input, PromotedRow::IMPORT_COLUMNS)?;
        info!("Read {} rows from {}", rows.len(), input.display());
        Ok(prepare(&rows))
    }

    /// Batch sizes `prompts` would be split into.
    pub fn plan(&self, prompts: &[ImportPrompt]) -> Vec<usize> {
        prompts.chunks(self.batch_size).map(<[_]>::len).collect()
    }

    /// Submit prepared prompts batch by batch, in order.
    pub async fn submit(&self, prepared: PreparedImport) -> ImportReport {
        let mut report = ImportReport {
            total_rows: prepared.total_rows,
            skipped: prepared.skipped,
            submitted: prepared.prompts.len(),
            ..Default::default()
        };

        for (index, batch) in prepared.prompts.chunks(self.batch_size).enumerate() {
            let outcome = self.submit_batch(index + 1, batch).await;
            report.record(outcome);
        }

        info!("Total: {} succeeded, {} failed", report.success, report.failure);
        if !report.is_reconciled() {
            warn!(
                "Backend tallies cover {} rows but {} were submitted",
                report.reported(),
                report.submitted
            );
        }
        report
    }

    async fn submit_batch(&self, number: usize, batch: &[ImportPrompt]) -> BatchOutcome {
        info!("Batch {}: {} prompts", number, batch.len());

        let status = match self.api.submit_batch(batch).await {
            Ok(result) => {
                info!(
                    "Batch {}: {} succeeded, {} failed",
                    number, result.success_count, result.failure_count
                );
                for message in result.error_messages() {
                    error!("Batch {} error: {}", number, message);
                }
                let reported = result.success_count.saturating_add(result.failure_count);
                if reported != batch.len() {
                    warn!(
                        "Batch {}: backend reported {} results for {} prompts",
                        number,
                        reported,
                        batch.len()
                    );
                }
                BatchStatus::Reported {
                    success: result.success_count,
                    failure: result.failure_count,
                    errors: result.error_messages().to_vec(),
                }
            }
            Err(e) => {
                error!("Batch {} failed: {}", number, e);
                BatchStatus::Failed(e.to_string())
            }
        };

        BatchOutcome {
            number,
            size: batch.len(),
            status,
        }
    }
}

/// Listing summary used for post-import spot checks.
#[derive(Debug, Clone, Default)]
pub struct ListingSummary {
    pub total: usize,
    pub sample: Vec<ListedPrompt>,
}

/// Read-only check of what the backend now stores. Never affects the
/// import outcome.
pub async fn verify_listing<A: ContentApi + ?Sized>(
    api: &A,
    sample_size: usize,
) -> Result<ListingSummary> {
    let prompts = api.list_prompts().await?;
    info!("Listing returned {} prompts", prompts.len());

    let sample: Vec<ListedPrompt> = prompts.iter().take(sample_size).cloned().collect();
    for (i, prompt) in sample.iter().enumerate() {
        info!(
            "Sample {}: {} - {}",
            i + 1,
            prompt.title.as_deref().unwrap_or_default(),
            prompt.category_name.as_deref().unwrap_or_default()
        );
    }

    Ok(ListingSummary {
        total: prompts.len(),
        sample,
    })
}
