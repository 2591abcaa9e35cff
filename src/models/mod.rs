//! Domain models shared by the pipeline stages.

mod record;

pub use record::{ExtractedRow, PromotedRow, PromptRecord, RequiredField};
