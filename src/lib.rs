//! Prompt pipeline - move a hand-authored prompt catalog into a content API.
//!
//! Three stages, each a separate run, connected only by checkpoint files:
//!
//! 1. [`extract`]: HTML prompt cards → rows + downloaded images (C1)
//! 2. [`promote`]: upload each image, add its short reference (C2)
//! 3. [`import`]: validate, batch, and submit C2 to the backend
//!
//! Any stage can be re-run on its own; a failure on one row or batch is
//! recorded and the run carries on.

pub mod api;
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod http_client;
pub mod import;
pub mod models;
pub mod promote;
pub mod utils;

pub use error::{PipelineError, Result};
