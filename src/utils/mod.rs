//! Shared utility functions.
//!
//! - `mime`: image MIME subtypes and data URIs
//! - `text`: whitespace normalization for scraped text

mod mime;
mod text;

pub use mime::{encode_data_uri, image_subtype};
pub use text::normalize_whitespace;
