//! Row validation and payload building for the importer.

use std::fmt;

use crate::api::ImportPrompt;
use crate::models::{PromotedRow, RequiredField};

/// Why a row was left out of the import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingField(RequiredField),
    MissingReference,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing {}", field),
            Self::MissingReference => f.write_str("no remote image reference"),
        }
    }
}

/// Whether a checkpoint row is submitted, and as what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowDecision {
    Submit(ImportPrompt),
    Skip(SkipReason),
}

/// Validate one row and build its payload.
pub fn decide_row(row: &PromotedRow) -> RowDecision {
    if let Some(field) = row.missing_field() {
        return RowDecision::Skip(SkipReason::MissingField(field));
    }

    let links = split_references(&row.remote_reference);
    if links.is_empty() {
        return RowDecision::Skip(SkipReason::MissingReference);
    }

    RowDecision::Submit(ImportPrompt {
        title: row.title.clone(),
        category_name: row.category.clone(),
        prompt: row.prompt_text.clone(),
        image_description: row.image_alt.clone(),
        oss_short_links: links,
    })
}

/// Split a reference cell on commas; one value yields a one-element list.
pub fn split_references(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|link| !link.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(reference: &str) -> PromotedRow {
        PromotedRow {
            title: "Title".to_string(),
            category: "Cat".to_string(),
            prompt_text: "text".to_string(),
            image_url: String::new(),
            image_alt: "desc".to_string(),
            local_image_path: String::new(),
            remote_reference: reference.to_string(),
        }
    }

    #[test]
    fn test_split_references() {
        assert_eq!(split_references("abc.png"), vec!["abc.png"]);
        assert_eq!(split_references(" a.png, b.png ,,"), vec!["a.png", "b.png"]);
        assert!(split_references("  ").is_empty());
    }

    #[test]
    fn test_complete_row_is_submitted() {
        match decide_row(&row("a.png,b.png")) {
            RowDecision::Submit(prompt) => {
                assert_eq!(prompt.category_name, "Cat");
                assert_eq!(prompt.image_description, "desc");
                assert_eq!(prompt.oss_short_links, vec!["a.png", "b.png"]);
            }
            other => panic!("unexpected decision: {other:?}"),
        }
    }

    #[test]
    fn test_rows_missing_data_are_skipped() {
        assert_eq!(
            decide_row(&row("")),
            RowDecision::Skip(SkipReason::MissingReference)
        );

        let mut untitled = row("a.png");
        untitled.category = String::new();
        assert_eq!(
            decide_row(&untitled),
            RowDecision::Skip(SkipReason::MissingField(RequiredField::Category))
        );
    }
}
