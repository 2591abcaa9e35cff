//! Prompt records and their checkpoint row shapes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A field every prompt must carry to be worth importing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    Title,
    Category,
    PromptText,
}

impl RequiredField {
    /// Checkpoint column holding this field.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Category => "category",
            Self::PromptText => "prompt_text",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// One prompt card as found in the source document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptRecord {
    pub title: String,
    pub category: String,
    pub prompt_text: String,
    /// Original remote image URL, empty when the card has no image.
    pub image_url: String,
    pub image_alt: String,
}

impl PromptRecord {
    /// First required field that is blank, if any.
    pub fn missing_field(&self) -> Option<RequiredField> {
        first_blank(&self.title, &self.category, &self.prompt_text)
    }
}

/// Row of the extraction checkpoint (C1).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRow {
    pub title: String,
    pub category: String,
    pub prompt_text: String,
    pub image_url: String,
    pub image_alt: String,
    /// Path of the downloaded image, relative to the project root when possible.
    /// Empty when the card had no image or the download failed.
    pub local_image_path: String,
}

impl ExtractedRow {
    pub const COLUMNS: &'static [&'static str] = &[
        "title",
        "category",
        "prompt_text",
        "image_url",
        "image_alt",
        "local_image_path",
    ];

    pub fn new(record: PromptRecord, local_image_path: String) -> Self {
        Self {
            title: record.title,
            category: record.category,
            prompt_text: record.prompt_text,
            image_url: record.image_url,
            image_alt: record.image_alt,
            local_image_path,
        }
    }

    pub fn has_local_image(&self) -> bool {
        !self.local_image_path.trim().is_empty()
    }
}

/// Row of the promotion checkpoint (C2): C1 plus the hosted image reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotedRow {
    pub title: String,
    pub category: String,
    pub prompt_text: String,
    #[serde(default)]
    pub image_url: String,
    pub image_alt: String,
    #[serde(default)]
    pub local_image_path: String,
    /// Short reference returned by the image host, or several joined by commas.
    pub remote_reference: String,
}

impl PromotedRow {
    pub const COLUMNS: &'static [&'static str] = &[
        "title",
        "category",
        "prompt_text",
        "image_url",
        "image_alt",
        "local_image_path",
        "remote_reference",
    ];

    /// Columns the importer cannot work without.
    pub const IMPORT_COLUMNS: &'static [&'static str] = &[
        "title",
        "category",
        "prompt_text",
        "image_alt",
        "remote_reference",
    ];

    /// Extend a C1 row with the promoter's column, leaving the rest untouched.
    pub fn from_extracted(row: ExtractedRow, remote_reference: String) -> Self {
        Self {
            title: row.title,
            category: row.category,
            prompt_text: row.prompt_text,
            image_url: row.image_url,
            image_alt: row.image_alt,
            local_image_path: row.local_image_path,
            remote_reference,
        }
    }

    pub fn missing_field(&self) -> Option<RequiredField> {
        first_blank(&self.title, &self.category, &self.prompt_text)
    }
}

fn first_blank(title: &str, category: &str, prompt_text: &str) -> Option<RequiredField> {
    [
        (RequiredField::Title, title),
        (RequiredField::Category, category),
        (RequiredField::PromptText, prompt_text),
    ]
    .into_iter()
    .find(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
}
