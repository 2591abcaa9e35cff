//! Local file names for downloaded images.
//!
//! Names are built from the URL's own file name plus a short hash of
//! `{title}_{url}_{acquired_at}`, so two cards sharing one image URL, or the
//! same card extracted twice, land in different files. Identity is not
//! content-based: re-running extraction stores the same bytes again under a
//! fresh name.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};

/// Extension used when neither the URL nor the sanitized name provides one.
const DEFAULT_EXTENSION: &str = ".jpg";

/// Picks unused paths inside an image directory.
#[derive(Debug, Clone)]
pub struct AssetNamer {
    dir: PathBuf,
}

impl AssetNamer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for the image at `url` belonging to the card titled `title`.
    ///
    /// The returned path never exists at the time of the call.
    pub fn next_path(&self, url: &str, title: &str, acquired_at: DateTime<Utc>) -> PathBuf {
        let filename = sanitize_filename(&base_filename(url));
        let (stem, ext) = split_extension(&filename);
        let ext = if ext.is_empty() { DEFAULT_EXTENSION } else { ext };

        let stamp = acquired_at.to_rfc3339_opts(SecondsFormat::Nanos, true);
        let unique_id = short_hash(&format!("{}_{}_{}", title, url, stamp));

        let candidate = self.dir.join(format!("{}_{}{}", stem, unique_id, ext));
        if !candidate.exists() {
            return candidate;
        }

        (1u64..)
            .map(|n| self.dir.join(format!("{}_{}_{}{}", stem, unique_id, n, ext)))
            .find(|path| !path.exists())
            .unwrap_or(candidate)
    }
}

/// File name taken from the URL path, or `image_<hash>.jpg` when the path
/// has no usable name.
pub fn base_filename(url: &str) -> String {
    let last_segment = match url::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(|s| s.to_string()),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .map(|s| s.to_string()),
    };

    let decoded = last_segment
        .map(|segment| match urlencoding::decode(&segment) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => segment,
        })
        .unwrap_or_default();

    if decoded.is_empty() || !decoded.contains('.') {
        format!("image_{}{}", short_hash(url), DEFAULT_EXTENSION)
    } else {
        decoded
    }
}

/// Replace anything outside `[A-Za-z0-9_.-]` with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Split `name` into stem and extension (with its dot). A leading dot does
/// not start an extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if pos > 0 && !name[..pos].chars().all(|c| c == '.') => {
            (&name[..pos], &name[pos..])
        }
        _ => (name, ""),
    }
}

/// First 8 hex characters of the SHA-256 of `input`.
fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    hex::encode(digest)[..8].to_string()
}
