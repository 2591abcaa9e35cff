//! Stage command implementations.

mod extract;
mod import;
mod upload;
mod verify;

pub use extract::cmd_extract;
pub use import::cmd_import;
pub use upload::cmd_upload;
pub use verify::cmd_verify;

use std::path::{Path, PathBuf};

use crate::config::Settings;

/// Resolve an optional CLI path against the working directory, falling back
/// to the configured default.
fn path_or(cli: Option<&Path>, default: &Path) -> PathBuf {
    cli.map(Settings::resolve_cli_path)
        .unwrap_or_else(|| default.to_path_buf())
}
