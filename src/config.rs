//! Configuration for the pipeline stages.
//!
//! Settings are read once per invocation from a YAML (default) or TOML file
//! and never written back. The file layout keeps the `new_api.admin_key`
//! entry used by the backend's own config, with pipeline knobs under
//! `pipeline`:
//!
//! ```yaml
//! new_api:
//!   admin_key: "sk-..."
//! pipeline:
//!   api_base: "http://localhost:16010/api"
//!   batch_size: 5
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{PipelineError, Result};
use crate::http_client::BROWSER_USER_AGENT;

/// Default config location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Default number of prompts per import request.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Environment variable overriding the backend base URL.
pub const ENV_API_BASE: &str = "PROMPTS_API_BASE";
/// Environment variable overriding the admin token.
pub const ENV_ADMIN_KEY: &str = "PROMPTS_ADMIN_KEY";
/// Environment variable overriding the import batch size.
pub const ENV_BATCH_SIZE: &str = "PROMPTS_BATCH_SIZE";

/// CSS selectors locating prompt cards and their fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub card: String,
    pub category: String,
    pub title: String,
    pub prompt: String,
    pub image: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            card: "div.bg-white.rounded-xl.overflow-hidden.flex.flex-col.h-full".to_string(),
            category: "span.bg-blue-500.rounded-full".to_string(),
            title: "h3.text-lg.font-bold".to_string(),
            prompt: "p.whitespace-pre-wrap".to_string(),
            image: "img".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    new_api: NewApiSection,
    #[serde(default)]
    pipeline: PipelineSection,
}

#[derive(Debug, Default, Deserialize)]
struct NewApiSection {
    admin_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PipelineSection {
    api_base: Option<String>,
    project_root: Option<PathBuf>,
    source_html: Option<PathBuf>,
    images_dir: Option<PathBuf>,
    extracted_checkpoint: Option<PathBuf>,
    promoted_checkpoint: Option<PathBuf>,
    batch_size: Option<usize>,
    download_timeout_secs: Option<u64>,
    upload_timeout_secs: Option<u64>,
    import_timeout_secs: Option<u64>,
    listing_timeout_secs: Option<u64>,
    user_agent: Option<String>,
    selectors: Option<SelectorConfig>,
}

/// Resolved settings for one pipeline invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Backend base URL, without a trailing slash.
    pub api_base: String,
    /// Bearer token for the admin endpoints.
    pub admin_token: String,
    /// Root that relative asset and checkpoint paths resolve against.
    pub project_root: PathBuf,
    pub source_html: PathBuf,
    pub images_dir: PathBuf,
    pub extracted_checkpoint: PathBuf,
    pub promoted_checkpoint: PathBuf,
    pub batch_size: usize,
    pub download_timeout: Duration,
    pub upload_timeout: Duration,
    pub import_timeout: Duration,
    pub listing_timeout: Duration,
    /// Identity sent when downloading source images.
    pub user_agent: String,
    pub selectors: SelectorConfig,
}

impl Settings {
    /// Load settings from `path`, applying environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let contents = fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let file: ConfigFile = if is_toml {
            toml::from_str(&contents)
                .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))?
        } else {
            serde_yaml::from_str::<Option<ConfigFile>>(&contents)
                .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))?
                .unwrap_or_default()
        };

        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        Self::from_file(file, &absolute, |key| std::env::var(key).ok())
    }

    /// Build settings from a parsed file; `env` supplies override values.
    fn from_file(
        file: ConfigFile,
        config_path: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let pipeline = file.pipeline;

        let project_root = match pipeline.project_root {
            Some(root) if root.is_absolute() => root,
            Some(root) => config_dir(config_path).join(root),
            None => default_project_root(config_path),
        };

        let api_base = env(ENV_API_BASE)
            .filter(|v| !v.trim().is_empty())
            .or(pipeline.api_base)
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                PipelineError::Config(format!(
                    "missing backend base URL (set pipeline.api_base or {})",
                    ENV_API_BASE
                ))
            })?;

        let admin_token = env(ENV_ADMIN_KEY)
            .filter(|v| !v.trim().is_empty())
            .or(file.new_api.admin_key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                PipelineError::Config(format!(
                    "missing admin token (set new_api.admin_key or {})",
                    ENV_ADMIN_KEY
                ))
            })?;

        let batch_size = match env(ENV_BATCH_SIZE) {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                PipelineError::Config(format!("{} must be a positive integer", ENV_BATCH_SIZE))
            })?,
            None => pipeline.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
        };
        if batch_size == 0 {
            return Err(PipelineError::Config(
                "batch_size must be at least 1".to_string(),
            ));
        }

        let resolve = |p: Option<PathBuf>, default: &str| {
            let p = p.unwrap_or_else(|| PathBuf::from(default));
            if p.is_absolute() {
                p
            } else {
                project_root.join(p)
            }
        };

        Ok(Self {
            source_html: resolve(pipeline.source_html, "docs/coze-prompt.html"),
            images_dir: resolve(pipeline.images_dir, "images"),
            extracted_checkpoint: resolve(pipeline.extracted_checkpoint, "data/prompts_data.csv"),
            promoted_checkpoint: resolve(
                pipeline.promoted_checkpoint,
                "data/prompts_data_with_oss.csv",
            ),
            api_base,
            admin_token,
            batch_size,
            download_timeout: Duration::from_secs(pipeline.download_timeout_secs.unwrap_or(30)),
            upload_timeout: Duration::from_secs(pipeline.upload_timeout_secs.unwrap_or(30)),
            import_timeout: Duration::from_secs(pipeline.import_timeout_secs.unwrap_or(60)),
            listing_timeout: Duration::from_secs(pipeline.listing_timeout_secs.unwrap_or(30)),
            user_agent: pipeline
                .user_agent
                .unwrap_or_else(|| BROWSER_USER_AGENT.to_string()),
            selectors: pipeline.selectors.unwrap_or_default(),
            project_root,
        })
    }

    /// Resolve a user-supplied path against the working directory.
    pub fn resolve_cli_path(path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(path)
        }
    }
}

fn config_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// A config living in `<root>/config/` belongs to `<root>`; otherwise the
/// config's own directory is the root.
fn default_project_root(config_path: &Path) -> PathBuf {
    let dir = config_dir(config_path);
    if dir.file_name().is_some_and(|name| name == "config") {
        if let Some(parent) = dir.parent() {
            return parent.to_path_buf();
        }
    }
    dir
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse_yaml(yaml: &str) -> ConfigFile {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    const BASIC: &str = r#"
new_api:
  domain: "https://newapi.example.com"
  admin_key: "secret-token"
pipeline:
  api_base: "http://localhost:16010/api/"
"#;

    #[test]
    fn test_defaults_resolve_against_project_root() {
        let settings =
            Settings::from_file(parse_yaml(BASIC), Path::new("/srv/app/config/config.yaml"), no_env)
                .unwrap();

        assert_eq!(settings.api_base, "http://localhost:16010/api");
        assert_eq!(settings.admin_token, "secret-token");
        assert_eq!(settings.project_root, PathBuf::from("/srv/app"));
        assert_eq!(settings.images_dir, PathBuf::from("/srv/app/images"));
        assert_eq!(
            settings.promoted_checkpoint,
            PathBuf::from("/srv/app/data/prompts_data_with_oss.csv")
        );
        assert_eq!(settings.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(settings.import_timeout, Duration::from_secs(60));
        assert_eq!(settings.selectors, SelectorConfig::default());
    }

    #[test]
    fn test_config_outside_config_dir_is_its_own_root() {
        let settings =
            Settings::from_file(parse_yaml(BASIC), Path::new("/opt/prompts.yaml"), no_env).unwrap();
        assert_eq!(settings.project_root, PathBuf::from("/opt"));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_ADMIN_KEY, "env-token"),
            (ENV_API_BASE, "https://api.example.com"),
            (ENV_BATCH_SIZE, "8"),
        ]);
        let settings = Settings::from_file(
            parse_yaml(BASIC),
            Path::new("/srv/app/config/config.yaml"),
            |k| env.get(k).map(|v| v.to_string()),
        )
        .unwrap();

        assert_eq!(settings.admin_token, "env-token");
        assert_eq!(settings.api_base, "https://api.example.com");
        assert_eq!(settings.batch_size, 8);
    }

    #[test]
    fn test_missing_admin_key_is_fatal() {
        let file = parse_yaml("pipeline:\n  api_base: http://x/api\n");
        let err = Settings::from_file(file, Path::new("/c/config.yaml"), no_env).unwrap_err();
        assert!(matches!(err, PipelineError::Config(msg) if msg.contains("admin token")));
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let file = parse_yaml(
            "new_api:\n  admin_key: k\npipeline:\n  api_base: http://x/api\n  batch_size: 0\n",
        );
        assert!(Settings::from_file(file, Path::new("/c/config.yaml"), no_env).is_err());
    }

    #[test]
    fn test_load_toml_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompts.toml");
        fs::write(
            &path,
            "[new_api]\nadmin_key = \"k\"\n\n[pipeline]\napi_base = \"http://x/api\"\nbatch_size = 3\n\n[pipeline.selectors]\ncard = \"article.card\"\n",
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.batch_size, 3);
        assert_eq!(settings.selectors.card, "article.card");
        assert_eq!(settings.selectors.image, "img");

        let err = Settings::load(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
