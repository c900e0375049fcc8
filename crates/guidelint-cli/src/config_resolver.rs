//! Configuration file resolution with global fallback.
//!
//! Resolves the configuration file path using a deterministic priority order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `{project}/guidelint.toml` or `.guidelint.toml`
//! 3. `$GUIDELINT_CONFIG_DIR/config.toml` or `~/.guidelint/config.toml`
//! 4. No config found → built-in rule set and default settings

use guidelint_core::model::DocumentFormat;
use guidelint_core::{load_rules, read_document, Config, ConfigError, RuleModel, RuleSource};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config` flag.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Loaded from the global config directory (`~/.guidelint/`).
    Global(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Short label for log output.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Explicit(_) => "explicit",
            Self::Project(_) => "project",
            Self::Global(_) => "global",
            Self::Default => "built-in",
        }
    }
}

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_NAMES: &[&str] = &["guidelint.toml", ".guidelint.toml"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration file path.
///
/// See module-level docs for resolution order.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(project_dir, explicit, global_config_dir())
}

/// Resolution with the global directory passed in.
fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    for name in PROJECT_CONFIG_NAMES {
        let candidate = project_dir.join(name);
        if candidate.exists() {
            debug!("Found project config: {}", candidate.display());
            return ConfigSource::Project(candidate);
        }
    }

    if let Some(dir) = global_dir {
        let candidate = dir.join(GLOBAL_CONFIG_NAME);
        if candidate.exists() {
            debug!("Found global config: {}", candidate.display());
            return ConfigSource::Global(candidate);
        }
    }

    ConfigSource::Default
}

/// Returns the global config directory path.
///
/// Resolution: `$GUIDELINT_CONFIG_DIR` > `~/.guidelint/`
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("GUIDELINT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".guidelint"))
}

/// Rule model and run settings read from one document.
#[derive(Debug)]
pub struct Settings {
    /// Effective rule set.
    pub model: RuleModel,
    /// Failure threshold and analyzer settings.
    pub config: Config,
}

/// Loads the document a [`ConfigSource`] points at.
///
/// # Errors
///
/// Returns [`ConfigError`] if the document cannot be read, parsed or
/// validated.
pub fn load(source: &ConfigSource) -> Result<Settings, ConfigError> {
    let Some(path) = source.path() else {
        return Ok(Settings {
            model: RuleModel::builtin()?,
            config: Config::default(),
        });
    };

    info!("Using {} config: {}", source.label(), path.display());
    let content = read_document(path)?;
    let format = DocumentFormat::from_path(path);
    Ok(Settings {
        model: load_rules(RuleSource::Document {
            content: &content,
            format,
        })?,
        config: Config::parse(&content, format)?,
    })
}
