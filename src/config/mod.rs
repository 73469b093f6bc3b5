//! Project configuration: source/output directories and runtime options.
//!
//! The record is read once before the pipeline starts and then passed
//! explicitly to every transform; nothing mutates it during a run.

pub mod constants;

use crate::build::Profile;
use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// One set of asset directories
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "AssetPathsEntry")]
pub struct AssetPaths {
    pub base: PathBuf,
    pub css: PathBuf,
    pub js: PathBuf,
    pub img: PathBuf,
}

impl AssetPaths {
    /// Conventional layout: `css`, `js` and `img` directly under `base`
    pub fn under(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            css: base.join("css"),
            js: base.join("js"),
            img: base.join("img"),
            base,
        }
    }

    fn resolve(&mut self, root: &Path) {
        for path in [&mut self.base, &mut self.css, &mut self.js, &mut self.img] {
            *path = resolve_path(root, path);
        }
    }
}

/// A `[paths.*]` table as written; subdirectories left out sit under `base`
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AssetPathsEntry {
    base: PathBuf,
    css: Option<PathBuf>,
    js: Option<PathBuf>,
    img: Option<PathBuf>,
}

impl From<AssetPathsEntry> for AssetPaths {
    fn from(entry: AssetPathsEntry) -> Self {
        let derived = AssetPaths::under(entry.base);
        Self {
            css: entry.css.unwrap_or(derived.css),
            js: entry.js.unwrap_or(derived.js),
            img: entry.img.unwrap_or(derived.img),
            base: derived.base,
        }
    }
}

/// Source, development-output and production-output directories
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathConfig {
    pub src: AssetPaths,
    pub dist: AssetPaths,
    pub build: AssetPaths,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            src: AssetPaths::under("src"),
            dist: AssetPaths::under("dist"),
            build: AssetPaths::under("build"),
        }
    }
}

/// Dev-server port and utility-CSS framework settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeOptions {
    pub port: Option<u16>,
    #[serde(rename = "tailwindjs", alias = "framework_config")]
    pub framework_config: PathBuf,
    pub utility_bin: String,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            port: None,
            framework_config: PathBuf::from("tailwind.config.js"),
            utility_bin: constants::DEFAULT_UTILITY_BIN.to_string(),
        }
    }
}

impl RuntimeOptions {
    /// Configured port, or the fixed default when unset
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(constants::DEFAULT_PORT)
    }
}

/// When scripts under an `external` directory are left out of the bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalScripts {
    /// Excluded from development bundles only
    #[default]
    Development,
    /// Excluded from every bundle
    Always,
    /// Never excluded
    Never,
}

impl ExternalScripts {
    pub fn excludes(self, profile: Profile) -> bool {
        match self {
            Self::Development => profile == Profile::Development,
            Self::Always => true,
            Self::Never => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptOptions {
    pub exclude_external: ExternalScripts,
}

/// Files scanned for selector tokens before purging unused CSS
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PurgeOptions {
    pub content: Vec<String>,
}

/// Whole configuration record
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub paths: PathConfig,
    #[serde(rename = "config")]
    pub runtime: RuntimeOptions,
    pub scripts: ScriptOptions,
    pub purge: PurgeOptions,
}

impl Config {
    /// Default layout rooted at `root`
    pub fn with_root(root: &Path) -> Result<Self, ConfigError> {
        Self::default().resolve(root)
    }

    /// Parse a TOML document; relative paths resolve against `root`
    pub fn from_toml_str(content: &str, root: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: root.join(constants::CONFIG_FILE),
            source,
        })?;
        config.resolve(root)
    }

    /// Load a config file; relative paths resolve against its directory
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let root = path.parent().unwrap_or_else(|| Path::new("."));
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded configuration from {:?}", path);
        config.resolve(root)
    }

    /// Load `config.toml` from `root`, falling back to the default layout
    pub fn discover(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(constants::CONFIG_FILE);
        if path.is_file() {
            Self::load(&path)
        } else {
            info!(
                "No {} found in {:?}, using default layout",
                constants::CONFIG_FILE,
                root
            );
            Self::with_root(root)
        }
    }

    /// Output directories written by `profile`
    pub fn output(&self, profile: Profile) -> &AssetPaths {
        match profile {
            Profile::Development => &self.paths.dist,
            Profile::Demo | Profile::Production => &self.paths.build,
        }
    }

    /// Content globs scanned by the purge pass
    pub fn purge_content(&self) -> &[String] {
        &self.purge.content
    }

    fn resolve(mut self, root: &Path) -> Result<Self, ConfigError> {
        self.paths.src.resolve(root);
        self.paths.dist.resolve(root);
        self.paths.build.resolve(root);
        self.runtime.framework_config = resolve_path(root, &self.runtime.framework_config);

        self.purge.content = if self.purge.content.is_empty() {
            let base = glob::Pattern::escape(&self.paths.src.base.to_string_lossy());
            vec![format!("{base}/**/*.html"), format!("{base}/**/*.js")]
        } else {
            self.purge
                .content
                .iter()
                .map(|pattern| resolve_pattern(root, pattern))
                .collect()
        };

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.runtime.port == Some(0) {
            return Err(ConfigError::invalid("config.port must be non-zero"));
        }
        if self.runtime.utility_bin.trim().is_empty() {
            return Err(ConfigError::invalid("config.utility_bin must not be empty"));
        }

        let src = &self.paths.src.base;
        for (name, out) in [("dist", &self.paths.dist.base), ("build", &self.paths.build.base)] {
            if src.starts_with(out) {
                return Err(ConfigError::invalid(format!(
                    "paths.{name}.base {:?} contains the source tree {:?}; cleaning it would delete sources",
                    out, src
                )));
            }
        }
        Ok(())
    }
}

/// Join `path` onto `root` unless it is already absolute, dropping `./` segments
fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    let cleaned: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if cleaned.is_absolute() {
        cleaned
    } else {
        root.join(cleaned)
    }
}

fn resolve_pattern(root: &Path, pattern: &str) -> String {
    let trimmed = pattern.trim_start_matches("./");
    if Path::new(trimmed).is_absolute() {
        trimmed.to_string()
    } else {
        format!(
            "{}/{}",
            glob::Pattern::escape(&root.to_string_lossy()),
            trimmed
        )
    }
}
