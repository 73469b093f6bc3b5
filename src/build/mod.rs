//! Build orchestration: clean, the concurrent transform phase, and the
//! three entry points.

pub mod tasks;

use crate::config::Config;
use crate::error::{BuildError, Result};
use crate::pipeline::PipeMap;
use crate::pipeline::keys::{OUTPUT_DIR, WRITTEN};
use crate::serve::{PreviewServer, ReloadHub};
use crate::util::file::remove_dir;
use crate::watch::Watcher;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    Development,
    Demo,
    Production,
}

impl Profile {
    /// Whether output is minified, purged and optimized
    pub fn is_optimized(self) -> bool {
        !matches!(self, Self::Development)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Development => "development",
            Self::Demo => "demo",
            Self::Production => "production",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Styles,
    Scripts,
    Images,
    Markup,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Styles,
        Category::Scripts,
        Category::Images,
        Category::Markup,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Styles => "styles",
            Self::Scripts => "scripts",
            Self::Images => "images",
            Self::Markup => "markup",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written(Vec<PathBuf>),
    /// Output skipped for this run after a compile error
    Aborted(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformReport {
    pub category: Category,
    pub outcome: Outcome,
}

impl TransformReport {
    pub fn written(&self) -> &[PathBuf] {
        match &self.outcome {
            Outcome::Written(paths) => paths,
            Outcome::Aborted(_) => &[],
        }
    }
}

/// Remove an output root so the next phase starts from nothing
pub async fn clean(dir: &Path) -> Result<()> {
    info!("Cleaning {} for fresh start.", dir.display());
    remove_dir(dir).await
}

/// Run one category's pipeline under `profile`
pub async fn run_transform(
    category: Category,
    profile: Profile,
    config: &Config,
) -> Result<TransformReport> {
    let pipeline = tasks::pipeline_for(category, profile, config)?;

    let mut data = PipeMap::new();
    data.insert(OUTPUT_DIR, tasks::output_dir(category, config.output(profile)));

    let outcome = match pipeline.execute(data).await {
        Ok(mut data) => {
            let written = data.take(WRITTEN).unwrap_or_default();
            debug!("{} wrote {} file(s)", pipeline.name(), written.len());
            Outcome::Written(written)
        }
        Err(e) if e.is_compile() => {
            error!("{}", e);
            Outcome::Aborted(e.to_string())
        }
        Err(e) => return Err(e),
    };

    Ok(TransformReport { category, outcome })
}

/// Run every category concurrently and wait for all of them.
///
/// Siblings are never cancelled; the first failure observed is returned
/// once the whole set has finished.
pub async fn run_phase(profile: Profile, config: Arc<Config>) -> Result<Vec<TransformReport>> {
    let mut set = JoinSet::new();
    for category in Category::ALL {
        let config = Arc::clone(&config);
        set.spawn(async move { run_transform(category, profile, &config).await });
    }

    let mut reports = Vec::with_capacity(Category::ALL.len());
    let mut first_error: Option<BuildError> = None;

    while let Some(joined) = set.join_next().await {
        match joined.map_err(BuildError::from).and_then(|result| result) {
            Ok(report) => reports.push(report),
            Err(e) => {
                error!("{}", e);
                first_error.get_or_insert(e);
            }
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }
    reports.sort_by_key(|report| report.category);
    Ok(reports)
}

/// Clean the profile's output root, then run the transform phase
pub async fn build(profile: Profile, config: Arc<Config>) -> Result<Vec<TransformReport>> {
    clean(&config.output(profile).base).await?;
    run_phase(profile, config).await
}

/// Development build, then serve and watch until the process ends
pub async fn develop(config: Arc<Config>) -> Result<()> {
    build(Profile::Development, Arc::clone(&config)).await?;

    let hub = ReloadHub::new();
    let server = PreviewServer::bind(&config, hub.clone()).await?;
    info!("Preview available at http://{}", server.local_addr());

    let watcher = Watcher::new(Arc::clone(&config), hub)?;
    info!("Watching for Changes..");

    tokio::select! {
        result = server.run() => result,
        result = watcher.run() => result,
    }
}

pub async fn demo(config: Arc<Config>) -> Result<()> {
    build(Profile::Demo, Arc::clone(&config)).await?;
    info!(
        "Demo build is complete. Files are located at {}",
        config.paths.build.base.display()
    );
    Ok(())
}

pub async fn production(config: Arc<Config>) -> Result<()> {
    build(Profile::Production, Arc::clone(&config)).await?;
    info!(
        "Production build is complete. Files are located at {}",
        config.paths.build.base.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_profile_flags() {
        assert!(!Profile::Development.is_optimized());
        assert!(Profile::Demo.is_optimized());
        assert!(Profile::Production.is_optimized());
        assert_eq!(Profile::Production.to_string(), "production");
        assert_eq!(Category::Images.to_string(), "images");
    }

    #[tokio::test]
    async fn test_clean_removes_tree_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("dist");
        fs::create_dir_all(out.join("css")).unwrap();
        fs::write(out.join("css/stale.css"), "old").unwrap();

        clean(&out).await.unwrap();
        assert!(!out.exists());
        clean(&out).await.unwrap();
    }

    #[tokio::test]
    async fn test_compile_error_aborts_only_styles() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/css")).unwrap();
        fs::create_dir_all(root.join("src/js")).unwrap();
        fs::write(root.join("src/css/main.scss"), ".a { color: ").unwrap();
        fs::write(root.join("src/js/app.js"), "app();").unwrap();

        let config = Arc::new(Config::with_root(root).unwrap());
        let reports = build(Profile::Development, Arc::clone(&config)).await.unwrap();

        assert!(matches!(reports[0].outcome, Outcome::Aborted(_)));
        assert!(!root.join("dist/css/style.css").exists());
        assert!(root.join("dist/js/scripts.js").exists());
    }
}
