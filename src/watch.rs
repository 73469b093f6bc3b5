//! Per-category filesystem watching for the development loop
use crate::build::{Category, Outcome, Profile, TransformReport, run_transform};
use crate::config::Config;
use crate::error::Result;
use crate::serve::ReloadHub;
use glob::Pattern;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// A source change routed to the category that owns it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub category: Category,
    pub path: PathBuf,
}

/// What one category watches and which paths it claims
#[derive(Debug, Clone)]
pub struct WatchSpec {
    pub category: Category,
    roots: Vec<(PathBuf, RecursiveMode)>,
    patterns: Vec<Pattern>,
}

impl WatchSpec {
    fn new(category: Category) -> Self {
        Self {
            category,
            roots: Vec::new(),
            patterns: Vec::new(),
        }
    }

    /// Watch `root` recursively and claim paths matching `glob` beneath it
    fn tree(mut self, root: &Path, glob: &str) -> Result<Self> {
        let root = canonical(root);
        let pattern = Pattern::new(&format!(
            "{}/{}",
            Pattern::escape(&root.to_string_lossy()),
            glob
        ))?;
        self.roots.push((root, RecursiveMode::Recursive));
        self.patterns.push(pattern);
        Ok(self)
    }

    /// Watch a single file through its parent directory
    fn file(mut self, path: &Path) -> Result<Self> {
        let Some(parent) = path.parent() else {
            return Ok(self);
        };
        let parent = canonical(parent);
        let file = match path.file_name() {
            Some(name) => parent.join(name),
            None => return Ok(self),
        };
        self.patterns
            .push(Pattern::new(&Pattern::escape(&file.to_string_lossy()))?);
        self.roots.push((parent, RecursiveMode::NonRecursive));
        Ok(self)
    }

    pub fn matches(&self, path: &Path) -> bool {
        self.patterns.iter().any(|p| p.matches_path(path))
    }
}

/// Watch layout for every category
pub fn watch_specs(config: &Config) -> Result<Vec<WatchSpec>> {
    let src = &config.paths.src;
    Ok(vec![
        WatchSpec::new(Category::Styles)
            .tree(&src.css, "**/*")?
            .file(&config.runtime.framework_config)?,
        WatchSpec::new(Category::Scripts).tree(&src.js, "**/*.js")?,
        WatchSpec::new(Category::Images).tree(&src.img, "**/*")?,
        WatchSpec::new(Category::Markup).tree(&src.base, "**/*.html")?,
    ])
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn is_content_change(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) | EventKind::Remove(_) => true,
        EventKind::Modify(modify) => !matches!(modify, ModifyKind::Metadata(_)),
        _ => false,
    }
}

pub struct Watcher {
    config: Arc<Config>,
    hub: ReloadHub,
    _watchers: Vec<RecommendedWatcher>,
    receiver: mpsc::UnboundedReceiver<Change>,
}

impl Watcher {
    pub fn new(config: Arc<Config>, hub: ReloadHub) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut watchers = Vec::new();

        for spec in watch_specs(&config)? {
            let tx = tx.clone();
            let claim = spec.clone();
            let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        warn!("Watch error: {}", e);
                        return;
                    }
                };
                if !is_content_change(&event.kind) {
                    return;
                }
                if let Some(path) = event.paths.iter().find(|p| claim.matches(p)) {
                    let _ = tx.send(Change {
                        category: claim.category,
                        path: path.clone(),
                    });
                }
            })?;

            for (root, mode) in &spec.roots {
                if !root.exists() {
                    warn!("Not watching {} for {}: path does not exist", root.display(), spec.category);
                    continue;
                }
                watcher.watch(root, *mode)?;
                debug!("Watching {} for {}", root.display(), spec.category);
            }
            watchers.push(watcher);
        }

        Ok(Self {
            config,
            hub,
            _watchers: watchers,
            receiver: rx,
        })
    }

    /// Wait for the next claimed change
    pub async fn next_change(&mut self) -> Option<Change> {
        self.receiver.recv().await
    }

    /// Rebuild the changed category, then tell preview clients to reload.
    /// Nothing is broadcast when the rebuild produced no output.
    pub async fn handle(&self, change: &Change) {
        info!("{} changed: {}", change.category, change.path.display());

        match run_transform(change.category, Profile::Development, &self.config).await {
            Ok(TransformReport {
                outcome: Outcome::Written(written),
                ..
            }) => {
                debug!("Rebuilt {} file(s) for {}", written.len(), change.category);
                self.hub.trigger_reload();
            }
            // compile error, already logged
            Ok(_) => debug!("{} output skipped, not reloading", change.category),
            Err(e) => error!("Rebuilding {} failed: {}", change.category, e),
        }
    }

    /// Handle changes one at a time for as long as the process runs
    pub async fn run(mut self) -> Result<()> {
        while let Some(change) = self.next_change().await {
            self.handle(&change).await;
        }
        Ok(())
    }
}
