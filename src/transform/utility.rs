//! Utility-CSS framework pass
//!
//! No Rust library implements the framework, so its standalone binary is
//! invoked per stylesheet. Stylesheets without framework directives skip the
//! process entirely, and a missing binary degrades to a passthrough.
use super::{Transform, has_extension};
use crate::error::{TransformError, TransformResult};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, warn};

const DIRECTIVES: &[&str] = &["@tailwind", "@apply", "@layer", "@config", "theme("];

static WARNED_UNAVAILABLE: AtomicBool = AtomicBool::new(false);
static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug)]
pub struct UtilityCss {
    binary: String,
    config: PathBuf,
    available: OnceLock<bool>,
}

impl UtilityCss {
    pub fn new(binary: impl Into<String>, config: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            config: config.into(),
            available: OnceLock::new(),
        }
    }

    /// Whether the stylesheet uses anything the framework must expand
    pub fn uses_directives(css: &str) -> bool {
        DIRECTIVES.iter().any(|directive| css.contains(directive))
    }

    fn is_available(&self) -> bool {
        *self.available.get_or_init(|| {
            let found = Command::new(&self.binary)
                .arg("--help")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .is_ok();
            if !found && !WARNED_UNAVAILABLE.swap(true, Ordering::Relaxed) {
                warn!("   '{}' not found. Utility CSS will not be generated.", self.binary);
                warn!("   Install the framework CLI to enable utility classes.");
                warn!("   Stylesheets will be passed through unchanged.");
            }
            found
        })
    }

    fn run(&self, css: &[u8], path: &Path) -> TransformResult<Vec<u8>> {
        let input = std::env::temp_dir().join(format!(
            "assetflow-utility-{}-{}.css",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::write(&input, css).map_err(|e| TransformError::failed(self.name(), path, e))?;

        let mut command = Command::new(&self.binary);
        if self.config.is_file() {
            command.arg("--config").arg(&self.config);
        }
        command.arg("--input").arg(&input);
        debug!("Running {:?}", command);

        let output = command.output();
        std::fs::remove_file(&input).ok();
        let output = output.map_err(|e| TransformError::failed(self.name(), path, e))?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(TransformError::failed(
                self.name(),
                path,
                String::from_utf8_lossy(&output.stderr).trim(),
            ))
        }
    }
}

impl Transform for UtilityCss {
    fn name(&self) -> &str {
        "UtilityCss"
    }

    fn can_process(&self, path: &Path) -> bool {
        has_extension(path, &["css"])
    }

    fn apply(&self, input: &[u8], path: &Path) -> TransformResult<Vec<u8>> {
        if !Self::uses_directives(&String::from_utf8_lossy(input)) || !self.is_available() {
            return Ok(input.to_vec());
        }
        self.run(input, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_detection() {
        assert!(UtilityCss::uses_directives("@tailwind base;"));
        assert!(UtilityCss::uses_directives(".btn { @apply px-4; }"));
        assert!(UtilityCss::uses_directives("a { color: theme('colors.red.500'); }"));
        assert!(!UtilityCss::uses_directives(".plain { color: red; }"));
    }

    #[test]
    fn test_plain_css_never_spawns() {
        let utility = UtilityCss::new("assetflow-no-such-binary", "tailwind.config.js");
        let out = utility
            .apply(b".plain{color:red}", Path::new("a.css"))
            .unwrap();
        assert_eq!(out, b".plain{color:red}");
        assert!(utility.available.get().is_none());
    }

    #[test]
    fn test_missing_binary_passes_through() {
        let utility = UtilityCss::new("assetflow-no-such-binary", "tailwind.config.js");
        let css = b"@tailwind utilities;";
        let out = utility.apply(css, Path::new("a.css")).unwrap();
        assert_eq!(out, css);
        assert_eq!(utility.available.get(), Some(&false));
    }
}
