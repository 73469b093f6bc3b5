//! Library-backed file transforms
//!
//! Every transform wraps one off-the-shelf library (or, for utility CSS,
//! the framework's own binary) behind the [`Transform`] capability. The
//! pipeline's transform node applies them to each matching asset.

pub mod css;
pub mod html;
pub mod image;
pub mod js;
pub mod purge;
pub mod sass;
pub mod utility;

use crate::error::TransformResult;
use std::path::Path;

pub use css::{CssMinifier, Prefixer};
pub use html::HtmlMinifier;
pub use image::ImageOptimizer;
pub use js::JsMinifier;
pub use purge::{Extractor, Purger};
pub use sass::SassCompiler;
pub use utility::UtilityCss;

pub trait Transform: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the file at `path` is something this transform understands
    fn can_process(&self, path: &Path) -> bool;

    /// Transform one file's bytes; `path` is used for diagnostics and lookups
    fn apply(&self, input: &[u8], path: &Path) -> TransformResult<Vec<u8>>;
}

/// Case-insensitive extension check
pub(crate) fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("a/b.SCSS"), &["scss", "sass"]));
        assert!(!has_extension(Path::new("a/b.css.map"), &["css"]));
        assert!(!has_extension(Path::new("Makefile"), &["css"]));
    }
}
