//! HTML minification with minify-html
use super::{Transform, has_extension};
use crate::error::TransformResult;
use minify_html::{Cfg, minify};
use std::path::Path;

pub struct HtmlMinifier {
    cfg: Cfg,
}

impl HtmlMinifier {
    fn aggressive() -> Cfg {
        let mut cfg = Cfg::new();
        cfg.keep_comments = false;
        cfg.minify_css = true;
        cfg.minify_js = true;
        cfg
    }

    /// Settings for demo builds
    pub fn demo() -> Self {
        Self {
            cfg: Self::aggressive(),
        }
    }

    /// Settings for production builds
    pub fn production() -> Self {
        Self {
            cfg: Self::aggressive(),
        }
    }
}

impl Transform for HtmlMinifier {
    fn name(&self) -> &str {
        "HtmlMinifier"
    }

    fn can_process(&self, path: &Path) -> bool {
        has_extension(path, &["html", "htm"])
    }

    fn apply(&self, input: &[u8], _path: &Path) -> TransformResult<Vec<u8>> {
        Ok(minify(input, &self.cfg))
    }
}
