//! Sass/SCSS compilation via grass
use super::{Transform, has_extension};
use crate::config::constants::STYLE_EXTENSIONS;
use crate::error::{TransformError, TransformResult};
use grass::{InputSyntax, Options};
use std::path::Path;

#[derive(Debug, Default, Clone)]
pub struct SassCompiler;

impl SassCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Partials are only ever pulled in through `@use`/`@import`
    pub fn is_partial(path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy().starts_with('_'))
            .unwrap_or(false)
    }

    fn syntax_for(path: &Path) -> InputSyntax {
        if has_extension(path, &["sass"]) {
            InputSyntax::Sass
        } else if has_extension(path, &["css"]) {
            InputSyntax::Css
        } else {
            InputSyntax::Scss
        }
    }
}

impl Transform for SassCompiler {
    fn name(&self) -> &str {
        "SassCompiler"
    }

    fn can_process(&self, path: &Path) -> bool {
        has_extension(path, STYLE_EXTENSIONS) && !Self::is_partial(path)
    }

    fn apply(&self, input: &[u8], path: &Path) -> TransformResult<Vec<u8>> {
        let source = std::str::from_utf8(input)
            .map_err(|e| TransformError::failed(self.name(), path, e))?;

        let mut options = Options::default().input_syntax(Self::syntax_for(path));
        if let Some(dir) = path.parent() {
            options = options.load_path(dir);
        }

        grass::from_string(source.to_owned(), &options)
            .map(String::into_bytes)
            .map_err(|e| TransformError::failed(self.name(), path, e))
    }
}
