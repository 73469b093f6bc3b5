//! JavaScript minification with oxc
use super::{Transform, has_extension};
use crate::error::{TransformError, TransformResult};
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc_mangler::MangleOptions;
use oxc_minifier::{CompressOptions, CompressOptionsUnused, Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;
use std::path::Path;

/// Compresses and mangles scripts; comments are dropped.
///
/// Bundles load as classic scripts, so top-level declarations are globals
/// other scripts and markup handlers may call. They are kept and never renamed.
#[derive(Debug, Clone, Default)]
pub struct JsMinifier;

impl JsMinifier {
    pub fn new() -> Self {
        Self
    }

    fn minify(&self, source: &str, path: &Path) -> TransformResult<String> {
        let allocator = Allocator::default();
        let parsed = Parser::new(&allocator, source, SourceType::cjs()).parse();

        if let Some(error) = parsed.errors.first() {
            return Err(TransformError::failed(
                self.name(),
                path,
                format!("Parse error: {error:?}"),
            ));
        }

        let mut program = parsed.program;
        let options = MinifierOptions {
            mangle: Some(MangleOptions {
                top_level: false,
                ..MangleOptions::default()
            }),
            compress: Some(CompressOptions {
                unused: CompressOptionsUnused::Keep,
                ..CompressOptions::smallest()
            }),
        };
        let minified = Minifier::new(options).minify(&allocator, &mut program);

        let codegen_options = CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        };
        let output = Codegen::new()
            .with_options(codegen_options)
            .with_scoping(minified.scoping)
            .build(&program);

        Ok(output.code)
    }
}

impl Transform for JsMinifier {
    fn name(&self) -> &str {
        "JsMinifier"
    }

    fn can_process(&self, path: &Path) -> bool {
        has_extension(path, &["js", "mjs", "cjs"])
    }

    fn apply(&self, input: &[u8], path: &Path) -> TransformResult<Vec<u8>> {
        let source = String::from_utf8_lossy(input);
        Ok(self.minify(&source, path)?.into_bytes())
    }
}
