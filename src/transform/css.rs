//! CSS post-processing via lightningcss
use super::{Transform, has_extension};
use crate::error::{TransformError, TransformResult};
use lightningcss::error::PrinterError;
use lightningcss::properties::Property;
use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{
    MinifyOptions, ParserOptions, PrinterOptions, StyleAttribute, StyleSheet,
};
use lightningcss::targets::{Browsers, Targets};
use lightningcss::traits::ToCss;
use std::path::Path;

const fn version(major: u32) -> Option<u32> {
    Some(major << 16)
}

/// Browser set used for vendor prefixing
pub fn default_browsers() -> Browsers {
    Browsers {
        chrome: version(80),
        edge: version(88),
        firefox: version(78),
        safari: version(13),
        ios_saf: version(13),
        ..Browsers::default()
    }
}

/// Legacy set used when minifying for production
pub fn legacy_browsers() -> Browsers {
    Browsers {
        ie: version(8),
        ..Browsers::default()
    }
}

fn minify_sheet(transform: &str, input: &[u8], path: &Path, targets: Targets) -> TransformResult<Vec<u8>> {
    let source = std::str::from_utf8(input)
        .map_err(|e| TransformError::failed(transform, path, e))?;

    let options = ParserOptions {
        filename: path.to_string_lossy().into_owned(),
        error_recovery: true,
        ..ParserOptions::default()
    };
    let mut sheet = StyleSheet::parse(source, options)
        .map_err(|e| TransformError::failed(transform, path, e))?;

    sheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| TransformError::failed(transform, path, e))?;

    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| TransformError::failed(transform, path, e))?;

    Ok(printed.code.into_bytes())
}

/// A declaration followed by any vendor-prefixed variants it needs, one per line
fn prefixed(property: &Property, important: bool, targets: Targets) -> Result<Vec<String>, PrinterError> {
    let text = property.to_css_string(important, PrinterOptions::default())?;

    // a lone declaration: nothing for the handler to merge it with
    let Ok(mut single) = StyleAttribute::parse(&text, ParserOptions::default()) else {
        return Ok(declaration_lines(&text).collect());
    };
    single.minify(MinifyOptions {
        targets,
        ..MinifyOptions::default()
    });

    let mut lines = Vec::new();
    for (property, important) in single.declarations.iter() {
        let printed = property.to_css_string(
            important,
            PrinterOptions {
                targets,
                ..PrinterOptions::default()
            },
        )?;
        lines.extend(declaration_lines(&printed));
    }
    if lines.is_empty() {
        lines.extend(declaration_lines(&text));
    }
    Ok(lines)
}

// A prefixed property prints as several `;`-separated lines
fn declaration_lines(printed: &str) -> impl Iterator<Item = String> + '_ {
    printed
        .lines()
        .map(|line| line.trim().trim_end_matches(';').to_string())
        .filter(|line| !line.is_empty())
}

fn push_indented(out: &mut String, indent: &str, text: &str) {
    for line in text.lines() {
        out.push_str(indent);
        out.push_str(line);
        out.push('\n');
    }
}

/// Print `rules` with prefixes added; rules are never merged, dropped or reordered
fn prefix_rules(
    rules: &[CssRule],
    targets: Targets,
    depth: usize,
    out: &mut String,
) -> Result<(), PrinterError> {
    let indent = "  ".repeat(depth);
    let printer = || PrinterOptions {
        targets,
        ..PrinterOptions::default()
    };

    for (i, rule) in rules.iter().enumerate() {
        if depth == 0 && i > 0 {
            out.push('\n');
        }
        match rule {
            CssRule::Style(style) if style.rules.0.is_empty() => {
                let selectors = style.selectors.to_css_string(printer())?;
                out.push_str(&format!("{indent}{selectors} {{\n"));
                for (property, important) in style.declarations.iter() {
                    for line in prefixed(property, important, targets)? {
                        out.push_str(&format!("{indent}  {line};\n"));
                    }
                }
                out.push_str(&format!("{indent}}}\n"));
            }
            CssRule::Media(media) => {
                let query = media.query.to_css_string(printer())?;
                out.push_str(&format!("{indent}@media {query} {{\n"));
                prefix_rules(&media.rules.0, targets, depth + 1, out)?;
                out.push_str(&format!("{indent}}}\n"));
            }
            CssRule::Supports(supports) => {
                let condition = supports.condition.to_css_string(printer())?;
                out.push_str(&format!("{indent}@supports {condition} {{\n"));
                prefix_rules(&supports.rules.0, targets, depth + 1, out)?;
                out.push_str(&format!("{indent}}}\n"));
            }
            other => {
                let printed = other.to_css_string(printer())?;
                push_indented(out, &indent, &printed);
            }
        }
    }
    Ok(())
}

/// Adds vendor prefixes, output stays readable.
///
/// Each declaration is prefixed on its own, so author rules keep their order
/// and are never merged or removed. Values are printed in lightningcss's
/// canonical form (`#ff0000` becomes `red`).
#[derive(Debug, Clone)]
pub struct Prefixer {
    targets: Targets,
}

impl Prefixer {
    pub fn new(browsers: Browsers) -> Self {
        Self {
            targets: Targets::from(browsers),
        }
    }
}

impl Default for Prefixer {
    fn default() -> Self {
        Self::new(default_browsers())
    }
}

impl Transform for Prefixer {
    fn name(&self) -> &str {
        "Prefixer"
    }

    fn can_process(&self, path: &Path) -> bool {
        has_extension(path, &["css"])
    }

    fn apply(&self, input: &[u8], path: &Path) -> TransformResult<Vec<u8>> {
        let source =
            std::str::from_utf8(input).map_err(|e| TransformError::failed(self.name(), path, e))?;
        let options = ParserOptions {
            filename: path.to_string_lossy().into_owned(),
            error_recovery: true,
            ..ParserOptions::default()
        };
        let sheet = StyleSheet::parse(source, options)
            .map_err(|e| TransformError::failed(self.name(), path, e))?;

        let mut out = String::with_capacity(source.len());
        prefix_rules(&sheet.rules.0, self.targets, 0, &mut out)
            .map_err(|e| TransformError::failed(self.name(), path, e))?;
        Ok(out.into_bytes())
    }
}

#[derive(Debug, Clone)]
pub struct CssMinifier {
    targets: Targets,
}

impl CssMinifier {
    pub fn new(browsers: Browsers) -> Self {
        Self {
            targets: Targets::from(browsers),
        }
    }
}

impl Default for CssMinifier {
    fn default() -> Self {
        Self::new(legacy_browsers())
    }
}

impl Transform for CssMinifier {
    fn name(&self) -> &str {
        "CssMinifier"
    }

    fn can_process(&self, path: &Path) -> bool {
        has_extension(path, &["css"])
    }

    fn apply(&self, input: &[u8], path: &Path) -> TransformResult<Vec<u8>> {
        minify_sheet(self.name(), input, path, self.targets)
    }
}
