//! Unused-rule removal
//!
//! Tokens are pulled out of content files with two extractor expressions;
//! a style rule survives when at least one of its selectors only names
//! classes, ids and tags found among those tokens.
use super::{Transform, has_extension};
use crate::error::{TransformError, TransformResult};
use lightningcss::rules::CssRule;
use lightningcss::selector::Selector;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::traits::ToCss;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

const BROAD: &str = r#"[^<>"'`\s]*[^<>"'`\s:]"#;
const INNER: &str = r#"[^<>"'`\s.()]*[^<>"'`\s.():]"#;

/// Pulls candidate selector tokens out of markup and script text
#[derive(Debug, Clone)]
pub struct Extractor {
    broad: Regex,
    inner: Regex,
}

impl Extractor {
    pub fn new() -> TransformResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| TransformError::failed("Extractor", pattern, e))
        };
        Ok(Self {
            broad: compile(BROAD)?,
            inner: compile(INNER)?,
        })
    }

    /// Every candidate token in `content`
    pub fn extract(&self, content: &str) -> HashSet<String> {
        self.broad
            .find_iter(content)
            .chain(self.inner.find_iter(content))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Purger {
    tokens: HashSet<String>,
}

impl Purger {
    pub fn new(tokens: HashSet<String>) -> Self {
        Self { tokens }
    }

    pub fn from_content<'a>(
        contents: impl IntoIterator<Item = &'a str>,
    ) -> TransformResult<Self> {
        let extractor = Extractor::new()?;
        let mut tokens = HashSet::new();
        for content in contents {
            tokens.extend(extractor.extract(content));
        }
        Ok(Self { tokens })
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    fn selector_used(&self, selector: &Selector<'_>) -> bool {
        match selector.to_css_string(PrinterOptions::default()) {
            Ok(text) => selector_tokens(&text)
                .iter()
                .all(|token| self.tokens.contains(token)),
            Err(_) => true,
        }
    }

    fn retain_used(&self, rules: &mut Vec<CssRule<'_>>) {
        rules.retain_mut(|rule| match rule {
            CssRule::Style(style) => {
                let used = style.selectors.0.iter().any(|s| self.selector_used(s));
                if !used {
                    debug!("Purging rule with {} selector(s)", style.selectors.0.len());
                }
                used
            }
            CssRule::Media(media) => {
                self.retain_used(&mut media.rules.0);
                !media.rules.0.is_empty()
            }
            CssRule::Supports(supports) => {
                self.retain_used(&mut supports.rules.0);
                !supports.rules.0.is_empty()
            }
            _ => true,
        });
    }
}

impl Transform for Purger {
    fn name(&self) -> &str {
        "Purger"
    }

    fn can_process(&self, path: &Path) -> bool {
        has_extension(path, &["css"])
    }

    fn apply(&self, input: &[u8], path: &Path) -> TransformResult<Vec<u8>> {
        let source = std::str::from_utf8(input)
            .map_err(|e| TransformError::failed(self.name(), path, e))?;
        let options = ParserOptions {
            filename: path.to_string_lossy().into_owned(),
            error_recovery: true,
            ..ParserOptions::default()
        };
        let mut sheet = StyleSheet::parse(source, options)
            .map_err(|e| TransformError::failed(self.name(), path, e))?;

        self.retain_used(&mut sheet.rules.0);

        let printed = sheet
            .to_css(PrinterOptions::default())
            .map_err(|e| TransformError::failed(self.name(), path, e))?;
        Ok(printed.code.into_bytes())
    }
}

/// Class, id and type names a single selector requires, unescaped
pub fn selector_tokens(selector: &str) -> Vec<String> {
    let chars: Vec<char> = selector.chars().collect();
    let mut tokens = Vec::new();
    let mut compound_start = true;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '.' | '#' => {
                let (ident, next) = read_ident(&chars, i + 1);
                if !ident.is_empty() {
                    tokens.push(ident);
                }
                i = next;
                compound_start = false;
            }
            '[' => {
                i = skip_block(&chars, i, '[', ']');
                compound_start = false;
            }
            ':' => {
                i += 1;
                if chars.get(i) == Some(&':') {
                    i += 1;
                }
                let (_, next) = read_ident(&chars, i);
                i = next;
                if chars.get(i) == Some(&'(') {
                    i = skip_block(&chars, i, '(', ')');
                }
                compound_start = false;
            }
            c if c.is_whitespace() || matches!(c, '>' | '+' | '~' | ',') => {
                compound_start = true;
                i += 1;
            }
            c if compound_start && (is_ident_char(c) || c == '\\') => {
                let (ident, next) = read_ident(&chars, i);
                if !ident.is_empty() {
                    tokens.push(ident);
                }
                i = next.max(i + 1);
                compound_start = false;
            }
            _ => {
                i += 1;
                compound_start = false;
            }
        }
    }
    tokens
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

fn read_ident(chars: &[char], start: usize) -> (String, usize) {
    let mut ident = String::new();
    let mut i = start;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            let Some(&next) = chars.get(i + 1) else {
                i += 1;
                break;
            };
            if next.is_ascii_hexdigit() {
                let mut end = i + 1;
                while end < chars.len() && end < i + 7 && chars[end].is_ascii_hexdigit() {
                    end += 1;
                }
                let hex: String = chars[i + 1..end].iter().collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                ident.push(decoded);
                i = end;
                if chars.get(i).is_some_and(|c| c.is_whitespace()) {
                    i += 1;
                }
            } else {
                ident.push(next);
                i += 2;
            }
        } else if is_ident_char(c) {
            ident.push(c);
            i += 1;
        } else {
            break;
        }
    }
    (ident, i)
}

/// Index just past the block opened at `start`
fn skip_block(chars: &[char], start: usize, open: char, close: char) -> usize {
    let mut depth = 0usize;
    let mut i = start;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            c if c == open => depth += 1,
            c if c == close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    chars.len()
}
