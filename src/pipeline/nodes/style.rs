use crate::error::{BuildError, Result, TransformError};
use crate::pipeline::keys::{ASSETS, PURGE_TOKENS};
use crate::pipeline::{PipeMap, PipeNode};
use crate::transform::purge::Extractor;
use crate::transform::{Purger, SassCompiler, Transform};
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::{debug, info};

/// Compile stylesheet sources, dropping partials and unrelated files.
///
/// A compile failure surfaces as [`BuildError::Compile`] so the caller can
/// abort the style output without failing the run.
pub struct StyleCompilerNode {
    compiler: SassCompiler,
}

impl StyleCompilerNode {
    pub fn new() -> Self {
        Self {
            compiler: SassCompiler::new(),
        }
    }
}

impl Default for StyleCompilerNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PipeNode for StyleCompilerNode {
    fn name(&self) -> String {
        self.compiler.name().to_string()
    }

    fn input(&self) -> Vec<String> {
        vec![ASSETS.name().to_string()]
    }

    fn output(&self) -> Vec<String> {
        vec![ASSETS.name().to_string()]
    }

    async fn process(&self, mut data: PipeMap) -> Result<PipeMap> {
        let assets = data
            .take(ASSETS)
            .ok_or_else(|| BuildError::missing_input(ASSETS.name()))?;
        let compiler = self.compiler.clone();

        let compiled = tokio::task::spawn_blocking(move || {
            let mut compiled = Vec::new();
            for mut asset in assets {
                if !compiler.can_process(&asset.path) {
                    debug!("Skipping {:?}", asset.path);
                    continue;
                }
                asset.contents = compiler
                    .apply(&asset.contents, &asset.source)
                    .map_err(|e| match e {
                        TransformError::Failed { path, message, .. } => {
                            BuildError::compile(path, message)
                        }
                        other => other.into(),
                    })?;
                asset.path.set_extension("css");
                compiled.push(asset);
            }
            Ok::<_, BuildError>(compiled)
        })
        .await??;

        data.insert(ASSETS, compiled);
        Ok(data)
    }
}

/// Scan purge content files for selector tokens
pub struct ContentScanNode {
    patterns: Vec<String>,
}

impl ContentScanNode {
    pub fn new(patterns: &[String]) -> Self {
        Self {
            patterns: patterns.to_vec(),
        }
    }
}

#[async_trait]
impl PipeNode for ContentScanNode {
    fn name(&self) -> String {
        "ContentScan".to_string()
    }

    fn input(&self) -> Vec<String> {
        Vec::new()
    }

    fn output(&self) -> Vec<String> {
        vec![PURGE_TOKENS.name().to_string()]
    }

    async fn process(&self, mut data: PipeMap) -> Result<PipeMap> {
        let extractor = Extractor::new()?;
        let mut tokens = HashSet::new();
        let mut scanned = 0usize;

        for pattern in &self.patterns {
            for entry in glob::glob(pattern)? {
                let path = entry?;
                if !path.is_file() {
                    continue;
                }
                let contents = tokio::fs::read(&path)
                    .await
                    .map_err(|e| BuildError::io_at(&path, e))?;
                tokens.extend(extractor.extract(&String::from_utf8_lossy(&contents)));
                scanned += 1;
            }
        }

        info!("Scanned {} content file(s), {} tokens", scanned, tokens.len());
        data.insert(PURGE_TOKENS, tokens);
        Ok(data)
    }
}

/// Drop style rules whose selectors never appear in content
pub struct PurgeNode;

#[async_trait]
impl PipeNode for PurgeNode {
    fn name(&self) -> String {
        "Purge".to_string()
    }

    fn input(&self) -> Vec<String> {
        vec![ASSETS.name().to_string(), PURGE_TOKENS.name().to_string()]
    }

    fn output(&self) -> Vec<String> {
        vec![ASSETS.name().to_string()]
    }

    async fn process(&self, mut data: PipeMap) -> Result<PipeMap> {
        let mut assets = data
            .take(ASSETS)
            .ok_or_else(|| BuildError::missing_input(ASSETS.name()))?;
        let tokens = data
            .take(PURGE_TOKENS)
            .ok_or_else(|| BuildError::missing_input(PURGE_TOKENS.name()))?;
        let purger = Purger::new(tokens);

        let assets = tokio::task::spawn_blocking(move || {
            for asset in assets.iter_mut().filter(|a| purger.can_process(&a.path)) {
                let before = asset.contents.len();
                asset.contents = purger.apply(&asset.contents, &asset.source)?;
                debug!(
                    "Purged {:?}: {} -> {} bytes",
                    asset.path,
                    before,
                    asset.contents.len()
                );
            }
            Ok::<_, BuildError>(assets)
        })
        .await??;

        data.insert(ASSETS, assets);
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Asset;
    use std::fs;

    #[tokio::test]
    async fn test_compile_renames_and_skips_partials() {
        let mut data = PipeMap::new();
        data.insert(
            ASSETS,
            vec![
                Asset::new("main.scss", "/src/css/main.scss", b".a { .b { c: d; } }".to_vec()),
                Asset::new("_vars.scss", "/src/css/_vars.scss", b"$x: 1;".to_vec()),
                Asset::new("notes.txt", "/src/css/notes.txt", b"hi".to_vec()),
            ],
        );

        let data = StyleCompilerNode::new().process(data).await.unwrap();
        let assets = data.get(ASSETS).unwrap();

        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].path.to_string_lossy(), "main.css");
        assert!(String::from_utf8_lossy(&assets[0].contents).contains(".a .b"));
    }

    #[tokio::test]
    async fn test_compile_error_is_compile_variant() {
        let mut data = PipeMap::new();
        data.insert(
            ASSETS,
            vec![Asset::new("bad.scss", "/src/css/bad.scss", b".a { color: ".to_vec())],
        );

        let err = StyleCompilerNode::new().process(data).await.unwrap_err();
        assert!(err.is_compile());
    }

    #[tokio::test]
    async fn test_scan_then_purge() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), r#"<p class="kept"></p>"#).unwrap();
        let pattern = format!(
            "{}/**/*.html",
            glob::Pattern::escape(&dir.path().to_string_lossy())
        );

        let mut data = PipeMap::new();
        data.insert(
            ASSETS,
            vec![Asset::new(
                "style.css",
                "style.css",
                b".kept { color: red; }\n.dropped { color: blue; }\n".to_vec(),
            )],
        );

        let data = ContentScanNode::new(&[pattern]).process(data).await.unwrap();
        assert!(data.get(PURGE_TOKENS).unwrap().contains("kept"));

        let data = PurgeNode.process(data).await.unwrap();
        let css = String::from_utf8_lossy(&data.get(ASSETS).unwrap()[0].contents).to_string();

        assert!(css.contains(".kept"));
        assert!(!css.contains(".dropped"));
    }
}
