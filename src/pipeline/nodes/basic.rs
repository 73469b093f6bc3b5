use crate::error::{BuildError, Result};
use crate::pipeline::keys::{ASSETS, OUTPUT_DIR, WRITTEN};
use crate::pipeline::{Asset, PipeMap, PipeNode};
use crate::util::file::{collect_files, concat, read_assets};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs as async_fs;
use tracing::{debug, warn};

/// File collector node - glob source files and read them into assets
pub struct FileCollectorNode {
    root: PathBuf,
    include: Vec<String>,
    exclude: Vec<String>,
}

impl FileCollectorNode {
    pub fn new(root: impl Into<PathBuf>, include: &[&str]) -> Self {
        Self {
            root: root.into(),
            include: include.iter().map(|s| s.to_string()).collect(),
            exclude: Vec::new(),
        }
    }

    pub fn excluding(mut self, pattern: &str) -> Self {
        self.exclude.push(pattern.to_string());
        self
    }
}

#[async_trait]
impl PipeNode for FileCollectorNode {
    fn name(&self) -> String {
        "FileCollector".to_string()
    }

    fn input(&self) -> Vec<String> {
        Vec::new()
    }

    fn output(&self) -> Vec<String> {
        vec![ASSETS.name().to_string()]
    }

    async fn process(&self, mut data: PipeMap) -> Result<PipeMap> {
        let include: Vec<&str> = self.include.iter().map(String::as_str).collect();
        let exclude: Vec<&str> = self.exclude.iter().map(String::as_str).collect();

        let files = collect_files(&self.root, &include, &exclude)?;
        debug!("Found {} files under {:?}", files.len(), self.root);

        let assets = read_assets(&self.root, files).await?;
        data.insert(ASSETS, assets);
        Ok(data)
    }
}

/// Concat node - merge every asset into one named bundle
pub struct ConcatNode {
    bundle: String,
}

impl ConcatNode {
    pub fn new(bundle: impl Into<String>) -> Self {
        Self {
            bundle: bundle.into(),
        }
    }
}

#[async_trait]
impl PipeNode for ConcatNode {
    fn name(&self) -> String {
        "Concat".to_string()
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

        if assets.is_empty() {
            warn!("No inputs for {}, nothing to bundle", self.bundle);
            data.insert(ASSETS, Vec::new());
            return Ok(data);
        }

        debug!("Concatenating {} files into {}", assets.len(), self.bundle);
        let bundle = Asset::new(&self.bundle, &self.bundle, concat(&assets));
        data.insert(ASSETS, vec![bundle]);
        Ok(data)
    }
}

/// File writer node - write assets beneath the output directory
pub struct FileWriterNode;

#[async_trait]
impl PipeNode for FileWriterNode {
    fn name(&self) -> String {
        "FileWriter".to_string()
    }

    fn input(&self) -> Vec<String> {
        vec![ASSETS.name().to_string(), OUTPUT_DIR.name().to_string()]
    }

    fn output(&self) -> Vec<String> {
        vec![WRITTEN.name().to_string()]
    }

    async fn process(&self, mut data: PipeMap) -> Result<PipeMap> {
        let assets = data
            .take(ASSETS)
            .ok_or_else(|| BuildError::missing_input(ASSETS.name()))?;
        let output_dir = data
            .get(OUTPUT_DIR)
            .ok_or_else(|| BuildError::missing_input(OUTPUT_DIR.name()))?
            .clone();

        let mut written = Vec::with_capacity(assets.len());
        for asset in assets {
            let dest = output_dir.join(&asset.path);
            if let Some(parent) = dest.parent() {
                async_fs::create_dir_all(parent)
                    .await
                    .map_err(|e| BuildError::io_at(parent, e))?;
            }
            async_fs::write(&dest, &asset.contents)
                .await
                .map_err(|e| BuildError::io_at(&dest, e))?;
            debug!("Wrote {:?} ({} bytes)", dest, asset.contents.len());
            written.push(dest);
        }

        data.insert(WRITTEN, written);
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_collect_concat_write() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        fs::create_dir_all(src.path().join("libs")).unwrap();
        fs::write(src.path().join("app.js"), "app();").unwrap();
        fs::write(src.path().join("libs/lib.js"), "lib();").unwrap();

        let mut data = PipeMap::new();
        data.insert(OUTPUT_DIR, out.path().to_path_buf());

        let collector = FileCollectorNode::new(src.path(), &["libs/**/*.js", "**/*.js"]);
        let data = collector.process(data).await.unwrap();
        let data = ConcatNode::new("scripts.js").process(data).await.unwrap();
        let data = FileWriterNode.process(data).await.unwrap();

        assert_eq!(data.get(WRITTEN), Some(&vec![out.path().join("scripts.js")]));
        assert_eq!(
            fs::read_to_string(out.path().join("scripts.js")).unwrap(),
            "lib();\napp();"
        );
    }

    #[tokio::test]
    async fn test_empty_bundle_writes_nothing() {
        let out = tempfile::tempdir().unwrap();
        let mut data = PipeMap::new();
        data.insert(ASSETS, Vec::new());
        data.insert(OUTPUT_DIR, out.path().to_path_buf());

        let data = ConcatNode::new("style.css").process(data).await.unwrap();
        let data = FileWriterNode.process(data).await.unwrap();

        assert_eq!(data.get(WRITTEN), Some(&Vec::new()));
        assert!(!out.path().join("style.css").exists());
    }
}
