//! Pipeline assembly, one pipeline per category and profile
use super::{Category, Profile};
use crate::config::constants::{EXTERNAL_SCRIPTS, LIBS_DIR, SCRIPT_BUNDLE, STYLE_BUNDLE};
use crate::config::{AssetPaths, Config};
use crate::error::PipelineResult;
use crate::pipeline::Pipeline;
use crate::pipeline::keys::OUTPUT_DIR;
use crate::pipeline::nodes::{
    ConcatNode, ContentScanNode, FileCollectorNode, FileWriterNode, PurgeNode,
    StyleCompilerNode, TransformNode,
};
use crate::transform::{
    CssMinifier, HtmlMinifier, ImageOptimizer, JsMinifier, Prefixer, UtilityCss,
};
use std::path::PathBuf;

/// Directory a category writes into
pub fn output_dir(category: Category, out: &AssetPaths) -> PathBuf {
    match category {
        Category::Styles => out.css.clone(),
        Category::Scripts => out.js.clone(),
        Category::Images => out.img.clone(),
        Category::Markup => out.base.clone(),
    }
}

pub fn pipeline_for(category: Category, profile: Profile, config: &Config) -> PipelineResult<Pipeline> {
    match category {
        Category::Styles => styles(profile, config),
        Category::Scripts => scripts(profile, config),
        Category::Images => images(profile, config),
        Category::Markup => markup(profile, config),
    }
}

fn new_pipeline(category: Category, profile: Profile) -> Pipeline {
    Pipeline::new(&format!("{category}:{profile}"))
        .with_external_inputs(vec![OUTPUT_DIR.name().to_string()])
}

fn styles(profile: Profile, config: &Config) -> PipelineResult<Pipeline> {
    let runtime = &config.runtime;
    let mut pipeline = new_pipeline(Category::Styles, profile)
        .add_node(Box::new(FileCollectorNode::new(&config.paths.src.css, &["**/*"])))?
        .add_node(Box::new(StyleCompilerNode::new()))?
        .add_node(Box::new(TransformNode::new(UtilityCss::new(
            &runtime.utility_bin,
            &runtime.framework_config,
        ))))?
        .add_node(Box::new(TransformNode::new(Prefixer::default())))?
        .add_node(Box::new(ConcatNode::new(STYLE_BUNDLE)))?;

    if profile.is_optimized() {
        pipeline = pipeline
            .add_node(Box::new(ContentScanNode::new(config.purge_content())))?
            .add_node(Box::new(PurgeNode))?
            .add_node(Box::new(TransformNode::new(CssMinifier::default())))?;
    }

    pipeline.add_node(Box::new(FileWriterNode))
}

fn scripts(profile: Profile, config: &Config) -> PipelineResult<Pipeline> {
    let libs = format!("{LIBS_DIR}/**/*.js");
    let mut collector = FileCollectorNode::new(&config.paths.src.js, &[libs.as_str(), "**/*.js"]);
    if config.scripts.exclude_external.excludes(profile) {
        collector = collector.excluding(EXTERNAL_SCRIPTS);
    }

    let mut pipeline = new_pipeline(Category::Scripts, profile)
        .add_node(Box::new(collector))?
        .add_node(Box::new(ConcatNode::new(SCRIPT_BUNDLE)))?;

    if profile.is_optimized() {
        pipeline = pipeline.add_node(Box::new(TransformNode::new(JsMinifier::new())))?;
    }

    pipeline.add_node(Box::new(FileWriterNode))
}

fn images(profile: Profile, config: &Config) -> PipelineResult<Pipeline> {
    let mut pipeline = new_pipeline(Category::Images, profile)
        .add_node(Box::new(FileCollectorNode::new(&config.paths.src.img, &["**/*"])))?;

    if profile.is_optimized() {
        pipeline = pipeline.add_node(Box::new(TransformNode::new(ImageOptimizer::new())))?;
    }

    pipeline.add_node(Box::new(FileWriterNode))
}

fn markup(profile: Profile, config: &Config) -> PipelineResult<Pipeline> {
    let mut pipeline = new_pipeline(Category::Markup, profile)
        .add_node(Box::new(FileCollectorNode::new(&config.paths.src.base, &["**/*.html"])))?;

    pipeline = match profile {
        Profile::Development => pipeline,
        Profile::Demo => pipeline.add_node(Box::new(TransformNode::new(HtmlMinifier::demo())))?,
        Profile::Production => {
            pipeline.add_node(Box::new(TransformNode::new(HtmlMinifier::production())))?
        }
    };

    pipeline.add_node(Box::new(FileWriterNode))
}
