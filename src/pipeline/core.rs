use crate::error::{PipelineResult, ProcessingError, Result};
use crate::pipeline::PipeMap;
use async_trait::async_trait;
use tracing::debug;

#[async_trait]
pub trait PipeNode: Send + Sync {
    fn name(&self) -> String;

    /// Keys read from the map; a trailing `?` marks an optional input
    fn input(&self) -> Vec<String>;

    fn output(&self) -> Vec<String>;

    async fn process(&self, data: PipeMap) -> Result<PipeMap>;

    fn validate_input(&self, data: &PipeMap) -> PipelineResult<()> {
        for input in self.input() {
            let is_optional = input.ends_with('?');
            let clean_input = input.trim_end_matches('?');

            if !is_optional && !data.contains_key(clean_input) {
                return Err(ProcessingError::missing_input(self.name(), clean_input));
            }
        }
        Ok(())
    }

    fn validate_output(&self, data: &PipeMap) -> PipelineResult<()> {
        for output in self.output() {
            // Outputs are always required
            if !data.contains_key(&output) {
                return Err(ProcessingError::missing_output(self.name(), output));
            }
        }
        Ok(())
    }
}

pub struct Pipeline {
    nodes: Vec<Box<dyn PipeNode>>,
    name: String,
    external_inputs: Vec<String>,
}

impl Pipeline {
    pub fn new(name: &str) -> Self {
        Self {
            nodes: Vec::new(),
            name: name.to_string(),
            external_inputs: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set external inputs that will be provided via initial PipeMap
    pub fn with_external_inputs(mut self, external_inputs: Vec<String>) -> Self {
        self.external_inputs = external_inputs;
        self
    }

    pub fn add_node(mut self, node: Box<dyn PipeNode>) -> PipelineResult<Self> {
        let current_inputs = node.input();
        let mut available_sources: Vec<String> = self.external_inputs.clone();
        for existing_node in &self.nodes {
            available_sources.extend(existing_node.output());
        }

        let missing_inputs: Vec<&String> = current_inputs
            .iter()
            .filter(|input| !input.ends_with('?'))
            .filter(|input| !available_sources.iter().any(|source| source == *input))
            .collect();

        if !missing_inputs.is_empty() {
            return Err(ProcessingError::config_error(format!(
                "Node '{}' requires inputs {:?} that are not available.\n\
                 Available sources (previous node outputs + external inputs): {:?}\n\
                 Tip: Add '?' suffix to make inputs optional",
                node.name(),
                missing_inputs,
                available_sources,
            )));
        }

        debug!(
            "Adding node '{}' to pipeline '{}'. Inputs: {:?}, Available sources: {:?}",
            node.name(),
            self.name,
            current_inputs,
            available_sources
        );

        self.nodes.push(node);
        Ok(self)
    }

    pub async fn execute(&self, mut data: PipeMap) -> Result<PipeMap> {
        debug!(
            "Executing pipeline '{}' with {} nodes",
            self.name,
            self.nodes.len()
        );

        for (index, node) in self.nodes.iter().enumerate() {
            debug!("Processing node {}: '{}'", index + 1, node.name());

            node.validate_input(&data)?;
            data = node.process(data).await?;
            node.validate_output(&data)?;

            debug!("Node '{}' processed successfully", node.name());
        }

        debug!("Pipeline '{}' executed successfully", self.name);
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use crate::pipeline::TypedKey;

    const SEED: TypedKey<u32> = TypedKey::new("seed");
    const DOUBLED: TypedKey<u32> = TypedKey::new("doubled");

    struct Doubler;

    #[async_trait]
    impl PipeNode for Doubler {
        fn name(&self) -> String {
            "Doubler".to_string()
        }

        fn input(&self) -> Vec<String> {
            vec![SEED.name().to_string()]
        }

        fn output(&self) -> Vec<String> {
            vec![DOUBLED.name().to_string()]
        }

        async fn process(&self, mut data: PipeMap) -> Result<PipeMap> {
            let seed = data
                .get(SEED)
                .copied()
                .ok_or_else(|| BuildError::missing_input(SEED.name()))?;
            data.insert(DOUBLED, seed * 2);
            Ok(data)
        }
    }

    struct Forgetful;

    #[async_trait]
    impl PipeNode for Forgetful {
        fn name(&self) -> String {
            "Forgetful".to_string()
        }

        fn input(&self) -> Vec<String> {
            vec!["doubled".to_string(), "extra?".to_string()]
        }

        fn output(&self) -> Vec<String> {
            vec!["never".to_string()]
        }

        async fn process(&self, data: PipeMap) -> Result<PipeMap> {
            Ok(data)
        }
    }

    #[tokio::test]
    async fn test_execute_chain() {
        let pipeline = Pipeline::new("test")
            .with_external_inputs(vec!["seed".to_string()])
            .add_node(Box::new(Doubler))
            .unwrap();

        let mut data = PipeMap::new();
        data.insert(SEED, 21);
        let data = pipeline.execute(data).await.unwrap();

        assert_eq!(data.get(DOUBLED), Some(&42));
    }

    #[test]
    fn test_unavailable_input_rejected() {
        let result = Pipeline::new("test").add_node(Box::new(Doubler));
        assert!(matches!(result, Err(ProcessingError::ConfigError { .. })));
    }

    #[test]
    fn test_optional_input_accepted() {
        let result = Pipeline::new("test")
            .with_external_inputs(vec!["seed".to_string()])
            .add_node(Box::new(Doubler))
            .and_then(|p| p.add_node(Box::new(Forgetful)));
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_missing_output_detected() {
        let pipeline = Pipeline::new("test")
            .with_external_inputs(vec!["seed".to_string()])
            .add_node(Box::new(Doubler))
            .and_then(|p| p.add_node(Box::new(Forgetful)))
            .unwrap();

        let mut data = PipeMap::new();
        data.insert(SEED, 1);
        let err = pipeline.execute(data).await.unwrap_err();

        assert!(matches!(
            err,
            BuildError::Pipeline(ProcessingError::MissingOutput { .. })
        ));
    }
}
