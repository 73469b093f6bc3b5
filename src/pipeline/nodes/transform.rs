use crate::error::{BuildError, Result};
use crate::pipeline::keys::ASSETS;
use crate::pipeline::{PipeMap, PipeNode};
use crate::transform::Transform;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Applies one library transform to every asset it can process.
///
/// The library call runs on the blocking pool; assets it does not
/// understand pass through untouched.
pub struct TransformNode {
    transform: Arc<dyn Transform>,
}

impl TransformNode {
    pub fn new(transform: impl Transform + 'static) -> Self {
        Self {
            transform: Arc::new(transform),
        }
    }
}

#[async_trait]
impl PipeNode for TransformNode {
    fn name(&self) -> String {
        self.transform.name().to_string()
    }

    fn input(&self) -> Vec<String> {
        vec![ASSETS.name().to_string()]
    }

    fn output(&self) -> Vec<String> {
        vec![ASSETS.name().to_string()]
    }

    async fn process(&self, mut data: PipeMap) -> Result<PipeMap> {
        let mut assets = data
            .take(ASSETS)
            .ok_or_else(|| BuildError::missing_input(ASSETS.name()))?;
        let transform = Arc::clone(&self.transform);

        let assets = tokio::task::spawn_blocking(move || {
            for asset in assets.iter_mut() {
                if !transform.can_process(&asset.path) {
                    continue;
                }
                debug!("{} processing {:?}", transform.name(), asset.path);
                asset.contents = transform.apply(&asset.contents, &asset.source)?;
            }
            Ok::<_, BuildError>(assets)
        })
        .await??;

        data.insert(ASSETS, assets);
        Ok(data)
    }
}
