use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::adapters::onnx::descriptor::{ensure_exists, parse_lenient, parse_strict, read_descriptor, resolve_weights};
use crate::adapters::onnx::engine::OnnxClassifierEngine;
use crate::application::ports::{InferencePort, ModelLoaderPort};
use crate::domain::{
    errors::{DomainError, DomainResult},
    model::{ModelConfig, ModelFormat, ModelLocation},
};

/// Estrategia de carga ONNX para un formato concreto.
pub struct OnnxModelLoader {
    format: ModelFormat,
    config: Arc<ModelConfig>,
}

impl OnnxModelLoader {
    pub fn new(format: ModelFormat, config: Arc<ModelConfig>) -> Self {
        Self { format, config }
    }

    /// Cadena completa en el orden fijo de respaldo.
    pub fn fallback_chain(config: &Arc<ModelConfig>) -> Vec<Arc<dyn ModelLoaderPort>> {
        ModelFormat::FALLBACK_ORDER
            .iter()
            .map(|&f| Arc::new(Self::new(f, config.clone())) as Arc<dyn ModelLoaderPort>)
            .collect()
    }

    async fn weights_path(&self, location: &ModelLocation) -> DomainResult<PathBuf> {
        match self.format {
            ModelFormat::Descriptor => {
                let text = read_descriptor(&location.descriptor).await?;
                let d = parse_strict(&text, &self.config)?;
                if let Some(classes) = d.classes.as_ref().filter(|c| **c != self.config.classes) {
                    warn!("Clases del descriptor {:?} distintas de las configuradas; se usan las configuradas", classes);
                }
                resolve_weights(location.base_dir(), &d.weights).await
            }
            ModelFormat::Graph => {
                let path = location.sibling_graph();
                ensure_exists(&path).await?;
                Ok(path)
            }
            ModelFormat::Lenient => {
                let text = read_descriptor(&location.descriptor).await?;
                let d = parse_lenient(&text)?;
                resolve_weights(location.base_dir(), &d.weights).await
            }
        }
    }
}

#[async_trait]
impl ModelLoaderPort for OnnxModelLoader {
    fn format(&self) -> ModelFormat {
        self.format
    }

    async fn load(&self, location: &ModelLocation) -> DomainResult<Arc<dyn InferencePort>> {
        let path = self.weights_path(location).await?;
        debug!("Formato {}: cargando pesos {}", self.format.as_str(), path.display());

        let engine = tokio::task::spawn_blocking(move || OnnxClassifierEngine::load(&path))
            .await
            .map_err(|e| DomainError::OperationFailed(e.to_string()))?
            .map_err(|e| DomainError::ModelFormat(format!("{e:#}")))?;
        Ok(Arc::new(engine))
    }
}
