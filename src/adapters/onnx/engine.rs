use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ndarray::{concatenate, Axis};
use ort::session::Session;
use ort::value::Value;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::application::ports::InferencePort;
use crate::domain::{
    errors::{DomainError, DomainResult},
    tensor::ImageTensor,
};

/// Clasificador binario sobre onnxruntime. Entrada NHWC `[N, 224, 224, 3]`,
/// salida `[N, 1]` con la probabilidad de `Non-Biodegradable`.
pub struct OnnxClassifierEngine {
    session: Arc<Mutex<Session>>,
}

impl OnnxClassifierEngine {
    pub fn load(path: &Path) -> Result<Self> {
        let model_bytes = fs::read(path)?;
        let session = Session::builder()?
            .with_intra_threads(4)?
            .commit_from_memory(&model_bytes)?;
        Ok(Self { session: Arc::new(Mutex::new(session)) })
    }

    /// Los buffers de entrada y salida viven solo dentro de esta función;
    /// se copian los escalares y se liberan al salir.
    fn run(session: &Mutex<Session>, tensor: ImageTensor) -> Result<Vec<f32>> {
        let mut session = session.lock().map_err(|_| anyhow!("sesión ONNX envenenada"))?;
        let (shape, data) = tensor.into_shape_and_data();
        let input = Value::from_array((shape, data))?;
        let outputs = session.run(ort::inputs![input])?;
        let (_, data_out) = outputs[0].try_extract_tensor::<f32>()?;
        Ok(data_out.to_vec())
    }

    async fn run_blocking(&self, tensor: ImageTensor) -> DomainResult<Vec<f32>> {
        let session = self.session.clone();
        tokio::task::spawn_blocking(move || Self::run(&session, tensor))
            .await
            .map_err(|e| DomainError::OperationFailed(e.to_string()))?
            .map_err(|e| DomainError::Inference(e.to_string()))
    }
}

#[async_trait]
impl InferencePort for OnnxClassifierEngine {
    async fn infer(&self, tensor: ImageTensor) -> DomainResult<f32> {
        self.run_blocking(tensor)
            .await?
            .first()
            .copied()
            .ok_or_else(|| DomainError::Inference("salida vacía".into()))
    }

    async fn infer_batch(&self, tensors: Vec<ImageTensor>) -> DomainResult<Vec<f32>> {
        if tensors.is_empty() {
            return Ok(Vec::new());
        }
        let n = tensors.len();
        let views: Vec<_> = tensors.iter().map(|t| t.view().view()).collect();
        let batch = concatenate(Axis(0), &views).map_err(|e| DomainError::InvalidInput(e.to_string()))?;
        drop(views);
        drop(tensors);

        let out = self.run_blocking(ImageTensor::new(batch)).await?;
        if out.len() < n {
            return Err(DomainError::Inference(format!("{} salidas para un lote de {}", out.len(), n)));
        }
        Ok(out.into_iter().take(n).collect())
    }

    fn backend(&self) -> &'static str {
        "onnxruntime"
    }
}
