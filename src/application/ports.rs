use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{
    errors::DomainResult,
    model::{ModelFormat, ModelLocation},
    prediction::{PredictionResult, WasteClass},
    tensor::ImageTensor,
    ui::Severity,
    upload::ImageUpload,
};

/// Motor de inferencia (real o simulado). Consume el tensor y devuelve
/// la salida escalar en `[0, 1]`.
#[async_trait]
pub trait InferencePort: Send + Sync {
    async fn infer(&self, tensor: ImageTensor) -> DomainResult<f32>;

    /// Salidas para un lote, en orden. Por defecto una inferencia por tensor.
    async fn infer_batch(&self, tensors: Vec<ImageTensor>) -> DomainResult<Vec<f32>> {
        let mut out = Vec::with_capacity(tensors.len());
        for t in tensors {
            out.push(self.infer(t).await?);
        }
        Ok(out)
    }

    fn backend(&self) -> &'static str;
}

/// Una estrategia de adquisición del modelo (un formato).
#[async_trait]
pub trait ModelLoaderPort: Send + Sync {
    fn format(&self) -> ModelFormat;
    async fn load(&self, location: &ModelLocation) -> DomainResult<Arc<dyn InferencePort>>;
}

/// Colaborador de UI: el núcleo solo empuja resultados hacia fuera.
pub trait ReporterPort: Send + Sync {
    fn report_status(&self, message: &str);
    fn notify(&self, message: &str, severity: Severity);
    fn render_prediction(&self, class: WasteClass, confidence_percent: f32);
    fn render_placeholder(&self, message: &str);
    fn set_loading(&self, active: bool);
}

/// Eventos de UI que dispara la página.
#[async_trait]
pub trait ImageEventHandler: Send + Sync {
    async fn on_file_selected(
        &self,
        upload: ImageUpload,
        reporter: &dyn ReporterPort,
    ) -> DomainResult<PredictionResult>;

    /// Lote: varias imágenes en una sola llamada al modelo activo.
    /// Un archivo que no sea imagen rechaza el lote completo.
    async fn on_files_selected(
        &self,
        uploads: Vec<ImageUpload>,
        reporter: &dyn ReporterPort,
    ) -> DomainResult<Vec<PredictionResult>>;

    async fn on_sample_chosen(
        &self,
        name: &str,
        reporter: &dyn ReporterPort,
    ) -> DomainResult<PredictionResult>;
}
