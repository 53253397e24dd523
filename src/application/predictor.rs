use crate::application::model_service::ModelHandle;
use crate::domain::{
    errors::{DomainError, DomainResult},
    model::ModelConfig,
    prediction::PredictionResult,
    tensor::ImageTensor,
};

fn checked_scalar(raw: f32) -> DomainResult<f32> {
    if !raw.is_finite() {
        return Err(DomainError::Inference(format!("salida no finita: {raw}")));
    }
    Ok(raw.clamp(0.0, 1.0))
}

/// Ejecuta el modelo activo sobre el tensor y aplica la regla de umbral.
/// El tensor se consume aquí y se libera al terminar la inferencia.
pub async fn predict(
    tensor: ImageTensor,
    handle: &ModelHandle,
    config: &ModelConfig,
) -> DomainResult<PredictionResult> {
    let raw = checked_scalar(handle.engine().infer(tensor).await?)?;
    Ok(PredictionResult::from_scalar(raw, config.threshold))
}

pub async fn predict_batch(
    tensors: Vec<ImageTensor>,
    handle: &ModelHandle,
    config: &ModelConfig,
) -> DomainResult<Vec<PredictionResult>> {
    if tensors.is_empty() {
        return Ok(Vec::new());
    }
    let expected = tensors.len();
    let raws = handle.engine().infer_batch(tensors).await?;
    if raws.len() != expected {
        return Err(DomainError::Inference(format!(
            "el lote devolvió {} salidas para {} entradas",
            raws.len(),
            expected
        )));
    }
    raws.into_iter()
        .map(|raw| checked_scalar(raw).map(|r| PredictionResult::from_scalar(r, config.threshold)))
        .collect()
}
