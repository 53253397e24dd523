use serde::{Deserialize, Serialize};

use crate::domain::{
    errors::DomainResult,
    model::PredictionMode,
    prediction::PredictionResult,
    ui::UiEvent,
    upload::SampleImage,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub ok: bool,
    pub prediction: Option<PredictionResult>,
    pub confidence_percent: Option<f32>,
    pub error: Option<String>,
    /// Eventos de UI emitidos durante la petición, en orden.
    pub events: Vec<UiEvent>,
}

impl PredictionResponse {
    pub fn from_result(result: &DomainResult<PredictionResult>, events: Vec<UiEvent>) -> Self {
        match result {
            Ok(p) => Self {
                ok: true,
                prediction: Some(*p),
                confidence_percent: Some(p.confidence_percent()),
                error: None,
                events,
            },
            Err(e) => Self {
                ok: false,
                prediction: None,
                confidence_percent: None,
                error: Some(e.to_string()),
                events,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleDto {
    pub name: String,
    pub image: String,
}

impl From<SampleImage> for SampleDto {
    fn from(s: SampleImage) -> Self {
        Self { name: s.name().to_string(), image: s.asset_path().to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfigResponse {
    pub mode: PredictionMode,
    pub accepted_mime_prefix: String,
    pub samples: Vec<SampleDto>,
}
