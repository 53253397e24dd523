use std::sync::Arc;

use crate::adapters::http::reporter::BroadcastReporter;
use crate::application::{model_service::ModelService, ports::ImageEventHandler};
use crate::domain::model::PredictionMode;

/// Estado compartido para los manejadores HTTP de Axum.
#[derive(Clone)]
pub struct HttpState {
    /// Manejador de los eventos de imagen (subida, lote y muestras).
    pub events: Arc<dyn ImageEventHandler>,
    /// Dueño del modelo; solo se consulta para información.
    pub model: Arc<ModelService>,
    /// Canal de difusión hacia las páginas conectadas.
    pub hub: BroadcastReporter,
    pub mode: PredictionMode,
}
