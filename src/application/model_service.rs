use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::application::{
    mock_model::MockModel,
    ports::{InferencePort, ModelLoaderPort, ReporterPort},
};
use crate::domain::{
    errors::{DomainError, DomainResult},
    model::{ModelConfig, ModelLocation},
    tensor::ImageTensor,
    ui::Severity,
};

const MSG_LOADED: &str = "AI model loaded successfully! Ready for predictions.";
const STATUS_DEMO_READY: &str = "Demo mode ready - try uploading an image!";

/// Modelo activo: real (cargado) o simulado (modo demo).
pub enum ModelHandle {
    Real(Arc<dyn InferencePort>),
    Mock(Arc<dyn InferencePort>),
}

impl ModelHandle {
    pub fn engine(&self) -> &Arc<dyn InferencePort> {
        match self {
            ModelHandle::Real(e) | ModelHandle::Mock(e) => e,
        }
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, ModelHandle::Mock(_))
    }
}

#[derive(Clone)]
pub enum ModelState {
    Unloaded,
    Loading,
    Ready(Arc<ModelHandle>),
    Fallback(Arc<ModelHandle>),
}

impl ModelState {
    pub fn handle(&self) -> Option<Arc<ModelHandle>> {
        match self {
            ModelState::Ready(h) | ModelState::Fallback(h) => Some(h.clone()),
            ModelState::Unloaded | ModelState::Loading => None,
        }
    }

    pub fn phase(&self) -> ModelPhase {
        match self {
            ModelState::Unloaded => ModelPhase::Unloaded,
            ModelState::Loading => ModelPhase::Loading,
            ModelState::Ready(_) => ModelPhase::Ready,
            ModelState::Fallback(_) => ModelPhase::Fallback,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelPhase {
    Unloaded,
    Loading,
    Ready,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub input_shape: [usize; 3],
    pub classes: [String; 2],
    pub threshold: f32,
    pub backend: String,
    pub state: ModelPhase,
    pub status: String,
    pub model_loaded: bool,
}

/// Mensaje para el usuario cuando se agotan todas las estrategias.
pub fn load_error_message(err: &DomainError) -> String {
    let detail = match err {
        DomainError::NotFound(_) => {
            "Model file not found. Please ensure the model is converted and placed in the correct directory."
        }
        DomainError::ModelFormat(_) => "Unsupported model format. Please re-export the model to ONNX.",
        DomainError::OperationFailed(_) => "Network error. Please check your connection and try again.",
        _ => "Please check the logs for details.",
    };
    format!("Failed to load AI model. {detail}")
}

/// Dueño único del modelo. `ensure_ready` es idempotente: las llamadas
/// concurrentes esperan a la misma adquisición.
pub struct ModelService {
    config: Arc<ModelConfig>,
    location: ModelLocation,
    loaders: Vec<Arc<dyn ModelLoaderPort>>,
    reporter: Arc<dyn ReporterPort>,
    mock_delay: Duration,
    state: RwLock<ModelState>,
    status: RwLock<String>,
    last_notice: RwLock<Option<(String, Severity)>>,
    gate: tokio::sync::Mutex<()>,
}

/// Vuelve a `Unloaded` si la adquisición se abandona a medias.
struct LoadingReset<'a> {
    svc: &'a ModelService,
    armed: bool,
}

impl Drop for LoadingReset<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("Adquisición del modelo abandonada; se vuelve a Unloaded");
            self.svc.set_state(ModelState::Unloaded);
        }
    }
}

impl ModelService {
    pub fn new(
        config: Arc<ModelConfig>,
        location: ModelLocation,
        loaders: Vec<Arc<dyn ModelLoaderPort>>,
        reporter: Arc<dyn ReporterPort>,
        mock_delay: Duration,
    ) -> Self {
        Self {
            config,
            location,
            loaders,
            reporter,
            mock_delay,
            state: RwLock::new(ModelState::Unloaded),
            status: RwLock::new("Initializing...".to_string()),
            last_notice: RwLock::new(None),
            gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn config(&self) -> &Arc<ModelConfig> {
        &self.config
    }

    pub fn state(&self) -> ModelState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn status(&self) -> String {
        self.status.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Última notificación de adquisición, para páginas que se conectan después.
    pub fn last_notice(&self) -> Option<(String, Severity)> {
        self.last_notice.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn announce(&self, message: &str, severity: Severity) {
        *self.last_notice.write().unwrap_or_else(PoisonError::into_inner) =
            Some((message.to_string(), severity));
        self.reporter.notify(message, severity);
    }

    fn set_state(&self, next: ModelState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    fn update_status(&self, message: &str) {
        *self.status.write().unwrap_or_else(PoisonError::into_inner) = message.to_string();
        info!("Estado del modelo: {}", message);
        self.reporter.report_status(message);
    }

    /// Devuelve el modelo activo, adquiriéndolo si aún no existe. Nunca falla:
    /// si no se puede cargar ninguno se instala el modelo simulado.
    pub async fn ensure_ready(&self) -> Arc<ModelHandle> {
        if let Some(h) = self.state().handle() {
            return h;
        }

        let _gate = self.gate.lock().await;
        if let Some(h) = self.state().handle() {
            return h;
        }

        self.set_state(ModelState::Loading);
        let mut reset = LoadingReset { svc: self, armed: true };
        self.update_status("Loading AI model...");

        let (handle, next) = match self.acquire().await {
            Ok(engine) => {
                self.warm_up(engine.as_ref()).await;
                let handle = Arc::new(ModelHandle::Real(engine));
                self.update_status("Model loaded successfully!");
                self.announce(MSG_LOADED, Severity::Success);
                (handle.clone(), ModelState::Ready(handle))
            }
            Err(last) => {
                error!("No se pudo cargar el modelo de producción: {}", last);
                self.update_status("Initializing demo mode...");
                let mock: Arc<dyn InferencePort> = Arc::new(MockModel::new(self.mock_delay));
                let handle = Arc::new(ModelHandle::Mock(mock));
                self.announce(&load_error_message(&last), Severity::Error);
                self.update_status(STATUS_DEMO_READY);
                (handle.clone(), ModelState::Fallback(handle))
            }
        };

        self.set_state(next);
        reset.armed = false;
        handle
    }

    /// Prueba las estrategias en orden; la primera que funciona gana.
    async fn acquire(&self) -> DomainResult<Arc<dyn InferencePort>> {
        info!("🔄 Cargando modelo desde {}", self.location.descriptor.display());
        let mut last_err = None;

        for loader in &self.loaders {
            let format = loader.format();
            match loader.load(&self.location).await {
                Ok(engine) => {
                    info!("✅ Modelo cargado (formato {}, backend {})", format.as_str(), engine.backend());
                    return Ok(engine);
                }
                Err(e) => {
                    warn!("Formato {} falló: {}", format.as_str(), e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            DomainError::NotFound(self.location.descriptor.display().to_string())
        }))
    }

    async fn warm_up(&self, engine: &dyn InferencePort) {
        self.update_status("Warming up model...");
        match engine.infer(ImageTensor::zeros(&self.config)).await {
            Ok(v) => debug!("Calentamiento completado (salida {})", v),
            Err(e) => warn!("Calentamiento del modelo fallido (se continúa): {}", e),
        }
    }

    /// Libera el modelo activo; la siguiente llamada a `ensure_ready` lo recarga.
    pub async fn dispose(&self) {
        let _gate = self.gate.lock().await;
        if self.state().handle().is_some() {
            self.set_state(ModelState::Unloaded);
            *self.last_notice.write().unwrap_or_else(PoisonError::into_inner) = None;
            info!("Modelo liberado");
        }
    }

    pub fn info(&self) -> ModelInfo {
        let state = self.state();
        let backend = state
            .handle()
            .map(|h| h.engine().backend().to_string())
            .unwrap_or_else(|| "none".to_string());
        ModelInfo {
            input_shape: self.config.input_shape,
            classes: self.config.classes.clone(),
            threshold: self.config.threshold,
            backend,
            model_loaded: state.handle().is_some(),
            state: state.phase(),
            status: self.status(),
        }
    }
}
