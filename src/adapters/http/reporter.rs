use std::sync::{Mutex, PoisonError};
use tokio::sync::broadcast;
use tracing::debug;

use crate::application::ports::ReporterPort;
use crate::domain::{
    prediction::WasteClass,
    ui::{Severity, UiEvent},
};

/// Destino de eventos de UI; cualquier sumidero obtiene `ReporterPort`.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: UiEvent);
}

impl<T: EventSink> ReporterPort for T {
    fn report_status(&self, message: &str) {
        self.emit(UiEvent::Status { message: message.to_string() });
    }
    fn notify(&self, message: &str, severity: Severity) {
        self.emit(UiEvent::Notification { message: message.to_string(), severity });
    }
    fn render_prediction(&self, class: WasteClass, confidence_percent: f32) {
        self.emit(UiEvent::Prediction { class, confidence_percent });
    }
    fn render_placeholder(&self, message: &str) {
        self.emit(UiEvent::Placeholder { message: message.to_string() });
    }
    fn set_loading(&self, active: bool) {
        self.emit(UiEvent::Loading { active });
    }
}

/// Difunde eventos a todas las páginas conectadas por WebSocket.
#[derive(Clone)]
pub struct BroadcastReporter {
    tx: broadcast::Sender<UiEvent>,
}

impl BroadcastReporter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }
}

impl EventSink for BroadcastReporter {
    fn emit(&self, event: UiEvent) {
        if self.tx.receiver_count() > 0 {
            let _ = self.tx.send(event);
        } else {
            debug!("Evento sin suscriptores: {:?}", event);
        }
    }
}

/// Reúne los eventos de una petición para devolverlos en la respuesta.
/// Solo los ve quien hizo la petición; no pasan por el canal de difusión.
#[derive(Default)]
pub struct RequestReporter {
    events: Mutex<Vec<UiEvent>>,
}

impl RequestReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_events(self) -> Vec<UiEvent> {
        self.events.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventSink for RequestReporter {
    fn emit(&self, event: UiEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }
}
