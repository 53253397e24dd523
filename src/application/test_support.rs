//! Dobles de prueba compartidos por los tests de la capa de aplicación.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::application::ports::{InferencePort, ModelLoaderPort, ReporterPort};
use crate::domain::{
    errors::{DomainError, DomainResult},
    model::{ModelFormat, ModelLocation},
    prediction::WasteClass,
    tensor::ImageTensor,
    ui::{Severity, UiEvent},
};

#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<(String, Severity)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Notification { message, severity } => Some((message, severity)),
                _ => None,
            })
            .collect()
    }

    pub fn loading_toggles(&self) -> Vec<bool> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Loading { active } => Some(active),
                _ => None,
            })
            .collect()
    }

    fn push(&self, ev: UiEvent) {
        self.events.lock().unwrap().push(ev);
    }
}

impl ReporterPort for RecordingReporter {
    fn report_status(&self, message: &str) {
        self.push(UiEvent::Status { message: message.into() });
    }
    fn notify(&self, message: &str, severity: Severity) {
        self.push(UiEvent::Notification { message: message.into(), severity });
    }
    fn render_prediction(&self, class: WasteClass, confidence_percent: f32) {
        self.push(UiEvent::Prediction { class, confidence_percent });
    }
    fn render_placeholder(&self, message: &str) {
        self.push(UiEvent::Placeholder { message: message.into() });
    }
    fn set_loading(&self, active: bool) {
        self.push(UiEvent::Loading { active });
    }
}

/// Devuelve los valores en orden; al agotarse repite el último.
pub struct FixedInference {
    values: Mutex<VecDeque<f32>>,
    last: Mutex<f32>,
}

impl FixedInference {
    pub fn new(values: Vec<f32>) -> Self {
        let last = values.last().copied().unwrap_or(0.0);
        Self { values: Mutex::new(values.into()), last: Mutex::new(last) }
    }
}

#[async_trait]
impl InferencePort for FixedInference {
    async fn infer(&self, _tensor: ImageTensor) -> DomainResult<f32> {
        let next = self.values.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        if let Some(v) = next {
            *last = v;
        }
        Ok(*last)
    }

    fn backend(&self) -> &'static str {
        "fixed"
    }
}

pub struct FailingInference;

#[async_trait]
impl InferencePort for FailingInference {
    async fn infer(&self, _tensor: ImageTensor) -> DomainResult<f32> {
        Err(DomainError::Inference("tensor corrupto".into()))
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

enum Outcome {
    Ok(Arc<dyn InferencePort>),
    Fail(fn() -> DomainError),
}

pub struct FakeLoader {
    format: ModelFormat,
    outcome: Outcome,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeLoader {
    pub fn ok(format: ModelFormat, engine: Arc<dyn InferencePort>) -> Self {
        Self { format, outcome: Outcome::Ok(engine), delay: Duration::ZERO, calls: AtomicUsize::new(0) }
    }

    pub fn failing(format: ModelFormat, err: fn() -> DomainError) -> Self {
        Self { format, outcome: Outcome::Fail(err), delay: Duration::ZERO, calls: AtomicUsize::new(0) }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelLoaderPort for FakeLoader {
    fn format(&self) -> ModelFormat {
        self.format
    }

    async fn load(&self, _location: &ModelLocation) -> DomainResult<Arc<dyn InferencePort>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.outcome {
            Outcome::Ok(engine) => Ok(engine.clone()),
            Outcome::Fail(err) => Err(err()),
        }
    }
}
