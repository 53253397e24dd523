use serde::{Deserialize, Serialize};

use super::prediction::WasteClass;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// Eventos que el núcleo empuja hacia la página. La página nunca es consultada.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    Status { message: String },
    Notification { message: String, severity: Severity },
    Loading { active: bool },
    Prediction { class: WasteClass, confidence_percent: f32 },
    Placeholder { message: String },
}
