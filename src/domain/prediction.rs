use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WasteClass {
    #[serde(rename = "Biodegradable")]
    Biodegradable,
    #[serde(rename = "Non-Biodegradable")]
    NonBiodegradable,
}

impl WasteClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            WasteClass::Biodegradable => "Biodegradable",
            WasteClass::NonBiodegradable => "Non-Biodegradable",
        }
    }

    pub fn from_biodegradable(is_biodegradable: bool) -> Self {
        if is_biodegradable { WasteClass::Biodegradable } else { WasteClass::NonBiodegradable }
    }
}

impl std::fmt::Display for WasteClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PredictionResult {
    pub class: WasteClass,
    pub confidence: f32,     // probabilidad de la clase elegida, nunca < umbral
    pub raw_prediction: f32, // salida cruda del modelo (probabilidad de Non-Biodegradable)
}

impl PredictionResult {
    /// Regla de umbral: sobre el umbral gana `Non-Biodegradable` con `raw`,
    /// si no gana `Biodegradable` con `1 - raw`.
    pub fn from_scalar(raw: f32, threshold: f32) -> Self {
        if raw > threshold {
            Self { class: WasteClass::NonBiodegradable, confidence: raw, raw_prediction: raw }
        } else {
            Self { class: WasteClass::Biodegradable, confidence: 1.0 - raw, raw_prediction: raw }
        }
    }

    pub fn confidence_percent(&self) -> f32 {
        // Una cifra decimal, igual que el panel de resultados.
        (self.confidence * 1000.0).round() / 10.0
    }
}
