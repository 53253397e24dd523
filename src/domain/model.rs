use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Ruta fija del descriptor del modelo, relativa a la raíz estática del sitio.
pub const MODEL_DESCRIPTOR_PATH: &str = "js/model/model.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    pub input_shape: [usize; 3], // [alto, ancho, canales]
    pub classes: [String; 2],    // orden: [clase bajo umbral, clase sobre umbral]
    pub threshold: f32,          // 0..1
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            input_shape: [224, 224, 3],
            classes: ["Biodegradable".to_string(), "Non-Biodegradable".to_string()],
            threshold: 0.5,
        }
    }
}

impl ModelConfig {
    pub fn height(&self) -> usize { self.input_shape[0] }
    pub fn width(&self) -> usize { self.input_shape[1] }
    pub fn channels(&self) -> usize { self.input_shape[2] }
}

/// Ubicación del descriptor, ya resuelta contra la raíz del sitio.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelLocation {
    pub descriptor: PathBuf,
}

impl ModelLocation {
    pub fn resolve(static_root: &Path) -> Self {
        Self { descriptor: static_root.join(MODEL_DESCRIPTOR_PATH) }
    }

    /// Grafo ONNX hermano del descriptor (`model.onnx`).
    pub fn sibling_graph(&self) -> PathBuf {
        self.descriptor.with_extension("onnx")
    }

    pub fn base_dir(&self) -> &Path {
        self.descriptor.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Formatos de carga, en el orden en que se intentan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelFormat {
    Descriptor,
    Graph,
    Lenient,
}

impl ModelFormat {
    pub const FALLBACK_ORDER: [ModelFormat; 3] =
        [ModelFormat::Descriptor, ModelFormat::Graph, ModelFormat::Lenient];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFormat::Descriptor => "descriptor",
            ModelFormat::Graph => "graph",
            ModelFormat::Lenient => "lenient",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PredictionMode {
    #[default]
    Auto,
    Model,
    Heuristic,
}

impl std::str::FromStr for PredictionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(PredictionMode::Auto),
            "model" => Ok(PredictionMode::Model),
            "heuristic" | "demo" => Ok(PredictionMode::Heuristic),
            other => Err(format!("modo desconocido: {other}")),
        }
    }
}
