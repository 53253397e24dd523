use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::domain::{
    errors::{DomainError, DomainResult},
    model::ModelConfig,
};

fn default_weights() -> String {
    "model.onnx".to_string()
}

/// Descriptor estricto: campos exactos y forma de entrada igual a la configurada.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModelDescriptor {
    pub format: String,
    pub weights: String,
    pub input_shape: [usize; 3],
    #[serde(default)]
    pub classes: Option<[String; 2]>,
}

/// Descriptor tolerante: ignora campos desconocidos; `weights` por defecto `model.onnx`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LenientDescriptor {
    #[serde(default = "default_weights")]
    pub weights: String,
}

pub async fn read_descriptor(path: &Path) -> DomainResult<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => DomainError::NotFound(format!("model file not found: {}", path.display())),
        _ => DomainError::OperationFailed(format!("{}: {}", path.display(), e)),
    })
}

pub fn parse_strict(text: &str, config: &ModelConfig) -> DomainResult<ModelDescriptor> {
    let d: ModelDescriptor =
        serde_json::from_str(text).map_err(|e| DomainError::ModelFormat(e.to_string()))?;
    if !d.format.eq_ignore_ascii_case("onnx") {
        return Err(DomainError::ModelFormat(format!("formato '{}' (se espera onnx)", d.format)));
    }
    if d.input_shape != config.input_shape {
        return Err(DomainError::ModelFormat(format!(
            "forma de entrada {:?} distinta de {:?}",
            d.input_shape, config.input_shape
        )));
    }
    Ok(d)
}

pub fn parse_lenient(text: &str) -> DomainResult<LenientDescriptor> {
    serde_json::from_str(text).map_err(|e| DomainError::ModelFormat(e.to_string()))
}

/// Resuelve los pesos relativos al directorio del descriptor, sin salir de él.
pub async fn resolve_weights(base_dir: &Path, weights: &str) -> DomainResult<PathBuf> {
    let rel = Path::new(weights);
    if weights.trim().is_empty()
        || rel.components().any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(DomainError::InvalidInput(format!("ruta de pesos inválida: {weights}")));
    }
    let path = base_dir.join(rel);
    ensure_exists(&path).await?;
    Ok(path)
}

pub async fn ensure_exists(path: &Path) -> DomainResult<()> {
    match tokio::fs::metadata(path).await {
        Ok(m) if m.is_file() => Ok(()),
        Ok(_) => Err(DomainError::InvalidInput(format!("no es un archivo: {}", path.display()))),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(DomainError::NotFound(format!("model file not found: {}", path.display())))
        }
        Err(e) => Err(DomainError::OperationFailed(format!("{}: {}", path.display(), e))),
    }
}
