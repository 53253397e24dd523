use serde::{Deserialize, Serialize};

/// Archivo elegido o soltado por el visitante.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// Imágenes de muestra incluidas con la página.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SampleImage {
    Biodegradable,
    NonBiodegradable,
}

impl SampleImage {
    pub const ALL: [SampleImage; 2] = [SampleImage::Biodegradable, SampleImage::NonBiodegradable];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "biodegradable" => Some(SampleImage::Biodegradable),
            "non_biodegradable" => Some(SampleImage::NonBiodegradable),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SampleImage::Biodegradable => "biodegradable",
            SampleImage::NonBiodegradable => "non_biodegradable",
        }
    }

    /// Ruta relativa a la raíz estática.
    pub fn asset_path(&self) -> &'static str {
        match self {
            SampleImage::Biodegradable => "images/Biodegradable.jpeg",
            SampleImage::NonBiodegradable => "images/Non_Biodegradable.jpg",
        }
    }

    pub fn is_biodegradable(&self) -> bool {
        matches!(self, SampleImage::Biodegradable)
    }
}
