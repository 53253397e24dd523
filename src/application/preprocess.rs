use image::{imageops::{self, FilterType}, DynamicImage, ImageReader};
use ndarray::Array4;
use std::io::Cursor;

use crate::domain::{
    errors::{DomainError, DomainResult},
    model::ModelConfig,
    tensor::ImageTensor,
};

/// Decodifica los bytes de una imagen adivinando el formato por contenido.
pub fn decode_image(bytes: &[u8]) -> DomainResult<DynamicImage> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DomainError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| DomainError::Decode(e.to_string()))
}

/// Redimensiona a la entrada del modelo (bilineal), descarta el alfa y
/// normaliza a `[0, 1]` con eje de lote: `[1, H, W, 3]`.
pub fn preprocess(image: &DynamicImage, config: &ModelConfig) -> ImageTensor {
    let (h, w) = (config.height(), config.width());
    let rgb = imageops::resize(&image.to_rgb8(), w as u32, h as u32, FilterType::Triangle);

    let data = Array4::from_shape_fn((1, h, w, 3), |(_, y, x, c)| {
        rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
    });
    ImageTensor::new(data)
}
