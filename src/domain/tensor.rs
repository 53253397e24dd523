use ndarray::Array4;

use super::model::ModelConfig;

/// Tensor de entrada NHWC `[1, alto, ancho, 3]` con valores en `[0, 1]`.
/// Se consume por valor en la inferencia; nunca se comparte entre peticiones.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Array4<f32>,
}

impl ImageTensor {
    pub fn new(data: Array4<f32>) -> Self {
        Self { data }
    }

    pub fn zeros(config: &ModelConfig) -> Self {
        Self::new(Array4::zeros((1, config.height(), config.width(), config.channels())))
    }

    pub fn shape(&self) -> [usize; 4] {
        let s = self.data.shape();
        [s[0], s[1], s[2], s[3]]
    }

    pub fn view(&self) -> &Array4<f32> {
        &self.data
    }

    /// Forma como `i64` (lo que espera onnxruntime) y datos planos.
    pub fn into_shape_and_data(self) -> (Vec<i64>, Vec<f32>) {
        let shape = self.shape().iter().map(|&d| d as i64).collect();
        let data = if self.data.is_standard_layout() {
            self.data.into_raw_vec_and_offset().0
        } else {
            self.data.iter().copied().collect()
        };
        (shape, data)
    }
}
