use async_trait::async_trait;
use std::time::Duration;

use crate::application::ports::InferencePort;
use crate::domain::{errors::DomainResult, tensor::ImageTensor};

/// Modelo simulado del modo demo: espera un instante y devuelve un valor
/// uniforme en `[0, 1)`.
pub struct MockModel {
    delay: Duration,
}

impl MockModel {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl InferencePort for MockModel {
    async fn infer(&self, _tensor: ImageTensor) -> DomainResult<f32> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(rand::random::<f32>())
    }

    fn backend(&self) -> &'static str {
        "mock"
    }
}
