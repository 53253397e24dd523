use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::application::{
    heuristic::{fixed_class_prediction, heuristic_predict, ConfidenceBand},
    model_service::{ModelHandle, ModelService},
    ports::{ImageEventHandler, ReporterPort},
    predictor::{predict, predict_batch},
    preprocess::{decode_image, preprocess},
};
use crate::domain::{
    errors::{DomainError, DomainResult},
    model::PredictionMode,
    prediction::{PredictionResult, WasteClass},
    ui::Severity,
    upload::{ImageUpload, SampleImage},
};

const MSG_INVALID_FILE: &str = "Please select a valid image file.";
const MSG_UNKNOWN_SAMPLE: &str = "Unknown sample image.";
const MSG_DECODE_FAILED: &str = "Could not read the selected image. Please try another file.";
const MSG_PROCESSING_FAILED: &str = "Error processing image. Please try again.";
const MSG_MODEL_DONE: &str = "Prediction completed!";
const MSG_DEMO_DONE: &str = "🎭 Enhanced demo: Visual analysis + AI simulation!";
const MSG_MOCK_DONE: &str = "Demo mode: Using simulated prediction. Load the actual model for real results.";
const MSG_BATCH_DONE: &str = "Batch prediction completed!";

/// Retardos simulados del modo demo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoTimings {
    pub heuristic: Duration,
    pub sample: Duration,
    pub mock_inference: Duration,
}

impl Default for DemoTimings {
    fn default() -> Self {
        Self {
            heuristic: Duration::from_millis(2000),
            sample: Duration::from_millis(1500),
            mock_inference: Duration::from_millis(500),
        }
    }
}

impl DemoTimings {
    pub fn instant() -> Self {
        Self { heuristic: Duration::ZERO, sample: Duration::ZERO, mock_inference: Duration::ZERO }
    }
}

/// Indicador de carga activo mientras vive el guard; se apaga en cualquier salida.
struct LoadingGuard<'a> {
    reporter: &'a dyn ReporterPort,
}

impl<'a> LoadingGuard<'a> {
    fn start(reporter: &'a dyn ReporterPort) -> Self {
        reporter.set_loading(true);
        Self { reporter }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.reporter.set_loading(false);
    }
}

struct Outcome {
    prediction: PredictionResult,
    message: &'static str,
    severity: Severity,
}

async fn pause(d: Duration) {
    if !d.is_zero() {
        tokio::time::sleep(d).await;
    }
}

async fn blocking<T, F>(f: F) -> DomainResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DomainError::OperationFailed(format!("tarea de procesamiento abortada: {e}")))
}

/// Orquestador del pipeline imagen → predicción → UI.
pub struct ClassificationService {
    model: Arc<ModelService>,
    mode: PredictionMode,
    timings: DemoTimings,
}

impl ClassificationService {
    pub fn new(model: Arc<ModelService>, mode: PredictionMode, timings: DemoTimings) -> Self {
        Self { model, mode, timings }
    }

    /// Modelo a usar para esta petición, o `None` para el heurístico.
    async fn select_model(&self) -> Option<Arc<ModelHandle>> {
        match self.mode {
            PredictionMode::Heuristic => None,
            PredictionMode::Model => Some(self.model.ensure_ready().await),
            PredictionMode::Auto => {
                let handle = self.model.ensure_ready().await;
                (!handle.is_mock()).then_some(handle)
            }
        }
    }

    async fn classify(&self, upload: ImageUpload) -> DomainResult<Outcome> {
        let ImageUpload { filename, bytes, .. } = upload;
        let image = blocking(move || decode_image(&bytes)).await??;

        match self.select_model().await {
            Some(handle) => {
                let config = self.model.config().clone();
                let tensor = blocking(move || preprocess(&image, &config)).await?;
                let prediction = predict(tensor, &handle, self.model.config()).await?;
                let (message, severity) = if handle.is_mock() {
                    (MSG_MOCK_DONE, Severity::Warning)
                } else {
                    (MSG_MODEL_DONE, Severity::Success)
                };
                Ok(Outcome { prediction, message, severity })
            }
            None => {
                info!("🎭 Predicción en modo demo para {}", filename);
                let prediction = blocking(move || {
                    heuristic_predict(&image, &filename, ConfidenceBand::Upload, &mut rand::thread_rng())
                })
                .await?;
                pause(self.timings.heuristic).await;
                Ok(Outcome { prediction, message: MSG_DEMO_DONE, severity: Severity::Info })
            }
        }
    }
}

#[async_trait]
impl ImageEventHandler for ClassificationService {
    async fn on_file_selected(
        &self,
        upload: ImageUpload,
        reporter: &dyn ReporterPort,
    ) -> DomainResult<PredictionResult> {
        if !upload.is_image() {
            warn!("Archivo rechazado: {} ({})", upload.filename, upload.mime);
            reporter.notify(MSG_INVALID_FILE, Severity::Error);
            return Err(DomainError::InvalidInput(format!("tipo MIME no soportado: {}", upload.mime)));
        }

        let loading = LoadingGuard::start(reporter);
        reporter.render_placeholder("Processing image...");

        let filename = upload.filename.clone();
        let result = self.classify(upload).await;
        drop(loading);

        match result {
            Ok(out) => {
                info!(
                    "Predicción para {}: {} ({:.1}%)",
                    filename,
                    out.prediction.class,
                    out.prediction.confidence_percent()
                );
                reporter.render_prediction(out.prediction.class, out.prediction.confidence_percent());
                reporter.notify(out.message, out.severity);
                Ok(out.prediction)
            }
            Err(e) => {
                error!("Error procesando {}: {}", filename, e);
                let message = match e {
                    DomainError::Decode(_) => MSG_DECODE_FAILED,
                    _ => MSG_PROCESSING_FAILED,
                };
                reporter.notify(message, Severity::Error);
                reporter.render_placeholder("Error processing image");
                Err(e)
            }
        }
    }

    async fn on_files_selected(
        &self,
        uploads: Vec<ImageUpload>,
        reporter: &dyn ReporterPort,
    ) -> DomainResult<Vec<PredictionResult>> {
        if let Some(bad) = uploads.iter().find(|u| !u.is_image()) {
            reporter.notify(MSG_INVALID_FILE, Severity::Error);
            return Err(DomainError::InvalidInput(format!("{} no es una imagen", bad.filename)));
        }
        if uploads.is_empty() {
            return Ok(Vec::new());
        }

        let loading = LoadingGuard::start(reporter);
        let config = self.model.config().clone();
        let tensors = blocking(move || {
            uploads
                .iter()
                .map(|u| decode_image(&u.bytes).map(|img| preprocess(&img, &config)))
                .collect::<DomainResult<Vec<_>>>()
        })
        .await?;

        let result = match tensors {
            Ok(tensors) => {
                let handle = self.model.ensure_ready().await;
                predict_batch(tensors, &handle, self.model.config()).await
            }
            Err(e) => Err(e),
        };
        drop(loading);

        match &result {
            Ok(predictions) => {
                info!("Lote de {} imágenes clasificado", predictions.len());
                reporter.notify(MSG_BATCH_DONE, Severity::Success);
            }
            Err(e) => {
                error!("Error en el lote: {}", e);
                reporter.notify(MSG_PROCESSING_FAILED, Severity::Error);
                reporter.render_placeholder("Error processing image");
            }
        }
        result
    }

    async fn on_sample_chosen(
        &self,
        name: &str,
        reporter: &dyn ReporterPort,
    ) -> DomainResult<PredictionResult> {
        let Some(sample) = SampleImage::from_name(name) else {
            warn!("Muestra desconocida: {}", name);
            reporter.notify(MSG_UNKNOWN_SAMPLE, Severity::Error);
            return Err(DomainError::NotFound(format!("muestra {name}")));
        };

        let loading = LoadingGuard::start(reporter);
        reporter.render_placeholder("Processing sample image...");
        info!("Cargando imagen de muestra {} desde {}", sample.name(), sample.asset_path());

        pause(self.timings.sample).await;
        let class = WasteClass::from_biodegradable(sample.is_biodegradable());
        let prediction = fixed_class_prediction(class, ConfidenceBand::Sample, &mut rand::thread_rng());
        drop(loading);

        reporter.render_prediction(prediction.class, prediction.confidence_percent());
        reporter.notify(&format!("✅ Sample prediction completed: {}", prediction.class), Severity::Success);
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{InferencePort, ModelLoaderPort};
    use crate::application::test_support::{FailingInference, FakeLoader, FixedInference, RecordingReporter};
    use crate::domain::model::{ModelConfig, ModelFormat, ModelLocation};
    use crate::domain::ui::UiEvent;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::path::Path;

    fn png(rgb: [u8; 3]) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 24, Rgb(rgb)));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn upload(name: &str, mime: &str, bytes: Vec<u8>) -> ImageUpload {
        ImageUpload { filename: name.into(), mime: mime.into(), bytes }
    }

    fn model_with(loader: Arc<FakeLoader>) -> Arc<ModelService> {
        Arc::new(ModelService::new(
            Arc::new(ModelConfig::default()),
            ModelLocation::resolve(Path::new("static")),
            vec![loader as Arc<dyn ModelLoaderPort>],
            Arc::new(RecordingReporter::default()),
            Duration::ZERO,
        ))
    }

    fn real(engine: Arc<dyn InferencePort>) -> Arc<FakeLoader> {
        Arc::new(FakeLoader::ok(ModelFormat::Descriptor, engine))
    }

    fn missing() -> Arc<FakeLoader> {
        Arc::new(FakeLoader::failing(ModelFormat::Descriptor, || DomainError::NotFound("model.json".into())))
    }

    fn classifier(model: Arc<ModelService>, mode: PredictionMode) -> ClassificationService {
        ClassificationService::new(model, mode, DemoTimings::instant())
    }

    #[tokio::test]
    async fn plastic_bottle_filename_beats_green_pixels() {
        let svc = classifier(model_with(missing()), PredictionMode::Heuristic);
        let reporter = RecordingReporter::default();

        let p = svc
            .on_file_selected(upload("plastic_bottle.jpg", "image/png", png([0, 255, 0])), &reporter)
            .await
            .unwrap();

        assert_eq!(p.class, WasteClass::NonBiodegradable);
        assert!((0.80..=1.0).contains(&p.confidence));
        assert_eq!(reporter.loading_toggles(), vec![true, false]);
        assert_eq!(reporter.notifications(), vec![(MSG_DEMO_DONE.to_string(), Severity::Info)]);
        assert!(reporter.events().iter().any(|e| matches!(
            e,
            UiEvent::Prediction { class: WasteClass::NonBiodegradable, .. }
        )));
    }

    #[tokio::test]
    async fn missing_model_still_predicts_through_mock() {
        let loader = missing();
        let svc = classifier(model_with(loader.clone()), PredictionMode::Model);
        let reporter = RecordingReporter::default();

        for _ in 0..3 {
            let p = svc
                .on_file_selected(upload("can.png", "image/png", png([120, 120, 130])), &reporter)
                .await
                .unwrap();
            assert!(p.confidence >= 0.5);
        }
        assert_eq!(loader.calls(), 1);
        assert_eq!(reporter.loading_toggles(), vec![true, false, true, false, true, false]);
    }

    #[tokio::test]
    async fn non_image_is_rejected_before_any_work() {
        let loader = missing();
        let svc = classifier(model_with(loader.clone()), PredictionMode::Model);
        let reporter = RecordingReporter::default();

        let err = svc
            .on_file_selected(upload("notes.txt", "text/plain", b"hola".to_vec()), &reporter)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert_eq!(reporter.notifications(), vec![(MSG_INVALID_FILE.to_string(), Severity::Error)]);
        assert!(reporter.loading_toggles().is_empty());
        assert_eq!(loader.calls(), 0);
    }

    #[tokio::test]
    async fn undecodable_image_aborts_only_that_request() {
        let svc = classifier(model_with(missing()), PredictionMode::Heuristic);
        let reporter = RecordingReporter::default();

        let err = svc
            .on_file_selected(upload("broken.png", "image/png", b"\x89PNG garbage".to_vec()), &reporter)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Decode(_)));
        assert_eq!(reporter.loading_toggles(), vec![true, false]);
        assert!(reporter.events().contains(&UiEvent::Placeholder { message: "Error processing image".into() }));
        assert_eq!(reporter.notifications()[0].0, MSG_DECODE_FAILED);

        let ok = svc
            .on_file_selected(upload("fruit.png", "image/png", png([200, 10, 10])), &reporter)
            .await
            .unwrap();
        assert_eq!(ok.class, WasteClass::Biodegradable);
    }

    #[tokio::test]
    async fn inference_failure_reports_generic_error_and_clears_loading() {
        let svc = classifier(model_with(real(Arc::new(FailingInference))), PredictionMode::Model);
        let reporter = RecordingReporter::default();

        let err = svc
            .on_file_selected(upload("x.png", "image/png", png([1, 2, 3])), &reporter)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Inference(_)));
        assert_eq!(reporter.loading_toggles(), vec![true, false]);
        assert_eq!(reporter.notifications(), vec![(MSG_PROCESSING_FAILED.to_string(), Severity::Error)]);
    }

    #[tokio::test]
    async fn auto_mode_uses_real_model_when_ready() {
        let svc = classifier(model_with(real(Arc::new(FixedInference::new(vec![0.9])))), PredictionMode::Auto);
        let reporter = RecordingReporter::default();

        let p = svc
            .on_file_selected(upload("food.png", "image/png", png([0, 255, 0])), &reporter)
            .await
            .unwrap();
        // el modelo manda; el nombre del archivo no interviene
        assert_eq!(p.class, WasteClass::NonBiodegradable);
        assert!((p.confidence - 0.9).abs() < 1e-6);
        assert_eq!(reporter.notifications(), vec![(MSG_MODEL_DONE.to_string(), Severity::Success)]);
    }

    #[tokio::test]
    async fn auto_mode_falls_back_to_heuristic() {
        let svc = classifier(model_with(missing()), PredictionMode::Auto);
        let reporter = RecordingReporter::default();

        let p = svc
            .on_file_selected(upload("organic.png", "image/png", png([0, 0, 255])), &reporter)
            .await
            .unwrap();
        assert_eq!(p.class, WasteClass::Biodegradable);
        assert_eq!(reporter.notifications(), vec![(MSG_DEMO_DONE.to_string(), Severity::Info)]);
    }

    #[tokio::test]
    async fn samples_report_known_class_in_sample_band() {
        let svc = classifier(model_with(missing()), PredictionMode::Auto);
        for _ in 0..50 {
            let reporter = RecordingReporter::default();
            let p = svc.on_sample_chosen("non_biodegradable", &reporter).await.unwrap();
            assert_eq!(p.class, WasteClass::NonBiodegradable);
            assert!((0.85..=1.0).contains(&p.confidence));
            assert_eq!(reporter.loading_toggles(), vec![true, false]);
        }
        let reporter = RecordingReporter::default();
        let p = svc.on_sample_chosen("biodegradable", &reporter).await.unwrap();
        assert_eq!(p.class, WasteClass::Biodegradable);
        assert_eq!(
            reporter.notifications(),
            vec![("✅ Sample prediction completed: Biodegradable".to_string(), Severity::Success)]
        );
    }

    #[tokio::test]
    async fn model_mode_with_mock_warns_about_simulation() {
        let svc = classifier(model_with(missing()), PredictionMode::Model);
        let reporter = RecordingReporter::default();
        svc.on_file_selected(upload("a.png", "image/png", png([5, 5, 5])), &reporter)
            .await
            .unwrap();
        assert_eq!(reporter.notifications(), vec![(MSG_MOCK_DONE.to_string(), Severity::Warning)]);
    }

    #[tokio::test]
    async fn batch_keeps_upload_order() {
        let svc = classifier(
            model_with(real(Arc::new(FixedInference::new(vec![0.0, 0.7, 0.2])))),
            PredictionMode::Auto,
        );
        let reporter = RecordingReporter::default();
        let files = vec![
            upload("a.png", "image/png", png([1, 1, 1])),
            upload("b.png", "image/png", png([2, 2, 2])),
        ];
        // el primer valor lo consume el calentamiento del modelo
        let out = svc.on_files_selected(files, &reporter).await.unwrap();
        let classes: Vec<_> = out.iter().map(|p| p.class).collect();
        assert_eq!(classes, vec![WasteClass::NonBiodegradable, WasteClass::Biodegradable]);
        assert_eq!(reporter.loading_toggles(), vec![true, false]);

        let err = svc
            .on_files_selected(vec![upload("x.txt", "text/plain", vec![])], &reporter)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert!(svc.on_files_selected(Vec::new(), &reporter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_batch_clears_result_area() {
        let svc = classifier(model_with(missing()), PredictionMode::Auto);
        let reporter = RecordingReporter::default();
        let files = vec![
            upload("a.png", "image/png", png([1, 1, 1])),
            upload("b.png", "image/png", b"no es png".to_vec()),
        ];

        let err = svc.on_files_selected(files, &reporter).await.unwrap_err();
        assert!(matches!(err, DomainError::Decode(_)));
        assert_eq!(reporter.loading_toggles(), vec![true, false]);
        assert_eq!(reporter.notifications(), vec![(MSG_PROCESSING_FAILED.to_string(), Severity::Error)]);
        assert_eq!(
            reporter.events().last(),
            Some(&UiEvent::Placeholder { message: "Error processing image".into() })
        );
    }

    #[tokio::test]
    async fn unknown_sample_is_rejected_without_loading() {
        let svc = classifier(model_with(missing()), PredictionMode::Auto);
        let reporter = RecordingReporter::default();
        let err = svc.on_sample_chosen("glass", &reporter).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert!(reporter.loading_toggles().is_empty());
    }
}
