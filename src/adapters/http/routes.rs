use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::any::Any;
use tracing::{error, warn};

use crate::adapters::http::reporter::RequestReporter;
use crate::adapters::http::state::HttpState;
use crate::application::dto::{DemoConfigResponse, PredictionResponse};
use crate::domain::{
    errors::{DomainError, DomainResult},
    prediction::PredictionResult,
    ui::{Severity, UiEvent},
    upload::{ImageUpload, SampleImage},
};

const MAX_BATCH: usize = 16;
const MSG_UNEXPECTED: &str = "An unexpected error occurred. Please refresh the page.";

fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::InvalidInput(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        DomainError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn prediction_response(result: DomainResult<PredictionResult>, reporter: RequestReporter) -> Response {
    let code = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => status_for(e),
    };
    let body = PredictionResponse::from_result(&result, reporter.into_events());
    (code, Json(body)).into_response()
}

fn bad_request(message: String) -> Response {
    rejection(StatusCode::BAD_REQUEST, message)
}

/// Rechazo antes de tocar el clasificador, con su notificación para la página.
fn rejection(code: StatusCode, message: String) -> Response {
    let event = UiEvent::Notification { message: message.clone(), severity: Severity::Error };
    let body = PredictionResponse {
        ok: false,
        prediction: None,
        confidence_percent: None,
        error: Some(message),
        events: vec![event],
    };
    (code, Json(body)).into_response()
}

/// Campos de archivo del formulario, en orden; deja de leer al reunir `limit`.
async fn file_fields(multipart: &mut Multipart, limit: usize) -> Result<Vec<ImageUpload>, String> {
    let mut uploads = Vec::new();
    while uploads.len() < limit {
        let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? else {
            break;
        };
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let mime = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|e| e.to_string())?;
        uploads.push(ImageUpload { filename, mime, bytes: bytes.to_vec() });
    }
    Ok(uploads)
}

pub async fn classify_upload(State(st): State<HttpState>, mut multipart: Multipart) -> Response {
    let upload = match file_fields(&mut multipart, 1).await.map(|mut v| v.pop()) {
        Ok(Some(upload)) => upload,
        Ok(None) => return bad_request("Please select a valid image file.".to_string()),
        Err(e) => {
            warn!("Formulario multipart inválido: {}", e);
            return bad_request(format!("Upload failed: {e}"));
        }
    };

    let reporter = RequestReporter::new();
    let result = st.events.on_file_selected(upload, &reporter).await;
    prediction_response(result, reporter)
}

pub async fn classify_batch(State(st): State<HttpState>, mut multipart: Multipart) -> Response {
    // uno de más basta para saber que el lote se pasa del límite
    let uploads = match file_fields(&mut multipart, MAX_BATCH + 1).await {
        Ok(v) => v,
        Err(e) => {
            warn!("Formulario multipart inválido: {}", e);
            return bad_request(format!("Upload failed: {e}"));
        }
    };
    if uploads.len() > MAX_BATCH {
        warn!("Lote rechazado: más de {} imágenes", MAX_BATCH);
        return rejection(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("Too many images. Select at most {MAX_BATCH} per batch."),
        );
    }

    let reporter = RequestReporter::new();
    match st.events.on_files_selected(uploads, &reporter).await {
        Ok(predictions) => Json(json!({
            "ok": true,
            "predictions": predictions,
            "events": reporter.into_events(),
        }))
        .into_response(),
        Err(e) => {
            let code = status_for(&e);
            let body = PredictionResponse::from_result(&Err(e), reporter.into_events());
            (code, Json(body)).into_response()
        }
    }
}

pub async fn classify_sample(State(st): State<HttpState>, Path(name): Path<String>) -> Response {
    let reporter = RequestReporter::new();
    let result = st.events.on_sample_chosen(&name, &reporter).await;
    prediction_response(result, reporter)
}

pub async fn model_info(State(st): State<HttpState>) -> impl IntoResponse {
    Json(st.model.info())
}

pub async fn get_config(State(st): State<HttpState>) -> impl IntoResponse {
    Json(DemoConfigResponse {
        mode: st.mode,
        accepted_mime_prefix: "image/".to_string(),
        samples: SampleImage::ALL.into_iter().map(Into::into).collect(),
    })
}

/// Manejador global: un pánico en un handler devuelve una notificación genérica
/// y el servidor sigue atendiendo.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("desconocido");
    error!("Pánico en un manejador HTTP: {}", detail);

    let body = json!({
        "ok": false,
        "error": MSG_UNEXPECTED,
        "events": [UiEvent::Notification { message: MSG_UNEXPECTED.to_string(), severity: Severity::Error }],
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
