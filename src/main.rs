mod adapters;
mod application;
mod config;
mod domain;

use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

use crate::adapters::{
    http::{reporter::BroadcastReporter, router, state::HttpState},
    onnx::loader::OnnxModelLoader,
};
use crate::application::{model_service::ModelService, services::ClassificationService};
use crate::config::AppConfig;
use crate::domain::model::ModelConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logs (RUST_LOG=info por defecto)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = AppConfig::from_env();
    tracing::info!("🔧 Configuración: {:?}", cfg);

    // 2. Adaptadores
    let model_cfg = Arc::new(ModelConfig::default());
    let hub = BroadcastReporter::new(64);
    let loaders = OnnxModelLoader::fallback_chain(&model_cfg);

    // 3. Servicios
    let model = Arc::new(ModelService::new(
        model_cfg,
        cfg.model_location(),
        loaders,
        Arc::new(hub.clone()),
        cfg.timings.mock_inference,
    ));
    let classifier = Arc::new(ClassificationService::new(model.clone(), cfg.mode, cfg.timings));

    // 4. Carga del modelo en segundo plano; las peticiones tempranas esperan a la misma carga.
    {
        let model = model.clone();
        tokio::spawn(async move {
            model.ensure_ready().await;
        });
    }

    if let Some(every) = cfg.stats_interval {
        let model = model.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(every);
            loop {
                tick.tick().await;
                tracing::info!("📊 Estadísticas del modelo: {:?}", model.info());
            }
        });
    }

    let state = HttpState {
        events: classifier,
        model: model.clone(),
        hub,
        mode: cfg.mode,
    };

    // 5. Router + archivos estáticos
    let app = router(state).fallback_service(ServeDir::new(&cfg.static_dir));

    tracing::info!("🚀 Demo de clasificación en http://{}", cfg.addr);
    tracing::info!("📂 Archivos estáticos servidos desde {}", cfg.static_dir.display());

    let listener = tokio::net::TcpListener::bind(&cfg.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Apagando servidor...");
        })
        .await?;

    model.dispose().await;
    Ok(())
}
