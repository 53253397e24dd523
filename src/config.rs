use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::application::services::DemoTimings;
use crate::domain::model::{ModelLocation, PredictionMode};

/// Configuración del proceso, leída de variables de entorno con valores por defecto.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub addr: String,
    pub static_dir: PathBuf,
    pub mode: PredictionMode,
    pub timings: DemoTimings,
    pub stats_interval: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8090".to_string(),
            static_dir: PathBuf::from("static"),
            mode: PredictionMode::Auto,
            timings: DemoTimings::default(),
            stats_interval: None,
        }
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match raw {
        None => default,
        Some(v) => v.parse().unwrap_or_else(|e| {
            warn!("{}={} no es válido ({}); se usa el valor por defecto", key, v, e);
            default
        }),
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        let delays_on = parse_or("WASTE_AI_DEMO_DELAYS", get("WASTE_AI_DEMO_DELAYS"), 1u8) != 0;
        let stats_secs = parse_or("WASTE_AI_STATS_SECS", get("WASTE_AI_STATS_SECS"), 0u64);

        Self {
            addr: get("WASTE_AI_ADDR").unwrap_or(d.addr),
            static_dir: get("WASTE_AI_STATIC_DIR").map(PathBuf::from).unwrap_or(d.static_dir),
            mode: parse_or("WASTE_AI_MODE", get("WASTE_AI_MODE"), d.mode),
            timings: if delays_on { d.timings } else { DemoTimings::instant() },
            stats_interval: (stats_secs > 0).then(|| Duration::from_secs(stats_secs)),
        }
    }

    pub fn model_location(&self) -> ModelLocation {
        ModelLocation::resolve(&self.static_dir)
    }
}
