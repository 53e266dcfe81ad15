#![forbid(unsafe_code)]

use formbridge_server::{build_router, AppState, FormConfig};
use std::env;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_path(name: &str, default: &PathBuf) -> PathBuf {
    env::var(name).map(PathBuf::from).unwrap_or_else(|_| default.clone())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("FORMBRIDGE_LOG_JSON", false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let defaults = FormConfig::default();
    let config = FormConfig {
        records_path: env_path("FORMBRIDGE_RECORDS_PATH", &defaults.records_path),
        template_path: env_path("FORMBRIDGE_TEMPLATE_PATH", &defaults.template_path),
        filled_output_path: env_path("FORMBRIDGE_FILLED_PATH", &defaults.filled_output_path),
        normalized_output_path: env_path(
            "FORMBRIDGE_NORMALIZED_PATH",
            &defaults.normalized_output_path,
        ),
        max_body_bytes: env_usize("FORMBRIDGE_MAX_BODY_BYTES", defaults.max_body_bytes),
        restrict_record_paths: env_bool("FORMBRIDGE_RESTRICT_RECORD_PATHS", false),
    };

    let bind_addr = env::var("FORMBRIDGE_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("bind {bind_addr}: {e}"))?;
    info!(
        bind = %bind_addr,
        records = %config.records_path.display(),
        template = %config.template_path.display(),
        "formbridge server listening"
    );

    let app = build_router(AppState::new(config));
    axum::serve(listener, app)
        .await
        .map_err(|e| format!("serve: {e}"))
}
