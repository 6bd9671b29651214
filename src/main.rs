//! 토론 튜터 · Debate Tutor Backend
//!
//! - Axum HTTP + WebSocket API for debate lesson scenarios and live sessions
//! - Pluggable scenario storage (memory / documents / local file)
//! - Optional AI drafting via OpenAI or Gemini (environment variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables (a `.env` file is read if present):
//!   PORT              : u16 (default 3000)
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"
//!   TUTOR_CONFIG_PATH : path to TOML config (prompts, storage, draft provider)
//!   STORAGE_BACKEND   : memory (default) | documents | local
//!   STORAGE_PATH      : default "./data/scenarios"
//!   OPENAI_API_KEY    : enables OpenAI drafting if present
//!   OPENAI_BASE_URL   : default "https://api.openai.com/v1"
//!   OPENAI_MODEL      : default "gpt-4o"
//!   GEMINI_API_KEY    : enables Gemini drafting (GOOGLE_AI_API_KEY also accepted)
//!   GEMINI_BASE_URL   : default "https://generativelanguage.googleapis.com/v1beta/models"
//!   GEMINI_MODEL      : default "gemini-1.5-flash"
//!   DRAFT_PROVIDER    : openai | gemini, preferred when a request names none

mod telemetry;
mod util;
mod domain;
mod config;
mod template;
mod scaler;
mod walker;
mod timer;
mod session;
mod store;
mod draft;
mod openai;
mod gemini;
mod error;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

use crate::config::{load_tutor_config_from_env, StorageConfig};
use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  let dotenv = dotenvy::dotenv();
  telemetry::init_tracing();
  if let Ok(path) = &dotenv {
    info!(target: "debate_tutor", path = %path.display(), "Loaded .env");
  }

  // Optional TOML config; env vars override its storage and provider choices.
  let cfg = load_tutor_config_from_env().unwrap_or_default();
  let storage = StorageConfig::resolve(cfg.storage.clone());
  if storage.backend == config::StorageBackend::Memory {
    warn!(target: "debate_tutor", "Using in-memory storage; scenarios are lost on restart.");
  }

  // The one store handle for the whole process.
  let store = store::open(&storage).await?;
  let state = Arc::new(AppState::from_config(store, &cfg));

  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "debate_tutor", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "debate_tutor", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "debate_tutor", error = %e, "Failed to listen for Ctrl+C");
    std::future::pending::<()>().await;
  }
}
