//! dailypp · osu! Daily Challenge Backend
//!
//! - Axum HTTP API serving three daily beatmaps (EASY / NORMAL / HARD) per user
//! - Optional osu! API v2 integration (client credentials via environment variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   OSU_CLIENT_ID       : enables the osu! API together with OSU_CLIENT_SECRET
//!   OSU_CLIENT_SECRET   : client credentials secret
//!   OSU_API_BASE_URL    : default "https://osu.ppy.sh"
//!   DAILYPP_CONFIG_PATH : path to TOML selection config (bands, window, length filter)
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod seeds;
mod skill;
mod band;
mod recent;
mod selector;
mod catalog;
mod osu;
mod error;
mod logic;
mod stats;
mod state;
mod protocol;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared application state (in-memory stores, selection config, osu! client).
  let state = Arc::new(AppState::new());

  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "dailypp_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "dailypp_backend", error = %e, "Failed to listen for shutdown signal");
    return;
  }
  info!(target: "dailypp_backend", "Shutdown signal received");
}
