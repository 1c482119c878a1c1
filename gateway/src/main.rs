use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use constellation_engine::{CatalogCache, GnssSystem, SatelliteRegistry, SimulationClock};

mod routes;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RwLock<SatelliteRegistry>>,
    /// The single periodic timer handle. Interval changes go through an
    /// explicit stop-then-restart; a running timer is never hot-swapped.
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl AppState {
    fn new(registry: SatelliteRegistry) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
            ticker: Arc::new(Mutex::new(None)),
        }
    }

    /// Stop the tick task, if one is running.
    pub async fn stop_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    /// (Re)start the tick task at the registry's current tick interval.
    pub async fn start_ticker(&self) {
        self.stop_ticker().await;

        let interval = self.registry.read().await.clock().tick_interval();
        let registry = Arc::clone(&self.registry);
        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            // Overrunning ticks lag rather than burst to catch up.
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                let mut registry = registry.write().await;
                registry.update_active(Utc::now());
                for event in registry.drain_events() {
                    tracing::trace!(?event, "engine event");
                }
            }
        });

        *self.ticker.lock().await = Some(handle);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "gnss_gateway=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let tle_dir = std::env::var("GNSS_TLE_DIR").unwrap_or_else(|_| "data/tle".to_string());

    let now = Utc::now();
    let mut registry =
        SatelliteRegistry::new(CatalogCache::new(&tle_dir), SimulationClock::new(now));
    registry.set_active_system(GnssSystem::GpsOps, now);
    registry.drain_events();

    let state = AppState::new(registry);

    let api_routes = Router::new()
        .route("/constellations/:system", get(routes::get_constellation))
        .route(
            "/constellations/:system/satellites/:id",
            get(routes::get_satellite),
        )
        .route("/satellites/active", get(routes::get_active_satellite))
        .route("/active-system", put(routes::put_active_system))
        .route("/active-satellite", put(routes::put_active_satellite))
        .route("/observer", put(routes::put_observer))
        .route("/clock", get(routes::get_clock).put(routes::put_clock))
        .route("/status", get(routes::get_status))
        .with_state(state);

    let app = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let port = std::env::var("GNSS_GATEWAY_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "18620".to_string());
    let addr = format!("0.0.0.0:{}", port);

    tracing::info!("GNSS gateway starting on {}", addr);
    tracing::info!("   Element files: {}", tle_dir);
    tracing::info!("   Active system: {}", GnssSystem::GpsOps.display_name());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "gnss-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
