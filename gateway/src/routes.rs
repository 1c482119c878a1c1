use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use constellation_engine::{GnssSystem, ObserverPoint, SatelliteRecord};

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SatelliteDto {
    pub name: String,
    pub designator: String,
    pub norad_id: u64,
    pub position_m: [f64; 3],
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    pub altitude_m: f64,
    pub velocity_km_s: [f64; 3],
    pub coverage_angle_deg: f64,
    pub is_visible: bool,
    pub is_selected: bool,
}

impl From<&SatelliteRecord> for SatelliteDto {
    fn from(record: &SatelliteRecord) -> Self {
        Self {
            name: record.info.name.clone(),
            designator: record.info.designator.clone(),
            norad_id: record.info.norad_id,
            position_m: record.state.position_m,
            longitude_deg: record.state.geodetic.longitude_deg,
            latitude_deg: record.state.geodetic.latitude_deg,
            altitude_m: record.state.geodetic.altitude_m,
            velocity_km_s: record.state.velocity_km_s,
            coverage_angle_deg: record.state.coverage_angle_deg,
            is_visible: record.is_visible,
            is_selected: record.is_selected,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClockDto {
    pub playing: bool,
    pub time_scale: f64,
    pub tick_interval_ms: u64,
    pub scene_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ClockCommand {
    pub playing: Option<bool>,
    pub time_scale: Option<f64>,
    pub tick_interval_ms: Option<u64>,
    pub scene_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ActiveSystemCommand {
    pub system: GnssSystem,
}

#[derive(Debug, Deserialize)]
pub struct ActiveSatelliteCommand {
    pub norad_id: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct StatusDto {
    pub active_system: Option<GnssSystem>,
    pub visible_count: Option<usize>,
    pub scene_time: DateTime<Utc>,
    pub playing: bool,
    pub time_scale: f64,
    pub reload_count: u64,
}

pub async fn get_constellation(
    State(state): State<AppState>,
    Path(system): Path<String>,
) -> Result<Json<Vec<SatelliteDto>>, StatusCode> {
    let system = GnssSystem::from_stem(&system).map_err(|_| StatusCode::NOT_FOUND)?;

    let mut registry = state.registry.write().await;
    let records = registry.get_constellation_data(system, Utc::now());
    Ok(Json(records.iter().map(SatelliteDto::from).collect()))
}

pub async fn get_satellite(
    State(state): State<AppState>,
    Path((system, norad_id)): Path<(String, u64)>,
) -> Result<Json<SatelliteDto>, StatusCode> {
    let system = GnssSystem::from_stem(&system).map_err(|_| StatusCode::NOT_FOUND)?;

    let mut registry = state.registry.write().await;
    registry
        .get_satellite(norad_id, Some(system), Utc::now())
        .map(|record| Json(SatelliteDto::from(record)))
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn get_active_satellite(
    State(state): State<AppState>,
) -> Json<Option<SatelliteDto>> {
    let mut registry = state.registry.write().await;
    Json(registry.get_active_satellite(Utc::now()).map(SatelliteDto::from))
}

pub async fn put_active_system(
    State(state): State<AppState>,
    Json(cmd): Json<ActiveSystemCommand>,
) -> StatusCode {
    let mut registry = state.registry.write().await;
    registry.set_active_system(cmd.system, Utc::now());
    StatusCode::NO_CONTENT
}

pub async fn put_active_satellite(
    State(state): State<AppState>,
    Json(cmd): Json<ActiveSatelliteCommand>,
) -> StatusCode {
    let mut registry = state.registry.write().await;
    registry.set_active_satellite(cmd.norad_id);
    StatusCode::NO_CONTENT
}

pub async fn put_observer(
    State(state): State<AppState>,
    Json(observer): Json<Option<ObserverPoint>>,
) -> StatusCode {
    let mut registry = state.registry.write().await;
    registry.set_observer(observer);
    StatusCode::NO_CONTENT
}

pub async fn get_clock(State(state): State<AppState>) -> Json<ClockDto> {
    let registry = state.registry.read().await;
    Json(clock_dto(&registry))
}

/// Apply clock commands. A tick-interval change (or a resume) goes
/// through the explicit stop-then-restart of the single timer task.
pub async fn put_clock(
    State(state): State<AppState>,
    Json(cmd): Json<ClockCommand>,
) -> Json<ClockDto> {
    let now = Utc::now();
    let mut interval_changed = false;

    {
        let mut registry = state.registry.write().await;
        if let Some(scale) = cmd.time_scale {
            registry.set_time_scale(scale);
        }
        if let Some(ms) = cmd.tick_interval_ms {
            registry.set_tick_interval(Duration::from_millis(ms.max(1)));
            interval_changed = true;
        }
        if let Some(scene_time) = cmd.scene_time {
            registry.set_scene_time(scene_time);
        }
        match cmd.playing {
            Some(true) => registry.play(now),
            Some(false) => registry.pause(),
            None => {}
        }
    }

    if cmd.playing == Some(false) {
        state.stop_ticker().await;
    } else {
        let playing = state.registry.read().await.clock().is_playing();
        if playing && (interval_changed || cmd.playing == Some(true)) {
            state.start_ticker().await;
        }
    }

    let registry = state.registry.read().await;
    Json(clock_dto(&registry))
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusDto> {
    let registry = state.registry.read().await;
    Json(StatusDto {
        active_system: registry.active_system(),
        visible_count: registry.visible_count(),
        scene_time: registry.clock().scene_time(),
        playing: registry.clock().is_playing(),
        time_scale: registry.clock().time_scale(),
        reload_count: registry.reload_count(),
    })
}

fn clock_dto(registry: &constellation_engine::SatelliteRegistry) -> ClockDto {
    let clock = registry.clock();
    ClockDto {
        playing: clock.is_playing(),
        time_scale: clock.time_scale(),
        tick_interval_ms: clock.tick_interval().as_millis() as u64,
        scene_time: clock.scene_time(),
    }
}
