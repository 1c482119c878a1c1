//! Satellite registry: the query and command surface of the engine.
//!
//! One registry instance owns the catalog cache, the simulation clock,
//! the observer point, and the active-system/selection state. The host
//! constructs it once and passes wall instants into every call; there is
//! no global state and no locking at this layer.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::catalog::{CatalogCache, SatelliteRecord};
use crate::clock::SimulationClock;
use crate::system::GnssSystem;
use crate::visibility::{self, ObserverPoint};

/// Typed notifications for the few cross-component transitions the host
/// cares about. Queued here, drained by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    ActiveSystemChanged(GnssSystem),
    ActiveSatelliteChanged(Option<u64>),
    SceneTimeChanged(DateTime<Utc>),
}

pub struct SatelliteRegistry {
    catalog: CatalogCache,
    clock: SimulationClock,
    observer: Option<ObserverPoint>,
    active_system: Option<GnssSystem>,
    selected_norad_id: Option<u64>,
    visible_count: Option<usize>,
    events: VecDeque<EngineEvent>,
}

impl SatelliteRegistry {
    pub fn new(catalog: CatalogCache, clock: SimulationClock) -> Self {
        Self {
            catalog,
            clock,
            observer: None,
            active_system: None,
            selected_norad_id: None,
            visible_count: None,
            events: VecDeque::new(),
        }
    }

    // ------------------------------------------------------------------
    // State accessors
    // ------------------------------------------------------------------

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn observer(&self) -> Option<ObserverPoint> {
        self.observer
    }

    pub fn active_system(&self) -> Option<GnssSystem> {
        self.active_system
    }

    pub fn selected_norad_id(&self) -> Option<u64> {
        self.selected_norad_id
    }

    /// `None` means "no observer selected", never "zero visible".
    pub fn visible_count(&self) -> Option<usize> {
        self.visible_count
    }

    pub fn reload_count(&self) -> u64 {
        self.catalog.reload_count()
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    pub fn set_observer(&mut self, observer: Option<ObserverPoint>) {
        self.observer = observer;
    }

    /// Switch the active constellation. The new catalog is recomputed
    /// immediately so queries after the switch see fresh state.
    pub fn set_active_system(&mut self, system: GnssSystem, wall_now: DateTime<Utc>) {
        if self.active_system == Some(system) {
            return;
        }
        debug!("active system -> {}", system);
        self.active_system = Some(system);
        self.events.push_back(EngineEvent::ActiveSystemChanged(system));
        self.refresh_active(wall_now);
    }

    /// Select (or deselect, with `None`) the active satellite by catalog
    /// number.
    pub fn set_active_satellite(&mut self, norad_id: Option<u64>) {
        if self.selected_norad_id == norad_id {
            return;
        }
        self.selected_norad_id = norad_id;
        self.events
            .push_back(EngineEvent::ActiveSatelliteChanged(norad_id));
        if let Some(system) = self.active_system {
            self.resync_selection(system);
        }
    }

    /// Raw selection-flag setter for the external UI layer; touches only
    /// already-cached records. Returns whether the satellite was found.
    pub fn set_selected(&mut self, system: GnssSystem, norad_id: u64, selected: bool) -> bool {
        let Some(records) = self.catalog.cached_mut(system) else {
            return false;
        };
        match records.iter_mut().find(|r| r.info.norad_id == norad_id) {
            Some(record) => {
                record.is_selected = selected;
                true
            }
            None => false,
        }
    }

    pub fn play(&mut self, wall_now: DateTime<Utc>) {
        self.clock.play(wall_now);
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn set_time_scale(&mut self, factor: f64) {
        self.clock.set_time_scale(factor);
    }

    pub fn set_tick_interval(&mut self, interval: std::time::Duration) {
        self.clock.set_tick_interval(interval);
    }

    pub fn set_scene_time(&mut self, instant: DateTime<Utc>) {
        self.clock.set_scene_time(instant);
        self.events
            .push_back(EngineEvent::SceneTimeChanged(self.clock.scene_time()));
    }

    /// Drop a cached constellation, forcing a reload on next access.
    pub fn expire(&mut self, system: GnssSystem) {
        self.catalog.expire(system);
    }

    /// Drain the queued engine events, oldest first.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// The ordered record list for `system`, loading and propagating it
    /// if absent or expired.
    pub fn get_constellation_data(
        &mut self,
        system: GnssSystem,
        wall_now: DateTime<Utc>,
    ) -> &[SatelliteRecord] {
        let scene_time = self.clock.scene_time();
        let before = self.catalog.reload_count();
        self.catalog.get_or_load(system, scene_time, wall_now);
        if self.catalog.reload_count() != before {
            self.resync_selection(system);
        }
        self.catalog.cached(system).unwrap_or(&[])
    }

    /// First record matching `norad_id` in `system` (or the active system
    /// when `system` is `None`).
    pub fn get_satellite(
        &mut self,
        norad_id: u64,
        system: Option<GnssSystem>,
        wall_now: DateTime<Utc>,
    ) -> Option<&SatelliteRecord> {
        let system = system.or(self.active_system)?;
        self.get_constellation_data(system, wall_now)
            .iter()
            .find(|r| r.info.norad_id == norad_id)
    }

    /// The currently selected satellite of the active constellation.
    pub fn get_active_satellite(&mut self, wall_now: DateTime<Utc>) -> Option<&SatelliteRecord> {
        let norad_id = self.selected_norad_id?;
        self.get_satellite(norad_id, None, wall_now)
    }

    /// One full simulation tick: advance the clock, then refresh the
    /// active constellation (fetch, propagate all, evaluate visibility).
    /// With no active constellation this is a no-op and the visible
    /// count stays `None`.
    pub fn update_active(&mut self, wall_now: DateTime<Utc>) {
        if self.clock.advance(wall_now) {
            self.events
                .push_back(EngineEvent::SceneTimeChanged(self.clock.scene_time()));
        }
        self.refresh_active(wall_now);
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Fetch + propagate + evaluate for the active constellation.
    fn refresh_active(&mut self, wall_now: DateTime<Utc>) {
        let Some(system) = self.active_system else {
            self.visible_count = None;
            return;
        };

        let scene_time = self.clock.scene_time();
        let before = self.catalog.reload_count();
        self.catalog.get_or_load(system, scene_time, wall_now);
        let reloaded = self.catalog.reload_count() != before;

        let selected = self.selected_norad_id;
        let observer = self.observer;
        if let Some(records) = self.catalog.cached_mut(system) {
            for record in records.iter_mut() {
                record.repropagate(scene_time);
                if reloaded {
                    record.is_selected = selected == Some(record.info.norad_id);
                }
            }
            self.visible_count = visibility::evaluate(records, observer);
        }
    }

    /// Re-apply the stored selection to the cached records of `system`.
    fn resync_selection(&mut self, system: GnssSystem) {
        if self.active_system != Some(system) {
            return;
        }
        let selected = self.selected_norad_id;
        if let Some(records) = self.catalog.cached_mut(system) {
            for record in records.iter_mut() {
                record.is_selected = selected == Some(record.info.norad_id);
            }
        }
    }
}
