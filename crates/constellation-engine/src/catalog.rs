//! Per-constellation element-set cache.
//!
//! Entries are loaded lazily from `{tle_dir}/{stem}.txt`, fully
//! propagated before they become visible, and expire 24 hours after
//! load so a refreshed raw file gets picked up on the next access.
//! Expiry is a stored timestamp checked against the wall instant the
//! caller passes in; there are no background timers here.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use gnss_mechanics::{parse_element_sets, propagate, PropagatedState, SatelliteInfo};

use crate::system::GnssSystem;

/// One satellite of a loaded constellation.
pub struct SatelliteRecord {
    pub info: SatelliteInfo,
    pub elements: sgp4::Elements,
    pub state: PropagatedState,
    pub is_visible: bool,
    /// Owned by the external UI layer; the engine only stores it.
    pub is_selected: bool,
}

impl std::fmt::Debug for SatelliteRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SatelliteRecord")
            .field("info", &self.info)
            .field(
                "elements",
                &format_args!("<sgp4::Elements #{}>", self.elements.norad_id),
            )
            .field("state", &self.state)
            .field("is_visible", &self.is_visible)
            .field("is_selected", &self.is_selected)
            .finish()
    }
}

impl SatelliteRecord {
    /// Recompute the state for a new scene instant. A propagation failure
    /// keeps the previous state so the record never loses validity.
    pub fn repropagate(&mut self, scene_time: DateTime<Utc>) {
        match propagate(&self.elements, scene_time) {
            Ok(state) => self.state = state,
            Err(e) => warn!(
                "propagation failed for {} ({}), keeping previous state: {}",
                self.info.name, self.info.norad_id, e
            ),
        }
    }
}

struct CatalogEntry {
    records: Vec<SatelliteRecord>,
    loaded_at: DateTime<Utc>,
}

/// Lazy, TTL-expiring store of constellation catalogs.
pub struct CatalogCache {
    tle_dir: PathBuf,
    ttl: Duration,
    entries: HashMap<GnssSystem, CatalogEntry>,
    reload_count: u64,
}

impl CatalogCache {
    /// Cache reading element files from `tle_dir`, 24-hour TTL.
    pub fn new(tle_dir: impl Into<PathBuf>) -> Self {
        Self {
            tle_dir: tle_dir.into(),
            ttl: Duration::hours(24),
            entries: HashMap::new(),
            reload_count: 0,
        }
    }

    /// Override the TTL (tests mostly).
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn tle_path(&self, system: GnssSystem) -> PathBuf {
        self.tle_dir.join(format!("{}.txt", system.file_stem()))
    }

    /// Number of parse+propagate cycles performed so far.
    pub fn reload_count(&self) -> u64 {
        self.reload_count
    }

    /// The live records for `system`, loading (parse + propagate against
    /// `scene_time`) if the entry is absent or its TTL has elapsed at
    /// `wall_now`. Within the TTL the stored list is returned untouched.
    pub fn get_or_load(
        &mut self,
        system: GnssSystem,
        scene_time: DateTime<Utc>,
        wall_now: DateTime<Utc>,
    ) -> &mut Vec<SatelliteRecord> {
        let expired = match self.entries.get(&system) {
            Some(entry) => wall_now.signed_duration_since(entry.loaded_at) >= self.ttl,
            None => true,
        };

        if expired {
            let records = load_catalog(&self.tle_path(system), system, scene_time);
            self.reload_count += 1;
            self.entries.insert(
                system,
                CatalogEntry {
                    records,
                    loaded_at: wall_now,
                },
            );
        }

        &mut self
            .entries
            .entry(system)
            .or_insert_with(|| CatalogEntry {
                records: Vec::new(),
                loaded_at: wall_now,
            })
            .records
    }

    /// The cached records regardless of TTL, if any.
    pub fn cached(&self, system: GnssSystem) -> Option<&[SatelliteRecord]> {
        self.entries.get(&system).map(|e| e.records.as_slice())
    }

    /// Mutable view of the cached records regardless of TTL, if any.
    pub fn cached_mut(&mut self, system: GnssSystem) -> Option<&mut [SatelliteRecord]> {
        self.entries.get_mut(&system).map(|e| e.records.as_mut_slice())
    }

    /// Drop an entry immediately, forcing a reload on next access.
    pub fn expire(&mut self, system: GnssSystem) {
        self.entries.remove(&system);
    }
}

/// Read, parse, and propagate one constellation file. Any failure
/// degrades to fewer (possibly zero) records; nothing escapes.
fn load_catalog(
    path: &Path,
    system: GnssSystem,
    scene_time: DateTime<Utc>,
) -> Vec<SatelliteRecord> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!(
                "cannot read element file {} for {}: {}; serving empty catalog",
                path.display(),
                system,
                e
            );
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for parsed in parse_element_sets(&text) {
        if !seen.insert(parsed.info.norad_id) {
            warn!(
                "duplicate catalog number {} in {}; keeping first entry",
                parsed.info.norad_id, system
            );
            continue;
        }
        match propagate(&parsed.elements, scene_time) {
            Ok(state) => records.push(SatelliteRecord {
                info: parsed.info,
                elements: parsed.elements,
                state,
                is_visible: false,
                is_selected: false,
            }),
            Err(e) => warn!(
                "dropping {} ({}) from {}: initial propagation failed: {}",
                parsed.info.name, parsed.info.norad_id, system, e
            ),
        }
    }

    debug!("loaded {} records for {}", records.len(), system);
    records
}
