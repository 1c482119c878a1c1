//! Constellation Engine Library
//!
//! The orchestration layer of the GNSS visualizer core: per-constellation
//! element-set caching with TTL expiry, a variable-rate simulation clock,
//! observer-relative visibility evaluation, and the satellite registry
//! surface queried by the external rendering layer.
//!
//! Everything here runs on a single logical thread of control: the host
//! drives one periodic tick and serializes any other calls around it.

use thiserror::Error;

pub mod catalog;
pub mod clock;
pub mod registry;
pub mod system;
pub mod visibility;

pub use catalog::{CatalogCache, SatelliteRecord};
pub use clock::SimulationClock;
pub use registry::{EngineEvent, SatelliteRegistry};
pub use system::GnssSystem;
pub use visibility::ObserverPoint;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unknown constellation type: {0}")]
    UnknownSystem(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
