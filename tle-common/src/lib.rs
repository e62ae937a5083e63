//! Shared data model for the TLE ingestion pipeline.
//!
//! Every derivation step is a one-way value transformation:
//! `TleRecord -> OrbitalElements -> ClassifiedOrbit`.

pub mod types;

pub use types::{ClassifiedOrbit, EarthModel, OrbitRegime, OrbitalElements, TleRecord};
