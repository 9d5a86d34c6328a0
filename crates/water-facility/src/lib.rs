//! # Water Facility Registry
//!
//! Deterministic identifiers for water points, plugged into the
//! [`registry_framework`] creation pipeline.
//!
//! - **[codes]**: location abbreviations and the water point type table.
//! - **[hash]**: normalization and the SHA-256 suffix.
//! - **[model]**: [`FacilityKey`](model::FacilityKey), the five identifying values.
//! - **[id_gen]**: [`WaterFacilityIdGenService`](id_gen::WaterFacilityIdGenService),
//!   generation plus the duplicate check.
//! - **[lifecycle]**: [`RegistrySystem`](lifecycle::RegistrySystem), which wires it all up.
//! - **[bulk]**: CSV survey exports registered row by row, with a resumable progress log.
//!
//! ## Quick Start
//!
//! The binary in `main.rs` starts a [`RegistrySystem`](lifecycle::RegistrySystem),
//! registers a facility and shows the duplicate of that facility being rejected.

pub mod bulk;
pub mod codes;
pub mod hash;
pub mod id_gen;
pub mod lifecycle;
pub mod model;
