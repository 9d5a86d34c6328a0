//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging for the whole pipeline with
//! the `tracing` crate. Levels are controlled through `RUST_LOG`:
//!
//! ```bash
//! # Creations, generated identifiers, duplicate rejections
//! RUST_LOG=info cargo run
//!
//! # Full payloads, relay binds and clears, search queries
//! RUST_LOG=debug cargo run
//!
//! # Only the generator
//! RUST_LOG=water_facility=debug cargo run
//! ```
//!
//! ## What Gets Traced
//!
//! - **Store Lifecycle**: startup, shutdown, inserts and rejections by the uniqueness constraint
//! - **Creation Pipeline**: one span per `add_entity`, with the entity type and `osid`
//! - **Relay**: binding and clearing of the entity context (`debug`)
//! - **Generators**: generated identifiers (`info`), confirmed duplicates (`error`),
//!   failed duplicate checks (`warn`)
//!
//! With `RUST_LOG=info` a creation reads:
//!
//! ```text
//! INFO add_entity: Generating wfId for WaterFacility entity
//! INFO add_entity: Generated wfId wf_id="WF-NIM-SAN-TWB-DAA7B4"
//! INFO Created entity_type="WaterFacility" osid="1-1" size=1
//! INFO add_entity: Entity added entity_type="WaterFacility" osid="1-1"
//! ```

/// Installs the global subscriber: env-filtered, compact, without module targets.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
