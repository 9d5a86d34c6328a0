//! # System Lifecycle & Orchestration
//!
//! Starts the registry store, wires the identifier generators to it and hands
//! out the creation pipeline.
//!
//! ## Wiring
//!
//! 1. **Store** - the [`RegistryStore`](registry_framework::RegistryStore) actor is
//!    spawned first. Its client serves both persistence and search.
//! 2. **Generators** - the WaterFacility generator and the default sequence
//!    generator are offered to [`select_id_gen`](registry_framework::select_id_gen);
//!    the facility generator declares itself primary and wins.
//! 3. **Pipeline** - the [`RegistryService`](registry_framework::RegistryService) is
//!    wrapped in [`EntityDataCapture`](registry_framework::EntityDataCapture) so the
//!    generator can read the document being created.
//!
//! ## Graceful Shutdown
//!
//! [`RegistrySystem::shutdown`] drops the pipeline, which holds every store
//! client, then awaits the store task. The generator's search handle is a
//! client clone too, so it lives inside the pipeline and is dropped with it.

pub mod registry_system;

pub use registry_system::*;
