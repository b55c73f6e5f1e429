//! # CSR Sorting
//!
//! Headless model of the demonstrator's conveyor: objects made of a material
//! from a static table ride the belt, pass a scanner that applies the
//! material's verdict, and feed a shared statistics context.
//!
//! ## Table of Contents
//! - **material**: Static material lookup table
//! - **stats**: Counter aggregate fed by classification events
//! - **simulation**: Deterministic tick-driven belt scheduler
//! - **error**: Error types
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use csr_sorting::{Simulation, SimulationConfig};
//!
//! let mut sim = Simulation::new(SimulationConfig::default().seed(42)).unwrap();
//! sim.tick(Duration::from_secs(60));
//!
//! let stats = sim.stats();
//! assert_eq!(stats.total(), stats.accepted() + stats.rejected() + stats.uncertain());
//! ```

pub mod error;
pub mod material;
pub mod simulation;
pub mod stats;

pub use error::{Result, SimError};
pub use material::{verdict_for, Material, Verdict, MATERIALS};
pub use simulation::{
    BeltObject, ObjectState, Reaction, SimEvent, Simulation, SimulationConfig, MAX_SPAWN_PER_WAVE,
};
pub use stats::{Classification, Outcome, SortingStats};
