//! # py-MCMD Core Library
//!
//! Coordination of coupled NAMD/GOMC simulations: a molecular-dynamics run and a
//! Monte Carlo run alternate every cycle, each starting from the geometry and restart
//! state the other one left behind.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless pieces: unit-cell geometry and PME grid
//!   sizing, the ensemble model, readers for structure files and NAMD logs, and the
//!   strict template renderer.
//!
//! - **[`engine`]: The Logic Core.** The validated `SimulationConfig`, the on-disk run
//!   layout, the `ConfWriter` that produces one MD input file for one box and cycle,
//!   and the `EngineRunner` seam to the external programs.
//!
//! - **[`workflows`]: The Public API.** The cycle loop that drives both engines from the
//!   first configured cycle to the last and reports what happened.

pub mod core;
pub mod engine;
pub mod workflows;
