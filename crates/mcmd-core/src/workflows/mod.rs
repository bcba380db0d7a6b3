//! # Workflows Module
//!
//! High-level entry points that tie the [`crate::engine`] pieces into a complete
//! coupled run.
//!
//! ## Architecture
//!
//! - **Cycle Workflow** ([`cycle`]) - Preflight checks, then per cycle: MD input synthesis
//!   for every box NAMD simulates, the MD runs (in series or in parallel), NAMD output
//!   harvesting, the MC run and the restart geometry it leaves for the next cycle
//!
//! The engines themselves are reached only through [`crate::engine::runner::EngineRunner`],
//! so a workflow can be exercised end to end without either program installed.

pub mod cycle;
