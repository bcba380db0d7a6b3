//! Readers for the files the two engines exchange.
//!
//! - [`pdb`] extracts the unit cell from a structure file's `CRYST1` record.
//! - [`namd_log`] reads the PME grid and the energy table from the MD engine's output.

pub mod namd_log;
pub mod pdb;
