//! # Core Module
//!
//! Stateless building blocks shared by the cycle engine: unit-cell geometry, the
//! ensemble model, engine file formats and the template renderer.
//!
//! ## Architecture
//!
//! - **Geometry** ([`cell`]) - Unit cells, per-axis dimension resolution, angle checks and PME grid sizing
//! - **Ensembles** ([`ensemble`]) - The four supported sampling modes and their box behaviour
//! - **File I/O** ([`io`]) - `CRYST1` records in structure files and the MD engine's output log
//! - **Templates** ([`template`]) - Strict, longest-token-first placeholder substitution
//! - **Utilities** ([`utils`]) - Cycle id formatting and path helpers
//!
//! Nothing in this layer touches the filesystem except the explicit readers in [`io`]
//! and [`template::load_template`].

pub mod cell;
pub mod ensemble;
pub mod io;
pub mod template;
pub mod utils;
