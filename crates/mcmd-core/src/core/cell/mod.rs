//! Unit-cell geometry and the per-axis decisions made from it.
//!
//! A simulation box is described by a `CRYST1` record (three lengths, three angles).
//! On the initial cycle the record comes from the user's starting structure and is
//! reconciled with the dimensions set in the configuration; on every later cycle it
//! comes from the Monte Carlo engine's restart output and is trusted as is.
//!
//! - [`dimensions`] picks the length used for each axis.
//! - [`angles`] rejects non-orthogonal cells on the initial cycle.
//! - [`grid`] derives the PME grid from the resolved lengths.

pub mod angles;
pub mod dimensions;
pub mod grid;

use std::fmt;
use thiserror::Error;

/// The cycle on which user overrides are reconciled with the structure file.
pub const INITIAL_CYCLE: u64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lengths (a, b, c) and angles (alpha, beta, gamma) of a box, each possibly unknown.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UnitCell {
    pub lengths: [Option<f64>; 3],
    pub angles: [Option<f64>; 3],
}

impl UnitCell {
    pub fn new(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        Self {
            lengths: [Some(a), Some(b), Some(c)],
            angles: [Some(alpha), Some(beta), Some(gamma)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.iter().chain(self.angles.iter()).all(Option::is_none)
    }

    pub fn length(&self, axis: Axis) -> Option<f64> {
        self.lengths[axis.index()]
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error(
        "The user defined {axis}-dimension is not set and the structure file has no {axis}-dimension (cycle {cycle})"
    )]
    MissingDimension { axis: Axis, cycle: u64 },

    #[error("Non-orthogonal box angles are not allowed on cycle 0: {}", .violations.join(", "))]
    NonOrthogonal { violations: Vec<String> },

    #[error("Restart cycle {cycle} needs the PME grid of a previous cycle, but none is known")]
    MissingPriorGrid { cycle: u64 },
}
