use super::{GeometryError, INITIAL_CYCLE};
use crate::core::ensemble::Ensemble;
use nalgebra::Vector3;
use std::fmt;

/// Extra head-room for ensembles whose box volume fluctuates during equilibration.
pub const FLUCTUATING_BOX_SCALE: f64 = 1.3;

/// PME grid points along x, y and z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridDims {
    pub nx: u32,
    pub ny: u32,
    pub nz: u32,
}

impl GridDims {
    pub fn new(nx: u32, ny: u32, nz: u32) -> Self {
        Self { nx, ny, nz }
    }
}

impl From<Vector3<u32>> for GridDims {
    fn from(v: Vector3<u32>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl fmt::Display for GridDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.nx, self.ny, self.nz)
    }
}

/// Computes the PME grid for one box.
///
/// Restart cycles reuse `prior` verbatim so the MD engine can keep its cached FFT plan.
/// The initial cycle sizes each axis as `floor((length + padding) * scale) + 1`.
pub fn grid_dims(
    cycle: u64,
    lengths: &Vector3<f64>,
    prior: Option<GridDims>,
    padding: f64,
    ensemble: Ensemble,
) -> Result<GridDims, GeometryError> {
    if cycle != INITIAL_CYCLE {
        return prior.ok_or(GeometryError::MissingPriorGrid { cycle });
    }

    let scale = if ensemble.has_fluctuating_box() {
        FLUCTUATING_BOX_SCALE
    } else {
        1.0
    };
    Ok(lengths
        .map(|length| ((length + padding) * scale).floor() as u32 + 1)
        .into())
}
