use super::layout::{BoxId, LayoutError, RunLayout};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name prefix of the FFT plan NAMD caches next to its first run.
pub const FFT_PLAN_PREFIX: &str = "FFTW_NAMD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanRemoval {
    Removed(PathBuf),
    NotFound,
}

/// Returns the first FFT plan in `dir`, in file-name order.
///
/// A missing directory is treated like an empty one.
pub fn find_run0_fft_plan(dir: &Path) -> Result<Option<PathBuf>, LayoutError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error(dir, e)),
    };

    let mut plans = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_error(dir, e))?;
        let is_plan = entry.file_name().to_string_lossy().starts_with(FFT_PLAN_PREFIX);
        if is_plan && entry.path().is_file() {
            plans.push(entry.path());
        }
    }
    plans.sort();
    Ok(plans.into_iter().next())
}

/// Deletes the FFT plan cached in the run-0 directory of `box_id`.
///
/// A missing plan or directory is [`PlanRemoval::NotFound`]; any other I/O failure
/// is returned to the caller.
pub fn remove_run0_fft_plan(layout: &RunLayout, box_id: BoxId) -> Result<PlanRemoval, LayoutError> {
    let dir = layout.namd_box_dir(0, box_id);
    let Some(plan) = find_run0_fft_plan(&dir)? else {
        return Ok(PlanRemoval::NotFound);
    };
    match fs::remove_file(&plan) {
        Ok(()) => Ok(PlanRemoval::Removed(plan)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(PlanRemoval::NotFound),
        Err(e) => Err(io_error(&plan, e)),
    }
}

fn io_error(path: &Path, e: io::Error) -> LayoutError {
    LayoutError::Io {
        path: path.to_string_lossy().to_string(),
        message: e.to_string(),
    }
}
