use super::config::SimulationConfig;
use crate::core::cell::INITIAL_CYCLE;
use crate::core::utils::paths::{format_cycle_id, relative_to, to_posix};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Placeholder for restart inputs a fresh run does not have.
pub const UNUSED_FILE: &str = "NA";

const RESTART_EXTENSIONS: [&str; 5] = ["pdb", "psf", "coor", "xsc", "vel"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BoxId {
    Primary,
    Secondary,
}

impl BoxId {
    pub const ALL: [BoxId; 2] = [BoxId::Primary, BoxId::Secondary];

    pub fn index(self) -> usize {
        match self {
            BoxId::Primary => 0,
            BoxId::Secondary => 1,
        }
    }

    /// Letter appended to the MD working directory of this box.
    pub fn suffix(self) -> &'static str {
        match self {
            BoxId::Primary => "a",
            BoxId::Secondary => "b",
        }
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Run numbers of the two engine runs of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunIds {
    pub md: u64,
    pub mc: u64,
}

impl RunIds {
    pub fn for_cycle(cycle: u64) -> Self {
        Self {
            md: 2 * cycle,
            mc: 2 * cycle + 1,
        }
    }
}

/// Name of a restart file the MC engine writes for `box_id`.
pub fn restart_file_name(box_id: BoxId, extension: &str) -> String {
    format!("Output_data_BOX_{}_restart.{extension}", box_id.index())
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Restart file from the previous cycle is missing: {path}")]
    MissingRestartFile { path: String },

    #[error("No starting {kind} file is configured for box {box_id}")]
    MissingStartingFile { box_id: BoxId, kind: &'static str },

    #[error("Failed to prepare directory '{path}': {message}")]
    Io { path: String, message: String },
}

/// Input files of one MD run, as the template refers to them.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSources {
    pub pdb: String,
    pub psf: String,
    pub coor: String,
    pub xsc: String,
    pub vel: String,
    pub restart: bool,
    /// Structure file the unit cell is read from.
    pub structure: PathBuf,
}

/// Where every run of a coupled simulation lives on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct RunLayout {
    namd_root: PathBuf,
    gomc_root: PathBuf,
    id_width: usize,
}

impl RunLayout {
    pub fn new(namd_root: impl Into<PathBuf>, gomc_root: impl Into<PathBuf>, id_width: usize) -> Self {
        Self {
            namd_root: namd_root.into(),
            gomc_root: gomc_root.into(),
            id_width,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            config.resolve(&config.namd().runs_dir),
            config.resolve(&config.gomc().runs_dir),
            config.cycle_id_width(),
        )
    }

    pub fn namd_root(&self) -> &Path {
        &self.namd_root
    }

    pub fn gomc_root(&self) -> &Path {
        &self.gomc_root
    }

    pub fn id_width(&self) -> usize {
        self.id_width
    }

    /// `<namd_root>/<run id>_<a|b>`
    pub fn namd_box_dir(&self, run_id: u64, box_id: BoxId) -> PathBuf {
        self.namd_root.join(format!(
            "{}_{}",
            format_cycle_id(run_id, self.id_width),
            box_id.suffix()
        ))
    }

    /// `<gomc_root>/<run id>_gomc`
    pub fn gomc_dir(&self, run_id: u64) -> PathBuf {
        self.gomc_root
            .join(format!("{}_gomc", format_cycle_id(run_id, self.id_width)))
    }

    pub fn cycle_md_dir(&self, cycle: u64, box_id: BoxId) -> PathBuf {
        self.namd_box_dir(RunIds::for_cycle(cycle).md, box_id)
    }

    pub fn cycle_mc_dir(&self, cycle: u64) -> PathBuf {
        self.gomc_dir(RunIds::for_cycle(cycle).mc)
    }

    /// Restart files written for `box_id` by the MC run of `cycle`.
    pub fn restart_files(&self, cycle: u64, box_id: BoxId) -> Vec<PathBuf> {
        let dir = self.cycle_mc_dir(cycle);
        RESTART_EXTENSIONS
            .iter()
            .map(|ext| dir.join(restart_file_name(box_id, ext)))
            .collect()
    }

    /// Creates a directory and its parents; existing directories are fine.
    pub fn ensure_dir(path: &Path) -> Result<(), LayoutError> {
        std::fs::create_dir_all(path).map_err(|e| LayoutError::Io {
            path: path.to_string_lossy().to_string(),
            message: e.to_string(),
        })
    }

    /// Picks the MD inputs for `box_id` on `cycle`.
    ///
    /// The initial cycle uses the configured starting structure and topology with no
    /// restart inputs. Every later cycle uses the restart files of the previous cycle's
    /// MC run, all five of which must exist. Paths are relative to `working_dir`.
    pub fn resolve_sources(
        &self,
        config: &SimulationConfig,
        cycle: u64,
        box_id: BoxId,
        working_dir: &Path,
    ) -> Result<RunSources, LayoutError> {
        let rel = |target: &Path| to_posix(&relative_to(target, working_dir));

        if cycle == INITIAL_CYCLE {
            let settings = config.box_settings(box_id);
            let pdb = settings
                .starting_pdb
                .as_deref()
                .map(|p| config.resolve(p))
                .ok_or(LayoutError::MissingStartingFile { box_id, kind: "PDB" })?;
            let psf = settings
                .starting_psf
                .as_deref()
                .map(|p| config.resolve(p))
                .ok_or(LayoutError::MissingStartingFile { box_id, kind: "PSF" })?;
            return Ok(RunSources {
                pdb: rel(&pdb),
                psf: rel(&psf),
                coor: UNUSED_FILE.to_string(),
                xsc: UNUSED_FILE.to_string(),
                vel: UNUSED_FILE.to_string(),
                restart: false,
                structure: pdb,
            });
        }

        let files = self.restart_files(cycle - 1, box_id);
        if let Some(missing) = files.iter().find(|f| !f.is_file()) {
            return Err(LayoutError::MissingRestartFile {
                path: missing.to_string_lossy().to_string(),
            });
        }
        let [pdb, psf, coor, xsc, vel] = <[PathBuf; 5]>::try_from(files).map_err(|_| {
            LayoutError::MissingRestartFile {
                path: self.cycle_mc_dir(cycle - 1).to_string_lossy().to_string(),
            }
        })?;
        Ok(RunSources {
            pdb: rel(&pdb),
            psf: rel(&psf),
            coor: rel(&coor),
            xsc: rel(&xsc),
            vel: rel(&vel),
            restart: true,
            structure: pdb,
        })
    }
}
