use super::config::{BoxSettings, SimulationConfig};
use super::error::EngineError;
use super::layout::{BoxId, RunIds, RunLayout, RunSources};
use super::progress::{EventReporter, RunEvent};
use crate::core::cell::angles::validate_angles;
use crate::core::cell::dimensions::{DimensionSource, resolve_dimension};
use crate::core::cell::grid::{GridDims, grid_dims};
use crate::core::cell::{Axis, INITIAL_CYCLE, UnitCell};
use crate::core::io::pdb;
use crate::core::template::{RenderMapping, load_template, render};
use crate::core::utils::paths::{relative_to, to_posix};
use nalgebra::Vector3;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Name of the rendered MD input inside each working directory.
pub const NAMD_INPUT_FILE: &str = "in.conf";

/// Placeholders substituted into the MD template.
pub const NAMD_TEMPLATE_TOKENS: [&str; 23] = [
    "all_parameter_files",
    "pdb_box_file",
    "psf_box_file",
    "coor_file",
    "xsc_file",
    "vel_file",
    "Bool_restart",
    "x_dim_box",
    "y_dim_box",
    "z_dim_box",
    "x_origin_box",
    "y_origin_box",
    "z_origin_box",
    "NAMD_Run_Steps",
    "NAMD_Minimize",
    "NAMD_RST_DCD_XST_Steps",
    "NAMD_console_BLKavg_E_and_P_Steps",
    "current_step",
    "System_temp_set",
    "System_press_set",
    "X_PME_GRID_DIM",
    "Y_PME_GRID_DIM",
    "Z_PME_GRID_DIM",
];

/// Everything decided while writing one box's MD input for one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleContext {
    pub cycle: u64,
    pub run_id: u64,
    pub box_id: BoxId,
    pub restart: bool,
    pub lengths: Vector3<f64>,
    pub grid: GridDims,
    pub working_dir: PathBuf,
    pub sources: RunSources,
    pub conf_path: PathBuf,
}

/// Renders a value in positional notation; integral values keep a trailing `.0`.
fn literal(value: f64) -> String {
    let mut text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    text
}

/// Writes the MD engine's input file for one box of one cycle.
pub struct ConfWriter<'a> {
    config: &'a SimulationConfig,
    layout: RunLayout,
    reporter: &'a EventReporter<'a>,
}

impl<'a> ConfWriter<'a> {
    pub fn new(config: &'a SimulationConfig, reporter: &'a EventReporter<'a>) -> Self {
        Self {
            config,
            layout: RunLayout::from_config(config),
            reporter,
        }
    }

    pub fn layout(&self) -> &RunLayout {
        &self.layout
    }

    /// Writes `<namd_root>/<run id>_<a|b>/in.conf`.
    ///
    /// `prior_grid` is the PME grid of the previous cycle and is required on every
    /// cycle after the initial one.
    #[instrument(skip_all, name = "write_namd_conf", fields(cycle = cycle, box_id = %box_id))]
    pub fn write(
        &self,
        cycle: u64,
        box_id: BoxId,
        prior_grid: Option<GridDims>,
    ) -> Result<CycleContext, EngineError> {
        let run_id = RunIds::for_cycle(cycle).md;
        let working_dir = self.layout.namd_box_dir(run_id, box_id);
        RunLayout::ensure_dir(&working_dir)?;

        let template = load_template(&self.config.resolve(&self.config.namd().template))?;
        let parameters = self.parameter_block(&working_dir);
        let sources = self
            .layout
            .resolve_sources(self.config, cycle, box_id, &working_dir)?;

        let cell = pdb::read_cell_from_path(&sources.structure)?;
        let settings = self.config.box_settings(box_id);
        validate_angles(cycle, cell.angles, settings.angles)?;
        let lengths = self.resolve_lengths(cycle, box_id, &cell, settings)?;
        let grid = grid_dims(
            cycle,
            &lengths,
            prior_grid,
            f64::from(self.config.namd().fft_padding),
            self.config.ensemble(),
        )?;
        debug!("Box {box_id} lengths {:?}, PME grid {grid}", lengths.as_slice());

        let mapping = self.mapping(parameters, &sources, &lengths, grid);
        let rendered = render(&template, &mapping, true, &NAMD_TEMPLATE_TOKENS)?;

        let conf_path = working_dir.join(NAMD_INPUT_FILE);
        fs::write(&conf_path, rendered).map_err(|e| EngineError::Write {
            path: conf_path.to_string_lossy().to_string(),
            message: e.to_string(),
        })?;

        info!("NAMD simulation data for simulation number {run_id} in box {box_id} is completed");
        self.reporter.report(RunEvent::ConfWritten {
            cycle,
            box_id,
            path: conf_path.clone(),
        });

        Ok(CycleContext {
            cycle,
            run_id,
            box_id,
            restart: sources.restart,
            lengths,
            grid,
            working_dir,
            sources,
            conf_path,
        })
    }

    /// One `parameters` line per MD force-field file, relative to `working_dir`.
    fn parameter_block(&self, working_dir: &Path) -> String {
        self.config
            .namd()
            .ff_files
            .iter()
            .map(|file| {
                let path = relative_to(&self.config.resolve(file), working_dir);
                format!("parameters \t {}\n", to_posix(&path))
            })
            .collect()
    }

    fn resolve_lengths(
        &self,
        cycle: u64,
        box_id: BoxId,
        cell: &UnitCell,
        settings: &BoxSettings,
    ) -> Result<Vector3<f64>, EngineError> {
        let mut lengths = Vector3::zeros();
        for axis in Axis::ALL {
            let resolved = resolve_dimension(
                axis,
                cycle,
                cell.length(axis),
                settings.dims[axis.index()],
                INITIAL_CYCLE,
            )?;
            if let DimensionSource::OverrideDiffers { read, set } = resolved.source {
                self.reporter.report(RunEvent::DimensionOverride {
                    box_id,
                    axis,
                    read,
                    set,
                });
            }
            lengths[axis.index()] = resolved.value;
        }
        Ok(lengths)
    }

    fn mapping(
        &self,
        parameters: String,
        sources: &RunSources,
        lengths: &Vector3<f64>,
        grid: GridDims,
    ) -> RenderMapping {
        let derived = self.config.derived();
        let origin = lengths / 2.0;
        let mut mapping = RenderMapping::new();
        mapping
            .insert("all_parameter_files", parameters)
            .insert("pdb_box_file", &sources.pdb)
            .insert("psf_box_file", &sources.psf)
            .insert("coor_file", &sources.coor)
            .insert("xsc_file", &sources.xsc)
            .insert("vel_file", &sources.vel)
            .insert("Bool_restart", sources.restart)
            .insert("x_dim_box", literal(lengths.x))
            .insert("y_dim_box", literal(lengths.y))
            .insert("z_dim_box", literal(lengths.z))
            .insert("x_origin_box", literal(origin.x))
            .insert("y_origin_box", literal(origin.y))
            .insert("z_origin_box", literal(origin.z))
            .insert("NAMD_Run_Steps", self.config.namd().run_steps)
            .insert("NAMD_Minimize", derived.namd_minimize_steps)
            .insert("NAMD_RST_DCD_XST_Steps", derived.namd_rst_dcd_xst_steps)
            .insert(
                "NAMD_console_BLKavg_E_and_P_Steps",
                derived.namd_console_blkavg_e_and_p_steps,
            )
            .insert("current_step", 0)
            .insert("System_temp_set", literal(self.config.temperature_k()))
            .insert("System_press_set", literal(self.config.pressure_bar()))
            .insert("X_PME_GRID_DIM", grid.nx)
            .insert("Y_PME_GRID_DIM", grid.ny)
            .insert("Z_PME_GRID_DIM", grid.nz);
        mapping
    }
}
