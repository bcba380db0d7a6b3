//! Validated simulation configuration.
//!
//! A [`RawConfig`] mirrors the user input file key for key. [`SimulationConfig::from_raw`]
//! checks primitive types and ranges first, then the ensemble-specific requirements,
//! and finally derives the engine step counts and core allocation. The result is
//! read-only for the rest of the run.

mod loader;
mod raw;

pub use loader::{
    base_dir_of, load_raw, load_simulation_config, parse_json, parse_toml, strip_line_comments,
};
pub use raw::RawConfig;

use crate::core::ensemble::Ensemble;
use crate::core::utils::paths::resolve_under;
use crate::engine::layout::BoxId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_PRESSURE_BAR: f64 = 1.01325;
pub const DEFAULT_CYCLE_ID_WIDTH: usize = 10;
pub const MAX_CYCLE_ID_WIDTH: usize = 20;
pub const MAX_HIST_SAMPLE_STEPS: u64 = 500;
pub const DEFAULT_NAMD_RUNS_DIR: &str = "NAMD";
pub const DEFAULT_GOMC_RUNS_DIR: &str = "GOMC";
pub const DEFAULT_LOG_DIR: &str = "logs";
const TEMPLATE_DIR: &str = "required_data/input_templates";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{field}': {reason}")]
    Value { field: &'static str, reason: String },

    #[error("Wrong value type in configuration: {0}")]
    Type(String),

    #[error("Configuration syntax error: {0}")]
    Syntax(String),

    #[error("Failed to access configuration file '{path}': {message}")]
    Io { path: String, message: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Value {
        field,
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    Cpu,
    Gpu,
}

impl Device {
    pub fn as_str(self) -> &'static str {
        match self {
            Device::Cpu => "CPU",
            Device::Gpu => "GPU",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChemPotKind {
    ChemPot,
    Fugacity,
}

impl ChemPotKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChemPotKind::ChemPot => "ChemPot",
            ChemPotKind::Fugacity => "Fugacity",
        }
    }
}

/// How the MD runs of the two boxes of a cycle are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SimulationOrder {
    #[default]
    Series,
    Parallel,
}

impl SimulationOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SimulationOrder::Series => "series",
            SimulationOrder::Parallel => "parallel",
        }
    }
}

impl fmt::Display for SimulationOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChemicalPotential {
    pub kind: ChemPotKind,
    pub values: BTreeMap<String, f64>,
}

/// Per-box user settings.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSettings {
    pub cores: u32,
    pub dims: [Option<f64>; 3],
    pub angles: [Option<f64>; 3],
    pub starting_pdb: Option<PathBuf>,
    pub starting_psf: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamdSettings {
    pub run_steps: u64,
    pub minimize_mult_scalar: u64,
    pub ff_files: Vec<PathBuf>,
    pub bin_directory: PathBuf,
    pub template: PathBuf,
    pub runs_dir: PathBuf,
    pub fft_padding: u32,
    pub order: SimulationOrder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GomcSettings {
    pub run_steps: u64,
    pub device: Device,
    pub ff_files: Vec<PathBuf>,
    pub bin_directory: PathBuf,
    pub template: PathBuf,
    pub runs_dir: PathBuf,
}

/// Values computed from the user settings; none of them can be set directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedParameters {
    pub namd_rst_dcd_xst_steps: u64,
    pub namd_console_blkavg_e_and_p_steps: u64,
    pub namd_minimize_steps: u64,
    pub gomc_rst_coor_ckpoint_steps: u64,
    pub gomc_console_blkavg_hist_steps: u64,
    pub gomc_hist_sample_steps: u64,
    pub two_box_namd: bool,
    pub effective_box_1_cores: u32,
    pub total_cores: u32,
    pub gomc_binary: String,
}

impl DerivedParameters {
    fn derive(
        ensemble: Ensemble,
        only_box_0: bool,
        boxes: &[BoxSettings; 2],
        namd: &NamdSettings,
        gomc: &GomcSettings,
    ) -> Result<Self, ConfigError> {
        let two_box_namd = ensemble == Ensemble::Gemc && !only_box_0;
        let effective_box_1_cores = if two_box_namd { boxes[1].cores } else { 0 };
        let namd_minimize_steps = namd
            .run_steps
            .checked_mul(namd.minimize_mult_scalar)
            .ok_or_else(|| {
                invalid(
                    "namd_minimize_mult_scalar",
                    format!(
                        "{} minimization cycles of {} steps overflow the step counter",
                        namd.minimize_mult_scalar, namd.run_steps
                    ),
                )
            })?;
        let total_cores = boxes[0]
            .cores
            .checked_add(effective_box_1_cores)
            .ok_or_else(|| {
                invalid(
                    "no_core_box_1",
                    format!(
                        "{} + {} cores overflow the core counter",
                        boxes[0].cores, effective_box_1_cores
                    ),
                )
            })?;
        Ok(Self {
            namd_rst_dcd_xst_steps: namd.run_steps,
            namd_console_blkavg_e_and_p_steps: namd.run_steps,
            namd_minimize_steps,
            gomc_rst_coor_ckpoint_steps: gomc.run_steps,
            gomc_console_blkavg_hist_steps: gomc.run_steps,
            gomc_hist_sample_steps: MAX_HIST_SAMPLE_STEPS.min(gomc.run_steps / 10),
            two_box_namd,
            effective_box_1_cores,
            total_cores,
            gomc_binary: format!("GOMC_{}_{}", gomc.device, ensemble),
        })
    }
}

/// The complete, validated configuration of a coupled run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    base_dir: PathBuf,
    total_cycles: u64,
    start_cycle: u64,
    ensemble: Ensemble,
    only_box_0_for_namd: bool,
    temperature_k: f64,
    pressure_bar: f64,
    chemical_potential: Option<ChemicalPotential>,
    boxes: [BoxSettings; 2],
    namd: NamdSettings,
    gomc: GomcSettings,
    log_dir: PathBuf,
    cycle_id_width: usize,
    derived: DerivedParameters,
}

fn required<T>(value: Option<T>, key: &'static str) -> Result<T, ConfigError> {
    value.ok_or(ConfigError::MissingParameter(key))
}

fn non_negative(value: i64, field: &'static str) -> Result<u64, ConfigError> {
    u64::try_from(value).map_err(|_| invalid(field, format!("must be >= 0, got {value}")))
}

fn positive(value: i64, field: &'static str) -> Result<u64, ConfigError> {
    match value {
        v if v > 0 => Ok(v as u64),
        v => Err(invalid(field, format!("must be > 0, got {v}"))),
    }
}

fn core_count(value: i64, field: &'static str) -> Result<u32, ConfigError> {
    u32::try_from(value).map_err(|_| invalid(field, format!("must be >= 0, got {value}")))
}

fn three_entries(
    list: Option<Vec<Option<f64>>>,
    field: &'static str,
) -> Result<[Option<f64>; 3], ConfigError> {
    match list {
        None => Ok([None; 3]),
        Some(values) => <[Option<f64>; 3]>::try_from(values).map_err(|v| {
            invalid(field, format!("must contain exactly 3 entries, got {}", v.len()))
        }),
    }
}

fn dims_list(
    list: Option<Vec<Option<f64>>>,
    field: &'static str,
) -> Result<[Option<f64>; 3], ConfigError> {
    let dims = three_entries(list, field)?;
    if let Some(bad) = dims.iter().flatten().find(|d| d.is_nan() || **d <= 0.0) {
        return Err(invalid(field, format!("dimensions must be > 0, got {bad}")));
    }
    Ok(dims)
}

fn angle_list(
    list: Option<Vec<Option<f64>>>,
    field: &'static str,
) -> Result<[Option<f64>; 3], ConfigError> {
    let angles = three_entries(list, field)?;
    if let Some(bad) = angles.iter().flatten().find(|a| **a != 90.0) {
        return Err(invalid(field, format!("angles must be exactly 90, got {bad}")));
    }
    Ok(angles)
}

fn file_list(list: Option<Vec<String>>, field: &'static str) -> Result<Vec<PathBuf>, ConfigError> {
    let list = required(list, field)?;
    if list.is_empty() {
        return Err(invalid(field, "must list at least one file"));
    }
    if list.iter().any(|f| f.trim().is_empty()) {
        return Err(invalid(field, "file names must not be empty"));
    }
    Ok(list.into_iter().map(PathBuf::from).collect())
}

fn parse_device(value: &str) -> Result<Device, ConfigError> {
    match value {
        "CPU" => Ok(Device::Cpu),
        "GPU" => Ok(Device::Gpu),
        other => Err(invalid(
            "gomc_use_CPU_or_GPU",
            format!("expected CPU or GPU, got '{other}'"),
        )),
    }
}

fn parse_chem_pot_kind(value: &str) -> Result<ChemPotKind, ConfigError> {
    match value {
        "ChemPot" => Ok(ChemPotKind::ChemPot),
        "Fugacity" => Ok(ChemPotKind::Fugacity),
        other => Err(invalid(
            "GCMC_ChemPot_or_Fugacity",
            format!("expected ChemPot or Fugacity, got '{other}'"),
        )),
    }
}

fn parse_order(value: Option<&str>) -> Result<SimulationOrder, ConfigError> {
    match value {
        None | Some("series") => Ok(SimulationOrder::Series),
        Some("parallel") => Ok(SimulationOrder::Parallel),
        Some(other) => Err(invalid(
            "namd_simulation_order",
            format!("expected series or parallel, got '{other}'"),
        )),
    }
}

fn default_template(engine: &str, ensemble: Ensemble) -> PathBuf {
    PathBuf::from(TEMPLATE_DIR).join(format!("{engine}_{ensemble}_template.conf"))
}

impl SimulationConfig {
    /// Validates raw input. Relative paths are later resolved against `base_dir`.
    pub fn from_raw(raw: RawConfig, base_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        // Primitive types and ranges.
        let total_cycles = non_negative(
            required(raw.total_cycles_namd_gomc_sims, "total_cycles_namd_gomc_sims")?,
            "total_cycles_namd_gomc_sims",
        )?;
        let start_cycle = non_negative(
            required(
                raw.starting_at_cycle_namd_gomc_sims,
                "starting_at_cycle_namd_gomc_sims",
            )?,
            "starting_at_cycle_namd_gomc_sims",
        )?;
        if start_cycle > total_cycles {
            return Err(invalid(
                "starting_at_cycle_namd_gomc_sims",
                format!("must not exceed total_cycles_namd_gomc_sims ({total_cycles}), got {start_cycle}"),
            ));
        }

        let device = parse_device(&required(raw.gomc_use_cpu_or_gpu, "gomc_use_CPU_or_GPU")?)?;
        let ensemble: Ensemble = required(raw.simulation_type, "simulation_type")?
            .parse::<Ensemble>()
            .map_err(|e| invalid("simulation_type", e.to_string()))?;
        let only_box_0_for_namd = raw.only_use_box_0_for_namd_for_gemc.unwrap_or(true);

        let box_0_cores = core_count(required(raw.no_core_box_0, "no_core_box_0")?, "no_core_box_0")?;
        if box_0_cores == 0 {
            return Err(invalid("no_core_box_0", "must be > 0"));
        }
        let box_1_cores = core_count(raw.no_core_box_1.unwrap_or(0), "no_core_box_1")?;

        let temperature_k = required(raw.simulation_temp_k, "simulation_temp_k")?;
        if !temperature_k.is_finite() || temperature_k <= 0.0 {
            return Err(invalid(
                "simulation_temp_k",
                format!("must be > 0, got {temperature_k}"),
            ));
        }

        let minimize_mult_scalar = non_negative(
            required(raw.namd_minimize_mult_scalar, "namd_minimize_mult_scalar")?,
            "namd_minimize_mult_scalar",
        )?;
        let namd_run_steps = positive(required(raw.namd_run_steps, "namd_run_steps")?, "namd_run_steps")?;
        let gomc_run_steps = positive(required(raw.gomc_run_steps, "gomc_run_steps")?, "gomc_run_steps")?;

        let dims_0 = dims_list(raw.set_dims_box_0_list, "set_dims_box_0_list")?;
        let dims_1 = dims_list(raw.set_dims_box_1_list, "set_dims_box_1_list")?;
        let angles_0 = angle_list(raw.set_angle_box_0_list, "set_angle_box_0_list")?;
        let angles_1 = angle_list(raw.set_angle_box_1_list, "set_angle_box_1_list")?;

        let gomc_ff_files = file_list(raw.starting_ff_file_list_gomc, "starting_ff_file_list_gomc")?;
        let namd_ff_files = file_list(raw.starting_ff_file_list_namd, "starting_ff_file_list_namd")?;

        let namd_bin = required(raw.namd2_bin_directory, "namd2_bin_directory")?;
        let gomc_bin = required(raw.gomc_bin_directory, "gomc_bin_directory")?;

        let fft_padding = u32::try_from(raw.fft_add_namd_ang_to_box_dim.unwrap_or(0)).map_err(|_| {
            invalid("fft_add_namd_ang_to_box_dim", "must be a non-negative integer")
        })?;
        let order = parse_order(raw.namd_simulation_order.as_deref())?;
        let cycle_id_width = match raw.cycle_id_width {
            None => DEFAULT_CYCLE_ID_WIDTH,
            Some(w) if (1..=MAX_CYCLE_ID_WIDTH as i64).contains(&w) => w as usize,
            Some(w) => {
                return Err(invalid(
                    "cycle_id_width",
                    format!("must be between 1 and {MAX_CYCLE_ID_WIDTH}, got {w}"),
                ));
            }
        };

        // Ensemble-specific requirements.
        let pressure_bar = match (ensemble, raw.simulation_pressure_bar) {
            (Ensemble::Npt, None) => return Err(ConfigError::MissingParameter("simulation_pressure_bar")),
            (Ensemble::Npt, Some(p)) if p.is_nan() || p < 0.0 => {
                return Err(invalid(
                    "simulation_pressure_bar",
                    format!("must be >= 0 for NPT, got {p}"),
                ));
            }
            (_, Some(p)) => p,
            (_, None) => DEFAULT_PRESSURE_BAR,
        };

        let chemical_potential = Self::validate_chemical_potential(
            ensemble,
            raw.gcmc_chempot_or_fugacity,
            raw.gcmc_chempot_or_fugacity_dict,
        )?;

        let starting_pdb_0 = required(raw.starting_pdb_box_0_file, "starting_pdb_box_0_file")?;
        let starting_psf_0 = required(raw.starting_psf_box_0_file, "starting_psf_box_0_file")?;
        let (starting_pdb_1, starting_psf_1) = if ensemble.uses_second_box() {
            (
                Some(required(raw.starting_pdb_box_1_file, "starting_pdb_box_1_file")?),
                Some(required(raw.starting_psf_box_1_file, "starting_psf_box_1_file")?),
            )
        } else {
            (raw.starting_pdb_box_1_file, raw.starting_psf_box_1_file)
        };

        if ensemble == Ensemble::Gemc && !only_box_0_for_namd && box_1_cores == 0 {
            return Err(invalid(
                "no_core_box_1",
                "no_core_box_1 must be > 0 when GEMC runs NAMD on both boxes",
            ));
        }

        // Derivation.
        let boxes = [
            BoxSettings {
                cores: box_0_cores,
                dims: dims_0,
                angles: angles_0,
                starting_pdb: Some(PathBuf::from(starting_pdb_0)),
                starting_psf: Some(PathBuf::from(starting_psf_0)),
            },
            BoxSettings {
                cores: box_1_cores,
                dims: dims_1,
                angles: angles_1,
                starting_pdb: starting_pdb_1.map(PathBuf::from),
                starting_psf: starting_psf_1.map(PathBuf::from),
            },
        ];
        let namd = NamdSettings {
            run_steps: namd_run_steps,
            minimize_mult_scalar,
            ff_files: namd_ff_files,
            bin_directory: PathBuf::from(namd_bin),
            template: raw
                .path_namd_template
                .map(PathBuf::from)
                .unwrap_or_else(|| default_template("NAMD", ensemble)),
            runs_dir: PathBuf::from(raw.path_namd_runs.as_deref().unwrap_or(DEFAULT_NAMD_RUNS_DIR)),
            fft_padding,
            order,
        };
        let gomc = GomcSettings {
            run_steps: gomc_run_steps,
            device,
            ff_files: gomc_ff_files,
            bin_directory: PathBuf::from(gomc_bin),
            template: raw
                .path_gomc_template
                .map(PathBuf::from)
                .unwrap_or_else(|| default_template("GOMC", ensemble)),
            runs_dir: PathBuf::from(raw.path_gomc_runs.as_deref().unwrap_or(DEFAULT_GOMC_RUNS_DIR)),
        };
        let derived = DerivedParameters::derive(ensemble, only_box_0_for_namd, &boxes, &namd, &gomc)?;

        Ok(Self {
            base_dir: base_dir.into(),
            total_cycles,
            start_cycle,
            ensemble,
            only_box_0_for_namd,
            temperature_k,
            pressure_bar,
            chemical_potential,
            boxes,
            namd,
            gomc,
            log_dir: PathBuf::from(raw.log_dir.as_deref().unwrap_or(DEFAULT_LOG_DIR)),
            cycle_id_width,
            derived,
        })
    }

    fn validate_chemical_potential(
        ensemble: Ensemble,
        kind: Option<String>,
        values: Option<BTreeMap<String, f64>>,
    ) -> Result<Option<ChemicalPotential>, ConfigError> {
        let kind = kind.as_deref().map(parse_chem_pot_kind).transpose()?;
        if ensemble != Ensemble::Gcmc {
            return Ok(kind.zip(values).map(|(kind, values)| ChemicalPotential { kind, values }));
        }

        let kind = required(kind, "GCMC_ChemPot_or_Fugacity")?;
        let values = required(values, "GCMC_ChemPot_or_Fugacity_dict")?;
        if values.is_empty() {
            return Err(invalid(
                "GCMC_ChemPot_or_Fugacity_dict",
                "must name at least one residue for GCMC",
            ));
        }
        if let Some((residue, value)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(
                "GCMC_ChemPot_or_Fugacity_dict",
                format!("value for '{residue}' must be a finite number, got {value}"),
            ));
        }
        if kind == ChemPotKind::Fugacity {
            if let Some((residue, value)) = values.iter().find(|(_, v)| **v < 0.0) {
                return Err(invalid(
                    "GCMC_ChemPot_or_Fugacity_dict",
                    format!("fugacity for '{residue}' must be >= 0, got {value}"),
                ));
            }
        }
        Ok(Some(ChemicalPotential { kind, values }))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolves a configured path against the base directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        resolve_under(&self.base_dir, path)
    }

    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    pub fn start_cycle(&self) -> u64 {
        self.start_cycle
    }

    pub fn ensemble(&self) -> Ensemble {
        self.ensemble
    }

    pub fn only_box_0_for_namd(&self) -> bool {
        self.only_box_0_for_namd
    }

    pub fn temperature_k(&self) -> f64 {
        self.temperature_k
    }

    pub fn pressure_bar(&self) -> f64 {
        self.pressure_bar
    }

    pub fn chemical_potential(&self) -> Option<&ChemicalPotential> {
        self.chemical_potential.as_ref()
    }

    pub fn box_settings(&self, box_id: BoxId) -> &BoxSettings {
        &self.boxes[box_id.index()]
    }

    pub fn namd(&self) -> &NamdSettings {
        &self.namd
    }

    pub fn gomc(&self) -> &GomcSettings {
        &self.gomc
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn cycle_id_width(&self) -> usize {
        self.cycle_id_width
    }

    pub fn derived(&self) -> &DerivedParameters {
        &self.derived
    }

    /// Boxes whose MD input is written every cycle.
    pub fn namd_boxes(&self) -> Vec<BoxId> {
        if self.derived.two_box_namd {
            vec![BoxId::Primary, BoxId::Secondary]
        } else {
            vec![BoxId::Primary]
        }
    }

    /// The user-settable fields, in the form the input file uses.
    pub fn to_raw(&self) -> RawConfig {
        let path_str = |p: &Path| p.to_string_lossy().to_string();
        let files = |list: &[PathBuf]| -> Option<Vec<String>> {
            Some(list.iter().map(|p| path_str(p)).collect())
        };
        let [box_0, box_1] = &self.boxes;
        RawConfig {
            total_cycles_namd_gomc_sims: Some(self.total_cycles as i64),
            starting_at_cycle_namd_gomc_sims: Some(self.start_cycle as i64),
            gomc_use_cpu_or_gpu: Some(self.gomc.device.as_str().to_string()),
            simulation_type: Some(self.ensemble.as_str().to_string()),
            only_use_box_0_for_namd_for_gemc: Some(self.only_box_0_for_namd),
            no_core_box_0: Some(box_0.cores as i64),
            no_core_box_1: Some(box_1.cores as i64),
            simulation_temp_k: Some(self.temperature_k),
            simulation_pressure_bar: Some(self.pressure_bar),
            gcmc_chempot_or_fugacity: self
                .chemical_potential
                .as_ref()
                .map(|c| c.kind.as_str().to_string()),
            gcmc_chempot_or_fugacity_dict: self.chemical_potential.as_ref().map(|c| c.values.clone()),
            namd_minimize_mult_scalar: Some(self.namd.minimize_mult_scalar as i64),
            namd_run_steps: Some(self.namd.run_steps as i64),
            gomc_run_steps: Some(self.gomc.run_steps as i64),
            set_dims_box_0_list: Some(box_0.dims.to_vec()),
            set_dims_box_1_list: Some(box_1.dims.to_vec()),
            set_angle_box_0_list: Some(box_0.angles.to_vec()),
            set_angle_box_1_list: Some(box_1.angles.to_vec()),
            starting_ff_file_list_gomc: files(&self.gomc.ff_files),
            starting_ff_file_list_namd: files(&self.namd.ff_files),
            starting_pdb_box_0_file: box_0.starting_pdb.as_deref().map(path_str),
            starting_psf_box_0_file: box_0.starting_psf.as_deref().map(path_str),
            starting_pdb_box_1_file: box_1.starting_pdb.as_deref().map(path_str),
            starting_psf_box_1_file: box_1.starting_psf.as_deref().map(path_str),
            namd2_bin_directory: Some(path_str(&self.namd.bin_directory)),
            gomc_bin_directory: Some(path_str(&self.gomc.bin_directory)),
            path_namd_template: Some(path_str(&self.namd.template)),
            path_gomc_template: Some(path_str(&self.gomc.template)),
            path_namd_runs: Some(path_str(&self.namd.runs_dir)),
            path_gomc_runs: Some(path_str(&self.gomc.runs_dir)),
            log_dir: Some(path_str(&self.log_dir)),
            fft_add_namd_ang_to_box_dim: Some(i64::from(self.namd.fft_padding)),
            namd_simulation_order: Some(self.namd.order.as_str().to_string()),
            cycle_id_width: Some(self.cycle_id_width as i64),
        }
    }

    /// Writes the user-settable fields as pretty-printed JSON.
    pub fn save_json(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(&self.to_raw())
            .map_err(|e| ConfigError::Syntax(e.to_string()))?;
        fs::write(path, text).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            message: e.to_string(),
        })
    }
}
