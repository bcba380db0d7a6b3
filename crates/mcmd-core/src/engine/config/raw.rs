use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The user input file as written, before any validation.
///
/// Every key is optional here so that a missing key can be reported by name instead of
/// as a deserialization failure. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    pub total_cycles_namd_gomc_sims: Option<i64>,
    pub starting_at_cycle_namd_gomc_sims: Option<i64>,
    #[serde(rename = "gomc_use_CPU_or_GPU")]
    pub gomc_use_cpu_or_gpu: Option<String>,
    pub simulation_type: Option<String>,
    pub only_use_box_0_for_namd_for_gemc: Option<bool>,
    pub no_core_box_0: Option<i64>,
    pub no_core_box_1: Option<i64>,
    pub simulation_temp_k: Option<f64>,
    pub simulation_pressure_bar: Option<f64>,
    #[serde(rename = "GCMC_ChemPot_or_Fugacity")]
    pub gcmc_chempot_or_fugacity: Option<String>,
    #[serde(rename = "GCMC_ChemPot_or_Fugacity_dict")]
    pub gcmc_chempot_or_fugacity_dict: Option<BTreeMap<String, f64>>,
    pub namd_minimize_mult_scalar: Option<i64>,
    pub namd_run_steps: Option<i64>,
    pub gomc_run_steps: Option<i64>,
    pub set_dims_box_0_list: Option<Vec<Option<f64>>>,
    pub set_dims_box_1_list: Option<Vec<Option<f64>>>,
    pub set_angle_box_0_list: Option<Vec<Option<f64>>>,
    pub set_angle_box_1_list: Option<Vec<Option<f64>>>,
    pub starting_ff_file_list_gomc: Option<Vec<String>>,
    pub starting_ff_file_list_namd: Option<Vec<String>>,
    pub starting_pdb_box_0_file: Option<String>,
    pub starting_psf_box_0_file: Option<String>,
    pub starting_pdb_box_1_file: Option<String>,
    pub starting_psf_box_1_file: Option<String>,
    pub namd2_bin_directory: Option<String>,
    pub gomc_bin_directory: Option<String>,
    pub path_namd_template: Option<String>,
    pub path_gomc_template: Option<String>,
    pub path_namd_runs: Option<String>,
    pub path_gomc_runs: Option<String>,
    pub log_dir: Option<String>,
    pub fft_add_namd_ang_to_box_dim: Option<i64>,
    pub namd_simulation_order: Option<String>,
    pub cycle_id_width: Option<i64>,
}
