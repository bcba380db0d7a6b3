use crate::error::{CliError, Result};
use mcmd::engine::config::{self as core_config, RawConfig, SimulationConfig};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Override(format!("Invalid {kind} value for {key}: {value}")))
}

/// Applies `KEY=VALUE` overrides on top of a raw input file.
pub fn apply_set_values(raw: &mut RawConfig, set_values: &[String]) -> Result<()> {
    for kv_pair in set_values {
        let Some((key, value)) = kv_pair.split_once('=') else {
            return Err(CliError::Override(format!(
                "Invalid --set format: '{kv_pair}'. Expected KEY=VALUE."
            )));
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "total_cycles_namd_gomc_sims" => {
                raw.total_cycles_namd_gomc_sims = Some(parse_value(key, value, "integer")?)
            }
            "starting_at_cycle_namd_gomc_sims" => {
                raw.starting_at_cycle_namd_gomc_sims = Some(parse_value(key, value, "integer")?)
            }
            "namd_run_steps" => raw.namd_run_steps = Some(parse_value(key, value, "integer")?),
            "gomc_run_steps" => raw.gomc_run_steps = Some(parse_value(key, value, "integer")?),
            "namd_minimize_mult_scalar" => {
                raw.namd_minimize_mult_scalar = Some(parse_value(key, value, "integer")?)
            }
            "no_core_box_0" => raw.no_core_box_0 = Some(parse_value(key, value, "integer")?),
            "no_core_box_1" => raw.no_core_box_1 = Some(parse_value(key, value, "integer")?),
            "simulation_temp_k" => {
                raw.simulation_temp_k = Some(parse_value(key, value, "float")?)
            }
            "simulation_pressure_bar" => {
                raw.simulation_pressure_bar = Some(parse_value(key, value, "float")?)
            }
            "fft_add_namd_ang_to_box_dim" => {
                raw.fft_add_namd_ang_to_box_dim = Some(parse_value(key, value, "integer")?)
            }
            "only_use_box_0_for_namd_for_gemc" => {
                raw.only_use_box_0_for_namd_for_gemc = Some(parse_value(key, value, "boolean")?)
            }
            "gomc_use_CPU_or_GPU" => raw.gomc_use_cpu_or_gpu = Some(value.to_string()),
            "namd_simulation_order" => raw.namd_simulation_order = Some(value.to_string()),
            _ => {
                return Err(CliError::Override(format!(
                    "Unsupported configuration key for --set: '{key}'"
                )));
            }
        }
        debug!("Override applied: {key} = {value}");
    }
    Ok(())
}

/// Loads an input file, applies overrides and validates the result.
pub fn load(path: &Path, set_values: &[String]) -> Result<SimulationConfig> {
    debug!("Loading simulation input from {:?}", path);
    let mut raw = core_config::load_raw(path)?;
    apply_set_values(&mut raw, set_values)?;
    Ok(SimulationConfig::from_raw(raw, core_config::base_dir_of(path))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcmd::engine::config::{ConfigError, SimulationOrder};
    use std::fs;
    use tempfile::tempdir;

    const INPUT: &str = r#"{
        "total_cycles_namd_gomc_sims": 4,
        "starting_at_cycle_namd_gomc_sims": 0,
        "gomc_use_CPU_or_GPU": "CPU",
        "simulation_type": "NVT",
        "only_use_box_0_for_namd_for_gemc": true,
        "no_core_box_0": 4,
        "no_core_box_1": 0,
        "simulation_temp_k": 300.0,
        "simulation_pressure_bar": 1.0,
        "namd_minimize_mult_scalar": 1,
        "namd_run_steps": 1000,
        "gomc_run_steps": 1000,
        "set_dims_box_0_list": [30.0, 30.0, 30.0],
        "set_angle_box_0_list": [90, 90, 90],
        "starting_ff_file_list_gomc": ["ff/par.inp"],
        "starting_ff_file_list_namd": ["ff/par.inp"],
        "starting_pdb_box_0_file": "box0.pdb",
        "starting_psf_box_0_file": "box0.psf",
        "namd2_bin_directory": "bin",
        "gomc_bin_directory": "bin"
    }"#;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut raw = RawConfig::default();
        apply_set_values(
            &mut raw,
            &strings(&[
                "namd_run_steps=5000",
                "simulation_temp_k = 310.5",
                "namd_simulation_order=parallel",
                "only_use_box_0_for_namd_for_gemc=false",
            ]),
        )
        .unwrap();
        assert_eq!(raw.namd_run_steps, Some(5000));
        assert_eq!(raw.simulation_temp_k, Some(310.5));
        assert_eq!(raw.namd_simulation_order.as_deref(), Some("parallel"));
        assert_eq!(raw.only_use_box_0_for_namd_for_gemc, Some(false));
    }

    #[test]
    fn malformed_override_is_rejected() {
        let mut raw = RawConfig::default();
        let err = apply_set_values(&mut raw, &strings(&["namd_run_steps"])).unwrap_err();
        assert!(err.to_string().contains("Expected KEY=VALUE"));

        let err = apply_set_values(&mut raw, &strings(&["no_core_box_0=four"])).unwrap_err();
        assert!(err.to_string().contains("Invalid integer value for no_core_box_0"));

        let err = apply_set_values(&mut raw, &strings(&["simulation_type=NPT"])).unwrap_err();
        assert!(err.to_string().contains("Unsupported configuration key"));
    }

    #[test]
    fn load_validates_after_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("input.json");
        fs::write(&path, INPUT).unwrap();

        let config = load(&path, &strings(&["namd_simulation_order=parallel"])).unwrap();
        assert_eq!(config.total_cycles(), 4);
        assert_eq!(config.namd().order, SimulationOrder::Parallel);
        assert_eq!(config.base_dir(), dir.path());

        let err = load(&path, &strings(&["no_core_box_0=0"])).unwrap_err();
        assert!(matches!(
            err,
            CliError::Config(ConfigError::Value {
                field: "no_core_box_0",
                ..
            })
        ));
    }
}
