use crate::cli::CheckArgs;
use crate::config;
use crate::error::Result;
use mcmd::engine::config::SimulationConfig;
use mcmd::engine::layout::BoxId;
use mcmd::workflows::cycle::core_allocation_warnings;
use tracing::{info, warn};

fn summary_lines(config: &SimulationConfig) -> Vec<String> {
    let derived = config.derived();
    let mut lines = vec![
        format!(
            "Ensemble: {} at {} K, {} bar",
            config.ensemble(),
            config.temperature_k(),
            config.pressure_bar()
        ),
        format!(
            "Cycles: {}..{}",
            config.start_cycle(),
            config.total_cycles()
        ),
        format!(
            "NAMD: {} steps/cycle, {} minimization steps, restart/DCD/XST every {}, energies every {}",
            config.namd().run_steps,
            derived.namd_minimize_steps,
            derived.namd_rst_dcd_xst_steps,
            derived.namd_console_blkavg_e_and_p_steps
        ),
        format!(
            "GOMC: {} ({} steps/cycle), restart/coordinates every {}, block averages every {}, histogram samples every {}",
            derived.gomc_binary,
            config.gomc().run_steps,
            derived.gomc_rst_coor_ckpoint_steps,
            derived.gomc_console_blkavg_hist_steps,
            derived.gomc_hist_sample_steps
        ),
        format!(
            "NAMD boxes: {} ({})",
            config
                .namd_boxes()
                .iter()
                .map(BoxId::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            config.namd().order
        ),
        format!(
            "Templates: NAMD {}, GOMC {}",
            config.resolve(&config.namd().template).display(),
            config.resolve(&config.gomc().template).display()
        ),
        format!(
            "Cores: box 0 = {}, box 1 = {}, total = {}",
            config.box_settings(BoxId::Primary).cores,
            derived.effective_box_1_cores,
            derived.total_cores
        ),
    ];
    if let Some(potential) = config.chemical_potential() {
        let values = potential
            .values
            .iter()
            .map(|(residue, value)| format!("{residue}={value}"))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("{}: {values}", potential.kind.as_str()));
    }
    lines
}

pub fn run(args: CheckArgs) -> Result<()> {
    let config = config::load(&args.config, &args.set_values)?;
    info!("Configuration {:?} is valid.", &args.config);

    println!("✓ {} is valid.", args.config.display());
    for line in summary_lines(&config) {
        println!("  {line}");
    }
    for warning in core_allocation_warnings(&config) {
        warn!("{warning}");
        println!("  Warning: {warning}");
    }

    if let Some(path) = &args.save {
        config.save_json(path)?;
        info!("Validated configuration written to {:?}", path);
        println!("Validated configuration written to: {}", path.display());
    }
    Ok(())
}
