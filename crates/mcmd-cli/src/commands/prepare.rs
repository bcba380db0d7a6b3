use crate::cli::PrepareArgs;
use crate::config;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use mcmd::core::cell::INITIAL_CYCLE;
use mcmd::engine::config::SimulationConfig;
use mcmd::engine::progress::{EventReporter, RunEvent};
use mcmd::engine::writer::{ConfWriter, CycleContext};
use mcmd::workflows::cycle::recover_prior_grid;
use tracing::{info, warn};

/// Writes the MD input of every active box for `cycle`.
///
/// Restart cycles take their PME grid from the first MD run's output log.
fn write_cycle(
    config: &SimulationConfig,
    cycle: u64,
    reporter: &EventReporter,
) -> Result<Vec<CycleContext>> {
    let writer = ConfWriter::new(config, reporter);
    reporter.report(RunEvent::CycleStart { cycle });

    let mut written = Vec::new();
    for box_id in config.namd_boxes() {
        let prior_grid = if cycle == INITIAL_CYCLE {
            None
        } else {
            let grid = recover_prior_grid(writer.layout(), box_id);
            if grid.is_none() {
                warn!("No PME grid found in the first NAMD output of box {box_id}.");
            }
            grid
        };
        written.push(writer.write(cycle, box_id, prior_grid)?);
    }

    reporter.report(RunEvent::CycleFinish { cycle });
    Ok(written)
}

pub fn run(args: PrepareArgs) -> Result<()> {
    let config = config::load(&args.config, &args.set_values)?;
    let cycle = args.cycle.unwrap_or(config.start_cycle());
    if cycle >= config.total_cycles() {
        return Err(CliError::Argument(format!(
            "cycle {cycle} is outside the configured range {}..{}",
            config.start_cycle(),
            config.total_cycles()
        )));
    }

    let progress_handler = CliProgressHandler::new();
    let reporter = EventReporter::with_callback(progress_handler.get_callback());

    println!("Preparing NAMD input for cycle {cycle}...");
    info!("Writing NAMD input files for cycle {cycle}");
    reporter.report(RunEvent::RunStart {
        first_cycle: cycle,
        total_cycles: cycle + 1,
    });
    let written = write_cycle(&config, cycle, &reporter)?;
    reporter.report(RunEvent::RunFinish);

    for context in &written {
        println!(
            "✓ Box {} (run {}, {}): {} [PME grid {}]",
            context.box_id,
            context.run_id,
            if context.restart { "restart" } else { "fresh" },
            context.conf_path.display(),
            context.grid
        );
    }
    Ok(())
}
