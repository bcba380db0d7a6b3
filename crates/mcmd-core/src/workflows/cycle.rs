use crate::core::cell::grid::GridDims;
use crate::core::cell::{INITIAL_CYCLE, UnitCell};
use crate::core::io::namd_log::{self, DEFAULT_ENERGY_TITLES, NamdEnergyData};
use crate::core::io::pdb;
use crate::engine::artifacts::{PlanRemoval, remove_run0_fft_plan};
use crate::engine::config::{SimulationConfig, SimulationOrder};
use crate::engine::error::EngineError;
use crate::engine::layout::{BoxId, RunIds, RunLayout, restart_file_name};
use crate::engine::progress::{EngineKind, EventReporter, RunEvent};
use crate::engine::runner::{EngineRunner, GomcJob, NAMD_EXECUTABLE, NamdJob};
use crate::engine::writer::{ConfWriter, CycleContext};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Log file NAMD writes into its working directory.
pub const NAMD_OUTPUT_FILE: &str = "out.dat";

#[derive(Debug, Clone, PartialEq)]
pub struct BoxEnergy {
    pub box_id: BoxId,
    pub data: NamdEnergyData,
}

/// What happened during one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleRecord {
    pub cycle: u64,
    pub run_ids: RunIds,
    pub boxes: Vec<CycleContext>,
    pub energies: Vec<BoxEnergy>,
    /// Cells read from the MC restart output, i.e. the starting geometry of the next cycle.
    pub next_cells: Vec<(BoxId, UnitCell)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub cycles: Vec<CycleRecord>,
    pub total_cores: u32,
    pub total_namd_steps: u64,
    pub total_gomc_steps: u64,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Step totals saturate rather than wrap on absurdly long runs.
    pub fn new(config: &SimulationConfig, cycles: Vec<CycleRecord>, elapsed: Duration) -> Self {
        let completed = cycles.len() as u64;
        Self {
            total_cores: config.derived().total_cores,
            total_namd_steps: completed.saturating_mul(config.namd().run_steps),
            total_gomc_steps: completed.saturating_mul(config.gomc().run_steps),
            cycles,
            elapsed,
        }
    }
}

/// Core-allocation problems worth telling the user about before any engine starts.
pub fn core_allocation_warnings(config: &SimulationConfig) -> Vec<String> {
    let derived = config.derived();
    let box_1_cores = config.box_settings(BoxId::Secondary).cores;
    let mut warnings = Vec::new();
    if derived.two_box_namd && box_1_cores == 0 {
        warnings.push(
            "GEMC runs NAMD on both boxes, but no_core_box_1 is 0; box 1 has no cores".to_string(),
        );
    }
    if !derived.two_box_namd && box_1_cores > 0 {
        warnings.push(format!(
            "no_core_box_1 = {box_1_cores} is ignored because only box 0 runs in NAMD; \
             the run uses {} core(s)",
            derived.total_cores
        ));
    }
    warnings
}

/// Reads the PME grid NAMD chose for `box_id` in the first MD run.
pub fn recover_prior_grid(layout: &RunLayout, box_id: BoxId) -> Option<GridDims> {
    namd_log::extract_pme_grid(&layout.namd_box_dir(0, box_id).join(NAMD_OUTPUT_FILE))
}

fn root_has_content(root: &Path) -> bool {
    root.read_dir()
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Drives the alternating MD and MC runs over the configured cycle range.
pub struct CycleOrchestrator<'a, R: EngineRunner> {
    config: &'a SimulationConfig,
    runner: &'a R,
    reporter: &'a EventReporter<'a>,
    writer: ConfWriter<'a>,
}

impl<'a, R: EngineRunner> CycleOrchestrator<'a, R> {
    pub fn new(
        config: &'a SimulationConfig,
        runner: &'a R,
        reporter: &'a EventReporter<'a>,
    ) -> Self {
        Self {
            config,
            runner,
            reporter,
            writer: ConfWriter::new(config, reporter),
        }
    }

    fn layout(&self) -> &RunLayout {
        self.writer.layout()
    }

    #[instrument(skip_all, name = "cycle_workflow")]
    pub fn run(&self) -> Result<RunSummary, EngineError> {
        let started = Instant::now();
        let start = self.config.start_cycle();
        let total = self.config.total_cycles();
        self.reporter.report(RunEvent::RunStart {
            first_cycle: start,
            total_cycles: total,
        });
        info!("Starting coupled NAMD/GOMC simulation: cycles {start}..{total}");

        self.preflight()?;

        let mut grids: [Option<GridDims>; 2] = [None, None];
        if start > INITIAL_CYCLE {
            for box_id in self.config.namd_boxes() {
                grids[box_id.index()] = recover_prior_grid(self.layout(), box_id);
                debug!("Recovered PME grid for box {box_id}: {:?}", grids[box_id.index()]);
            }
        }

        let mut cycles = Vec::new();
        for cycle in start..total {
            cycles.push(self.run_cycle(cycle, &mut grids)?);
        }

        let completed = cycles.len();
        let summary = RunSummary::new(self.config, cycles, started.elapsed());
        self.reporter.report(RunEvent::RunFinish);
        info!(
            "All cycles completed: {completed} cycle(s) in {:.2?}",
            summary.elapsed
        );
        Ok(summary)
    }

    fn preflight(&self) -> Result<(), EngineError> {
        for warning in core_allocation_warnings(self.config) {
            warn!("{warning}");
            self.reporter.report(RunEvent::Message(warning));
        }
        info!(
            "Using {} core(s) in total; NAMD box order: {}",
            self.config.derived().total_cores,
            self.config.namd().order
        );

        for (engine, root) in [
            (EngineKind::Namd, self.layout().namd_root()),
            (EngineKind::Gomc, self.layout().gomc_root()),
        ] {
            if root_has_content(root) {
                let message = format!(
                    "[{}] Directory {} already exists. If startup/restart fails, try deleting it or its last subfolders.",
                    engine.as_str(),
                    root.display()
                );
                warn!("{message}");
                self.reporter.report(RunEvent::Message(message));
            }
            RunLayout::ensure_dir(root)?;
        }
        RunLayout::ensure_dir(&self.config.resolve(self.config.log_dir()))?;
        Ok(())
    }

    #[instrument(skip_all, fields(cycle = cycle))]
    fn run_cycle(
        &self,
        cycle: u64,
        grids: &mut [Option<GridDims>; 2],
    ) -> Result<CycleRecord, EngineError> {
        self.reporter.report(RunEvent::CycleStart { cycle });
        let run_ids = RunIds::for_cycle(cycle);
        debug!("Cycle {}/{}", cycle + 1, self.config.total_cycles());

        let mut boxes = Vec::new();
        for box_id in self.config.namd_boxes() {
            boxes.push(self.writer.write(cycle, box_id, grids[box_id.index()])?);
        }
        for context in &boxes {
            grids[context.box_id.index()] = Some(context.grid);
        }

        self.run_namd(&boxes)?;

        if cycle == INITIAL_CYCLE {
            for context in &boxes {
                if let Some(grid) = recover_prior_grid(self.layout(), context.box_id) {
                    debug!("NAMD chose PME grid {grid} for box {}", context.box_id);
                    grids[context.box_id.index()] = Some(grid);
                }
            }
        } else if cycle == INITIAL_CYCLE + 1 {
            self.remove_fft_plans(&boxes)?;
        }

        let energies = self.read_energies(&boxes)?;

        let gomc_dir = self.layout().gomc_dir(run_ids.mc);
        RunLayout::ensure_dir(&gomc_dir)?;
        let gomc_job = GomcJob {
            cycle,
            run_id: run_ids.mc,
            executable: self
                .config
                .resolve(&self.config.gomc().bin_directory)
                .join(&self.config.derived().gomc_binary),
            working_dir: gomc_dir,
            cores: self.config.derived().total_cores,
        };
        self.run_engine(EngineKind::Gomc, run_ids.mc, || self.runner.run_gomc(&gomc_job))?;

        let next_cells = self.read_restart_cells(cycle)?;
        self.reporter.report(RunEvent::CycleFinish { cycle });
        info!("Cycle {cycle} complete");

        Ok(CycleRecord {
            cycle,
            run_ids,
            boxes,
            energies,
            next_cells,
        })
    }

    fn namd_job(&self, context: &CycleContext) -> NamdJob {
        NamdJob {
            cycle: context.cycle,
            run_id: context.run_id,
            box_id: context.box_id,
            executable: self
                .config
                .resolve(&self.config.namd().bin_directory)
                .join(NAMD_EXECUTABLE),
            working_dir: context.working_dir.clone(),
            conf_path: context.conf_path.clone(),
            cores: self.config.box_settings(context.box_id).cores,
        }
    }

    fn run_engine(
        &self,
        engine: EngineKind,
        run_id: u64,
        run: impl FnOnce() -> Result<(), EngineError>,
    ) -> Result<(), EngineError> {
        self.reporter.report(RunEvent::EngineStart { engine, run_id });
        run()?;
        self.reporter.report(RunEvent::EngineFinish { engine, run_id });
        Ok(())
    }

    fn run_namd(&self, boxes: &[CycleContext]) -> Result<(), EngineError> {
        let jobs: Vec<NamdJob> = boxes.iter().map(|c| self.namd_job(c)).collect();
        let run_one = |job: &NamdJob| {
            self.run_engine(EngineKind::Namd, job.run_id, || self.runner.run_namd(job))
        };

        match (self.config.namd().order, jobs.as_slice()) {
            (SimulationOrder::Parallel, [first, second]) => {
                debug!("Running NAMD boxes 0 and 1 in parallel");
                let (a, b) = rayon::join(|| run_one(first), || run_one(second));
                a.and(b)
            }
            _ => jobs.iter().try_for_each(run_one),
        }
    }

    fn remove_fft_plans(&self, boxes: &[CycleContext]) -> Result<(), EngineError> {
        for context in boxes {
            match remove_run0_fft_plan(self.layout(), context.box_id)? {
                PlanRemoval::Removed(path) => info!(
                    "The NAMD FFT file was deleted from Run 0 in Box {}: {}",
                    context.box_id,
                    path.display()
                ),
                PlanRemoval::NotFound => info!(
                    "The NAMD FFT file was not found in Run 0 in Box {}",
                    context.box_id
                ),
            }
        }
        Ok(())
    }

    fn read_energies(&self, boxes: &[CycleContext]) -> Result<Vec<BoxEnergy>, EngineError> {
        let mut energies = Vec::new();
        for context in boxes {
            let path = context.working_dir.join(NAMD_OUTPUT_FILE);
            if !path.is_file() {
                debug!("No NAMD output at {}; skipping energies", path.display());
                continue;
            }
            let data = namd_log::read_energy_file(&path, &DEFAULT_ENERGY_TITLES)?;
            info!(
                "Box {} energies: POTENTIAL {} -> {}, VDW+ELECT {} -> {}",
                context.box_id,
                data.potential_first(),
                data.potential_last(),
                data.vdw_plus_elect_first(),
                data.vdw_plus_elect_last()
            );
            energies.push(BoxEnergy {
                box_id: context.box_id,
                data,
            });
        }
        Ok(energies)
    }

    fn read_restart_cells(&self, cycle: u64) -> Result<Vec<(BoxId, UnitCell)>, EngineError> {
        let boxes: &[BoxId] = if self.config.ensemble().uses_second_box() {
            &BoxId::ALL
        } else {
            &[BoxId::Primary]
        };
        let dir = self.layout().cycle_mc_dir(cycle);
        let mut cells = Vec::new();
        for &box_id in boxes {
            let path = dir.join(restart_file_name(box_id, "pdb"));
            if path.is_file() {
                cells.push((box_id, pdb::read_cell_from_path(&path)?));
            } else {
                debug!("No restart structure at {}", path.display());
            }
        }
        Ok(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::RawConfig;
    use crate::engine::config::tests::minimal_raw;
    use crate::engine::runner::DryRunner;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn warns_about_unused_secondary_cores() {
        let raw = RawConfig {
            no_core_box_1: Some(2),
            ..minimal_raw()
        };
        let config = SimulationConfig::from_raw(raw, ".").unwrap();
        let warnings = core_allocation_warnings(&config);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("no_core_box_1 = 2"));

        let config = SimulationConfig::from_raw(minimal_raw(), ".").unwrap();
        assert!(core_allocation_warnings(&config).is_empty());
    }

    #[test]
    fn single_cycle_run_writes_input_and_hands_off_both_engines() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("template.conf"), "cellBasisVector1 x_dim_box 0 0\n").unwrap();
        fs::write(
            dir.path().join("box0.pdb"),
            "CRYST1   25.000   25.000   25.000   90.00   90.00   90.00\n",
        )
        .unwrap();
        let raw = RawConfig {
            total_cycles_namd_gomc_sims: Some(1),
            path_namd_template: Some("template.conf".into()),
            ..minimal_raw()
        };
        let config = SimulationConfig::from_raw(raw, dir.path()).unwrap();
        let runner = DryRunner::new();
        let reporter = EventReporter::new();

        let summary = CycleOrchestrator::new(&config, &runner, &reporter)
            .run()
            .unwrap();

        assert_eq!(summary.cycles.len(), 1);
        assert_eq!(summary.total_namd_steps, 1000);
        assert_eq!(summary.total_gomc_steps, 6000);
        assert_eq!(summary.total_cores, 4);
        assert!(summary.cycles[0].energies.is_empty());
        assert!(summary.cycles[0].next_cells.is_empty());

        let namd_jobs = runner.namd_jobs();
        assert_eq!(namd_jobs.len(), 1);
        assert_eq!(namd_jobs[0].executable, dir.path().join("bin/namd/namd2"));
        let gomc_jobs = runner.gomc_jobs();
        assert_eq!(gomc_jobs[0].run_id, 1);
        assert_eq!(
            gomc_jobs[0].executable,
            dir.path().join("bin/gomc/GOMC_CPU_NVT")
        );
        assert!(dir.path().join("GOMC/0000000001_gomc").is_dir());
        assert!(dir.path().join("logs").is_dir());

        let text =
            fs::read_to_string(dir.path().join("NAMD/0000000000_a/in.conf")).unwrap();
        assert_eq!(text, "cellBasisVector1 25.0 0 0\n");
    }

    #[test]
    fn empty_cycle_range_does_nothing() {
        let dir = tempdir().unwrap();
        let raw = RawConfig {
            total_cycles_namd_gomc_sims: Some(0),
            ..minimal_raw()
        };
        let config = SimulationConfig::from_raw(raw, dir.path()).unwrap();
        let runner = DryRunner::new();
        let reporter = EventReporter::new();
        let summary = CycleOrchestrator::new(&config, &runner, &reporter)
            .run()
            .unwrap();
        assert!(summary.cycles.is_empty());
        assert!(runner.namd_jobs().is_empty());
    }

    #[test]
    fn step_totals_saturate_instead_of_overflowing() {
        let raw = RawConfig {
            namd_run_steps: Some(i64::MAX),
            namd_minimize_mult_scalar: Some(0),
            gomc_run_steps: Some(i64::MAX),
            ..minimal_raw()
        };
        let config = SimulationConfig::from_raw(raw, ".").unwrap();
        let record = CycleRecord {
            cycle: 0,
            run_ids: RunIds::for_cycle(0),
            boxes: Vec::new(),
            energies: Vec::new(),
            next_cells: Vec::new(),
        };
        let summary = RunSummary::new(
            &config,
            vec![record.clone(), record],
            Duration::from_secs(1),
        );
        assert_eq!(summary.total_namd_steps, u64::MAX);
        assert_eq!(summary.total_gomc_steps, u64::MAX);
    }

    #[test]
    fn preflight_warnings_reach_the_reporter() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("NAMD/old_run")).unwrap();
        let raw = RawConfig {
            total_cycles_namd_gomc_sims: Some(0),
            no_core_box_1: Some(2),
            ..minimal_raw()
        };
        let config = SimulationConfig::from_raw(raw, dir.path()).unwrap();
        let runner = DryRunner::new();
        let messages = std::sync::Mutex::new(Vec::new());
        let reporter = EventReporter::with_callback(Box::new(|event| {
            if let RunEvent::Message(text) = event {
                messages.lock().unwrap().push(text);
            }
        }));

        CycleOrchestrator::new(&config, &runner, &reporter)
            .run()
            .unwrap();
        drop(reporter);

        let messages = messages.into_inner().unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("no_core_box_1 = 2"));
        assert!(messages[1].starts_with("[NAMD] Directory"));
    }

    #[test]
    fn recovers_grid_from_first_namd_output() {
        let dir = tempdir().unwrap();
        let layout = RunLayout::new(dir.path().join("NAMD"), dir.path().join("GOMC"), 10);
        assert_eq!(recover_prior_grid(&layout, BoxId::Primary), None);

        let run0 = layout.namd_box_dir(0, BoxId::Primary);
        fs::create_dir_all(&run0).unwrap();
        fs::write(
            run0.join(NAMD_OUTPUT_FILE),
            "Info: PME GRID DIMENSIONS 30 30 36\n",
        )
        .unwrap();
        assert_eq!(
            recover_prior_grid(&layout, BoxId::Primary),
            Some(GridDims::new(30, 30, 36))
        );
    }
}
