use super::error::EngineError;
use super::layout::BoxId;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// File name of the NAMD executable inside its binary directory.
pub const NAMD_EXECUTABLE: &str = "namd2";

/// One MD run of one box.
#[derive(Debug, Clone, PartialEq)]
pub struct NamdJob {
    pub cycle: u64,
    pub run_id: u64,
    pub box_id: BoxId,
    pub executable: PathBuf,
    pub working_dir: PathBuf,
    pub conf_path: PathBuf,
    pub cores: u32,
}

/// The MC run that closes a cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct GomcJob {
    pub cycle: u64,
    pub run_id: u64,
    pub executable: PathBuf,
    pub working_dir: PathBuf,
    pub cores: u32,
}

/// Hands prepared runs to the external engines.
///
/// Implementations must be `Sync`: the MD runs of two boxes may be started from two
/// threads at once.
pub trait EngineRunner: Sync {
    fn run_namd(&self, job: &NamdJob) -> Result<(), EngineError>;
    fn run_gomc(&self, job: &GomcJob) -> Result<(), EngineError>;
}

/// Records the jobs it is given without launching anything.
#[derive(Debug, Default)]
pub struct DryRunner {
    namd_jobs: Mutex<Vec<NamdJob>>,
    gomc_jobs: Mutex<Vec<GomcJob>>,
}

impl DryRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namd_jobs(&self) -> Vec<NamdJob> {
        self.namd_jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn gomc_jobs(&self) -> Vec<GomcJob> {
        self.gomc_jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EngineRunner for DryRunner {
    fn run_namd(&self, job: &NamdJob) -> Result<(), EngineError> {
        info!(
            "[dry run] {} +p{} {}",
            job.executable.display(),
            job.cores,
            job.conf_path.display()
        );
        self.namd_jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(job.clone());
        Ok(())
    }

    fn run_gomc(&self, job: &GomcJob) -> Result<(), EngineError> {
        info!(
            "[dry run] {} +p{} in {}",
            job.executable.display(),
            job.cores,
            job.working_dir.display()
        );
        self.gomc_jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(job.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_runner_records_jobs() {
        let runner = DryRunner::new();
        let job = NamdJob {
            cycle: 0,
            run_id: 0,
            box_id: BoxId::Primary,
            executable: PathBuf::from("bin/namd2"),
            working_dir: PathBuf::from("NAMD/0000000000_a"),
            conf_path: PathBuf::from("NAMD/0000000000_a/in.conf"),
            cores: 4,
        };
        runner.run_namd(&job).unwrap();
        runner
            .run_gomc(&GomcJob {
                cycle: 0,
                run_id: 1,
                executable: PathBuf::from("bin/GOMC_CPU_NVT"),
                working_dir: PathBuf::from("GOMC/0000000001_gomc"),
                cores: 4,
            })
            .unwrap();

        assert_eq!(runner.namd_jobs(), vec![job]);
        assert_eq!(runner.gomc_jobs()[0].run_id, 1);
    }

    #[test]
    fn dry_runner_keeps_recording_after_a_panicking_caller() {
        let runner = DryRunner::new();
        let job = NamdJob {
            cycle: 1,
            run_id: 2,
            box_id: BoxId::Secondary,
            executable: PathBuf::from("bin/namd2"),
            working_dir: PathBuf::from("NAMD/0000000002_b"),
            conf_path: PathBuf::from("NAMD/0000000002_b/in.conf"),
            cores: 2,
        };
        std::thread::scope(|scope| {
            let poisoned = scope
                .spawn(|| {
                    let _guard = runner.namd_jobs.lock().unwrap();
                    panic!("worker died while holding the job list");
                })
                .join();
            assert!(poisoned.is_err());
        });
        assert!(runner.namd_jobs.is_poisoned());

        runner.run_namd(&job).unwrap();
        assert_eq!(runner.namd_jobs(), vec![job]);
    }
}
