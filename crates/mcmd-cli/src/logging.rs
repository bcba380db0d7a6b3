use crate::error::{CliError, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, time::Uptime},
    prelude::*,
};

/// File name used when `--log-file` points at a directory.
pub const LOG_FILE_NAME: &str = "mcmd.log";

fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Opens the log file for appending, so a resumed run continues the same log.
///
/// A directory target (such as a run's `log_dir`) gets [`LOG_FILE_NAME`]; missing
/// parent directories are created.
fn open_log_file(target: &Path) -> Result<(PathBuf, File)> {
    let path = if target.is_dir() {
        target.join(LOG_FILE_NAME)
    } else {
        target.to_path_buf()
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(CliError::Io)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(CliError::Io)?;
    Ok((path, file))
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact();

    let subscriber = tracing_subscriber::registry()
        .with(level_filter(verbosity, quiet))
        .with(stderr_layer);

    match log_file {
        Some(target) => {
            let (path, file) = open_log_file(&target)?;
            // Both MD boxes may log at once from rayon workers.
            let file_layer = fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_timer(Uptime::default())
                .with_thread_names(true)
                .with_target(false);
            subscriber.with(file_layer).init();
            tracing::debug!("Appending log output to {}", path.display());
        }
        None => subscriber.init(),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::Once;
    use tracing::{debug, error, info, trace, warn};

    static INIT: Once = Once::new();

    fn ensure_global_logger_is_set() {
        INIT.call_once(|| {
            setup_logging(3, false, None).expect("Failed to set up global logger for tests");
        });
    }

    #[test]
    fn quiet_keeps_errors_and_verbosity_raises_the_level() {
        assert_eq!(level_filter(3, true), LevelFilter::ERROR);
        assert_eq!(level_filter(0, false), LevelFilter::WARN);
        assert_eq!(level_filter(1, false), LevelFilter::INFO);
        assert_eq!(level_filter(2, false), LevelFilter::DEBUG);
        assert_eq!(level_filter(7, false), LevelFilter::TRACE);
    }

    #[test]
    #[serial]
    fn initialization_and_macros_work() {
        ensure_global_logger_is_set();

        error!("This is an error");
        warn!("This is a warning");
        info!(cycle = 3, "This is info");
        debug!("This is debug");
        trace!("This is trace");
    }

    #[test]
    #[serial]
    fn file_layer_records_span_fields_and_thread_names() {
        let temp_dir = tempfile::tempdir().unwrap();
        let (log_path, file) = open_log_file(temp_dir.path()).unwrap();
        assert_eq!(log_path, temp_dir.path().join(LOG_FILE_NAME));

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_names(true);
        let subscriber = tracing_subscriber::registry().with(file_layer);

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("write_namd_conf", cycle = 4);
            let _guard = span.enter();
            debug!("NAMD simulation data for simulation number 8 in box 0 is completed");
        });

        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("simulation number 8 in box 0 is completed"));
        assert!(content.contains("DEBUG"));
        assert!(content.contains("cycle=4"));
    }

    #[test]
    fn log_file_is_appended_and_parents_are_created() {
        let temp_dir = tempfile::tempdir().unwrap();
        let target = temp_dir.path().join("logs/run_a/mcmd.log");
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(&target, "cycle 0 done\n").unwrap();

        let (path, mut file) = open_log_file(&target).unwrap();
        std::io::Write::write_all(&mut file, b"cycle 1 done\n").unwrap();
        drop(file);
        assert_eq!(path, target);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "cycle 0 done\ncycle 1 done\n"
        );

        let nested = temp_dir.path().join("fresh/logs/mcmd.log");
        let (path, _) = open_log_file(&nested).unwrap();
        assert!(path.is_file());
    }

    #[test]
    #[serial]
    fn unusable_log_path_propagates_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let blocker = temp_dir.path().join("not_a_dir");
        std::fs::write(&blocker, "").unwrap();

        let result = setup_logging(0, false, Some(blocker.join("logs/mcmd.log")));
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
