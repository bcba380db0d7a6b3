use indicatif::{ProgressBar, ProgressStyle};
use mcmd::engine::progress::{EventCallback, RunEvent};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::spinner_style())
            .with_message("Initializing...");
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.disable_steady_tick();
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> EventCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |event: RunEvent| {
            let Ok(mut pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match event {
                RunEvent::RunStart {
                    first_cycle,
                    total_cycles,
                } => {
                    pb_guard.reset();
                    pb_guard.set_style(Self::spinner_style());
                    pb_guard.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb_guard.set_message(format!("Cycles {first_cycle}..{total_cycles}"));
                }
                RunEvent::CycleStart { cycle } => {
                    if pb_guard.is_finished() {
                        pb_guard.reset();
                        pb_guard.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    }
                    pb_guard.set_message(format!("Cycle {cycle}"));
                }
                RunEvent::DimensionOverride {
                    box_id,
                    axis,
                    read,
                    set,
                } => {
                    pb_guard.println(format!(
                        "  Box {box_id}: {axis}-dimension {read} from the structure file replaced by {set}"
                    ));
                }
                RunEvent::ConfWritten { box_id, path, .. } => {
                    pb_guard.println(format!("  Box {box_id}: wrote {}", path.display()));
                }
                RunEvent::EngineStart { engine, run_id } => {
                    pb_guard.set_message(format!("{} run {run_id}", engine.as_str()));
                }
                RunEvent::EngineFinish { .. } => {}
                RunEvent::CycleFinish { cycle } => {
                    pb_guard.set_message(format!("Cycle {cycle} done"));
                }
                RunEvent::RunFinish => {
                    pb_guard.disable_steady_tick();
                    pb_guard.finish_with_message("✓ Done");
                }
                RunEvent::Message(msg) => {
                    if !pb_guard.is_finished() {
                        pb_guard.println(format!("  {msg}"));
                    } else {
                        pb_guard.set_message(msg);
                    }
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcmd::engine::layout::BoxId;
    use mcmd::engine::progress::EngineKind;
    use std::path::PathBuf;
    use std::thread;

    #[test]
    fn handler_initializes_in_a_clean_state() {
        let handler = CliProgressHandler::new();
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.length(), Some(0));
        assert!(pb.is_finished());
    }

    #[test]
    fn callback_follows_the_run() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        callback(RunEvent::RunStart {
            first_cycle: 0,
            total_cycles: 2,
        });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.message(), "Cycles 0..2");
            assert!(!pb.is_finished());
        }

        callback(RunEvent::CycleStart { cycle: 1 });
        assert_eq!(handler.pb.lock().unwrap().message(), "Cycle 1");

        callback(RunEvent::ConfWritten {
            cycle: 1,
            box_id: BoxId::Primary,
            path: PathBuf::from("NAMD/0000000002_a/in.conf"),
        });
        callback(RunEvent::EngineStart {
            engine: EngineKind::Gomc,
            run_id: 3,
        });
        assert_eq!(handler.pb.lock().unwrap().message(), "GOMC run 3");

        callback(RunEvent::RunFinish);
        {
            let pb = handler.pb.lock().unwrap();
            assert!(pb.is_finished());
            assert_eq!(pb.message(), "✓ Done");
        }
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(RunEvent::CycleStart { cycle: 0 });
            callback(RunEvent::Message("hello".to_string()));
            callback(RunEvent::RunFinish);
        })
        .join()
        .unwrap();

        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "✓ Done");
    }
}
