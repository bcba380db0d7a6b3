use super::layout::BoxId;
use crate::core::cell::Axis;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    Namd,
    Gomc,
}

impl EngineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EngineKind::Namd => "NAMD",
            EngineKind::Gomc => "GOMC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    RunStart { first_cycle: u64, total_cycles: u64 },
    CycleStart { cycle: u64 },
    DimensionOverride {
        box_id: BoxId,
        axis: Axis,
        read: f64,
        set: f64,
    },
    ConfWritten { cycle: u64, box_id: BoxId, path: PathBuf },
    EngineStart { engine: EngineKind, run_id: u64 },
    EngineFinish { engine: EngineKind, run_id: u64 },
    CycleFinish { cycle: u64 },
    RunFinish,

    Message(String),
}

pub type EventCallback<'a> = Box<dyn Fn(RunEvent) + Send + Sync + 'a>;

/// Forwards run events to an optional observer; without one every report is a no-op.
#[derive(Default)]
pub struct EventReporter<'a> {
    callback: Option<EventCallback<'a>>,
}

impl<'a> EventReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: EventCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: RunEvent) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
