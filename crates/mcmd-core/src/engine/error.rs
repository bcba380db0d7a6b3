use thiserror::Error;

use super::config::ConfigError;
use super::layout::LayoutError;
use super::progress::EngineKind;
use crate::core::cell::GeometryError;
use crate::core::io::namd_log::NamdOutputError;
use crate::core::io::pdb::PdbError;
use crate::core::template::TemplateError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Box geometry error: {source}")]
    Geometry {
        #[from]
        source: GeometryError,
    },

    #[error("Template error: {source}")]
    Template {
        #[from]
        source: TemplateError,
    },

    #[error("Run layout error: {source}")]
    Layout {
        #[from]
        source: LayoutError,
    },

    #[error("Structure file error: {source}")]
    Structure {
        #[from]
        source: PdbError,
    },

    #[error("NAMD output error: {source}")]
    NamdOutput {
        #[from]
        source: NamdOutputError,
    },

    #[error("Failed to write '{path}': {message}")]
    Write { path: String, message: String },

    #[error("{} run {run_id} failed: {message}", .engine.as_str())]
    EngineRun {
        engine: EngineKind,
        run_id: u64,
        message: String,
    },
}
