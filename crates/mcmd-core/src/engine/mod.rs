//! # Engine Module
//!
//! The stateful layer between the stateless [`crate::core`] building blocks and the
//! cycle workflow. It knows the validated configuration, where each run lives on
//! disk and how one MD input file is produced.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Input file loading, validation and derived parameters
//! - **Run Layout** ([`layout`]) - Run ids, working directories and fresh/restart input selection
//! - **Input Synthesis** ([`writer`]) - Composes geometry, grid sizing and templating into `in.conf`
//! - **Run Artifacts** ([`artifacts`]) - Cleanup of files the MD engine leaves behind
//! - **Engine Hand-off** ([`runner`]) - The seam through which prepared runs reach the engines
//! - **Progress Monitoring** ([`progress`]) - Observer for run events
//! - **Error Handling** ([`error`]) - Engine-level error type folding in every layer's errors

pub mod artifacts;
pub mod config;
pub mod error;
pub mod layout;
pub mod progress;
pub mod runner;
pub mod writer;
