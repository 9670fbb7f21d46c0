//! Command Line Interface (CLI) layer for SATSCENE.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for single-scene and animation
//! flows. It wires user-provided options to the underlying library
//! functionality exposed via `satscene::api`.
//!
//! If you are embedding SATSCENE into another application, prefer using
//! the high-level `satscene::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
