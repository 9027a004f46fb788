//! Support library for the `asmi` command-line runner.

/// Plain and literate (Markdown) source ingestion.
pub mod literate;

/// Human-readable trace output.
pub mod trace;

#[cfg(test)]
use tempfile as _;
