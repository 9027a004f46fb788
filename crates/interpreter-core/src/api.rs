//! Host-facing configuration, step outcomes and trace hooks.

use crate::ErrorKind;

/// Instruction ceiling applied by the `asmi` CLI unless overridden.
pub const DEFAULT_CLI_STEP_LIMIT: u64 = 10_000_000;

/// How arithmetic results outside the `i64` range are handled.
///
/// The policy applies uniformly to `inc`, `dec`, `add`, `sub`, `mul` and to
/// the single overflowing division `i64::MIN / -1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum OverflowPolicy {
    /// Fail the run with an overflow error.
    #[default]
    Checked,
    /// Two's complement wraparound.
    Wrapping,
    /// Clamp to `i64::MIN` / `i64::MAX`.
    Saturating,
}

impl OverflowPolicy {
    /// Parses the CLI spelling of a policy.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "checked" => Some(Self::Checked),
            "wrapping" => Some(Self::Wrapping),
            "saturating" => Some(Self::Saturating),
            _ => None,
        }
    }
}

/// Immutable configuration for one interpretation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct InterpreterConfig {
    /// Arithmetic overflow handling.
    pub overflow: OverflowPolicy,
    /// Maximum executed lines before failing; `None` runs until `end`.
    pub step_limit: Option<u64>,
    /// Enables trace event dispatch to the supplied [`TraceSink`].
    pub tracing_enabled: bool,
}

impl InterpreterConfig {
    /// Configuration used by the command-line runner.
    #[must_use]
    pub const fn cli_default() -> Self {
        Self {
            overflow: OverflowPolicy::Checked,
            step_limit: Some(DEFAULT_CLI_STEP_LIMIT),
            tracing_enabled: false,
        }
    }
}

/// Result of executing one program line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// The line executed and the run continues.
    Retired,
    /// `end` executed.
    Halted,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Concatenated `msg` output.
    pub output: String,
    /// Number of program lines executed, label lines included.
    pub steps: u64,
}

/// Deterministic trace events emitted during execution when enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// About to execute a line.
    InstructionStart {
        /// Program line index.
        pointer: usize,
        /// 1-indexed source line.
        source_line: usize,
    },
    /// `msg` appended to the output buffer.
    OutputAppended {
        /// Rendered fragment.
        text: String,
    },
    /// `call` pushed a return address.
    CallPushed {
        /// Program line index the matching `ret` resumes at.
        return_to: usize,
        /// Stack depth after the push.
        depth: usize,
    },
    /// `ret` popped a return address.
    Returned {
        /// Program line index execution resumes at.
        to: usize,
        /// Stack depth after the pop.
        depth: usize,
    },
    /// `end` executed.
    Halted {
        /// Total executed lines.
        steps: u64,
    },
    /// The run failed.
    FaultRaised {
        /// Failure classification.
        kind: ErrorKind,
        /// Program line index active when the fault was raised.
        pointer: usize,
    },
}

/// Sink trait for trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn on_event(&mut self, _event: TraceEvent) {}
}

/// Sink that keeps every event in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingTrace {
    /// Events in the order they were emitted.
    pub events: Vec<TraceEvent>,
}

impl TraceSink for RecordingTrace {
    fn on_event(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::{
        InterpreterConfig, OverflowPolicy, RecordingTrace, TraceEvent, TraceSink,
        DEFAULT_CLI_STEP_LIMIT,
    };

    #[test]
    fn default_config_runs_unbounded_with_checked_arithmetic() {
        let config = InterpreterConfig::default();
        assert_eq!(config.overflow, OverflowPolicy::Checked);
        assert_eq!(config.step_limit, None);
        assert!(!config.tracing_enabled);
    }

    #[test]
    fn cli_config_applies_step_ceiling() {
        let config = InterpreterConfig::cli_default();
        assert_eq!(config.step_limit, Some(DEFAULT_CLI_STEP_LIMIT));
        assert_eq!(config.overflow, OverflowPolicy::Checked);
    }

    #[test]
    fn overflow_policy_names_parse() {
        assert_eq!(
            OverflowPolicy::from_name("checked"),
            Some(OverflowPolicy::Checked)
        );
        assert_eq!(
            OverflowPolicy::from_name("wrapping"),
            Some(OverflowPolicy::Wrapping)
        );
        assert_eq!(
            OverflowPolicy::from_name("saturating"),
            Some(OverflowPolicy::Saturating)
        );
        assert_eq!(OverflowPolicy::from_name("Wrapping"), None);
    }

    #[test]
    fn recording_trace_keeps_order() {
        let mut sink = RecordingTrace::default();
        sink.on_event(TraceEvent::Halted { steps: 1 });
        sink.on_event(TraceEvent::OutputAppended { text: "x".into() });
        assert_eq!(
            sink.events,
            vec![
                TraceEvent::Halted { steps: 1 },
                TraceEvent::OutputAppended { text: "x".into() },
            ]
        );
    }
}
