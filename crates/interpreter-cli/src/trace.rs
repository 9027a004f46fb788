//! Trace sink that writes one line per event to stderr.

use interpreter_core::{TraceEvent, TraceSink};

/// Renders a trace event as a single line.
#[must_use]
pub fn format_event(event: &TraceEvent) -> String {
    match event {
        TraceEvent::InstructionStart {
            pointer,
            source_line,
        } => format!("exec  [{pointer:>4}] line {source_line}"),
        TraceEvent::OutputAppended { text } => format!("out   {text:?}"),
        TraceEvent::CallPushed { return_to, depth } => {
            format!("call  return_to={return_to} depth={depth}")
        }
        TraceEvent::Returned { to, depth } => format!("ret   to={to} depth={depth}"),
        TraceEvent::Halted { steps } => format!("halt  steps={steps}"),
        TraceEvent::FaultRaised { kind, pointer } => {
            format!("fault {} at [{pointer}]", kind.as_str())
        }
    }
}

/// Prints every event to stderr, prefixed with `trace:`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrTrace;

impl TraceSink for StderrTrace {
    fn on_event(&mut self, event: TraceEvent) {
        eprintln!("trace: {}", format_event(&event));
    }
}
