//! Core interpreter for a small register assembly language.
//!
//! A program is plain text: one instruction or label per line, `;` comments,
//! named integer registers, labels as jump and call targets, and a `msg`
//! instruction that appends to an output buffer. [`interpret`] loads and runs
//! a program, returning the emitted text once `end` executes.
//!
//! ```text
//! mov a, 5
//! inc a
//! call half
//! msg '(5+1)/2 = ', a   ; emits "(5+1)/2 = 3"
//! end
//!
//! half:
//!     div a, 2
//!     ret
//! ```

/// Source preprocessing (comment and blank-line stripping).
pub mod source;
pub use source::{
    preprocess, preprocess_numbered, strip_comment, SourceLine, COMMENT_MARKER, QUOTE,
};

/// Line parser producing opcode and operand tokens.
pub mod parser;
pub use parser::{is_identifier, parse_line, split_opcode, RawLine, Token, TokenKind};

/// Opcode table and mnemonic lookup.
pub mod mnemonic;
pub use mnemonic::{resolve_mnemonic, Arity, Opcode};

/// Label index built before execution.
pub mod labels;
pub use labels::{LabelDefinition, LabelIndex};

/// Typed program representation and load-time validation.
pub mod program;
pub use program::{
    parse_value, ArithOp, Condition, Instruction, Line, LineKind, MessagePart, Operand, Program,
    LABEL_TERMINATOR,
};

/// Error taxonomy for load-time and runtime failures.
pub mod fault;
pub use fault::{ErrorKind, InterpretError, ParseErrorKind};

/// Per-run mutable state.
pub mod state;
pub use state::{CallStack, ComparisonFlag, OutputBuffer, RegisterFile, RunState};

/// Host-facing configuration, outcomes and trace hooks.
pub mod api;
pub use api::{
    InterpreterConfig, NullTrace, OverflowPolicy, RecordingTrace, RunOutcome, StepOutcome,
    TraceEvent, TraceSink, DEFAULT_CLI_STEP_LIMIT,
};

/// Execution engine.
pub mod execute;
pub use execute::{
    apply_arith, interpret, interpret_traced, interpret_with_config, ArithFault, Machine,
};

#[cfg(test)]
use proptest as _;
