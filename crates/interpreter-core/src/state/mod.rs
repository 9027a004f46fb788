//! Mutable per-run state: registers, comparison flag, call stack, output.

/// Register store, comparison flag and call stack.
pub mod registers;

/// Output buffer fed by `msg`.
pub mod output;

/// Run state machine.
pub mod run_state;

pub use output::OutputBuffer;
pub use registers::{CallStack, ComparisonFlag, RegisterFile};
pub use run_state::RunState;
