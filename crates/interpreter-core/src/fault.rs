use thiserror::Error;

/// Stable, fieldless classification of every interpretation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ErrorKind {
    /// No `end` instruction exists, or execution ran past the last line.
    MissingHalt,
    /// A line is malformed or the program structure is invalid.
    Parse,
    /// An operand names a register that was never assigned.
    UnknownIdentifier,
    /// A jump or call names a label that is not defined.
    UnknownLabel,
    /// `div` with a zero divisor.
    DivideByZero,
    /// `ret` with an empty call stack.
    StackUnderflow,
    /// Arithmetic result does not fit in 64 bits under the checked policy.
    Overflow,
    /// A relative jump landed before the first line.
    JumpOutOfBounds,
    /// The configured instruction ceiling was reached.
    StepLimitExceeded,
}

impl ErrorKind {
    /// Short snake-case name used by the CLI and wasm reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingHalt => "missing_halt",
            Self::Parse => "parse_error",
            Self::UnknownIdentifier => "unknown_identifier",
            Self::UnknownLabel => "unknown_label",
            Self::DivideByZero => "divide_by_zero",
            Self::StackUnderflow => "stack_underflow",
            Self::Overflow => "overflow",
            Self::JumpOutOfBounds => "jump_out_of_bounds",
            Self::StepLimitExceeded => "step_limit_exceeded",
        }
    }
}

/// Reasons a single line or the program structure fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Line has no opcode token.
    #[error("empty opcode")]
    EmptyOpcode,
    /// A single quote was opened but never closed.
    #[error("unterminated string literal")]
    UnterminatedString,
    /// Two commas with nothing between them, or a trailing comma.
    #[error("empty operand")]
    EmptyOperand,
    /// Operand is neither an integer, a register name, nor a whole literal.
    #[error("invalid operand: {0}")]
    InvalidOperand(String),
    /// Destination operand is not a valid register name.
    #[error("invalid register name: {0}")]
    InvalidRegister(String),
    /// Label definition or reference is not a valid identifier.
    #[error("invalid label name: {0}")]
    InvalidLabel(String),
    /// Integer literal does not fit in a signed 64-bit value.
    #[error("integer literal out of range: {0}")]
    InvalidInteger(String),
    /// First token is not a known opcode and the line is not a label.
    #[error("unknown opcode: {0}")]
    UnknownOpcode(String),
    /// Wrong number of operands for a fixed-arity opcode.
    #[error("`{opcode}` expects {expected} operand(s), found {found}")]
    OperandCount {
        /// Canonical opcode name.
        opcode: &'static str,
        /// Required operand count.
        expected: usize,
        /// Operand count written in the source.
        found: usize,
    },
    /// A quoted literal was given to an opcode other than `msg`.
    #[error("text literal is not allowed as an operand of `{0}`")]
    UnexpectedText(&'static str),
    /// A label was defined more than once.
    #[error("duplicate label `{name}` (first defined at line {first_definition})")]
    DuplicateLabel {
        /// The label name.
        name: String,
        /// Source line of the first definition.
        first_definition: usize,
    },
    /// Something other than a comment follows a `name:` label.
    #[error("unexpected text after label `{0}`")]
    TrailingLabelText(String),
}

/// Typed failure returned by loading or running a program.
///
/// Line numbers are 1-indexed positions in the original source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpretError {
    /// The program never reaches an `end` instruction.
    #[error("program does not reach an `end` instruction")]
    MissingHalt,
    /// Malformed line or invalid program structure.
    #[error("line {line}: {kind}")]
    Parse {
        /// Offending source line.
        line: usize,
        /// What was wrong with it.
        kind: ParseErrorKind,
    },
    /// Read of a register that was never assigned.
    #[error("line {line}: unknown register `{name}`")]
    UnknownIdentifier {
        /// Source line of the reading instruction.
        line: usize,
        /// Register name.
        name: String,
    },
    /// Jump or call to an undefined label.
    #[error("line {line}: unknown label `{name}`")]
    UnknownLabel {
        /// Source line of the jump or call.
        line: usize,
        /// Label name.
        name: String,
    },
    /// `div` by zero.
    #[error("line {line}: division by zero")]
    DivideByZero {
        /// Source line of the `div`.
        line: usize,
    },
    /// `ret` with nothing to return to.
    #[error("line {line}: `ret` with an empty call stack")]
    StackUnderflow {
        /// Source line of the `ret`.
        line: usize,
    },
    /// Checked arithmetic overflowed.
    #[error("line {line}: arithmetic overflow")]
    Overflow {
        /// Source line of the arithmetic instruction.
        line: usize,
    },
    /// Relative jump target before the first line.
    #[error("line {line}: jump to line index {target} is out of bounds")]
    JumpOutOfBounds {
        /// Source line of the `jnz`.
        line: usize,
        /// Computed program line index.
        target: i64,
    },
    /// Instruction ceiling reached before `end`.
    #[error("step limit of {limit} instructions exceeded")]
    StepLimitExceeded {
        /// Configured ceiling.
        limit: u64,
    },
}

impl InterpretError {
    /// Returns the fieldless classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingHalt => ErrorKind::MissingHalt,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::UnknownIdentifier { .. } => ErrorKind::UnknownIdentifier,
            Self::UnknownLabel { .. } => ErrorKind::UnknownLabel,
            Self::DivideByZero { .. } => ErrorKind::DivideByZero,
            Self::StackUnderflow { .. } => ErrorKind::StackUnderflow,
            Self::Overflow { .. } => ErrorKind::Overflow,
            Self::JumpOutOfBounds { .. } => ErrorKind::JumpOutOfBounds,
            Self::StepLimitExceeded { .. } => ErrorKind::StepLimitExceeded,
        }
    }

    /// Source line the error refers to, when it is tied to one.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::MissingHalt | Self::StepLimitExceeded { .. } => None,
            Self::Parse { line, .. }
            | Self::UnknownIdentifier { line, .. }
            | Self::UnknownLabel { line, .. }
            | Self::DivideByZero { line }
            | Self::StackUnderflow { line }
            | Self::Overflow { line }
            | Self::JumpOutOfBounds { line, .. } => Some(*line),
        }
    }

    pub(crate) const fn parse(line: usize, kind: ParseErrorKind) -> Self {
        Self::Parse { line, kind }
    }
}
