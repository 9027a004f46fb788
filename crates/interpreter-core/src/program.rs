//! Program loading: decoding parsed lines into typed instructions.
//!
//! [`Program::load`] runs every load-time check before a single instruction
//! executes, in this order:
//! 1. the source must contain an `end` instruction somewhere,
//! 2. every line must parse and decode (opcode, operand count, operand kinds),
//! 3. label names must be unique,
//! 4. every jump and call target must name a defined label.

use crate::fault::{InterpretError, ParseErrorKind};
use crate::labels::{LabelDefinition, LabelIndex};
use crate::mnemonic::{resolve_mnemonic, Arity, Opcode};
use crate::parser::{is_identifier, parse_line, split_opcode, Token};
use crate::source::{preprocess, SourceLine};

/// Terminator accepted after a label name.
pub const LABEL_TERMINATOR: char = ':';

/// A value source: integer literal or register reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Integer literal.
    Literal(i64),
    /// Register name, resolved at execution time.
    Register(String),
}

/// One piece of a `msg` instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePart {
    /// Quoted literal emitted verbatim.
    Text(String),
    /// Value emitted as a decimal integer.
    Value(Operand),
}

/// Two-operand arithmetic instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    /// `add`
    Add,
    /// `sub`
    Sub,
    /// `mul`
    Mul,
    /// `div`, truncating toward zero.
    Div,
}

/// Relation tested by a conditional jump against the comparison flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// `je`
    Eq,
    /// `jne`
    Ne,
    /// `jg`
    Gt,
    /// `jge`
    Ge,
    /// `jl`
    Lt,
    /// `jle`
    Le,
}

impl Condition {
    /// Evaluates `left <relation> right`.
    #[must_use]
    pub const fn holds(self, left: i64, right: i64) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Gt => left > right,
            Self::Ge => left >= right,
            Self::Lt => left < right,
            Self::Le => left <= right,
        }
    }
}

/// A decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `mov dest, src`
    Mov {
        /// Destination register.
        dest: String,
        /// Source value.
        src: Operand,
    },
    /// `inc dest`
    Inc(String),
    /// `dec dest`
    Dec(String),
    /// `add`/`sub`/`mul`/`div dest, src`
    Arith {
        /// Operation.
        op: ArithOp,
        /// Destination register, also the left operand.
        dest: String,
        /// Right operand.
        src: Operand,
    },
    /// `jmp label`
    Jmp(String),
    /// `jnz test, offset`: relative jump when `test` is non-zero.
    Jnz {
        /// Value tested against zero.
        test: Operand,
        /// Line offset added to the pointer.
        offset: Operand,
    },
    /// `cmp left, right`
    Cmp {
        /// Left comparison value.
        left: Operand,
        /// Right comparison value.
        right: Operand,
    },
    /// `je`/`jne`/`jg`/`jge`/`jl`/`jle label`
    Branch {
        /// Relation that must hold for the jump.
        condition: Condition,
        /// Target label.
        label: String,
    },
    /// `call label`
    Call(String),
    /// `ret`
    Ret,
    /// `msg part, ...`
    Msg(Vec<MessagePart>),
    /// `end`
    End,
}

impl Instruction {
    /// Label named by a jump or call, if any.
    #[must_use]
    pub fn label_target(&self) -> Option<&str> {
        match self {
            Self::Jmp(label) | Self::Call(label) | Self::Branch { label, .. } => Some(label),
            _ => None,
        }
    }
}

/// What a program line holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Label definition; a no-op when executed.
    Label(String),
    /// Executable instruction.
    Instruction(Instruction),
}

/// One program line and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-indexed line in the original source.
    pub source_line: usize,
    /// Decoded content.
    pub kind: LineKind,
}

/// An immutable, fully validated program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    lines: Vec<Line>,
    labels: LabelIndex,
}

impl Program {
    /// Preprocesses, parses and validates `source`.
    ///
    /// # Errors
    ///
    /// Returns [`InterpretError::MissingHalt`] when no `end` instruction
    /// exists, [`InterpretError::Parse`] for malformed lines or duplicate
    /// labels, and [`InterpretError::UnknownLabel`] for jump or call targets
    /// that are never defined.
    pub fn load(source: &str) -> Result<Self, InterpretError> {
        Self::from_source_lines(&preprocess(source))
    }

    /// Builds a program from already preprocessed lines.
    ///
    /// # Errors
    ///
    /// Same as [`Program::load`].
    pub fn from_source_lines(source_lines: &[SourceLine]) -> Result<Self, InterpretError> {
        if !contains_halt(source_lines) {
            return Err(InterpretError::MissingHalt);
        }

        let mut lines = Vec::with_capacity(source_lines.len());
        let mut labels = LabelIndex::new();

        for (index, source) in source_lines.iter().enumerate() {
            let line_number = source.original_line;
            let kind = decode_line(&source.text)
                .map_err(|kind| InterpretError::parse(line_number, kind))?;

            if let LineKind::Label(name) = &kind {
                let definition = LabelDefinition {
                    index,
                    defined_at: line_number,
                };
                labels
                    .define(name, definition)
                    .map_err(|kind| InterpretError::parse(line_number, kind))?;
            }

            lines.push(Line {
                source_line: line_number,
                kind,
            });
        }

        for line in &lines {
            if let LineKind::Instruction(instruction) = &line.kind {
                if let Some(target) = instruction.label_target() {
                    if labels.resolve(target).is_none() {
                        return Err(InterpretError::UnknownLabel {
                            line: line.source_line,
                            name: target.to_string(),
                        });
                    }
                }
            }
        }

        Ok(Self { lines, labels })
    }

    /// All program lines, labels included.
    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Line at program index `index`.
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// Number of program lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` for a program with no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The label index built at load time.
    #[must_use]
    pub const fn labels(&self) -> &LabelIndex {
        &self.labels
    }
}

fn contains_halt(lines: &[SourceLine]) -> bool {
    lines
        .iter()
        .any(|line| resolve_mnemonic(split_opcode(&line.text).0) == Some(Opcode::End))
}

fn decode_line(text: &str) -> Result<LineKind, ParseErrorKind> {
    let raw = parse_line(text)?;

    if let Some(name) = raw.opcode.strip_suffix(LABEL_TERMINATOR) {
        if !is_identifier(name) {
            return Err(ParseErrorKind::InvalidLabel(name.to_string()));
        }
        if !raw.operands.is_empty() {
            return Err(ParseErrorKind::TrailingLabelText(name.to_string()));
        }
        return Ok(LineKind::Label(name.to_string()));
    }

    match resolve_mnemonic(&raw.opcode) {
        Some(opcode) => decode_instruction(opcode, &raw.operands).map(LineKind::Instruction),
        None if raw.operands.is_empty() && is_identifier(&raw.opcode) => {
            Ok(LineKind::Label(raw.opcode))
        }
        None => Err(ParseErrorKind::UnknownOpcode(raw.opcode)),
    }
}

fn decode_instruction(opcode: Opcode, operands: &[Token]) -> Result<Instruction, ParseErrorKind> {
    if let Arity::Fixed(expected) = opcode.arity() {
        if operands.len() != expected {
            return Err(ParseErrorKind::OperandCount {
                opcode: opcode.name(),
                expected,
                found: operands.len(),
            });
        }
    }

    let instruction = match opcode {
        Opcode::Mov => Instruction::Mov {
            dest: register(opcode, &operands[0])?,
            src: operand(opcode, &operands[1])?,
        },
        Opcode::Inc => Instruction::Inc(register(opcode, &operands[0])?),
        Opcode::Dec => Instruction::Dec(register(opcode, &operands[0])?),
        Opcode::Add => arith(opcode, ArithOp::Add, operands)?,
        Opcode::Sub => arith(opcode, ArithOp::Sub, operands)?,
        Opcode::Mul => arith(opcode, ArithOp::Mul, operands)?,
        Opcode::Div => arith(opcode, ArithOp::Div, operands)?,
        Opcode::Jmp => Instruction::Jmp(label(opcode, &operands[0])?),
        Opcode::Jnz => Instruction::Jnz {
            test: operand(opcode, &operands[0])?,
            offset: operand(opcode, &operands[1])?,
        },
        Opcode::Cmp => Instruction::Cmp {
            left: operand(opcode, &operands[0])?,
            right: operand(opcode, &operands[1])?,
        },
        Opcode::Je => branch(opcode, Condition::Eq, operands)?,
        Opcode::Jne => branch(opcode, Condition::Ne, operands)?,
        Opcode::Jg => branch(opcode, Condition::Gt, operands)?,
        Opcode::Jge => branch(opcode, Condition::Ge, operands)?,
        Opcode::Jl => branch(opcode, Condition::Lt, operands)?,
        Opcode::Jle => branch(opcode, Condition::Le, operands)?,
        Opcode::Call => Instruction::Call(label(opcode, &operands[0])?),
        Opcode::Ret => Instruction::Ret,
        Opcode::Msg => Instruction::Msg(
            operands
                .iter()
                .map(|token| message_part(opcode, token))
                .collect::<Result<_, _>>()?,
        ),
        Opcode::End => Instruction::End,
    };

    Ok(instruction)
}

fn arith(opcode: Opcode, op: ArithOp, operands: &[Token]) -> Result<Instruction, ParseErrorKind> {
    Ok(Instruction::Arith {
        op,
        dest: register(opcode, &operands[0])?,
        src: operand(opcode, &operands[1])?,
    })
}

fn branch(
    opcode: Opcode,
    condition: Condition,
    operands: &[Token],
) -> Result<Instruction, ParseErrorKind> {
    Ok(Instruction::Branch {
        condition,
        label: label(opcode, &operands[0])?,
    })
}

fn register(opcode: Opcode, token: &Token) -> Result<String, ParseErrorKind> {
    if token.is_text() {
        return Err(ParseErrorKind::UnexpectedText(opcode.name()));
    }
    if !is_identifier(&token.text) {
        return Err(ParseErrorKind::InvalidRegister(token.text.clone()));
    }
    Ok(token.text.clone())
}

fn label(opcode: Opcode, token: &Token) -> Result<String, ParseErrorKind> {
    if token.is_text() {
        return Err(ParseErrorKind::UnexpectedText(opcode.name()));
    }
    if !is_identifier(&token.text) {
        return Err(ParseErrorKind::InvalidLabel(token.text.clone()));
    }
    Ok(token.text.clone())
}

fn operand(opcode: Opcode, token: &Token) -> Result<Operand, ParseErrorKind> {
    if token.is_text() {
        return Err(ParseErrorKind::UnexpectedText(opcode.name()));
    }
    parse_value(&token.text)
}

fn message_part(opcode: Opcode, token: &Token) -> Result<MessagePart, ParseErrorKind> {
    if token.is_text() {
        Ok(MessagePart::Text(token.text.clone()))
    } else {
        operand(opcode, token).map(MessagePart::Value)
    }
}

/// Classifies a bare token as an integer literal or register reference.
///
/// # Errors
///
/// Returns [`ParseErrorKind::InvalidInteger`] for numeric tokens that do not
/// fit in `i64` and [`ParseErrorKind::InvalidOperand`] for anything that is
/// neither a number nor an identifier.
pub fn parse_value(text: &str) -> Result<Operand, ParseErrorKind> {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    if digits.starts_with(|c: char| c.is_ascii_digit()) {
        return text
            .parse::<i64>()
            .map(Operand::Literal)
            .map_err(|_| ParseErrorKind::InvalidInteger(text.to_string()));
    }
    if is_identifier(text) {
        return Ok(Operand::Register(text.to_string()));
    }
    Err(ParseErrorKind::InvalidOperand(text.to_string()))
}
