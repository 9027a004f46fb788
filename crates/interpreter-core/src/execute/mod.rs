//! Fetch-decode-execute loop.
//!
//! A [`Machine`] owns every piece of mutable run state (instruction pointer,
//! registers, comparison flag, call stack, output buffer), so independent runs
//! never observe each other. Each step executes one program line:
//! 1. Check the step ceiling
//! 2. Fetch the line at the pointer (running past the end is `MissingHalt`)
//! 3. Execute its handler
//! 4. Advance, jump, or halt
//!
//! Any fault moves the machine into [`RunState::Failed`] and is reported again
//! by every later step.

mod arith;

pub use arith::{apply as apply_arith, ArithFault};

use crate::api::{InterpreterConfig, NullTrace, RunOutcome, StepOutcome, TraceEvent, TraceSink};
use crate::program::{ArithOp, Instruction, Line, LineKind, MessagePart, Operand, Program};
use crate::state::{CallStack, ComparisonFlag, OutputBuffer, RegisterFile, RunState};
use crate::InterpretError;

/// Where control goes after a handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Next,
    Jump(usize),
    Halt,
}

/// Interpreter state for a single run over a loaded [`Program`].
#[derive(Debug, Clone)]
pub struct Machine<'p> {
    program: &'p Program,
    config: InterpreterConfig,
    pointer: usize,
    registers: RegisterFile,
    comparison: ComparisonFlag,
    call_stack: CallStack,
    output: OutputBuffer,
    run_state: RunState,
    fault: Option<InterpretError>,
    steps: u64,
}

impl<'p> Machine<'p> {
    /// Creates a machine positioned at the first program line.
    #[must_use]
    pub fn new(program: &'p Program, config: InterpreterConfig) -> Self {
        Self {
            program,
            config,
            pointer: 0,
            registers: RegisterFile::new(),
            comparison: ComparisonFlag::default(),
            call_stack: CallStack::new(),
            output: OutputBuffer::new(),
            run_state: RunState::default(),
            fault: None,
            steps: 0,
        }
    }

    /// Executes one program line.
    ///
    /// # Errors
    ///
    /// Returns the fault that aborted the run; once failed, every further
    /// call returns the same error.
    pub fn step(&mut self) -> Result<StepOutcome, InterpretError> {
        self.step_traced(&mut NullTrace)
    }

    /// Executes one program line, reporting trace events to `sink` when
    /// tracing is enabled in the configuration.
    ///
    /// # Errors
    ///
    /// Same as [`Machine::step`].
    pub fn step_traced(&mut self, sink: &mut dyn TraceSink) -> Result<StepOutcome, InterpretError> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        if self.run_state == RunState::Halted {
            return Ok(StepOutcome::Halted);
        }

        if let Some(limit) = self.config.step_limit {
            if self.steps >= limit {
                return Err(self.fail(InterpretError::StepLimitExceeded { limit }, sink));
            }
        }

        let program = self.program;
        let Some(line) = program.line(self.pointer) else {
            return Err(self.fail(InterpretError::MissingHalt, sink));
        };

        let pointer = self.pointer;
        self.trace(sink, || TraceEvent::InstructionStart {
            pointer,
            source_line: line.source_line,
        });
        self.steps = self.steps.saturating_add(1);

        match self.execute_line(line, sink) {
            Ok(Flow::Next) => {
                self.pointer += 1;
                self.run_state = RunState::Running {
                    pointer: self.pointer,
                };
                Ok(StepOutcome::Retired)
            }
            Ok(Flow::Jump(target)) => {
                self.pointer = target;
                self.run_state = RunState::Running { pointer: target };
                Ok(StepOutcome::Retired)
            }
            Ok(Flow::Halt) => {
                self.run_state = RunState::Halted;
                let steps = self.steps;
                self.trace(sink, || TraceEvent::Halted { steps });
                Ok(StepOutcome::Halted)
            }
            Err(err) => Err(self.fail(err, sink)),
        }
    }

    /// Steps until `end` or the first fault.
    ///
    /// # Errors
    ///
    /// Returns the fault that aborted the run. Output produced before the
    /// fault stays readable through [`Machine::output`] but is not part of the
    /// returned result.
    pub fn run(&mut self) -> Result<RunOutcome, InterpretError> {
        self.run_traced(&mut NullTrace)
    }

    /// Like [`Machine::run`], reporting trace events to `sink`.
    ///
    /// # Errors
    ///
    /// Same as [`Machine::run`].
    pub fn run_traced(&mut self, sink: &mut dyn TraceSink) -> Result<RunOutcome, InterpretError> {
        while self.step_traced(sink)? == StepOutcome::Retired {}

        Ok(RunOutcome {
            output: self.output.contents(),
            steps: self.steps,
        })
    }

    /// Index of the next line to execute.
    #[must_use]
    pub const fn pointer(&self) -> usize {
        self.pointer
    }

    /// Register store.
    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Last recorded comparison.
    #[must_use]
    pub const fn comparison(&self) -> ComparisonFlag {
        self.comparison
    }

    /// Number of outstanding calls.
    #[must_use]
    pub fn call_depth(&self) -> usize {
        self.call_stack.depth()
    }

    /// Output emitted so far.
    #[must_use]
    pub const fn output(&self) -> &OutputBuffer {
        &self.output
    }

    /// Lines executed so far.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Current state machine position.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    fn fail(&mut self, err: InterpretError, sink: &mut dyn TraceSink) -> InterpretError {
        let kind = err.kind();
        let pointer = self.pointer;
        self.run_state = RunState::Failed(kind);
        self.fault = Some(err.clone());
        self.trace(sink, || TraceEvent::FaultRaised { kind, pointer });
        err
    }

    fn trace(&self, sink: &mut dyn TraceSink, event: impl FnOnce() -> TraceEvent) {
        if self.config.tracing_enabled {
            sink.on_event(event());
        }
    }

    fn execute_line(
        &mut self,
        line: &Line,
        sink: &mut dyn TraceSink,
    ) -> Result<Flow, InterpretError> {
        let instruction = match &line.kind {
            LineKind::Label(_) => return Ok(Flow::Next),
            LineKind::Instruction(instruction) => instruction,
        };
        let at = line.source_line;

        match instruction {
            Instruction::Mov { dest, src } => {
                let value = self.value(src, at)?;
                self.registers.set(dest, value);
                Ok(Flow::Next)
            }
            Instruction::Inc(dest) => self.arith(ArithOp::Add, dest, &Operand::Literal(1), at),
            Instruction::Dec(dest) => self.arith(ArithOp::Sub, dest, &Operand::Literal(1), at),
            Instruction::Arith { op, dest, src } => self.arith(*op, dest, src, at),
            Instruction::Jmp(label) => self.resolve(label, at).map(Flow::Jump),
            Instruction::Jnz { test, offset } => {
                if self.value(test, at)? == 0 {
                    return Ok(Flow::Next);
                }
                let offset = self.value(offset, at)?;
                self.relative_target(offset, at).map(Flow::Jump)
            }
            Instruction::Cmp { left, right } => {
                let left = self.value(left, at)?;
                let right = self.value(right, at)?;
                self.comparison.record(left, right);
                Ok(Flow::Next)
            }
            Instruction::Branch { condition, label } => {
                if condition.holds(self.comparison.left, self.comparison.right) {
                    self.resolve(label, at).map(Flow::Jump)
                } else {
                    Ok(Flow::Next)
                }
            }
            Instruction::Call(label) => {
                let target = self.resolve(label, at)?;
                let return_to = self.pointer + 1;
                self.call_stack.push(return_to);
                let depth = self.call_stack.depth();
                self.trace(sink, || TraceEvent::CallPushed { return_to, depth });
                Ok(Flow::Jump(target))
            }
            Instruction::Ret => {
                let to = self
                    .call_stack
                    .pop()
                    .ok_or(InterpretError::StackUnderflow { line: at })?;
                let depth = self.call_stack.depth();
                self.trace(sink, || TraceEvent::Returned { to, depth });
                Ok(Flow::Jump(to))
            }
            Instruction::Msg(parts) => {
                let text = self.render(parts, at)?;
                self.trace(sink, || TraceEvent::OutputAppended { text: text.clone() });
                self.output.push(text);
                Ok(Flow::Next)
            }
            Instruction::End => Ok(Flow::Halt),
        }
    }

    fn value(&self, operand: &Operand, at: usize) -> Result<i64, InterpretError> {
        match operand {
            Operand::Literal(value) => Ok(*value),
            Operand::Register(name) => self.read_register(name, at),
        }
    }

    fn read_register(&self, name: &str, at: usize) -> Result<i64, InterpretError> {
        self.registers
            .get(name)
            .ok_or_else(|| InterpretError::UnknownIdentifier {
                line: at,
                name: name.to_string(),
            })
    }

    fn arith(
        &mut self,
        op: ArithOp,
        dest: &str,
        src: &Operand,
        at: usize,
    ) -> Result<Flow, InterpretError> {
        let left = self.read_register(dest, at)?;
        let right = self.value(src, at)?;
        let policy = self.config.overflow;
        let result = arith::apply(op, left, right, policy).map_err(|fault| match fault {
            ArithFault::DivideByZero => InterpretError::DivideByZero { line: at },
            ArithFault::Overflow => InterpretError::Overflow { line: at },
        })?;
        self.registers.set(dest, result);
        Ok(Flow::Next)
    }

    fn resolve(&self, label: &str, at: usize) -> Result<usize, InterpretError> {
        self.program
            .labels()
            .resolve(label)
            .ok_or_else(|| InterpretError::UnknownLabel {
                line: at,
                name: label.to_string(),
            })
    }

    fn relative_target(&self, offset: i64, at: usize) -> Result<usize, InterpretError> {
        let base = i64::try_from(self.pointer).unwrap_or(i64::MAX);
        let target = base.saturating_add(offset);
        if target < 0 {
            return Err(InterpretError::JumpOutOfBounds { line: at, target });
        }
        // Past the addressable range is past the last line.
        Ok(usize::try_from(target).unwrap_or(usize::MAX))
    }

    fn render(&self, parts: &[MessagePart], at: usize) -> Result<String, InterpretError> {
        let mut text = String::new();
        for part in parts {
            match part {
                MessagePart::Text(literal) => text.push_str(literal),
                MessagePart::Value(operand) => {
                    text.push_str(&self.value(operand, at)?.to_string());
                }
            }
        }
        Ok(text)
    }
}

/// Loads and runs `source` with the default configuration.
///
/// # Errors
///
/// Returns any load-time or runtime [`InterpretError`]; no partial output is
/// returned on failure.
pub fn interpret(source: &str) -> Result<String, InterpretError> {
    interpret_with_config(source, &InterpreterConfig::default())
}

/// Loads and runs `source` with an explicit configuration.
///
/// # Errors
///
/// Same as [`interpret`].
pub fn interpret_with_config(
    source: &str,
    config: &InterpreterConfig,
) -> Result<String, InterpretError> {
    interpret_traced(source, config, &mut NullTrace).map(|outcome| outcome.output)
}

/// Loads and runs `source`, reporting trace events to `sink`.
///
/// # Errors
///
/// Same as [`interpret`].
pub fn interpret_traced(
    source: &str,
    config: &InterpreterConfig,
    sink: &mut dyn TraceSink,
) -> Result<RunOutcome, InterpretError> {
    let program = Program::load(source)?;
    Machine::new(&program, *config).run_traced(sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{OverflowPolicy, RecordingTrace};
    use crate::ErrorKind;

    fn load(source: &str) -> Program {
        Program::load(source).expect("program should load")
    }

    #[test]
    fn mov_inc_dec_update_registers() {
        let program = load("mov a, 5\ninc a\ninc a\ndec a\nmov b, a\nend");
        let mut machine = Machine::new(&program, InterpreterConfig::default());
        let outcome = machine.run().expect("run should halt");

        assert_eq!(outcome.output, "");
        assert_eq!(outcome.steps, 6);
        assert_eq!(machine.registers().get("a"), Some(6));
        assert_eq!(machine.registers().get("b"), Some(6));
        assert_eq!(machine.run_state(), RunState::Halted);
    }

    #[test]
    fn stepping_advances_pointer_and_reports_halt() {
        let program = load("mov a, 1\nend");
        let mut machine = Machine::new(&program, InterpreterConfig::default());

        assert_eq!(machine.pointer(), 0);
        assert_eq!(machine.step(), Ok(StepOutcome::Retired));
        assert_eq!(machine.pointer(), 1);
        assert_eq!(machine.step(), Ok(StepOutcome::Halted));
        assert_eq!(machine.step(), Ok(StepOutcome::Halted));
        assert_eq!(machine.steps(), 2);
    }

    #[test]
    fn failed_machine_keeps_reporting_the_same_fault() {
        let program = load("ret\nend");
        let mut machine = Machine::new(&program, InterpreterConfig::default());

        let first = machine.step().expect_err("ret on empty stack");
        assert_eq!(first, InterpretError::StackUnderflow { line: 1 });
        assert_eq!(machine.step(), Err(first));
        assert_eq!(
            machine.run_state(),
            RunState::Failed(ErrorKind::StackUnderflow)
        );
        assert_eq!(machine.steps(), 1);
    }

    #[test]
    fn call_pushes_next_line_and_ret_resumes_there() {
        let program = load("mov a, 1\ncall f\nmsg a\nend\nf:\ninc a\nret");
        let mut machine = Machine::new(&program, InterpreterConfig::default());

        machine.step().expect("mov");
        machine.step().expect("call");
        assert_eq!(machine.pointer(), 4);
        assert_eq!(machine.call_depth(), 1);
        machine.step().expect("label");
        machine.step().expect("inc");
        machine.step().expect("ret");
        assert_eq!(machine.pointer(), 2);
        assert_eq!(machine.call_depth(), 0);
        assert_eq!(machine.run().map(|o| o.output), Ok("2".to_string()));
    }

    #[test]
    fn jnz_jumps_relative_to_its_own_line() {
        let program = load(
            "\
mov a, 3
mov n, 0
inc n
dec a
jnz a, -2
msg n
end",
        );
        let outcome = Machine::new(&program, InterpreterConfig::default())
            .run()
            .expect("loop terminates");
        assert_eq!(outcome.output, "3");
    }

    #[test]
    fn jnz_with_zero_test_falls_through_without_reading_offset() {
        assert_eq!(
            interpret("mov a, 0\njnz a, missing\nmsg 'ok'\nend"),
            Ok("ok".to_string())
        );
    }

    #[test]
    fn jnz_before_first_line_is_out_of_bounds() {
        assert_eq!(
            interpret("mov a, 1\njnz a, -5\nend"),
            Err(InterpretError::JumpOutOfBounds {
                line: 2,
                target: -4,
            })
        );
    }

    #[test]
    fn jnz_past_last_line_is_missing_halt() {
        assert_eq!(
            interpret("mov a, 1\njnz a, 10\nend"),
            Err(InterpretError::MissingHalt)
        );
        assert_eq!(
            interpret("mov a, 1\njnz a, 9223372036854775807\nend"),
            Err(InterpretError::MissingHalt)
        );
    }

    #[test]
    fn conditional_jumps_reuse_the_comparison_flag() {
        let source = "\
cmp 2, 5
jg bad
jl first
bad:
msg 'no'
end
first:
jne second
msg 'no'
end
second:
msg 'both'
end";
        assert_eq!(interpret(source), Ok("both".to_string()));
    }

    #[test]
    fn comparison_flag_defaults_to_zero_pair() {
        assert_eq!(
            interpret("je eq\nmsg 'ne'\nend\neq:\nmsg 'eq'\nend"),
            Ok("eq".to_string())
        );
    }

    #[test]
    fn div_truncates_toward_zero() {
        assert_eq!(
            interpret("mov a, -7\ndiv a, 2\nmsg a\nend"),
            Ok("-3".to_string())
        );
    }

    #[test]
    fn runtime_faults_carry_source_lines() {
        assert_eq!(
            interpret("mov a, 1\n\ndiv a, 0\nend"),
            Err(InterpretError::DivideByZero { line: 3 })
        );
        assert_eq!(
            interpret("inc a\nend"),
            Err(InterpretError::UnknownIdentifier {
                line: 1,
                name: "a".into(),
            })
        );
        assert_eq!(
            interpret("mov a, b\nend"),
            Err(InterpretError::UnknownIdentifier {
                line: 1,
                name: "b".into(),
            })
        );
    }

    #[test]
    fn overflow_policy_is_applied_to_inc() {
        let source = "mov a, 9223372036854775807\ninc a\nmsg a\nend";

        assert_eq!(interpret(source), Err(InterpretError::Overflow { line: 2 }));

        let wrapping = InterpreterConfig {
            overflow: OverflowPolicy::Wrapping,
            ..InterpreterConfig::default()
        };
        assert_eq!(
            interpret_with_config(source, &wrapping),
            Ok(i64::MIN.to_string())
        );

        let saturating = InterpreterConfig {
            overflow: OverflowPolicy::Saturating,
            ..InterpreterConfig::default()
        };
        assert_eq!(
            interpret_with_config(source, &saturating),
            Ok(i64::MAX.to_string())
        );
    }

    #[test]
    fn step_limit_stops_non_halting_programs() {
        let config = InterpreterConfig {
            step_limit: Some(50),
            ..InterpreterConfig::default()
        };
        assert_eq!(
            interpret_with_config("loop:\njmp loop\nend", &config),
            Err(InterpretError::StepLimitExceeded { limit: 50 })
        );
    }

    #[test]
    fn step_limit_counts_executed_lines_inclusively() {
        let config = InterpreterConfig {
            step_limit: Some(2),
            ..InterpreterConfig::default()
        };
        assert_eq!(
            interpret_with_config("msg 'x'\nend", &config),
            Ok("x".to_string())
        );
    }

    #[test]
    fn partial_output_is_kept_on_machine_but_not_returned() {
        let program = load("msg 'before'\nret\nend");
        let mut machine = Machine::new(&program, InterpreterConfig::default());

        assert!(machine.run().is_err());
        assert_eq!(machine.output().contents(), "before");
        assert_eq!(
            interpret("msg 'before'\nret\nend"),
            Err(InterpretError::StackUnderflow { line: 2 })
        );
    }

    #[test]
    fn trace_events_follow_execution_when_enabled() {
        let config = InterpreterConfig {
            tracing_enabled: true,
            ..InterpreterConfig::default()
        };
        let mut sink = RecordingTrace::default();
        let outcome = interpret_traced("call f\nend\nf:\nmsg 'hi'\nret", &config, &mut sink)
            .expect("run should halt");

        assert_eq!(outcome.output, "hi");
        assert_eq!(
            sink.events,
            vec![
                TraceEvent::InstructionStart {
                    pointer: 0,
                    source_line: 1,
                },
                TraceEvent::CallPushed {
                    return_to: 1,
                    depth: 1,
                },
                TraceEvent::InstructionStart {
                    pointer: 2,
                    source_line: 3,
                },
                TraceEvent::InstructionStart {
                    pointer: 3,
                    source_line: 4,
                },
                TraceEvent::OutputAppended { text: "hi".into() },
                TraceEvent::InstructionStart {
                    pointer: 4,
                    source_line: 5,
                },
                TraceEvent::Returned { to: 1, depth: 0 },
                TraceEvent::InstructionStart {
                    pointer: 1,
                    source_line: 2,
                },
                TraceEvent::Halted { steps: 5 },
            ]
        );
    }

    #[test]
    fn trace_reports_faults() {
        let config = InterpreterConfig {
            tracing_enabled: true,
            ..InterpreterConfig::default()
        };
        let mut sink = RecordingTrace::default();
        let err = interpret_traced("ret\nend", &config, &mut sink).expect_err("underflow");

        assert_eq!(err.kind(), ErrorKind::StackUnderflow);
        assert_eq!(
            sink.events.last(),
            Some(&TraceEvent::FaultRaised {
                kind: ErrorKind::StackUnderflow,
                pointer: 0,
            })
        );
    }

    #[test]
    fn disabled_tracing_emits_nothing() {
        let mut sink = RecordingTrace::default();
        interpret_traced("msg 'x'\nend", &InterpreterConfig::default(), &mut sink)
            .expect("run should halt");
        assert!(sink.events.is_empty());
    }
}
