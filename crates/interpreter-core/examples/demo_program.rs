//! Runs a fixed demonstration program and prints its output and final registers.
//!
//! ## Usage
//!
//! ```sh
//! cargo run -p interpreter-core --example demo_program
//! ```

use interpreter_core::{InterpreterConfig, Machine, Program, RecordingTrace, TraceEvent};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

const DEMO: &str = "\
; factorial of a, printed via a subroutine
mov   a, 5
mov   b, a
mov   c, a
call  proc_fact
call  print
end

proc_fact:
    dec   b
    mul   c, b
    cmp   b, 1
    jne   proc_fact
    ret

print:
    msg   a, '! = ', c
    ret
";

fn main() {
    let program = match Program::load(DEMO) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let config = InterpreterConfig {
        tracing_enabled: true,
        ..InterpreterConfig::default()
    };
    let mut machine = Machine::new(&program, config);
    let mut trace = RecordingTrace::default();

    match machine.run_traced(&mut trace) {
        Ok(outcome) => {
            println!("output: {}", outcome.output);
            println!("steps:  {}", outcome.steps);
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }

    let calls = trace
        .events
        .iter()
        .filter(|event| matches!(event, TraceEvent::CallPushed { .. }))
        .count();
    println!("calls:  {calls}");

    for (name, value) in machine.registers().sorted() {
        println!("  {name} = {value}");
    }
}
