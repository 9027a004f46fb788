//! CLI entry point for the `asmi` interpreter binary.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use interpreter_cli::literate::extract_source;
use interpreter_cli::trace::StderrTrace;
use interpreter_core::{
    InterpretError, InterpreterConfig, Machine, OverflowPolicy, Program, DEFAULT_CLI_STEP_LIMIT,
};
#[cfg(test)]
use tempfile as _;

const USAGE_TEXT: &str = "\
Usage: asmi <command> [options]

Commands:
  run   <input> [options]  Interpret a program and print its output
  check <input>            Validate a program without running it

Options:
  --trace               Print execution trace to stderr (run only)
  --max-steps <n>       Instruction ceiling, 0 for none (default: 10000000)
  --overflow <policy>   checked, wrapping or saturating (default: checked)
  -h, --help            Show this help message

Inputs ending in .md are read as Markdown; only ```asm blocks are run.

Examples:
  asmi run program.asm
  asmi run notes.md --trace --max-steps 5000
  asmi check program.asm
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run(RunArgs),
    Check(CheckArgs),
}

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    input: PathBuf,
    trace: bool,
    max_steps: Option<u64>,
    overflow: OverflowPolicy,
}

impl RunArgs {
    const fn config(&self) -> InterpreterConfig {
        let step_limit = match self.max_steps {
            None => Some(DEFAULT_CLI_STEP_LIMIT),
            Some(0) => None,
            Some(limit) => Some(limit),
        };
        InterpreterConfig {
            overflow: self.overflow,
            step_limit,
            tracing_enabled: self.trace,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct CheckArgs {
    input: PathBuf,
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "run" => parse_run_args(args)
            .map(Command::Run)
            .map(ParseResult::Command),
        "check" => parse_check_args(args)
            .map(Command::Check)
            .map(ParseResult::Command),
        other => Err(format!("unknown command: {other}")),
    }
}

#[allow(clippy::while_let_on_iterator)]
fn parse_run_args(mut args: impl Iterator<Item = OsString>) -> Result<RunArgs, String> {
    let mut input: Option<PathBuf> = None;
    let mut trace = false;
    let mut max_steps: Option<u64> = None;
    let mut overflow = OverflowPolicy::default();

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--trace" {
            trace = true;
            continue;
        }

        if arg == "--max-steps" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --max-steps".to_string())?;
            let value = value.to_string_lossy();
            max_steps = Some(
                value
                    .parse()
                    .map_err(|_| format!("invalid value for --max-steps: {value}"))?,
            );
            continue;
        }

        if arg == "--overflow" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --overflow".to_string())?;
            let value = value.to_string_lossy();
            overflow = OverflowPolicy::from_name(&value)
                .ok_or_else(|| format!("invalid value for --overflow: {value}"))?;
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if input.is_some() {
            return Err("multiple input paths provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    let input = input.ok_or_else(|| "missing input path".to_string())?;
    Ok(RunArgs {
        input,
        trace,
        max_steps,
        overflow,
    })
}

fn parse_check_args(args: impl Iterator<Item = OsString>) -> Result<CheckArgs, String> {
    let mut input: Option<PathBuf> = None;

    for arg in args {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if input.is_some() {
            return Err("multiple input paths provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    let input = input.ok_or_else(|| "missing input path".to_string())?;
    Ok(CheckArgs { input })
}

fn load_program(input: &Path) -> Result<Program, i32> {
    let content = match fs::read_to_string(input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("error: failed to read {}: {e}", input.display());
            return Err(1);
        }
    };

    Program::from_source_lines(&extract_source(input, &content)).map_err(|e| {
        report_error(input, &e);
        1
    })
}

fn report_error(input: &Path, e: &InterpretError) {
    eprintln!("error: {}: {e}", input.display());
}

fn run_program(args: &RunArgs) -> Result<(), i32> {
    let program = load_program(&args.input)?;
    let mut machine = Machine::new(&program, args.config());

    match machine.run_traced(&mut StderrTrace) {
        Ok(outcome) => {
            println!("{}", outcome.output);
            Ok(())
        }
        Err(e) => {
            report_error(&args.input, &e);
            Err(1)
        }
    }
}

fn label_listing(program: &Program) -> Vec<String> {
    let labels = program.labels();
    labels
        .names_in_order()
        .into_iter()
        .filter_map(|name| {
            labels
                .definition(name)
                .map(|def| format!("  {name}: line {}", def.defined_at))
        })
        .collect()
}

fn run_check(args: &CheckArgs) -> Result<(), i32> {
    let program = load_program(&args.input)?;

    println!(
        "{}: ok ({} lines, {} labels)",
        args.input.display(),
        program.len(),
        program.labels().len()
    );
    for line in label_listing(&program) {
        println!("{line}");
    }

    Ok(())
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(Command::Run(args))) => match run_program(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Ok(ParseResult::Command(Command::Check(args))) => match run_check(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}
