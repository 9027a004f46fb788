use interpreter_core::{
    ErrorKind, InterpretError, InterpreterConfig, Machine, OverflowPolicy, Program, TraceEvent,
    TraceSink,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

macro_rules! console_log {
    ($($t:tt)*) => (log(&format!($($t)*)))
}

/// JS-compatible view of an `InterpretError`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WasmError {
    pub kind: ErrorKind,
    pub line: Option<usize>,
    pub message: String,
    pub load_time: bool,
}

impl WasmError {
    fn new(err: &InterpretError, load_time: bool) -> Self {
        Self {
            kind: err.kind(),
            line: err.line(),
            message: err.to_string(),
            load_time,
        }
    }
}

/// JS-compatible summary of one run.
///
/// Register values are decimal strings so 64-bit values survive the trip to
/// JS numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WasmRunReport {
    pub output: Option<String>,
    pub steps: u64,
    pub registers: Vec<(String, String)>,
    pub error: Option<WasmError>,
}

/// Loads and runs `source`, collecting a report instead of failing.
#[must_use]
pub fn run_report(
    source: &str,
    config: &InterpreterConfig,
    sink: &mut dyn TraceSink,
) -> WasmRunReport {
    let program = match Program::load(source) {
        Ok(program) => program,
        Err(err) => {
            return WasmRunReport {
                output: None,
                steps: 0,
                registers: Vec::new(),
                error: Some(WasmError::new(&err, true)),
            };
        }
    };

    let mut machine = Machine::new(&program, *config);
    let result = machine.run_traced(sink);
    let registers = machine
        .registers()
        .sorted()
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    match result {
        Ok(outcome) => WasmRunReport {
            output: Some(outcome.output),
            steps: outcome.steps,
            registers,
            error: None,
        },
        Err(err) => WasmRunReport {
            output: None,
            steps: machine.steps(),
            registers,
            error: Some(WasmError::new(&err, false)),
        },
    }
}

/// Forwards trace events to the browser console.
struct ConsoleTrace;

impl TraceSink for ConsoleTrace {
    fn on_event(&mut self, event: TraceEvent) {
        console_log!("{event:?}");
    }
}

fn to_js_error(err: &InterpretError) -> js_sys::Error {
    js_sys::Error::new(&err.to_string())
}

/// Runs `source` with the default configuration and returns its output.
///
/// # Errors
///
/// Throws a JS `Error` carrying the interpreter's message.
#[wasm_bindgen]
pub fn interpret(source: &str) -> Result<String, js_sys::Error> {
    console_error_panic_hook::set_once();
    interpreter_core::interpret(source).map_err(|err| to_js_error(&err))
}

#[wasm_bindgen]
pub struct WasmInterpreter {
    config: InterpreterConfig,
}

impl Default for WasmInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WasmInterpreter {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        console_error_panic_hook::set_once();
        Self {
            config: InterpreterConfig::default(),
        }
    }

    /// Sets the instruction ceiling; `undefined` removes it.
    pub fn set_step_limit(&mut self, limit: Option<u32>) {
        self.config.step_limit = limit.map(u64::from);
    }

    /// Selects `checked`, `wrapping` or `saturating` arithmetic.
    ///
    /// # Errors
    ///
    /// Throws for any other policy name.
    pub fn set_overflow(&mut self, name: &str) -> Result<(), js_sys::Error> {
        self.config.overflow = OverflowPolicy::from_name(name)
            .ok_or_else(|| js_sys::Error::new(&format!("unknown overflow policy: {name}")))?;
        Ok(())
    }

    /// Logs trace events to the console during `run`.
    pub fn set_tracing(&mut self, enabled: bool) {
        self.config.tracing_enabled = enabled;
    }

    /// Returns the current configuration as a JSON object.
    ///
    /// # Errors
    ///
    /// Throws if the configuration cannot be converted.
    pub fn config(&self) -> Result<JsValue, js_sys::Error> {
        serde_wasm_bindgen::to_value(&self.config).map_err(|e| js_sys::Error::new(&e.to_string()))
    }

    /// Runs `source` and returns a `WasmRunReport` as a JSON object.
    ///
    /// # Errors
    ///
    /// Interpretation failures are reported in the `error` field; the call
    /// only throws if the report cannot be converted.
    pub fn run(&self, source: &str) -> Result<JsValue, js_sys::Error> {
        let report = run_report(source, &self.config, &mut ConsoleTrace);
        if let Some(error) = &report.error {
            web_sys::console::warn_1(&JsValue::from_str(&error.message));
        }
        serde_wasm_bindgen::to_value(&report).map_err(|e| js_sys::Error::new(&e.to_string()))
    }
}
