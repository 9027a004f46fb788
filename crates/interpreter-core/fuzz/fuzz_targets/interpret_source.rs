#![no_main]

use interpreter_core::{
    interpret_with_config, parse_line, preprocess, InterpreterConfig, OverflowPolicy, Program,
};
use libfuzzer_sys::fuzz_target;

const FUZZ_STEP_LIMIT: u64 = 10_000;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let Ok(source) = std::str::from_utf8(rest) else {
        return;
    };

    for line in preprocess(source) {
        let _ = parse_line(&line.text);
    }
    let _ = Program::load(source);

    let overflow = match selector % 3 {
        0 => OverflowPolicy::Checked,
        1 => OverflowPolicy::Wrapping,
        _ => OverflowPolicy::Saturating,
    };
    let config = InterpreterConfig {
        overflow,
        step_limit: Some(FUZZ_STEP_LIMIT),
        tracing_enabled: false,
    };
    let _ = interpret_with_config(source, &config);
});
