//! `tinder run SOURCE` — compile and execute a script against a
//! terminal-backed Crucible: `input`/bare `yield` prompt stdin for a
//! line, `write` drains to stdout, `import` is granted unconditionally
//! (this host has no catalog to gate access to) and `catch` handlers
//! behave exactly as Firestarter compiled them.

use std::io::BufRead;
use std::path::Path;
use std::process::ExitCode;

use tinder_core::{Crucible, Value};
use tinder_vm::{FuelLimits, Interpreter, PrintTracer, StepOutcome, Verbosity};

use crate::cli::TraceLevel;
use crate::config::Config;
use crate::host::StdLibrary;
use crate::util::read_source;

pub fn run(source: &Path, trace: TraceLevel, fuel: Option<u64>, config: &Config) -> ExitCode {
    let text = match read_source(source) {
        Ok(t) => t,
        Err(code) => return code,
    };
    let script = match tinder_compiler::compile(&text) {
        Ok(script) => script,
        Err(err) => {
            eprintln!("{}: {err}", source.display());
            return ExitCode::FAILURE;
        }
    };

    let limits = match fuel.or(config.fuel) {
        Some(n) => FuelLimits::default().instruction_fuel(n),
        None => FuelLimits::default(),
    };
    let mut crucible = Crucible::new();
    let mut library = StdLibrary;
    let mut interpreter = Interpreter::new(&script, limits);
    let stdin = std::io::stdin();

    loop {
        let outcome = match trace {
            TraceLevel::Off => interpreter.run(&mut crucible, &mut library),
            level => {
                let mut tracer = PrintTracer::new(&script.interner, verbosity(level));
                let outcome = interpreter.run_with(&mut crucible, &mut library, &mut tracer);
                tracer.print();
                outcome
            }
        };
        flush_output(&mut crucible);

        match outcome {
            StepOutcome::Halted => return ExitCode::SUCCESS,
            StepOutcome::Fatal(err) => {
                eprintln!("fatal at line {}: {err}", crucible.get("__LINE__").map(ToString::to_string).unwrap_or_default());
                return ExitCode::FAILURE;
            }
            StepOutcome::Imported(spec) => {
                match config.resolve_library(&spec.library) {
                    Some(path) => tracing::info!(library = %spec.library, path = %path.display(), "resolved import from search path"),
                    None => tracing::debug!(library = %spec.library, "import granted with no matching library path"),
                }
                eprintln!("(imported \"{}\")", spec.library);
                interpreter.resume(&mut crucible, None);
            }
            StepOutcome::Yielded(Some(value)) => {
                eprintln!("(yield: {value})");
                interpreter.resume(&mut crucible, None);
            }
            StepOutcome::Yielded(None) => {
                let mut line = String::new();
                if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
                    return ExitCode::SUCCESS;
                }
                let trimmed = line.trim_end_matches(['\n', '\r']).to_string();
                interpreter.resume(&mut crucible, Some(Value::String(trimmed)));
            }
            StepOutcome::Continue => unreachable!("run/run_with only returns on a non-Continue outcome"),
        }
    }
}

fn verbosity(level: TraceLevel) -> Verbosity {
    match level {
        TraceLevel::Off | TraceLevel::Default => Verbosity::Default,
        TraceLevel::Verbose => Verbosity::Verbose,
        TraceLevel::VeryVerbose => Verbosity::VeryVerbose,
    }
}

/// Drains the implicit `out` variable to stdout and clears it, mimicking
/// a terminal host's scene buffer.
fn flush_output(crucible: &mut Crucible) {
    if let Some(Value::String(s)) = crucible.get("out") {
        if !s.is_empty() {
            print!("{s}");
            let _ = crucible.set("out", Value::String(String::new()));
        }
    }
}
