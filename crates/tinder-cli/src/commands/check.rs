//! `tinder check SOURCE` — compile only, reporting the first
//! parse/compile error found.

use std::path::Path;
use std::process::ExitCode;

use crate::util::read_source;

pub fn run(source: &Path) -> ExitCode {
    let text = match read_source(source) {
        Ok(t) => t,
        Err(code) => return code,
    };
    match tinder_compiler::compile(&text) {
        Ok(script) => {
            println!("ok: {} compiled lines", script.lines.len());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}: {err}", source.display());
            ExitCode::FAILURE
        }
    }
}
