//! `tinder dump SOURCE` — print the compiled flat instruction table,
//! as text or as the full serialized `CompiledScript`.

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use crate::cli::DumpFormat;
use crate::util::read_source;

pub fn run(source: &Path, format: DumpFormat) -> ExitCode {
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

    match format {
        DumpFormat::Text => {
            for (idx, line) in script.lines.iter().enumerate() {
                let guard = match &line.condition {
                    Some(cond) => format!(" if {cond:?}"),
                    None => String::new(),
                };
                println!("{idx:04} [{:>4}] {:?}{guard}", line.source_line, line.instruction);
            }
        }
        DumpFormat::Json => match serde_json::to_string_pretty(&script) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("failed to serialize compiled script: {err}");
                return ExitCode::FAILURE;
            }
        },
        DumpFormat::Postcard => match script.to_postcard() {
            Ok(bytes) => {
                if let Err(err) = std::io::stdout().write_all(&bytes) {
                    eprintln!("failed to write postcard bytes: {err}");
                    return ExitCode::FAILURE;
                }
            }
            Err(err) => {
                eprintln!("failed to serialize compiled script: {err}");
                return ExitCode::FAILURE;
            }
        },
    }
    ExitCode::SUCCESS
}
