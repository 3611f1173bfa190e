//! Small helpers shared by the CLI's subcommands.

use std::path::Path;
use std::process::ExitCode;

pub fn read_source(path: &Path) -> Result<String, ExitCode> {
    std::fs::read_to_string(path).map_err(|err| {
        eprintln!("{}: {err}", path.display());
        ExitCode::FAILURE
    })
}
