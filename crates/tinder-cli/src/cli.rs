//! Argument parsing for the `tinder` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum TraceLevel {
    /// No tracing output (default).
    #[default]
    Off,
    /// Instruction kind and line per step.
    Default,
    /// Adds jump/call/return targets and catch installs.
    Verbose,
    /// Adds label-hit and raw signal detail.
    VeryVerbose,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum DumpFormat {
    /// One instruction per line, human-readable.
    #[default]
    Text,
    /// The full `CompiledScript`, serialized as JSON.
    Json,
    /// The full `CompiledScript`, serialized as postcard bytes, written
    /// raw to stdout.
    Postcard,
}

#[derive(Parser)]
#[command(name = "tinder", bin_name = "tinder")]
#[command(about = "Compile and run Tinder scripts against a terminal-backed Crucible")]
pub struct Cli {
    /// Path to a TOML config file with default fuel/library-path
    /// settings. Silently ignored if it doesn't exist.
    #[arg(long, global = true, default_value = "tinder.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile a script and report parse/compile errors, if any.
    Check {
        /// Path to a `.tndr` script.
        source: PathBuf,
    },

    /// Compile and run a script, reading `input` prompts from stdin
    /// and writing `write`/`output` to stdout.
    #[command(after_help = r#"EXAMPLES:
  tinder run login.tndr
  tinder run login.tndr --trace default
  tinder run login.tndr --fuel 10000"#)]
    Run {
        /// Path to a `.tndr` script.
        source: PathBuf,

        /// Step-by-step execution trace, written to stderr.
        #[arg(long, value_enum, default_value = "off")]
        trace: TraceLevel,

        /// Instruction budget before the run aborts with a fatal
        /// `FuelExhausted` error.
        #[arg(long)]
        fuel: Option<u64>,
    },

    /// Compile a script and print its flat instruction table.
    Dump {
        /// Path to a `.tndr` script.
        source: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value = "text")]
        format: DumpFormat,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_accepts_trace_and_fuel_flags() {
        let cli = Cli::try_parse_from(["tinder", "run", "game.tndr", "--trace", "verbose", "--fuel", "500"]).unwrap();
        match cli.command {
            Command::Run { source, trace, fuel } => {
                assert_eq!(source, PathBuf::from("game.tndr"));
                assert!(matches!(trace, TraceLevel::Verbose));
                assert_eq!(fuel, Some(500));
            }
            _ => panic!("expected Run"),
        }
    }

    #[test]
    fn dump_defaults_to_text_format() {
        let cli = Cli::try_parse_from(["tinder", "dump", "game.tndr"]).unwrap();
        match cli.command {
            Command::Dump { format, .. } => assert!(matches!(format, DumpFormat::Text)),
            _ => panic!("expected Dump"),
        }
    }

    #[test]
    fn dump_accepts_postcard_format() {
        let cli = Cli::try_parse_from(["tinder", "dump", "game.tndr", "--format", "postcard"]).unwrap();
        match cli.command {
            Command::Dump { format, .. } => assert!(matches!(format, DumpFormat::Postcard)),
            _ => panic!("expected Dump"),
        }
    }

    #[test]
    fn config_defaults_to_tinder_toml_in_cwd() {
        let cli = Cli::try_parse_from(["tinder", "dump", "game.tndr"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("tinder.toml"));
    }

    #[test]
    fn config_flag_overrides_the_default_path() {
        let cli = Cli::try_parse_from(["tinder", "--config", "ci.toml", "dump", "game.tndr"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("ci.toml"));
    }

    #[test]
    fn check_requires_a_source_path() {
        assert!(Cli::try_parse_from(["tinder", "check"]).is_err());
    }
}
