//! Optional `tinder.toml` config: defaults for the `--fuel` and
//! library-search-path settings so a project doesn't have to repeat
//! them on every `tinder run` invocation.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Default instruction fuel, overridden by `--fuel` when given.
    pub fuel: Option<u64>,
    /// Directories searched, in order, for a library named in an
    /// `import` statement.
    #[serde(default)]
    pub library_paths: Vec<PathBuf>,
}

impl Config {
    /// Loads `path` if it exists; a missing file is not an error, since
    /// the config is entirely optional. A present-but-malformed file
    /// is.
    pub fn load(path: &Path) -> Result<Config, ExitCode> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                return Err(ExitCode::FAILURE);
            }
        };
        toml::from_str(&text).map_err(|err| {
            eprintln!("{}: {err}", path.display());
            ExitCode::FAILURE
        })
    }

    /// Searches `library_paths` in order for a `<name>.tndr` file,
    /// returning the first match.
    pub fn resolve_library(&self, name: &str) -> Option<PathBuf> {
        self.library_paths.iter().map(|dir| dir.join(format!("{name}.tndr"))).find(|candidate| candidate.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_is_not_an_error() {
        let config = Config::load(Path::new("/nonexistent/tinder.toml")).unwrap();
        assert_eq!(config.fuel, None);
        assert!(config.library_paths.is_empty());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = toml::from_str::<Config>("bogus = 1").unwrap_err();
        assert!(err.to_string().contains("bogus") || err.to_string().contains("unknown"));
    }

    #[test]
    fn parses_fuel_and_library_paths() {
        let config: Config = toml::from_str("fuel = 5000\nlibrary_paths = [\"libs\", \"vendor/libs\"]").unwrap();
        assert_eq!(config.fuel, Some(5000));
        assert_eq!(config.library_paths, vec![PathBuf::from("libs"), PathBuf::from("vendor/libs")]);
    }
}
