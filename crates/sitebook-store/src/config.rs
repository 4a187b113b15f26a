use std::env;
use std::path::PathBuf;

/// State-file configuration.
///
/// The path normally comes from `SITEBOOK_STATE_PATH` (see
/// [`Self::path_from_env`]) or `<data_dir>/sitebook/state.json`.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path of the JSON document holding the EPO log and notes.
    pub state_path: PathBuf,
}

impl StoreConfig {
    /// File name used inside the data directory.
    pub const DEFAULT_FILE_NAME: &str = "state.json";

    /// Environment variable naming the state file.
    pub const ENV_VAR: &str = "SITEBOOK_STATE_PATH";

    /// The path in `SITEBOOK_STATE_PATH`, if set to something other than
    /// blank.
    pub fn path_from_env() -> Option<PathBuf> {
        env::var(Self::ENV_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    }

    /// Build a config from an explicit path (useful for tests and CLI flags).
    pub fn new(state_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
        }
    }

    /// The platform data directory joined with `sitebook/state.json`.
    ///
    /// Falls back to the current directory when no data directory is known.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sitebook")
            .join(Self::DEFAULT_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_ends_with_state_file() {
        let path = StoreConfig::default_path();
        assert!(
            path.ends_with("sitebook/state.json"),
            "unexpected default path: {}",
            path.display()
        );
    }

    #[test]
    fn explicit_new() {
        let cfg = StoreConfig::new("/tmp/sitebook-test/state.json");
        assert_eq!(cfg.state_path, PathBuf::from("/tmp/sitebook-test/state.json"));
    }
}
