use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::backend::DEFAULT_COMPILER;
use crate::error::{Error, Result};
use crate::paths;

/// Config file looked up in the working directory when none is named.
pub const DEFAULT_CONFIG_FILE: &str = "hyperion.config.json";

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "HYPERION_CONFIG";

/// Environment variable overriding the compiler command.
///
/// The value is split on whitespace, so a compiler path containing spaces
/// cannot be given here; use the config's `compiler` argv list instead.
pub const COMPILER_ENV: &str = "HYPERION_COMPILER";

/// Project layout and compiler command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    /// Directory holding `.hl` sources
    pub src_dir: PathBuf,
    /// Directory artifacts are written to, created on demand
    pub build_dir: PathBuf,
    /// Directory holding `<name>.params.json` files
    pub params_dir: PathBuf,
    /// Argv of the external compiler
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler: Option<Vec<String>>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            src_dir: PathBuf::from("src"),
            build_dir: PathBuf::from("build"),
            params_dir: PathBuf::from("params"),
            compiler: None,
        }
    }
}

impl ProjectConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = paths::read_file(path)?;
        serde_json::from_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Pick the config for this run: the CLI path, then `$HYPERION_CONFIG`,
    /// then `hyperion.config.json` if present, then the defaults.
    pub fn resolve(cli_config: Option<PathBuf>) -> Result<Self> {
        let explicit = cli_config.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading project config");
            return Self::load_from_file(path);
        }

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if paths::exists(default_path) {
            debug!(path = %default_path.display(), "loading project config");
            Self::load_from_file(default_path)
        } else {
            debug!("no project config found, using defaults");
            Ok(Self::default())
        }
    }

    /// Compiler argv: `$HYPERION_COMPILER`, then the config, then the default.
    pub fn compiler_command(&self) -> Vec<String> {
        pick_compiler(std::env::var(COMPILER_ENV).ok().as_deref(), self.compiler.as_deref())
    }
}

fn pick_compiler(from_env: Option<&str>, configured: Option<&[String]>) -> Vec<String> {
    let from_env = from_env
        .map(|cmd| cmd.split_whitespace().map(String::from).collect::<Vec<_>>())
        .filter(|argv| !argv.is_empty());

    from_env
        .or_else(|| configured.filter(|argv| !argv.is_empty()).map(<[String]>::to_vec))
        .unwrap_or_else(|| vec![DEFAULT_COMPILER.to_string()])
}
