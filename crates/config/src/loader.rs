use std::path::{Path, PathBuf};

use {
    strongbox_vault::{CryptoError, KeyRecord, KeySource},
    tracing::debug,
};

#[cfg(feature = "metrics")]
use strongbox_metrics::{counter, labels, source as source_metrics};

use crate::{
    env_subst::substitute_env,
    error::{ConfigError, Result},
    schema::{KeyEntry, KeyFile},
};

/// Standard key file names, checked in order.
const KEY_FILENAMES: &[&str] = &[
    "strongbox.toml",
    "strongbox.yaml",
    "strongbox.yml",
    "strongbox.json",
];

/// Environment variable holding a JSON array of key records.
pub const ENV_KEYS_VAR: &str = "STRONGBOX_KEYS";

/// Load a key file from the given path (any supported format).
pub fn load_key_file(path: &Path) -> Result<KeyFile> {
    #[cfg(feature = "metrics")]
    counter!(source_metrics::FILE_READS_TOTAL, labels::SOURCE => "file").increment(1);

    let result = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })
        .and_then(|raw| parse_key_file(&substitute_env(&raw), path));

    #[cfg(feature = "metrics")]
    if result.is_err() {
        counter!(source_metrics::FILE_ERRORS_TOTAL, labels::SOURCE => "file").increment(1);
    }

    result
}

/// Parse key file contents, picking the format from the path's extension.
pub(crate) fn parse_key_file(raw: &str, path: &Path) -> Result<KeyFile> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
    }
}

/// Find the first key file in standard locations.
///
/// Search order:
/// 1. `./strongbox.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/strongbox/strongbox.{toml,yaml,yml,json}` (user-global)
pub fn find_key_file() -> Option<PathBuf> {
    let local = KEY_FILENAMES.iter().map(PathBuf::from);
    let global = config_dir()
        .into_iter()
        .flat_map(|dir| KEY_FILENAMES.iter().map(move |name| dir.join(name)));

    local.chain(global).find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/strongbox/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "strongbox").map(|d| d.config_dir().to_path_buf())
}

/// Key source reading a key file on every call, so reloads see edits.
#[derive(Debug, Clone)]
pub struct FileKeySource {
    path: PathBuf,
}

impl FileKeySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use the first key file found in the standard locations.
    pub fn discover() -> Result<Self> {
        let path = find_key_file().ok_or(ConfigError::NotFound)?;
        debug!(path = %path.display(), "using key file");
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeySource for FileKeySource {
    fn records(&self) -> strongbox_vault::Result<Vec<KeyRecord>> {
        let file = load_key_file(&self.path)?;
        debug!(path = %self.path.display(), records = file.keys.len(), "read key file");
        Ok(file.records())
    }
}

/// Key source reading a JSON array of records from an environment variable.
///
/// An unset variable yields no records rather than an error.
#[derive(Debug, Clone)]
pub struct EnvKeySource {
    var: String,
}

impl Default for EnvKeySource {
    fn default() -> Self {
        Self::new(ENV_KEYS_VAR)
    }
}

impl EnvKeySource {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    fn parse(raw: &str) -> Result<Vec<KeyRecord>> {
        let entries: Vec<KeyEntry> = serde_json::from_str(raw)?;
        Ok(entries.iter().map(KeyEntry::to_record).collect())
    }
}

impl KeySource for EnvKeySource {
    fn records(&self) -> strongbox_vault::Result<Vec<KeyRecord>> {
        #[cfg(feature = "metrics")]
        counter!(source_metrics::FILE_READS_TOTAL, labels::SOURCE => "env").increment(1);

        match std::env::var(&self.var) {
            Ok(raw) => Ok(Self::parse(&raw)?),
            Err(std::env::VarError::NotPresent) => Ok(Vec::new()),
            Err(e) => Err(CryptoError::key_source(format!("{}: {e}", self.var))),
        }
    }
}
