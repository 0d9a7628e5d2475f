//! Key sources backed by files and the environment.
//!
//! Key files: `strongbox.toml`, `strongbox.yaml`, `strongbox.yml` or
//! `strongbox.json`, each holding a `keys` array of records.
//! Searched in `./` then `~/.config/strongbox/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values, so secrets can
//! be injected without writing them to disk.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;
pub mod watcher;

pub use {
    error::{ConfigError, Result},
    loader::{
        ENV_KEYS_VAR, EnvKeySource, FileKeySource, config_dir, find_key_file, load_key_file,
    },
    schema::{KeyEntry, KeyFile},
    validate::{Diagnostic, Severity, ValidationResult},
    watcher::{KeyFileWatcher, KeyWatchEvent},
};
