//! Metric name and label definitions.
//!
//! Centralizing names keeps the vault crate, the config crate and any
//! dashboard in agreement about what is exported.

/// Encryption, decryption and key lifecycle metrics
pub mod crypto {
    /// Total number of envelopes produced
    pub const ENCRYPTIONS_TOTAL: &str = "strongbox_encryptions_total";
    /// Total number of envelopes successfully opened
    pub const DECRYPTIONS_TOTAL: &str = "strongbox_decryptions_total";
    /// Total number of envelopes that failed to open (any reason)
    pub const DECRYPTION_FAILURES_TOTAL: &str = "strongbox_decryption_failures_total";
    /// Composite decryptions satisfied by a member other than the current key
    pub const COMPOSITE_FALLBACKS_TOTAL: &str = "strongbox_composite_fallbacks_total";
    /// Total number of identifiers loaded from a key source
    pub const KEY_LOADS_TOTAL: &str = "strongbox_key_loads_total";
    /// Total number of successful key ring reloads
    pub const KEY_RELOADS_TOTAL: &str = "strongbox_key_reloads_total";
    /// Number of identifiers in the currently published key set
    pub const IDENTIFIERS_LOADED: &str = "strongbox_identifiers_loaded";
}

/// Key source (configuration) metrics
pub mod source {
    /// Total number of key file reads
    pub const FILE_READS_TOTAL: &str = "strongbox_key_file_reads_total";
    /// Total number of key file read or parse failures
    pub const FILE_ERRORS_TOTAL: &str = "strongbox_key_file_errors_total";
    /// Total number of change events emitted by the key file watcher
    pub const WATCH_EVENTS_TOTAL: &str = "strongbox_key_file_watch_events_total";
}

/// Common label keys used across metrics
pub mod labels {
    /// Cipher suite name (`aes-gcm`, `aes-pmac-siv`, ...)
    pub const CIPHER: &str = "cipher";
    /// Key source kind (`file`, `env`)
    pub const SOURCE: &str = "source";
}
