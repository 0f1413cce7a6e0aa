//! Runtime configuration.
//!
//! Loaded once at process start and threaded through explicitly; nothing in
//! the crate reads configuration ambiently.

use std::{path::Path, time::Duration};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// RUST_LOG compatible filter string.
    #[serde(default = "default_log")]
    pub log: String,

    /// RPC endpoint transactions are sent to.
    pub rpc_url: String,

    /// Escrow program id, base58.
    #[serde(default = "default_program_id")]
    pub program_id: String,

    /// Whole-number percentage added on top of the offered amount.
    #[serde(default = "default_fee_percent")]
    pub fee_percent: u64,

    /// Upper bound on the confirmation wait, in seconds.
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
}

fn default_log() -> String {
    "info".to_string()
}

fn default_program_id() -> String {
    "7V3CWKtaLtYqx82Rm96ph8DutCP2LQpfkz8URpH3XAxT".to_string()
}

fn default_fee_percent() -> u64 {
    4
}

fn default_confirmation_timeout_secs() -> u64 {
    30
}

impl Settings {
    /// Loads settings from an optional file, overridable with environment
    /// variables prefixed `NOFFER_` (double underscore separates sections).
    pub fn new<P: AsRef<Path>>(path: Option<P>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(file) = path {
            builder = builder.add_source(
                config::File::with_name(&file.as_ref().to_string_lossy()).required(false),
            );
        }
        builder
            .add_source(config::Environment::with_prefix("NOFFER").separator("__"))
            .build()
            .and_then(|config| config.try_deserialize())
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}
