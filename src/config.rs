// Run configuration. Built once at startup from the parsed command line and
// handed by reference to every stage.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::model::Language;

pub const DEFAULT_COLLECTION_NAME: &str = "Trying Saplo Sentiment";
pub const DEFAULT_MODEL_ID: u64 = 3827;
pub const DEFAULT_WAIT_SECS: u64 = 30;
pub const DEFAULT_ROW_LIMIT: usize = 20;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    secret_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Credentials {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Which credential is missing from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    ApiKey,
    SecretKey,
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::ApiKey => f.write_str("Missing API Key (--apikey)"),
            Credential::SecretKey => f.write_str("Missing Secret Key (--secretkey)"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing credentials: {}", .0.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", "))]
    MissingCredentials(Vec<Credential>),
}

/// Settings of the `collection.predict` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictOptions {
    pub model_id: u64,
    /// Seconds the server may spend before answering.
    pub wait: u64,
}

impl Default for PredictOptions {
    fn default() -> Self {
        PredictOptions {
            model_id: DEFAULT_MODEL_ID,
            wait: DEFAULT_WAIT_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub endpoint: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub collection_name: String,
    pub language: Language,
    pub predict: PredictOptions,
    /// Maximum number of input rows consumed.
    pub row_limit: usize,
    pub show_progress: bool,
}

impl Config {
    /// Configuration with the demo defaults and the given credentials.
    pub fn new(credentials: Credentials) -> Self {
        Config {
            credentials,
            endpoint: crate::api::DEFAULT_ENDPOINT.to_string(),
            input: PathBuf::from("input.csv"),
            output: PathBuf::from("output.csv"),
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            language: Language::En,
            predict: PredictOptions::default(),
            row_limit: DEFAULT_ROW_LIMIT,
            show_progress: true,
        }
    }
}
