// Command line surface. Flags take the `--name=value` form (clap also
// accepts `--name value`).

use clap::Parser;
use std::path::PathBuf;

use crate::api::DEFAULT_ENDPOINT;
use crate::config::{
    Config, ConfigError, Credential, Credentials, PredictOptions, DEFAULT_COLLECTION_NAME,
    DEFAULT_MODEL_ID, DEFAULT_ROW_LIMIT, DEFAULT_WAIT_SECS,
};
use crate::model::Language;

#[derive(Parser, Debug)]
#[clap(name = "try-sentiment")]
#[clap(about = "Upload texts from a CSV file to Saplo and write back their sentiment")]
#[clap(version)]
pub struct Args {
    #[clap(long, env = "SAPLO_API_KEY", help = "Saplo API key")]
    pub apikey: Option<String>,

    #[clap(long, env = "SAPLO_SECRET_KEY", hide_env_values = true, help = "Saplo secret key")]
    pub secretkey: Option<String>,

    #[clap(long, default_value = "input.csv", help = "CSV file with text,target_word rows")]
    pub input: PathBuf,

    #[clap(long, default_value = "output.csv", help = "CSV file to write results to")]
    pub output: PathBuf,

    #[clap(long, env = "SAPLO_API_URL", default_value = DEFAULT_ENDPOINT, help = "JSON-RPC endpoint")]
    pub endpoint: String,

    #[clap(long, default_value = DEFAULT_COLLECTION_NAME, help = "Name of the collection to store texts in")]
    pub collection: String,

    #[clap(long, default_value_t = DEFAULT_MODEL_ID, help = "Sentiment model id")]
    pub model_id: u64,

    #[clap(long, default_value_t = DEFAULT_WAIT_SECS, help = "Seconds the server may wait per prediction")]
    pub wait: u64,

    #[clap(long, default_value_t = DEFAULT_ROW_LIMIT, help = "Maximum number of input rows to read")]
    pub row_limit: usize,

    #[clap(long, help = "Do not draw progress spinners")]
    pub no_progress: bool,
}

impl Args {
    /// Validate the arguments. Every missing credential is reported, not
    /// just the first one.
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let api_key = self.apikey.filter(|k| !k.is_empty());
        let secret_key = self.secretkey.filter(|k| !k.is_empty());

        let (api_key, secret_key) = match (api_key, secret_key) {
            (Some(a), Some(s)) => (a, s),
            (a, s) => {
                let mut missing = Vec::new();
                if a.is_none() {
                    missing.push(Credential::ApiKey);
                }
                if s.is_none() {
                    missing.push(Credential::SecretKey);
                }
                return Err(ConfigError::MissingCredentials(missing));
            }
        };

        Ok(Config {
            credentials: Credentials::new(api_key, secret_key),
            endpoint: self.endpoint,
            input: self.input,
            output: self.output,
            collection_name: self.collection,
            language: Language::En,
            predict: PredictOptions {
                model_id: self.model_id,
                wait: self.wait,
            },
            row_limit: self.row_limit,
            show_progress: !self.no_progress,
        })
    }
}
