// Entrypoint for the CLI application.
// - Keeps `main` small: validate arguments, connect a client and hand it to
//   the pipeline.
// - Exit status: 0 on success, 1 when the run fails, 2 when credentials are
//   missing.

use anyhow::Context;
use clap::Parser;
use saplo_sentiment_cli::{api::ApiClient, cli::Args, config::ConfigError, logging, pipeline};
use std::process;

fn main() {
    let args = Args::parse();

    let config = match args.into_config() {
        Ok(config) => config,
        Err(ConfigError::MissingCredentials(missing)) => {
            for credential in missing {
                eprintln!("{}", credential);
            }
            process::exit(2);
        }
    };

    logging::init();

    if let Err(err) = run(&config) {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run(config: &saplo_sentiment_cli::config::Config) -> anyhow::Result<()> {
    println!("All input arguments look good, let's run!");

    let api = ApiClient::connect(config.endpoint.clone(), &config.credentials)
        .context("Failed to authenticate against the Saplo API")?;

    let report = pipeline::run(&api, config)?;

    println!(
        "Done: {} text(s) written to {} ({} failed to upload, {} prediction(s) applied).",
        report.written,
        config.output.display(),
        report.failed_texts,
        report.predict.applied
    );
    Ok(())
}
