// The whole run: resolve collection -> ingest -> predict -> write.
// Each stage runs once, in order; the first fatal error ends the run.

use std::fmt;
use thiserror::Error;
use tracing::{error, info};

use crate::api::{ApiError, SaploApi};
use crate::collection::resolve_collection;
use crate::config::Config;
use crate::ingest::{ingest_texts, read_rows, IngestError};
use crate::model::Collection;
use crate::output::{write_results, OutputError};
use crate::predict::{predict_all, PredictSummary};
use crate::progress::Progress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    ResolvingCollection,
    Ingesting,
    Predicting,
    Writing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::ResolvingCollection => "resolving collection",
            Stage::Ingesting => "ingesting",
            Stage::Predicting => "predicting",
            Stage::Writing => "writing",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not prepare collection: {0}")]
    Resolve(#[source] ApiError),

    #[error(transparent)]
    Input(#[from] IngestError),

    #[error("prediction aborted: {0}")]
    Predict(#[source] ApiError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl PipelineError {
    /// Stage that was running when the error occurred.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Resolve(_) => Stage::ResolvingCollection,
            PipelineError::Input(_) => Stage::Ingesting,
            PipelineError::Predict(_) => Stage::Predicting,
            PipelineError::Output(_) => Stage::Writing,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub collection: Collection,
    /// Texts created remotely and written to the output.
    pub ingested: usize,
    pub failed_texts: usize,
    pub predict: PredictSummary,
    pub written: usize,
}

/// Run every stage against `api` with the settings in `config`.
pub fn run<A: SaploApi + ?Sized>(api: &A, config: &Config) -> Result<RunReport, PipelineError> {
    let result = run_stages(api, config);
    if let Err(e) = &result {
        error!(stage = %e.stage(), "run failed: {}", e);
    }
    result
}

fn run_stages<A: SaploApi + ?Sized>(api: &A, config: &Config) -> Result<RunReport, PipelineError> {
    let progress = Progress::new(config.show_progress);
    let mut stage = Stage::Idle;
    let mut advance = |next: Stage| {
        info!(from = %stage, to = %next, "stage");
        stage = next;
    };

    advance(Stage::ResolvingCollection);
    let collection = resolve_collection(api, &config.collection_name, config.language)
        .map_err(PipelineError::Resolve)?;

    advance(Stage::Ingesting);
    let rows = read_rows(&config.input, config.row_limit)?;
    let mut ingested = ingest_texts(api, &collection, rows, progress);

    advance(Stage::Predicting);
    let predict = predict_all(
        api,
        &collection,
        &ingested.target_words,
        &mut ingested.index,
        config.predict,
        progress,
    )
    .map_err(PipelineError::Predict)?;

    advance(Stage::Writing);
    let written = write_results(&config.output, &ingested.index)?;

    advance(Stage::Done);
    Ok(RunReport {
        collection,
        ingested: ingested.index.len(),
        failed_texts: ingested.failed,
        predict,
        written,
    })
}
