// Prediction: one `collection.predict` per distinct target word, with the
// returned values written back onto the texts of this run.

use tracing::{error, info, warn};

use crate::api::{ApiError, PredictRequest, SaploApi};
use crate::config::PredictOptions;
use crate::model::{Collection, TargetWords, TextIndex, UnknownText};
use crate::progress::Progress;

/// Counts gathered while applying predictions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PredictSummary {
    /// Number of predict calls issued.
    pub calls: usize,
    /// Values stored on a text of this run.
    pub applied: usize,
    /// Predictions naming a text this run never created.
    pub unknown_ids: usize,
    /// Target words whose call was rejected by the service.
    pub skipped_words: usize,
}

/// Predict every target word and apply the results to `index`.
///
/// A rejected call skips its word. Any other failure is returned
/// immediately and leaves later words unpredicted.
pub fn predict_all<A: SaploApi + ?Sized>(
    api: &A,
    collection: &Collection,
    target_words: &TargetWords,
    index: &mut TextIndex,
    options: PredictOptions,
    progress: Progress,
) -> Result<PredictSummary, ApiError> {
    info!(
        model_id = options.model_id,
        "predicting sentiment for {} target word(s)",
        target_words.len()
    );

    let mut summary = PredictSummary::default();
    for target_word in target_words {
        let request = PredictRequest {
            collection_id: collection.id,
            target_word: target_word.clone(),
            model_id: options.model_id,
            wait: options.wait,
        };

        let spinner = progress.spinner(format!("Predicting '{}'...", target_word));
        summary.calls += 1;
        let result = api.predict(&request);
        spinner.finish_and_clear();

        let predictions = match result {
            Ok(predictions) => predictions,
            Err(e) if e.is_application() => {
                warn!(target_word = %target_word, code = ?e.code(), "prediction rejected, skipping: {}", e);
                summary.skipped_words += 1;
                continue;
            }
            Err(e) => {
                error!(target_word = %target_word, "an error occurred while predicting: {}", e);
                return Err(e);
            }
        };

        for prediction in predictions {
            match index.apply(prediction) {
                Ok(()) => summary.applied += 1,
                Err(UnknownText(id)) => {
                    warn!(text_id = %id, target_word = %target_word, "prediction for unknown text, ignoring");
                    summary.unknown_ids += 1;
                }
            }
        }
    }

    info!(
        applied = summary.applied,
        unknown_ids = summary.unknown_ids,
        skipped_words = summary.skipped_words,
        "predictions applied"
    );
    Ok(summary)
}
