// Result writer: one CSV row per created text.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::model::TextIndex;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create output file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush output: {0}")]
    Io(#[from] std::io::Error),
}

/// Write `index` to a new file at `path`, replacing any existing file.
/// Returns the number of rows written.
pub fn write_results(path: &Path, index: &TextIndex) -> Result<usize, OutputError> {
    info!("writing results to {}", path.display());
    let file = File::create(path).map_err(|source| OutputError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_records(file, index)
}

/// Write `id, body, target_word, value` rows in id order, every field
/// quoted. An absent value is an empty field.
pub fn write_records<W: Write>(writer: W, index: &TextIndex) -> Result<usize, OutputError> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .delimiter(b',')
        .quote(b'"')
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    let mut written = 0;
    for text in index.iter() {
        csv.write_record([
            text.id.to_string(),
            text.body.clone(),
            text.target_word.clone(),
            text.value.to_string(),
        ])?;
        written += 1;
    }
    csv.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InputRow, PredictedValue, PredictionText, TextId};
    use serde_json::json;
    use tempfile::tempdir;

    fn index_with(values: &[(u64, &str, &str, PredictedValue)]) -> TextIndex {
        let mut index = TextIndex::new();
        for (id, body, word, value) in values {
            let mut text = PredictionText::created(
                TextId(*id),
                InputRow {
                    body: body.to_string(),
                    target_word: word.to_string(),
                },
            );
            text.value = value.clone();
            index.insert(text);
        }
        index
    }

    #[test]
    fn quotes_every_field_and_renders_values() {
        let index = index_with(&[
            (2, "bad product", "bad", PredictedValue::from(json!(-0.6))),
            (1, "good, \"really\"", "good", PredictedValue::from(json!(0.8))),
            (3, "unscored", "meh", PredictedValue::Absent),
        ]);
        let mut out = Vec::new();
        let written = write_records(&mut out, &index).unwrap();
        assert_eq!(written, 3);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            concat!(
                "\"1\",\"good, \"\"really\"\"\",\"good\",\"0.8\"\n",
                "\"2\",\"bad product\",\"bad\",\"-0.6\"\n",
                "\"3\",\"unscored\",\"meh\",\"\"\n",
            )
        );
    }

    #[test]
    fn empty_index_creates_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.csv");
        let written = write_results(&path, &TextIndex::new()).unwrap();
        assert_eq!(written, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn unwritable_path_is_create_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("output.csv");
        let err = write_results(&path, &TextIndex::new()).unwrap_err();
        assert!(matches!(err, OutputError::Create { .. }));
    }
}
