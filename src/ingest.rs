// Text ingestion: read the input CSV and register every row as a text in
// the collection.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::api::SaploApi;
use crate::model::{Collection, InputRow, PredictionText, TargetWords, TextIndex};
use crate::progress::Progress;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to open input file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read input CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Read at most `limit` rows from the CSV file at `path`.
pub fn read_rows(path: &Path, limit: usize) -> Result<Vec<InputRow>, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_rows_from(file, limit)
}

/// Read at most `limit` rows of `body,target_word` from `reader`.
///
/// There is no header row. Rows with fewer than two fields are skipped but
/// still count toward `limit`; extra fields are ignored.
pub fn read_rows_from<R: Read>(reader: R, limit: usize) -> Result<Vec<InputRow>, IngestError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b',')
        .quote(b'"')
        .escape(Some(b'\\'))
        .double_quote(true)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (consumed, record) in csv.records().enumerate() {
        if consumed >= limit {
            info!("stopped reading input: this demo is limited to {} texts", limit);
            break;
        }
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        match (record.get(0), record.get(1)) {
            (Some(body), Some(target_word)) => rows.push(InputRow {
                body: body.to_string(),
                target_word: target_word.to_string(),
            }),
            _ => warn!(line, "skipping row with {} field(s), expected text and target word", record.len()),
        }
    }
    Ok(rows)
}

/// Outcome of registering the input rows.
#[derive(Debug, Default)]
pub struct Ingested {
    pub index: TextIndex,
    pub target_words: TargetWords,
    /// Rows the server refused to create.
    pub failed: usize,
}

/// Create one remote text per row. A failed create drops that row and the
/// batch carries on.
pub fn ingest_texts<A: SaploApi + ?Sized>(
    api: &A,
    collection: &Collection,
    rows: Vec<InputRow>,
    progress: Progress,
) -> Ingested {
    info!("adding {} text(s) to collection '{}'", rows.len(), collection.name);
    let bar = progress.bar(rows.len() as u64, "Adding texts");

    let mut ingested = Ingested::default();
    for row in rows {
        // Recorded before the create call, so the word is predicted even
        // if this row is dropped.
        ingested.target_words.insert(row.target_word.clone());

        match api.create_text(collection.id, &row.body) {
            Ok(id) => {
                ingested.index.insert(PredictionText::created(id, row));
            }
            Err(e) => {
                warn!(code = ?e.code(), "unable to create text: {}", e);
                ingested.failed += 1;
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    info!(
        created = ingested.index.len(),
        failed = ingested.failed,
        target_words = ingested.target_words.len(),
        "texts added"
    );
    ingested
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn reads_quoted_fields_with_commas() {
        let input = "\"good, really good product\",\"good\"\nplain text,bad\n";
        let rows = read_rows_from(input.as_bytes(), 20).unwrap();
        assert_eq!(
            rows,
            vec![
                InputRow {
                    body: "good, really good product".into(),
                    target_word: "good".into()
                },
                InputRow {
                    body: "plain text".into(),
                    target_word: "bad".into()
                },
            ]
        );
    }

    #[test]
    fn backslash_escapes_quote_inside_quoted_field() {
        let input = "\"b \\\"q\\\"\",\"y\"\n";
        let rows = read_rows_from(input.as_bytes(), 20).unwrap();
        assert_eq!(
            rows,
            vec![InputRow {
                body: "b \"q\"".into(),
                target_word: "y".into()
            }]
        );
    }

    #[test]
    fn doubled_quote_still_reads_as_quote() {
        let rows = read_rows_from("\"say \"\"hi\"\"\",greet\n".as_bytes(), 20).unwrap();
        assert_eq!(rows[0].body, "say \"hi\"");
    }

    #[test]
    fn first_row_is_data_not_header() {
        let rows = read_rows_from("text,target\n".as_bytes(), 20).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].body, "text");
    }

    #[test]
    fn stops_at_limit() {
        let input: String = (0..25).map(|i| format!("text {i},word\n")).collect();
        let rows = read_rows_from(input.as_bytes(), 20).unwrap();
        assert_eq!(rows.len(), 20);
        assert_eq!(rows[19].body, "text 19");
    }

    #[test]
    fn short_rows_are_skipped_but_counted() {
        let input = "only body\n\"a\",\"x\"\n\"b\",\"y\"\n\"c\",\"z\"\n";
        let rows = read_rows_from(input.as_bytes(), 3).unwrap();
        let bodies: Vec<&str> = rows.iter().map(|r| r.body.as_str()).collect();
        assert_eq!(bodies, vec!["a", "b"]);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let rows = read_rows_from("body,word,extra,more\n".as_bytes(), 20).unwrap();
        assert_eq!(rows[0].target_word, "word");
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(read_rows_from("".as_bytes(), 20).unwrap().is_empty());
    }

    #[test]
    fn read_rows_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "\"good product\",\"good\"").unwrap();
        let rows = read_rows(file.path(), 20).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].target_word, "good");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_rows(Path::new("does/not/exist.csv"), 20).unwrap_err();
        assert!(matches!(err, IngestError::Open { .. }));
        assert!(err.to_string().contains("does/not/exist.csv"));
    }
}
