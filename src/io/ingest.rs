//! CSV ingest for a single measurement series.
//!
//! This module turns a CSV file into a `(layer, signal)` [`Dataset`].
//!
//! Design goals:
//! - **All-or-nothing rows**: one bad cell invalidates the whole source
//! - **Fail-soft public load**: [`load`] never errors, it returns an empty dataset
//! - **Precise diagnostics**: the reason is kept as a [`LoadFailure`] and logged
//! - **Header discovery** via [`list_columns`], which does fail hard

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use log::{debug, warn};
use thiserror::Error;

use crate::domain::{Dataset, LAYER_COLUMN, Record, SourceReference};
use crate::error::AppError;

/// Why a source could not be turned into a dataset.
#[derive(Debug, Error)]
pub enum LoadFailure {
    #[error("file not found at '{}': {source}. Please provide a correct path", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("`{column}` not in header, please choose a correct signal (see `spc columns`)")]
    ColumnNotFound { column: String },
    #[error("line {line}: {reason}")]
    MalformedSource { line: usize, reason: String },
}

impl LoadFailure {
    /// Short machine-friendly tag, used in exported reports.
    pub fn kind(&self) -> &'static str {
        match self {
            LoadFailure::SourceUnavailable { .. } => "source_unavailable",
            LoadFailure::ColumnNotFound { .. } => "column_not_found",
            LoadFailure::MalformedSource { .. } => "malformed_source",
        }
    }
}

/// Load the referenced series, or an empty dataset if that is not possible.
///
/// The failure reason is logged at `warn` level; callers that need it should
/// use [`try_load`].
pub fn load(source: &SourceReference) -> Dataset {
    match try_load(source) {
        Ok(dataset) => dataset,
        Err(failure) => {
            warn!("{failure}");
            Dataset::empty()
        }
    }
}

/// Load the referenced series, keeping the failure reason.
pub fn try_load(source: &SourceReference) -> Result<Dataset, LoadFailure> {
    let file = File::open(source.path()).map_err(|e| LoadFailure::SourceUnavailable {
        path: source.path().to_path_buf(),
        source: e,
    })?;
    let dataset = read_dataset(file, source.signal())?;
    debug!(
        "loaded {} rows of `{}` from '{}'",
        dataset.len(),
        source.signal(),
        source.path().display()
    );
    Ok(dataset)
}

/// Fail-soft load from an already-open stream.
pub fn load_reader<R: Read>(reader: R, signal: &str) -> Dataset {
    match read_dataset(reader, signal) {
        Ok(dataset) => dataset,
        Err(failure) => {
            warn!("{failure}");
            Dataset::empty()
        }
    }
}

/// Parse CSV text from `reader` and extract the `layer` and `signal` columns.
pub fn read_dataset<R: Read>(reader: R, signal: &str) -> Result<Dataset, LoadFailure> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Fields)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| LoadFailure::MalformedSource {
            line: 1,
            reason: format!("failed to read CSV header: {e}"),
        })?
        .clone();
    let header_map = build_header_map(&headers);

    let signal_idx = column_index(&header_map, signal)?;
    let layer_idx = column_index(&header_map, LAYER_COLUMN)?;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, and CSV lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| LoadFailure::MalformedSource {
            line,
            reason: format!("CSV parse error: {e}"),
        })?;

        let layer = parse_cell(&record, layer_idx, LAYER_COLUMN, line)?;
        let value = parse_cell(&record, signal_idx, signal, line)?;
        records.push(Record { layer, value });
    }

    Ok(Dataset::new(signal, records))
}

/// Column names of the source's header row, in file order.
///
/// Unlike [`load`] this fails hard: it is meant to be called before the caller
/// commits to a signal, where a missing file is actionable.
pub fn list_columns(path: &Path) -> Result<Vec<String>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::usage(format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_columns(file)
        .map_err(|e| {
            AppError::usage(format!("Failed to read CSV header of '{}': {e}", path.display()))
        })
}

/// Header row of a CSV stream.
pub fn read_columns<R: Read>(reader: R) -> Result<Vec<String>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().from_reader(reader);
    let headers = reader.headers()?;
    Ok(headers
        .iter()
        .enumerate()
        .map(|(idx, name)| normalize_header_name(idx, name).to_string())
        .collect())
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for duplicated names.
        map.entry(normalize_header_name(idx, name).to_string())
            .or_insert(idx);
    }
    map
}

fn normalize_header_name(idx: usize, name: &str) -> &str {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, `layer` would never be found.
    if idx == 0 {
        name.trim_start_matches('\u{feff}')
    } else {
        name
    }
}

fn column_index(header_map: &HashMap<String, usize>, name: &str) -> Result<usize, LoadFailure> {
    header_map
        .get(name)
        .copied()
        .ok_or_else(|| LoadFailure::ColumnNotFound {
            column: name.to_string(),
        })
}

fn parse_cell(
    record: &StringRecord,
    idx: usize,
    name: &str,
    line: usize,
) -> Result<f64, LoadFailure> {
    let raw = record
        .get(idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| LoadFailure::MalformedSource {
            line,
            reason: format!("missing `{name}` value"),
        })?;
    raw.parse::<f64>().map_err(|_| LoadFailure::MalformedSource {
        line,
        reason: format!("`{name}` value '{raw}' is not numeric"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_SIGNAL;
    use crate::test_support::{series_csv, write_fixture};

    #[test]
    fn loads_valid_csv_in_row_order() {
        let path = write_fixture(
            "test_data.csv",
            &series_csv(DEFAULT_SIGNAL, &[0.5, 0.6, 0.7, 0.8, 0.9]),
        );
        let ds = load(&SourceReference::new(&path));

        assert_eq!(ds.len(), 5);
        assert_eq!(ds.column_names(), vec!["layer", "mean_ir_pwr"]);
        assert_eq!(ds.column("layer"), Some(vec![1.0, 2.0, 3.0, 4.0, 5.0]));
        assert_eq!(ds.column(DEFAULT_SIGNAL), Some(vec![0.5, 0.6, 0.7, 0.8, 0.9]));
    }

    #[test]
    fn extra_columns_are_ignored() {
        let path = write_fixture(
            "extra.csv",
            "extra,mean_ir_pwr,layer\nx,0.25,10\ny,0.5,11\n",
        );
        let ds = load(&SourceReference::new(&path));
        assert_eq!(ds.points(), vec![(10.0, 0.25), (11.0, 0.5)]);
    }

    #[test]
    fn non_csv_text_yields_empty_dataset() {
        let path = write_fixture("invalid_data.txt", "This is not a CSV file.");
        let source = SourceReference::new(&path);

        assert!(load(&source).is_empty());
        assert!(matches!(
            try_load(&source),
            Err(LoadFailure::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn missing_file_yields_empty_dataset() {
        let source = SourceReference::new("nonexistent_file.csv");

        let ds = load(&source);
        assert!(ds.is_empty());
        assert!(ds.column_names().is_empty());

        let err = try_load(&source).unwrap_err();
        assert_eq!(err.kind(), "source_unavailable");
    }

    #[test]
    fn unknown_signal_yields_empty_dataset() {
        let path = write_fixture("signal.csv", &series_csv("signal", &[1.0, 2.0]));
        let source = SourceReference::with_signal(&path, "not_a_column");

        assert!(load(&source).is_empty());
        match try_load(&source) {
            Err(LoadFailure::ColumnNotFound { column }) => assert_eq!(column, "not_a_column"),
            other => panic!("expected ColumnNotFound, got {other:?}"),
        }
    }

    #[test]
    fn missing_layer_column_yields_empty_dataset() {
        let path = write_fixture("nolayer.csv", "mean_ir_pwr\n0.1\n0.2\n");
        match try_load(&SourceReference::new(&path)) {
            Err(LoadFailure::ColumnNotFound { column }) => assert_eq!(column, "layer"),
            other => panic!("expected ColumnNotFound, got {other:?}"),
        }
    }

    #[test]
    fn one_bad_cell_invalidates_all_rows() {
        let csv = "layer,mean_ir_pwr\n1,0.1\n2,abc\n3,0.3\n";
        let ds = load_reader(csv.as_bytes(), DEFAULT_SIGNAL);
        assert!(ds.is_empty());

        match read_dataset(csv.as_bytes(), DEFAULT_SIGNAL) {
            Err(LoadFailure::MalformedSource { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected MalformedSource, got {other:?}"),
        }
    }

    #[test]
    fn empty_cell_is_malformed() {
        let csv = "layer,mean_ir_pwr\n1,0.1\n2,\n";
        assert!(matches!(
            read_dataset(csv.as_bytes(), DEFAULT_SIGNAL),
            Err(LoadFailure::MalformedSource { line: 3, .. })
        ));
    }

    #[test]
    fn ragged_rows_are_malformed() {
        let csv = "layer,mean_ir_pwr\n1,0.1\n2,0.2,extra\n";
        assert!(load_reader(csv.as_bytes(), DEFAULT_SIGNAL).is_empty());
    }

    #[test]
    fn empty_source_yields_empty_dataset() {
        assert!(load_reader("".as_bytes(), DEFAULT_SIGNAL).is_empty());
    }

    #[test]
    fn header_only_source_keeps_columns() {
        let ds = load_reader("layer,mean_ir_pwr\n".as_bytes(), DEFAULT_SIGNAL);
        assert!(ds.is_empty());
        assert_eq!(ds.column_names(), vec!["layer", "mean_ir_pwr"]);
    }

    #[test]
    fn bom_prefixed_header_is_recognized() {
        let csv = "\u{feff}layer,mean_ir_pwr\n1,0.5\n";
        let ds = load_reader(csv.as_bytes(), DEFAULT_SIGNAL);
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn whitespace_around_numbers_is_accepted() {
        let csv = "layer,mean_ir_pwr\n 1 , 0.5 \n";
        let ds = load_reader(csv.as_bytes(), DEFAULT_SIGNAL);
        assert_eq!(ds.points(), vec![(1.0, 0.5)]);
    }

    #[test]
    fn list_columns_preserves_header_order() {
        let path = write_fixture("columns.csv", "layer,mean_ir_pwr,extra\n1,0.5,x\n");
        let columns = list_columns(&path).unwrap();
        assert_eq!(columns, vec!["layer", "mean_ir_pwr", "extra"]);
    }

    #[test]
    fn list_columns_fails_hard_on_missing_file() {
        let err = list_columns(Path::new("nonexistent_file.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
