use std::fmt;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type, UInt64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{AppRecord, Dataset};

// ---------------------------------------------------------------------------
// Source schema
// ---------------------------------------------------------------------------

pub const COL_NAME: &str = "App Name";
pub const COL_CATEGORY: &str = "Category";
pub const COL_RATING: &str = "Rating";
pub const COL_MIN_INSTALLS: &str = "Minimum Installs";
pub const COL_MAX_INSTALLS: &str = "Maximum Installs";
pub const COL_FREE: &str = "Free";
pub const COL_CONTENT_RATING: &str = "Content Rating";

/// Columns every source must carry. Anything else is ignored.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_NAME,
    COL_CATEGORY,
    COL_RATING,
    COL_MIN_INSTALLS,
    COL_MAX_INSTALLS,
    COL_FREE,
    COL_CONTENT_RATING,
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the app catalog from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – the Play Store export, header row with the column names above
/// * `.json`    – `[{ "App Name": "...", "Category": "...", ... }, ...]`
/// * `.parquet` – one column per field, string / integer / float / bool typed
///
/// Rows with a missing or unreadable field are dropped and counted; a missing
/// column or an unreadable file fails the whole load.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} apps from {} ({} rows dropped)",
        dataset.len(),
        path.display(),
        dataset.dropped_rows()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Row cleaning
// ---------------------------------------------------------------------------

/// One source row before validation. Every cell may be absent.
#[derive(Debug, Default, Deserialize)]
struct RawRecord {
    #[serde(rename = "App Name")]
    name: Option<String>,
    #[serde(rename = "Category")]
    category: Option<String>,
    #[serde(rename = "Rating")]
    rating: Option<String>,
    #[serde(rename = "Minimum Installs")]
    min_installs: Option<String>,
    #[serde(rename = "Maximum Installs")]
    max_installs: Option<String>,
    #[serde(rename = "Free")]
    free: Option<String>,
    #[serde(rename = "Content Rating")]
    content_rating: Option<String>,
}

#[derive(Debug, Error)]
enum RowError {
    #[error("missing '{0}'")]
    Missing(&'static str),
    #[error("'{column}': cannot read {value:?}")]
    Invalid { column: &'static str, value: String },
    #[error("minimum installs {min} exceed maximum installs {max}")]
    InvertedRange { min: u64, max: u64 },
}

impl RawRecord {
    fn into_record(self) -> Result<AppRecord, RowError> {
        let name = required(self.name, COL_NAME)?;
        let category = required(self.category, COL_CATEGORY)?;
        let rating = parse_rating(&required(self.rating, COL_RATING)?)?;
        let min = parse_count(&required(self.min_installs, COL_MIN_INSTALLS)?, COL_MIN_INSTALLS)?;
        let max = parse_count(&required(self.max_installs, COL_MAX_INSTALLS)?, COL_MAX_INSTALLS)?;
        let is_free = parse_bool(&required(self.free, COL_FREE)?)?;
        let content_rating = required(self.content_rating, COL_CONTENT_RATING)?;

        AppRecord::new(name, category, rating, min, max, is_free, content_rating)
            .ok_or(RowError::InvertedRange { min, max })
    }
}

fn required(cell: Option<String>, column: &'static str) -> Result<String, RowError> {
    match cell {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(RowError::Missing(column)),
    }
}

fn invalid(column: &'static str, value: &str) -> RowError {
    RowError::Invalid {
        column,
        value: value.to_string(),
    }
}

fn parse_rating(s: &str) -> Result<f64, RowError> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(invalid(COL_RATING, s)),
    }
}

/// Install bounds arrive as integers, or as integral floats (`"10.0"`) when
/// the exporting tool promoted the column.
fn parse_count(s: &str, column: &'static str) -> Result<u64, RowError> {
    if let Ok(n) = s.parse::<u64>() {
        return Ok(n);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => {
            Ok(v as u64)
        }
        _ => Err(invalid(column, s)),
    }
}

fn parse_bool(s: &str) -> Result<bool, RowError> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(invalid(COL_FREE, s)),
    }
}

/// Collects valid rows and counts the rest.
#[derive(Default)]
struct Cleaner {
    records: Vec<AppRecord>,
    dropped: usize,
}

impl Cleaner {
    fn push(&mut self, row: usize, raw: RawRecord) {
        match raw.into_record() {
            Ok(rec) => self.records.push(rec),
            Err(e) => self.drop_row(row, e),
        }
    }

    fn drop_row(&mut self, row: usize, reason: impl fmt::Display) {
        log::debug!("row {row} dropped: {reason}");
        self.dropped += 1;
    }

    fn finish(self) -> Dataset {
        if self.dropped > 0 {
            log::warn!(
                "{} of {} rows dropped during cleaning",
                self.dropped,
                self.dropped + self.records.len()
            );
        }
        Dataset::with_dropped(self.records, self.dropped)
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();

    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            bail!("CSV missing '{col}' column");
        }
    }

    let mut cleaner = Cleaner::default();
    for (row_no, result) in reader.deserialize::<RawRecord>().enumerate() {
        match result {
            Ok(raw) => cleaner.push(row_no, raw),
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                return Err(e).with_context(|| format!("CSV row {row_no}"));
            }
            Err(e) => cleaner.drop_row(row_no, e),
        }
    }

    Ok(cleaner.finish())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, as written by `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "App Name": "Maps", "Category": "Travel & Local", "Rating": 4.3,
///     "Minimum Installs": 1000, "Maximum Installs": 4012,
///     "Free": true, "Content Rating": "Everyone" },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut cleaner = Cleaner::default();
    for (i, row) in rows.iter().enumerate() {
        let Some(obj) = row.as_object() else {
            cleaner.drop_row(i, "not a JSON object");
            continue;
        };
        let cell = |col: &str| json_text(obj.get(col));
        cleaner.push(
            i,
            RawRecord {
                name: cell(COL_NAME),
                category: cell(COL_CATEGORY),
                rating: cell(COL_RATING),
                min_installs: cell(COL_MIN_INSTALLS),
                max_installs: cell(COL_MAX_INSTALLS),
                free: cell(COL_FREE),
                content_rating: cell(COL_CONTENT_RATING),
            },
        );
    }

    Ok(cleaner.finish())
}

fn json_text(val: Option<&JsonValue>) -> Option<String> {
    match val? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet catalog.
///
/// Each required field is its own column. Text columns may be Utf8 or
/// LargeUtf8; numeric columns any of Int32 / Int64 / UInt64 / Float32 /
/// Float64; `Free` may be Boolean or text. Works with files written by both
/// **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut cleaner = Cleaner::default();
    let mut row_offset = 0usize;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let mut columns: Vec<&ArrayRef> = Vec::with_capacity(REQUIRED_COLUMNS.len());
        for col in REQUIRED_COLUMNS {
            let idx = schema
                .index_of(col)
                .map_err(|_| anyhow::anyhow!("Parquet file missing '{col}' column"))?;
            columns.push(batch.column(idx));
        }

        for row in 0..batch.num_rows() {
            let mut cells = Vec::with_capacity(columns.len());
            for (col, name) in columns.iter().zip(REQUIRED_COLUMNS) {
                cells.push(cell_text(col, row).with_context(|| format!("column '{name}'"))?);
            }
            let mut cells = cells.into_iter();
            let mut next = || cells.next().flatten();
            cleaner.push(
                row_offset + row,
                RawRecord {
                    name: next(),
                    category: next(),
                    rating: next(),
                    min_installs: next(),
                    max_installs: next(),
                    free: next(),
                    content_rating: next(),
                },
            );
        }
        row_offset += batch.num_rows();
    }

    Ok(cleaner.finish())
}

/// Render a single Arrow cell as text, `None` for null.
fn cell_text(col: &ArrayRef, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let text = match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row).to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row).to_string(),
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row).to_string(),
        DataType::UInt64 => col.as_primitive::<UInt64Type>().value(row).to_string(),
        DataType::Float32 => col.as_primitive::<Float32Type>().value(row).to_string(),
        DataType::Float64 => col.as_primitive::<Float64Type>().value(row).to_string(),
        DataType::Boolean => col.as_boolean().value(row).to_string(),
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(Some(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::Builder;

    const HEADER: &str = "App Name,App Id,Category,Rating,Rating Count,Minimum Installs,Maximum Installs,Free,Price,Content Rating";

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut tmp = Builder::new().suffix(suffix).tempfile().unwrap();
        write!(tmp, "{contents}").unwrap();
        tmp
    }

    #[test]
    fn csv_rows_with_missing_fields_are_dropped() {
        let csv = format!(
            "{HEADER}\n\
             Maps,com.maps,Travel & Local,4.3,100,1000.0,4012,True,0,Everyone\n\
             NoRating,com.x,Tools,,0,10.0,50,True,0,Everyone\n\
             Chess,com.chess,Board,0.0,0,10,20,False,1.99,Everyone\n\
             Inverted,com.inv,Tools,3.0,4,500,10,True,0,Teen\n\
             \"Quoted, Name\",com.q,Puzzle,4.0,9,5,15,true,0,Teen\n"
        );
        let tmp = write_temp(".csv", &csv);
        let ds = load_file(tmp.path()).unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.dropped_rows(), 2);

        let maps = &ds.records()[0];
        assert_eq!(maps.category, "Travel & Local");
        assert_eq!(maps.min_installs, 1000);
        assert_eq!(maps.average_installs(), 2506.0);
        assert!(maps.is_free);

        let chess = &ds.records()[1];
        assert!(!chess.is_free);
        assert!(!chess.is_rated());

        assert_eq!(ds.records()[2].name, "Quoted, Name");
    }

    #[test]
    fn csv_missing_required_column_fails() {
        let tmp = write_temp(".csv", "App Name,Category\nMaps,Tools\n");
        let err = load_file(tmp.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Rating"));
    }

    #[test]
    fn json_records_load() {
        let json = r#"[
            {"App Name": "Maps", "Category": "Tools", "Rating": 4.5,
             "Minimum Installs": 100, "Maximum Installs": 300,
             "Free": true, "Content Rating": "Everyone"},
            {"App Name": "Broken", "Category": "Tools", "Rating": null,
             "Minimum Installs": 1, "Maximum Installs": 2,
             "Free": false, "Content Rating": "Teen"},
            42
        ]"#;
        let tmp = write_temp(".json", json);
        let ds = load_file(tmp.path()).unwrap();

        assert_eq!(ds.len(), 1);
        assert_eq!(ds.dropped_rows(), 2);
        assert_eq!(ds.records()[0].average_installs(), 200.0);
        assert_eq!(ds.records()[0].rating, 4.5);
    }

    #[test]
    fn parquet_columns_load() {
        let schema = Arc::new(Schema::new(vec![
            Field::new(COL_NAME, DataType::Utf8, true),
            Field::new(COL_CATEGORY, DataType::Utf8, false),
            Field::new(COL_RATING, DataType::Float64, true),
            Field::new(COL_MIN_INSTALLS, DataType::Int64, false),
            Field::new(COL_MAX_INSTALLS, DataType::Int64, false),
            Field::new(COL_FREE, DataType::Boolean, false),
            Field::new(COL_CONTENT_RATING, DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("Chess"), None])),
                Arc::new(StringArray::from(vec!["Board", "Board"])),
                Arc::new(Float64Array::from(vec![Some(4.1), Some(3.0)])),
                Arc::new(Int64Array::from(vec![10, 20])),
                Arc::new(Int64Array::from(vec![30, 40])),
                Arc::new(BooleanArray::from(vec![false, true])),
                Arc::new(StringArray::from(vec!["Everyone", "Teen"])),
            ],
        )
        .unwrap();

        let tmp = Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(std::fs::File::create(tmp.path()).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(tmp.path()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.dropped_rows(), 1);
        let chess = &ds.records()[0];
        assert_eq!(chess.name, "Chess");
        assert_eq!(chess.average_installs(), 20.0);
        assert!(!chess.is_free);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let tmp = write_temp(".xlsx", "");
        assert!(load_file(tmp.path()).is_err());
    }

    #[test]
    fn cell_parsers() {
        assert_eq!(parse_count("10.0", COL_MIN_INSTALLS).unwrap(), 10);
        assert!(parse_count("10.5", COL_MIN_INSTALLS).is_err());
        assert!(parse_count("-1", COL_MIN_INSTALLS).is_err());
        assert!(parse_bool("False").is_ok_and(|b| !b));
        assert!(parse_bool("maybe").is_err());
        assert!(parse_rating("NaN").is_err());
    }
}
