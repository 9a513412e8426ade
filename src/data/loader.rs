use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, Date32Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Source description
// ---------------------------------------------------------------------------

/// Header names of the two columns the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceColumns {
    pub category: String,
    pub date: String,
}

/// Where the call log lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

impl Source {
    /// `http://` and `https://` strings are URLs, anything else a path.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            Source::Url(s.to_string())
        } else {
            Source::File(PathBuf::from(s))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => write!(f, "{url}"),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a call log from a URL (CSV over HTTP) or a local file.
pub fn load_source(source: &Source, columns: &SourceColumns, timeout: Duration) -> Result<Dataset> {
    match source {
        Source::Url(url) => fetch_csv(url, columns, timeout),
        Source::File(path) => load_file(path, columns),
    }
}

/// Download a CSV with a blocking GET and parse it.
pub fn fetch_csv(url: &str, columns: &SourceColumns, timeout: Duration) -> Result<Dataset> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .context("building HTTP client")?;

    log::info!("Fetching call log from {url}");
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("fetching {url}"))?;

    let status = response.status();
    if !status.is_success() {
        bail!(LoadError::Http {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.bytes().context("reading response body")?;
    log::debug!("Downloaded {} bytes", body.len());
    read_csv(body.as_ref(), columns).with_context(|| format!("parsing CSV from {url}"))
}

/// Load a call log from a local file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, day-first date text
/// * `.json`    – `[{ "<category>": "...", "<date>": "dd/mm/yyyy", ... }, ...]`
/// * `.parquet` – date column as Date32/Date64/Timestamp or day-first text
pub fn load_file(path: &Path, columns: &SourceColumns) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).context("opening CSV")?;
            read_csv(file, columns)
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            read_json(&text, columns)
        }
        "parquet" | "pq" => load_parquet(path, columns),
        other => bail!(LoadError::UnsupportedFormat(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

const DAY_FIRST_LONG: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];
const DAY_FIRST_SHORT: [&str; 3] = ["%d/%m/%y", "%d-%m-%y", "%d.%m.%y"];
const ISO_DATE: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// Parse a day-first date such as `15/01/2024`, `15-01-2024 08:30`,
/// `15.01.2024` or `15/01/24`. ISO `2024-01-15` is accepted too.
/// Time-of-day is ignored.
///
/// Two-digit years follow chrono's `%y` pivot (`00..=69` → 20xx). Years of
/// any other width, signs and non-digit characters are rejected.
pub fn parse_day_first(s: &str) -> Option<NaiveDate> {
    let date_part = s
        .trim()
        .split(|c: char| c.is_whitespace() || c == 'T')
        .next()?;

    let fields: Vec<&str> = date_part.split(['/', '-', '.']).collect();
    let digits_only = |f: &&str| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit());
    if fields.len() != 3 || !fields.iter().all(digits_only) {
        return None;
    }

    let formats: &[&str] = match (fields[0].len(), fields[2].len()) {
        (4, _) => &ISO_DATE,
        (_, 4) => &DAY_FIRST_LONG,
        (_, 2) => &DAY_FIRST_SHORT,
        _ => return None,
    };
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

fn date_or_error(raw: &str, row: usize) -> Result<NaiveDate> {
    parse_day_first(raw).ok_or_else(|| {
        anyhow::Error::from(LoadError::InvalidDate {
            row,
            value: raw.to_string(),
        })
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, comma separated.
/// The category and date columns are required; all other columns are kept
/// as passthrough text.
pub fn read_csv<R: Read>(input: R, columns: &SourceColumns) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(clean_header)
        .collect();

    let cat_idx = column_index(&headers, &columns.category)?;
    let date_idx = column_index(&headers, &columns.date)?;

    let extra_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != cat_idx && *i != date_idx)
        .map(|(i, h)| (i, h.clone()))
        .collect();

    let mut records = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let record = result.with_context(|| format!("CSV row {row}"))?;

        let open_date = date_or_error(record.get(date_idx).unwrap_or(""), row)?;
        let creation_role = record.get(cat_idx).unwrap_or("").to_string();

        let mut extra = BTreeMap::new();
        for (col_idx, name) in &extra_cols {
            extra.insert(name.clone(), record.get(*col_idx).unwrap_or("").to_string());
        }

        records.push(Record {
            creation_role,
            open_date,
            extra,
        });
    }

    let extra_columns = extra_cols.into_iter().map(|(_, name)| name).collect();
    Ok(Dataset::from_records(records, extra_columns))
}

/// Exported spreadsheets often carry a UTF-8 BOM on the first header.
fn clean_header(h: &str) -> String {
    h.trim_start_matches('\u{feff}').trim().to_string()
}

fn column_index(headers: &[String], name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| anyhow::Error::from(LoadError::MissingColumn(name.to_string())))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`).
pub fn read_json(text: &str, columns: &SourceColumns) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let rows = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());
    let mut extra_names: BTreeSet<String> = BTreeSet::new();

    for (i, rec) in rows.iter().enumerate() {
        let row = i + 1;
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {row} is not a JSON object"))?;

        let category = obj
            .get(&columns.category)
            .ok_or_else(|| LoadError::MissingColumn(columns.category.clone()))?;
        let date = obj
            .get(&columns.date)
            .ok_or_else(|| LoadError::MissingColumn(columns.date.clone()))?;

        let open_date = date_or_error(&json_text(date), row)?;

        let mut extra = BTreeMap::new();
        for (key, val) in obj {
            if *key == columns.category || *key == columns.date {
                continue;
            }
            extra_names.insert(key.clone());
            extra.insert(key.clone(), json_text(val));
        }

        records.push(Record {
            creation_role: json_text(category),
            open_date,
            extra,
        });
    }

    Ok(Dataset::from_records(records, extra_names.into_iter().collect()))
}

fn json_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet call log.
///
/// The category column may be any type castable to Utf8 (plain or
/// dictionary-encoded strings). The date column may be Date32, Date64,
/// Timestamp, or day-first text. Other columns are rendered to text.
fn load_parquet(path: &Path, columns: &SourceColumns) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let schema = builder.schema().clone();
    let cat_idx = schema
        .index_of(&columns.category)
        .map_err(|_| LoadError::MissingColumn(columns.category.clone()))?;
    let date_idx = schema
        .index_of(&columns.date)
        .map_err(|_| LoadError::MissingColumn(columns.date.clone()))?;

    let extra_cols: Vec<(usize, String)> = schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != cat_idx && *i != date_idx)
        .map(|(i, f)| (i, f.name().clone()))
        .collect();

    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    let mut rows_before = 0usize;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let categories = string_values(batch.column(cat_idx), &columns.category)?;
        let dates = date_values(batch.column(date_idx), &columns.date, rows_before)?;

        for (row, (creation_role, open_date)) in categories.into_iter().zip(dates).enumerate() {
            let mut extra = BTreeMap::new();
            for (col_idx, name) in &extra_cols {
                let col = batch.column(*col_idx);
                let text = if col.is_null(row) {
                    String::new()
                } else {
                    array_value_to_string(col.as_ref(), row).with_context(|| {
                        format!("Row {}: rendering '{name}'", rows_before + row + 1)
                    })?
                };
                extra.insert(name.clone(), text);
            }
            records.push(Record {
                creation_role,
                open_date,
                extra,
            });
        }

        rows_before += batch.num_rows();
    }

    let extra_columns = extra_cols.into_iter().map(|(_, name)| name).collect();
    Ok(Dataset::from_records(records, extra_columns))
}

// -- Parquet / Arrow helpers --

fn unsupported(col: &ArrayRef, name: &str) -> LoadError {
    LoadError::UnsupportedColumnType {
        column: name.to_string(),
        data_type: col.data_type().to_string(),
    }
}

/// Cast a column to Utf8 and collect it; nulls become empty strings.
fn string_values(col: &ArrayRef, name: &str) -> Result<Vec<String>> {
    let utf8 = cast(col.as_ref(), &DataType::Utf8).map_err(|_| unsupported(col, name))?;
    let strings = utf8
        .as_any()
        .downcast_ref::<StringArray>()
        .context("expected StringArray after cast")?;
    Ok(strings
        .iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}

/// Read a date column; `rows_before` offsets row numbers in error messages.
fn date_values(col: &ArrayRef, name: &str, rows_before: usize) -> Result<Vec<NaiveDate>> {
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Dictionary(_, _) => {
            string_values(col, name)?
                .iter()
                .enumerate()
                .map(|(i, raw)| date_or_error(raw, rows_before + i + 1))
                .collect()
        }
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            let days = cast(col.as_ref(), &DataType::Date32).map_err(|_| unsupported(col, name))?;
            let days = days
                .as_any()
                .downcast_ref::<Date32Array>()
                .context("expected Date32Array after cast")?;
            (0..days.len())
                .map(|i| {
                    let converted = if days.is_null(i) {
                        None
                    } else {
                        days.value_as_date(i)
                    };
                    converted.ok_or_else(|| {
                        anyhow::Error::from(LoadError::InvalidDate {
                            row: rows_before + i + 1,
                            value: "<null>".to_string(),
                        })
                    })
                })
                .collect()
        }
        _ => Err(unsupported(col, name).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Int64Array, TimestampMillisecondArray};
    use arrow::datatypes::{Field, Schema, TimeUnit};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    fn cols() -> SourceColumns {
        SourceColumns {
            category: "Papel do criador".to_string(),
            date: "Data de abertura".to_string(),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn day_first_formats() {
        assert_eq!(parse_day_first("15/01/2024"), Some(d(2024, 1, 15)));
        assert_eq!(parse_day_first(" 05-02-2024 "), Some(d(2024, 2, 5)));
        assert_eq!(parse_day_first("05.02.2024"), Some(d(2024, 2, 5)));
        assert_eq!(parse_day_first("31/12/2023 23:59:59"), Some(d(2023, 12, 31)));
        assert_eq!(parse_day_first("2024-03-09"), Some(d(2024, 3, 9)));
        assert_eq!(parse_day_first("2024-03-09T10:00:00"), Some(d(2024, 3, 9)));
        assert_eq!(parse_day_first("5/1/2024"), Some(d(2024, 1, 5)));
    }

    #[test]
    fn two_digit_years_use_chrono_pivot() {
        assert_eq!(parse_day_first("15/01/24"), Some(d(2024, 1, 15)));
        assert_eq!(parse_day_first("31.12.99"), Some(d(1999, 12, 31)));
        assert_eq!(parse_day_first("01-07-69"), Some(d(2069, 7, 1)));
    }

    #[test]
    fn day_first_rejects_garbage() {
        assert_eq!(parse_day_first(""), None);
        assert_eq!(parse_day_first("31/02/2024"), None);
        assert_eq!(parse_day_first("13/13/2024"), None);
        assert_eq!(parse_day_first("ontem"), None);
        assert_eq!(parse_day_first("+5/01/2024"), None);
        assert_eq!(parse_day_first("15/01/-2024"), None);
        assert_eq!(parse_day_first("15/01/024"), None);
        assert_eq!(parse_day_first("15/01/2024/3"), None);
        assert_eq!(parse_day_first("2024/01"), None);
    }

    #[test]
    fn csv_with_passthrough_columns() {
        let text = "\u{feff}Número do caso,Papel do criador,Data de abertura,Assunto\n\
                    1,Assistente CSF,15/01/2024 09:12,Cartão\n\
                    2,Assistente CSF CM,03/02/2024,\"Fatura, 2ª via\"\n";
        let ds = read_csv(text.as_bytes(), &cols()).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.extra_columns, vec!["Número do caso", "Assunto"]);
        assert_eq!(ds.records[0].creation_role, "Assistente CSF");
        assert_eq!(ds.records[0].open_date, d(2024, 1, 15));
        assert_eq!(ds.records[1].extra["Assunto"], "Fatura, 2ª via");
        assert_eq!(ds.categories, vec!["Assistente CSF", "Assistente CSF CM"]);
    }

    #[test]
    fn csv_missing_column_is_reported() {
        let text = "Papel do criador,Aberto em\nAssistente CSF,15/01/2024\n";
        let err = read_csv(text.as_bytes(), &cols()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::MissingColumn("Data de abertura".to_string()))
        );
    }

    #[test]
    fn csv_bad_date_fails_whole_load() {
        let text = "Papel do criador,Data de abertura\n\
                    Assistente CSF,15/01/2024\n\
                    Assistente CSF,32/01/2024\n";
        let err = read_csv(text.as_bytes(), &cols()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::InvalidDate {
                row: 2,
                value: "32/01/2024".to_string()
            })
        );
    }

    #[test]
    fn csv_header_only_is_empty_dataset() {
        let text = "Papel do criador,Data de abertura\n";
        let ds = read_csv(text.as_bytes(), &cols()).unwrap();
        assert!(ds.is_empty());
        assert!(ds.date_bounds.is_none());
    }

    #[test]
    fn json_records() {
        let text = r#"[
            {"Papel do criador": "Assistente CSF", "Data de abertura": "01/03/2024", "Caso": 17},
            {"Papel do criador": "Assistente CSF Ajuda Quality",
             "Data de abertura": "2024-04-02", "Caso": null}
        ]"#;
        let ds = read_json(text, &cols()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].extra["Caso"], "17");
        assert_eq!(ds.records[1].extra["Caso"], "");
        assert_eq!(ds.records[1].open_date, d(2024, 4, 2));
        assert_eq!(ds.extra_columns, vec!["Caso"]);
    }

    #[test]
    fn json_row_without_date_is_missing_column() {
        let text = r#"[{"Papel do criador": "Assistente CSF"}]"#;
        let err = read_json(text, &cols()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::MissingColumn("Data de abertura".to_string()))
        );
    }

    #[test]
    fn load_csv_file_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Papel do criador,Data de abertura").unwrap();
        writeln!(file, "Assistente CSF,10/10/2023").unwrap();
        file.flush().unwrap();

        let ds = load_file(file.path(), &cols()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].open_date, d(2023, 10, 10));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("calls.xlsx"), &cols()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::UnsupportedFormat("xlsx".to_string()))
        );
    }

    fn write_parquet(schema: Arc<Schema>, columns: Vec<ArrayRef>) -> tempfile::NamedTempFile {
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        file
    }

    fn days_since_epoch(date: NaiveDate) -> i32 {
        (date - d(1970, 1, 1)).num_days() as i32
    }

    #[test]
    fn parquet_with_date32_column() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Papel do criador", DataType::Utf8, false),
            Field::new("Data de abertura", DataType::Date32, false),
            Field::new("Caso", DataType::Int64, true),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec!["Assistente CSF", "Assistente CSF CM"])),
            Arc::new(Date32Array::from(vec![
                days_since_epoch(d(2024, 1, 15)),
                days_since_epoch(d(2024, 2, 29)),
            ])),
            Arc::new(Int64Array::from(vec![Some(7), None])),
        ];
        let file = write_parquet(schema, columns);

        let ds = load_file(file.path(), &cols()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[1].open_date, d(2024, 2, 29));
        assert_eq!(ds.records[0].extra["Caso"], "7");
        assert_eq!(ds.records[1].extra["Caso"], "");
        assert_eq!(ds.extra_columns, vec!["Caso"]);
    }

    #[test]
    fn parquet_with_day_first_text_dates() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Papel do criador", DataType::Utf8, false),
            Field::new("Data de abertura", DataType::Utf8, false),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec!["Assistente CSF", "Assistente CSF"])),
            Arc::new(StringArray::from(vec!["15/01/2024", "03/02/2024 10:45"])),
        ];
        let file = write_parquet(schema, columns);

        let ds = load_file(file.path(), &cols()).unwrap();
        assert_eq!(ds.records[0].open_date, d(2024, 1, 15));
        assert_eq!(ds.records[1].open_date, d(2024, 2, 3));
    }

    #[test]
    fn parquet_timestamp_drops_time_of_day() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Papel do criador", DataType::Utf8, false),
            Field::new(
                "Data de abertura",
                DataType::Timestamp(TimeUnit::Millisecond, None),
                false,
            ),
        ]));
        let late_evening = d(2024, 1, 15)
            .and_hms_opt(23, 30, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec!["Assistente CSF"])),
            Arc::new(TimestampMillisecondArray::from(vec![late_evening])),
        ];
        let file = write_parquet(schema, columns);

        let ds = load_file(file.path(), &cols()).unwrap();
        assert_eq!(ds.records[0].open_date, d(2024, 1, 15));
        assert_eq!(ds.date_bounds, Some((d(2024, 1, 15), d(2024, 1, 15))));
    }

    #[test]
    fn parquet_null_date_fails_with_row_number() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Papel do criador", DataType::Utf8, false),
            Field::new("Data de abertura", DataType::Date32, true),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec!["Assistente CSF", "Assistente CSF"])),
            Arc::new(Date32Array::from(vec![Some(days_since_epoch(d(2024, 1, 15))), None])),
        ];
        let file = write_parquet(schema, columns);

        let err = load_file(file.path(), &cols()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::InvalidDate {
                row: 2,
                value: "<null>".to_string()
            })
        );
    }

    #[test]
    fn source_parse_distinguishes_urls() {
        assert_eq!(
            Source::parse("https://example.com/calls.csv"),
            Source::Url("https://example.com/calls.csv".to_string())
        );
        assert_eq!(
            Source::parse("data/calls.csv"),
            Source::File(PathBuf::from("data/calls.csv"))
        );
    }
}
