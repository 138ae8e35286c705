//! Streaming CSV reader producing [`RawRow`]s.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use memeraki_model::RawRow;
use tracing::{debug, warn};

use crate::error::{IngestError, Result};

use super::header::normalize_headers;

/// A delimited source file.
///
/// Opening is cheap and repeatable; every call to [`CsvSource::open`] starts
/// again from the first data row.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the file and read its header row.
    pub fn open(&self) -> Result<RowReader> {
        validate_encoding(&self.path)?;
        let file = open_file(&self.path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(file);

        let raw_headers = reader
            .headers()
            .map_err(|err| header_error(&self.path, err))?
            .clone();
        if raw_headers.is_empty() {
            return Err(IngestError::EmptyCsv {
                path: self.path.clone(),
            });
        }
        let headers = normalize_headers(&raw_headers);
        debug!(path = %self.path.display(), columns = headers.len(), "opened source");

        Ok(RowReader {
            path: self.path.clone(),
            headers,
            records: reader.into_records(),
            last_line: 1,
        })
    }

    /// Count data rows by reading the file once more.
    pub fn count_rows(&self) -> Result<usize> {
        let file = open_file(&self.path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(file);
        let mut count = 0;
        for record in reader.byte_records() {
            if let Err(err) = record
                && err.is_io_error()
            {
                return Err(IngestError::FileRead {
                    path: self.path.clone(),
                    source: err.into(),
                });
            }
            count += 1;
        }
        Ok(count)
    }
}

/// Lazy sequence of rows from an opened [`CsvSource`].
///
/// Record-level decode failures are yielded as [`IngestError::Record`] and
/// reading continues; I/O failures end the sequence.
pub struct RowReader {
    path: PathBuf,
    headers: Vec<String>,
    records: StringRecordsIntoIter<File>,
    last_line: u64,
}

impl RowReader {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn to_raw_row(&self, record: &StringRecord, line: u64) -> RawRow {
        if record.len() > self.headers.len() {
            warn!(
                line,
                expected = self.headers.len(),
                found = record.len(),
                "row has more values than header columns; extra values ignored"
            );
        }
        let mut row = RawRow::new(line);
        for (header, value) in self.headers.iter().zip(record.iter()) {
            if header.is_empty() {
                continue;
            }
            row.values.insert(header.clone(), value.to_string());
        }
        row
    }
}

impl Iterator for RowReader {
    type Item = Result<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.records.next()?;
        match result {
            Ok(record) => {
                let line = record
                    .position()
                    .map_or(self.last_line + 1, csv::Position::line);
                self.last_line = line;
                Some(Ok(self.to_raw_row(&record, line)))
            }
            Err(err) if err.is_io_error() => Some(Err(IngestError::FileRead {
                path: self.path.clone(),
                source: err.into(),
            })),
            Err(err) => {
                let line = err
                    .position()
                    .map_or(self.last_line + 1, csv::Position::line);
                self.last_line = line;
                Some(Err(IngestError::Record {
                    path: self.path.clone(),
                    line,
                    message: err.to_string(),
                }))
            }
        }
    }
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

fn header_error(path: &Path, err: csv::Error) -> IngestError {
    if err.is_io_error() {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: err.into(),
        }
    } else {
        IngestError::Header {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// Reject UTF-16 sources up front; UTF-8 with or without BOM is accepted.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = open_file(path)?;
    let mut buffer = [0u8; 2];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if bytes_read == 2 {
        let encoding = match buffer {
            [0xFF, 0xFE] => Some("UTF-16 LE"),
            [0xFE, 0xFF] => Some("UTF-16 BE"),
            _ => None,
        };
        if let Some(encoding) = encoding {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_rows_carry_line_numbers() {
        let file = create_temp_csv(b"name,slug\nGanga Devi,ganga-devi\nJamini Roy,jamini-roy\n");
        let rows: Vec<RawRow> = CsvSource::new(file.path())
            .open()
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].get("name"), Some("Ganga Devi"));
        assert_eq!(rows[1].line, 3);
        assert_eq!(rows[1].get("slug"), Some("jamini-roy"));
    }

    #[test]
    fn test_multiline_quoted_value_keeps_physical_lines() {
        let file = create_temp_csv(b"name,bio\nA,\"first\nsecond\"\nB,short\n");
        let rows: Vec<RawRow> = CsvSource::new(file.path())
            .open()
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(rows[0].get("bio"), Some("first\nsecond"));
        assert_eq!(rows[1].line, 4);
    }

    #[test]
    fn test_bom_and_padded_headers() {
        let file = create_temp_csv("\u{feff} name , slug\nA,a\n".as_bytes());
        let reader = CsvSource::new(file.path()).open().unwrap();
        assert_eq!(reader.headers(), ["name", "slug"]);
    }

    #[test]
    fn test_short_row_omits_missing_columns() {
        let file = create_temp_csv(b"name,slug,bio\nA,a\n");
        let rows: Vec<RawRow> = CsvSource::new(file.path())
            .open()
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows[0].get("slug"), Some("a"));
        assert_eq!(rows[0].get("bio"), None);
    }

    #[test]
    fn test_invalid_utf8_is_row_level() {
        let file = create_temp_csv(b"name,slug\nA,a\n\xff\xfe\xfd,b\nC,c\n");
        let results: Vec<Result<RawRow>> = CsvSource::new(file.path()).open().unwrap().collect();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        let err = results[1].as_ref().unwrap_err();
        assert!(err.is_row_level());
        assert_eq!(err.line(), Some(3));
        assert_eq!(results[2].as_ref().unwrap().get("name"), Some("C"));
    }

    #[test]
    fn test_header_only_yields_nothing() {
        let file = create_temp_csv(b"name,slug\n");
        let mut reader = CsvSource::new(file.path()).open().unwrap();
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_empty_file() {
        let file = create_temp_csv(b"");
        let result = CsvSource::new(file.path()).open();
        assert!(matches!(result, Err(IngestError::EmptyCsv { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = CsvSource::new("/definitely/not/here.csv").open();
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }

    #[test]
    fn test_utf16_rejected() {
        let file = create_temp_csv(&[0xFF, 0xFE, b'n', 0]);
        let result = CsvSource::new(file.path()).open();
        assert!(matches!(
            result,
            Err(IngestError::UnsupportedEncoding {
                encoding: "UTF-16 LE",
                ..
            })
        ));
    }

    #[test]
    fn test_count_rows_and_reopen() {
        let file = create_temp_csv(b"name;slug\nA;a\nB;b\nC;c\n");
        let source = CsvSource::new(file.path()).with_delimiter(b';');
        assert_eq!(source.count_rows().unwrap(), 3);

        let first = source.open().unwrap().count();
        let second = source.open().unwrap().count();
        assert_eq!(first, 3);
        assert_eq!(second, 3);
    }
}
