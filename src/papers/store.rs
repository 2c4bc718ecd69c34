//! Persistence for the papers table.
//!
//! The table is a tab-separated file with a leading unnamed index column
//! followed by the columns of the active [`SchemaVersion`]. It is read and
//! written wholesale.

use super::record::{PaperRecord, SchemaVersion};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Standard I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed table contents
    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Stored columns do not match the active schema
    #[error("papers table has columns [{found}], expected [{expected}]; clear the papers to switch schema")]
    SchemaMismatch {
        /// Columns of the active schema
        expected: String,
        /// Columns found in the file
        found: String,
    },
}

/// Interface for paper stores
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaperStore: Send + Sync {
    /// Load every record in insertion order. An absent store is empty.
    async fn load(&self) -> Result<Vec<PaperRecord>, StoreError>;
    /// Replace the stored contents with `records`.
    async fn save(&self, records: &[PaperRecord]) -> Result<(), StoreError>;
}

/// File-backed tab-separated store
pub struct TsvPaperStore {
    path: PathBuf,
    schema: SchemaVersion,
}

impl TsvPaperStore {
    /// Create a store for the table at `path` using `schema`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, schema: SchemaVersion) -> Self {
        Self {
            path: path.into(),
            schema,
        }
    }

    /// Location of the table
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Active schema
    #[must_use]
    pub const fn schema(&self) -> SchemaVersion {
        self.schema
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl PaperStore for TsvPaperStore {
    async fn load(&self) -> Result<Vec<PaperRecord>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => decode_table(&bytes, self.schema),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Papers table {} not found, treating as empty", self.path.display());
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, records: &[PaperRecord]) -> Result<(), StoreError> {
        let bytes = encode_table(records, self.schema)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Write-then-rename keeps the previous table intact if the write fails
        let tmp = self.temp_path();
        if let Err(e) = tokio::fs::write(&tmp, &bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Serialize `records` as a papers table for `schema`.
///
/// # Errors
///
/// Returns an error if the TSV writer fails.
pub fn encode_table(records: &[PaperRecord], schema: SchemaVersion) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(Vec::new());

    let mut header = vec![""];
    header.extend_from_slice(schema.columns());
    writer.write_record(&header)?;

    for (index, record) in records.iter().enumerate() {
        let mut row = vec![index.to_string()];
        for column in schema.columns() {
            row.push(field(record, column).to_string());
        }
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|e| StoreError::Io(std::io::Error::other(e.to_string())))
}

/// Parse a papers table written for `schema`.
///
/// Blank input yields an empty list.
///
/// # Errors
///
/// Returns [`StoreError::SchemaMismatch`] if the header does not match
/// `schema`, or a TSV error for malformed rows.
pub fn decode_table(bytes: &[u8], schema: SchemaVersion) -> Result<Vec<PaperRecord>, StoreError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let found: Vec<&str> = headers.iter().skip(1).collect();
    if found != schema.columns() {
        return Err(StoreError::SchemaMismatch {
            expected: schema.columns().join(", "),
            found: found.join(", "),
        });
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let value = |column: &str| {
            schema
                .columns()
                .iter()
                .position(|c| *c == column)
                .and_then(|i| row.get(i + 1))
                .map(ToString::to_string)
        };
        records.push(PaperRecord {
            message: value("message"),
            url: value("link").unwrap_or_default(),
            title: value("title").unwrap_or_default(),
            description: value("description"),
        });
    }

    Ok(records)
}

fn field<'a>(record: &'a PaperRecord, column: &str) -> &'a str {
    match column {
        "message" => record.message.as_deref().unwrap_or_default(),
        "link" => &record.url,
        "title" => &record.title,
        "description" => record.description.as_deref().unwrap_or_default(),
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, title: &str) -> PaperRecord {
        PaperRecord {
            message: Some(format!("#tag {url}")),
            url: url.to_string(),
            title: title.to_string(),
            description: Some(String::new()),
        }
    }

    #[test]
    fn test_encode_layout() -> Result<(), StoreError> {
        let records = vec![
            PaperRecord {
                message: None,
                url: "http://x.test/a".to_string(),
                title: "A".to_string(),
                description: None,
            },
            PaperRecord {
                message: None,
                url: "http://x.test/b".to_string(),
                title: "B".to_string(),
                description: None,
            },
        ];
        let bytes = encode_table(&records, SchemaVersion::LinkTitle)?;
        assert_eq!(
            String::from_utf8_lossy(&bytes),
            "\tlink\ttitle\n0\thttp://x.test/a\tA\n1\thttp://x.test/b\tB\n"
        );
        Ok(())
    }

    #[test]
    fn test_clear_layout_is_header_only() -> Result<(), StoreError> {
        let bytes = encode_table(&[], SchemaVersion::MessageLinkTitleDescription)?;
        assert_eq!(
            String::from_utf8_lossy(&bytes),
            "\tmessage\tlink\ttitle\tdescription\n"
        );
        assert!(decode_table(&bytes, SchemaVersion::MessageLinkTitleDescription)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_multiline_fields_survive() -> Result<(), StoreError> {
        let mut rec = record("http://x.test/a", "Tabs\tand \"quotes\"");
        rec.message = Some("line one\nline two http://x.test/a".to_string());
        let schema = SchemaVersion::MessageLinkTitleDescription;
        let decoded = decode_table(&encode_table(&[rec.clone()], schema)?, schema)?;
        assert_eq!(decoded, vec![rec]);
        Ok(())
    }

    #[test]
    fn test_decode_blank_is_empty() -> Result<(), StoreError> {
        assert!(decode_table(b"", SchemaVersion::LinkTitle)?.is_empty());
        assert!(decode_table(b" \n", SchemaVersion::LinkTitle)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_decode_rejects_other_schema() -> Result<(), StoreError> {
        let bytes = encode_table(&[record("http://x.test/a", "A")], SchemaVersion::MessageLinkTitle)?;
        let result = decode_table(&bytes, SchemaVersion::LinkTitle);
        let Err(StoreError::SchemaMismatch { expected, found }) = result else {
            panic!("expected schema mismatch, got {result:?}");
        };
        assert_eq!(expected, "link, title");
        assert_eq!(found, "message, link, title");
        Ok(())
    }

    #[test]
    fn test_decode_reads_pandas_table() -> Result<(), StoreError> {
        let table = "\tlink\ttitle\n0\thttp://x.test/a\tFirst\n1\thttp://x.test/b\tSecond\n";
        let records = decode_table(table.as_bytes(), SchemaVersion::LinkTitle)?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].url, "http://x.test/b");
        assert_eq!(records[1].title, "Second");
        assert_eq!(records[1].message, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() -> Result<(), StoreError> {
        let dir = tempfile::tempdir()?;
        let store = TsvPaperStore::new(dir.path().join("papers.tsv"), SchemaVersion::LinkTitle);
        assert!(store.load().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_save_then_load() -> Result<(), StoreError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("papers.tsv");
        let store = TsvPaperStore::new(&path, SchemaVersion::MessageLinkTitleDescription);
        let records = vec![record("http://x.test/a", "A"), record("http://x.test/a", "A")];

        store.save(&records).await?;

        assert_eq!(store.load().await?, records);
        assert!(!store.temp_path().exists());
        Ok(())
    }
}
