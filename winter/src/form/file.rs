use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::Result;
use crate::error::FileSave;
use crate::request::FilePart;

const DEFAULT_EXTENSION: &str = ".bin";

/// A file uploaded with the request.
///
/// Every upload gets a generated, timestamped filename (see
/// [`generate_timestamp_filename`]); the name submitted by the client is
/// kept separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    filename: String,
    original_filename: Option<String>,
    content_type: Option<String>,
    content: Bytes,
}

impl UploadedFile {
    /// Creates an uploaded file, generating its filename from the current
    /// time.
    #[must_use]
    pub fn new(
        original_filename: Option<&str>,
        content_type: Option<String>,
        content: Bytes,
    ) -> Self {
        Self::with_timestamp(original_filename, content_type, content, Utc::now())
    }

    /// Creates an uploaded file, generating its filename from `now`.
    #[must_use]
    pub fn with_timestamp(
        original_filename: Option<&str>,
        content_type: Option<String>,
        content: Bytes,
        now: DateTime<Utc>,
    ) -> Self {
        let original_filename = original_filename.and_then(base_name).map(ToOwned::to_owned);
        Self {
            filename: generate_timestamp_filename(original_filename.as_deref(), now),
            original_filename,
            content_type,
            content,
        }
    }

    pub(crate) fn from_part(part: FilePart) -> Self {
        Self::new(part.filename.as_deref(), part.content_type, part.content)
    }

    /// The generated filename.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The final path component of the filename sent by the client.
    #[must_use]
    pub fn original_filename(&self) -> Option<&str> {
        self.original_filename.as_deref()
    }

    /// The content type sent by the client.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The content of the file.
    #[must_use]
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// The size of the file in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the file has no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Writes the file into `directory` under its generated filename, and
    /// returns the path it was written to.
    ///
    /// # Errors
    ///
    /// Returns a [`FileSave`] error if the file has no content, or if it
    /// cannot be written.
    pub fn save<P: AsRef<Path>>(&self, directory: P) -> Result<PathBuf> {
        if self.content.is_empty() {
            return Err(FileSave::Empty {
                filename: self.filename.clone(),
            }
            .into());
        }

        let path = directory.as_ref().join(&self.filename);
        std::fs::write(&path, &self.content).map_err(|source| FileSave::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = self.content.len(), "saved uploaded file");

        Ok(path)
    }
}

fn base_name(filename: &str) -> Option<&str> {
    filename
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
}

/// Generates the filename of an upload: `file_` followed by the UTC time
/// with millisecond resolution (`yyyyMMdd_HHmmssSSS`) and the extension of
/// `original_filename`, or `.bin` if it has none.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use winter::form::generate_timestamp_filename;
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
///     + chrono::Duration::milliseconds(42);
///
/// assert_eq!(
///     generate_timestamp_filename(Some("photo.png"), now),
///     "file_20240309_140507042.png"
/// );
/// assert_eq!(generate_timestamp_filename(None, now), "file_20240309_140507042.bin");
/// ```
#[must_use]
pub fn generate_timestamp_filename(original_filename: Option<&str>, now: DateTime<Utc>) -> String {
    let extension = original_filename
        .and_then(|name| name.rfind('.').map(|index| &name[index..]))
        .unwrap_or(DEFAULT_EXTENSION);
    format!("file_{}{extension}", now.format("%Y%m%d_%H%M%S%3f"))
}
