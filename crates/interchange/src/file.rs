use crate::error::{ErrorKind, Result};
use crate::{Decoded, Record, decode, encode};
use exn::ResultExt;
use std::path::Path;
use tokio::fs;
use tracing::instrument;

/// Reads and decodes an interchange file.
///
/// Fails with [`ErrorKind::Unreadable`] when the file cannot be opened or
/// read, and [`ErrorKind::Encoding`] when its contents are not UTF-8. Lines
/// dropped while decoding are reported as a warning, not an error.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub async fn read_file(path: impl AsRef<Path>) -> Result<Decoded> {
    let path = path.as_ref();
    let bytes = fs::read(path).await.or_raise(|| ErrorKind::Unreadable(path.to_path_buf()))?;
    let text = String::from_utf8(bytes).or_raise(|| ErrorKind::Encoding(path.to_path_buf()))?;
    let decoded = decode(&text);
    if decoded.dropped > 0 {
        tracing::warn!(dropped = decoded.dropped, "Skipped interchange lines missing a person or photo path");
    }
    tracing::debug!(records = decoded.records.len(), "Decoded interchange file");
    Ok(decoded)
}

/// Encodes records and writes them to `path`, replacing any existing file.
///
/// Missing parent directories are created first.
#[instrument(skip_all, fields(path = %path.as_ref().display(), records = records.len()))]
pub async fn write_file(path: impl AsRef<Path>, records: &[Record]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Unwritable(path.to_path_buf()))?;
    }
    let text = encode(records)?;
    fs::write(path, text).await.or_raise(|| ErrorKind::Unwritable(path.to_path_buf()))
}
