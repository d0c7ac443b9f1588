//! Exported report decoding
//!
//! The service returns exported report and manifest files as
//! base64-encoded, gzip-compressed blobs. This is the only binary-format
//! handling in the client.

use std::io::Read;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use flate2::read::GzDecoder;

use crate::error::{Error, Result};

/// Decode a base64+gzip payload and write it to `path`, overwriting any
/// existing file.
pub fn save_file(data: &str, path: &Path) -> Result<()> {
    let decoded = general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| Error::Decode(format!("invalid base64 content: {e}")))?;

    let mut contents = Vec::new();
    GzDecoder::new(decoded.as_slice())
        .read_to_end(&mut contents)
        .map_err(|e| Error::Decode(format!("invalid gzip content: {e}")))?;

    std::fs::write(path, contents)?;
    Ok(())
}
