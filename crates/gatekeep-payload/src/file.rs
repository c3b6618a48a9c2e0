//! Payloads rendered from uploaded files (format D).

use crate::escape::escape_bytes;
use gatekeep_core::{Error, Result};

/// Largest upload accepted for rendering.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// MIME type of accepted uploads.
pub const BINARY_MIME_TYPE: &str = "application/octet-stream";

/// A file handed over by the transport.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn binary(bytes: Vec<u8>) -> Self {
        Self {
            file_name: None,
            mime_type: Some(BINARY_MIME_TYPE.to_string()),
            bytes,
        }
    }

    /// Only binary files up to [`MAX_UPLOAD_BYTES`] are accepted.
    pub fn validate(&self) -> Result<()> {
        if self.mime_type.as_deref() != Some(BINARY_MIME_TYPE) {
            return Err(Error::UnsupportedUpload(
                "only binary files are supported".to_string(),
            ));
        }
        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(Error::UnsupportedUpload(format!(
                "file size exceeds the maximum of {} MB",
                MAX_UPLOAD_BYTES / (1024 * 1024)
            )));
        }
        Ok(())
    }
}

/// Format D: every byte of the upload as `\xHH`.
pub fn from_upload(upload: &Upload) -> Result<String> {
    upload.validate()?;
    Ok(escape_bytes(&upload.bytes))
}
