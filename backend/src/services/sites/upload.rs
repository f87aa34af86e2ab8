// Rust
use crate::error::UploadError;
use crate::pipeline::Upload;
use actix_multipart::Multipart;
use common::requests::IngestRequest;
use futures_util::StreamExt;
use log::debug;
use md5::Context;
use serde_json::from_slice;

/// Metadata parts are tiny; anything larger is not a valid request.
const MAX_METADATA_BYTES: usize = 64 * 1024;

/// A multipart upload read fully into memory.
pub(crate) struct ReceivedUpload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    /// Hex MD5 of `bytes`.
    pub md5: String,
    pub request: Option<IngestRequest>,
}

impl ReceivedUpload {
    pub fn as_upload(&self) -> Upload<'_> {
        Upload {
            bytes: &self.bytes,
            filename: self.filename.as_deref(),
            content_type: self.content_type.as_deref(),
        }
    }

    /// The trimmed uploader identity, if one was sent.
    pub fn uploader(&self) -> Option<String> {
        self.request
            .as_ref()
            .map(|r| r.uploader.trim().to_string())
            .filter(|u| !u.is_empty())
    }
}

/// Reads the `json` and `file` parts of a multipart upload.
///
/// The file is rejected as soon as it grows past `limit`, before any of it
/// is parsed. With `require_metadata`, the `json` part must come first and
/// name an uploader.
pub(crate) async fn read_upload(
    mut payload: Multipart,
    limit: usize,
    require_metadata: bool,
) -> Result<ReceivedUpload, UploadError> {
    let mut received = ReceivedUpload {
        filename: None,
        content_type: None,
        bytes: Vec::new(),
        md5: String::new(),
        request: None,
    };
    let mut md5_hasher = Context::new();
    let mut file_received = false;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| UploadError::Transport(e.to_string()))?;
        let part_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match part_name.as_deref() {
            Some("file") => {
                if require_metadata && received.uploader().is_none() {
                    return Err(UploadError::MissingUploader);
                }
                received.filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()));
                received.content_type = field.content_type().map(|m| m.essence_str().to_string());

                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(|e| UploadError::Transport(e.to_string()))?;
                    let size = received.bytes.len() + chunk.len();
                    if size > limit {
                        return Err(UploadError::TooLarge { size, limit });
                    }
                    md5_hasher.consume(&chunk);
                    received.bytes.extend_from_slice(&chunk);
                }
                file_received = true;
            }

            Some("json") => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(|e| UploadError::Transport(e.to_string()))?;
                    if bytes.len() + chunk.len() > MAX_METADATA_BYTES {
                        return Err(UploadError::Transport("metadata part too large".into()));
                    }
                    bytes.extend_from_slice(&chunk);
                }
                received.request = Some(from_slice(&bytes)?);
            }

            _ => {}
        }
    }

    if !file_received {
        return Err(UploadError::MissingFile);
    }

    received.md5 = format!("{:x}", md5_hasher.finalize());
    debug!(
        "received {:?} ({} bytes, md5 {})",
        received.filename,
        received.bytes.len(),
        received.md5
    );
    Ok(received)
}
