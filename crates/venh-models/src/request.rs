//! Upload requests and processing results.

use std::path::Path;

use bytes::Bytes;

use crate::metadata::ProcessingMetadata;

/// A video submitted for enhancement. Immutable once built.
#[derive(Debug, Clone)]
pub struct ProcessingRequest {
    file_name: String,
    content_type: String,
    data: Bytes,
}

impl ProcessingRequest {
    /// Create a request, inferring the content type from the file name.
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            data: data.into(),
        }
    }

    /// Override the inferred content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Payload. Cloning is cheap (reference counted).
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Payload size in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}

/// Enhanced video returned by the backend.
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// Video payload
    pub video: Bytes,
    /// Content type reported for the payload, if any
    pub content_type: Option<String>,
    /// Run metadata, present only when the backend answered with JSON
    pub metadata: Option<ProcessingMetadata>,
}

impl ProcessingResult {
    pub fn new(video: Bytes) -> Self {
        Self {
            video,
            content_type: None,
            metadata: None,
        }
    }

    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_metadata(mut self, metadata: ProcessingMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn size(&self) -> u64 {
        self.video.len() as u64
    }
}
