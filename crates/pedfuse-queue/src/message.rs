//! Messages carried on the image stream.

/// Stream field holding the encoded image bytes.
pub const DATA_FIELD: &str = "data";

/// Stream field holding the optional originating file name.
pub const FILENAME_FIELD: &str = "filename";

/// Name reported for images published without a file name.
pub const UNKNOWN_FILE: &str = "unknown_file";

/// One image as it travels through the queue: the encoded bytes plus an
/// optional file name for traceability.
///
/// The bytes are an opaque encoded image (PNG, JPEG, ...); the queue never
/// decodes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMessage {
    /// Encoded image bytes.
    pub data: Vec<u8>,
    /// Originating file name, if the publisher attached one.
    pub file_name: Option<String>,
}

impl ImageMessage {
    /// Create a message from encoded image bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            file_name: None,
        }
    }

    /// Attach the originating file name.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Name to report for this image, falling back to [`UNKNOWN_FILE`]
    /// when the publisher did not attach one.
    pub fn display_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or(UNKNOWN_FILE)
    }
}
