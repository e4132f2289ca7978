use mediaconv_core::FormatRegistry;

/// Validation errors for received files
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Unsupported file type: {content_type} ({filename})")]
    UnsupportedType {
        content_type: String,
        filename: String,
    },

    #[error("Empty file")]
    EmptyFile,
}

/// Upload validator backed by the format registry.
pub struct MediaValidator {
    max_file_size: u64,
    registry: &'static FormatRegistry,
}

impl MediaValidator {
    pub fn new(max_file_size: u64, registry: &'static FormatRegistry) -> Self {
        Self {
            max_file_size,
            registry,
        }
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: u64) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// The declared MIME type or the file extension must be in the input allow-list.
    pub fn validate_input_type(
        &self,
        content_type: &str,
        filename: &str,
    ) -> Result<(), ValidationError> {
        if self.registry.is_accepted_input(content_type, filename) {
            return Ok(());
        }
        Err(ValidationError::UnsupportedType {
            content_type: content_type.to_string(),
            filename: filename.to_string(),
        })
    }

    pub fn validate(
        &self,
        content_type: &str,
        filename: &str,
        size: u64,
    ) -> Result<(), ValidationError> {
        self.validate_input_type(content_type, filename)?;
        self.validate_file_size(size)
    }
}
