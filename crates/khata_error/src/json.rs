//! Record serialization errors.

/// Why an error record could not be serialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum JsonErrorKind {
    /// A value in the record has no JSON representation
    #[display("Unrepresentable value: {}", _0)]
    Data(String),
    /// The output sink failed while writing
    #[display("Failed to write JSON: {}", _0)]
    Io(String),
}

/// Serialization error with location tracking.
///
/// # Examples
///
/// ```
/// use khata_error::{JsonError, JsonErrorKind};
///
/// let err = JsonError::new(JsonErrorKind::Data("property key must be a string".to_string()));
/// assert!(matches!(err.kind(), JsonErrorKind::Data(_)));
/// assert!(err.to_string().starts_with("JSON Error: Unrepresentable value"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error: {} at line {} in {}", kind, line, file)]
pub struct JsonError {
    kind: JsonErrorKind,
    line: u32,
    file: &'static str,
}

impl JsonError {
    /// Create a new serialization error with caller location tracking.
    #[track_caller]
    pub fn new(kind: JsonErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &JsonErrorKind {
        &self.kind
    }

    /// Line where the error was created.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// File where the error was created.
    pub fn file(&self) -> &'static str {
        self.file
    }
}
