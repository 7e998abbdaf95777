//! Top-level error wrapper types.

use crate::{ConfigError, JsonError};

/// Every way the khata library itself can fail.
///
/// # Examples
///
/// ```
/// use khata_error::{JsonError, JsonErrorKind, KhataError};
///
/// let err: KhataError = JsonError::new(JsonErrorKind::Io("broken pipe".to_string())).into();
/// assert!(format!("{}", err).contains("JSON Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum KhataErrorKind {
    /// Report configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Record serialization error
    #[from(JsonError)]
    Json(JsonError),
}

/// Khata error with kind discrimination.
///
/// # Examples
///
/// ```
/// use khata_error::{ConfigError, ConfigErrorKind, KhataErrorKind, KhataResult};
///
/// fn might_fail() -> KhataResult<()> {
///     Err(ConfigError::new(ConfigErrorKind::Parse("color".to_string())))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), KhataErrorKind::Config(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Khata Error: {}", _0)]
pub struct KhataError(Box<KhataErrorKind>);

impl KhataError {
    /// Create a new error from a kind.
    pub fn new(kind: KhataErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &KhataErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to KhataErrorKind
impl<T> From<T> for KhataError
where
    T: Into<KhataErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for khata's own operations.
pub type KhataResult<T> = std::result::Result<T, KhataError>;
