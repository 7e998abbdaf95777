//! Extension traits for `Result`.

use std::error::Error;
use std::panic::Location;

use crate::{ErrorRecord, Template};

/// Explain failures without unpacking the `Result`.
///
/// # Examples
///
/// ```
/// use khata::{ErrorRecord, ResultExt};
///
/// fn read_port() -> Result<u16, ErrorRecord> {
///     Err(ErrorRecord::new("PORT is not a number"))
/// }
///
/// fn start() -> Result<(), ErrorRecord> {
///     let port = read_port().explain("reading server settings")?;
///     println!("listening on {port}");
///     Ok(())
/// }
///
/// let err = start().unwrap_err();
/// assert_eq!(err.explanations().len(), 1);
/// assert_eq!(err.explanations()[0].message(), "reading server settings");
/// ```
pub trait ResultExt<T> {
    /// Appends an explanation located at the caller to the error, if any.
    fn explain(self, message: impl Into<String>) -> Result<T, ErrorRecord>;

    /// Like [`ResultExt::explain`], building the message only on error.
    fn explain_with<F, S>(self, message: F) -> Result<T, ErrorRecord>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> ResultExt<T> for Result<T, ErrorRecord> {
    #[track_caller]
    fn explain(self, message: impl Into<String>) -> Result<T, ErrorRecord> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(err.explained_at(Location::caller(), message.into())),
        }
    }

    #[track_caller]
    fn explain_with<F, S>(self, message: F) -> Result<T, ErrorRecord>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(err.explained_at(Location::caller(), message().into())),
        }
    }
}

/// Turn foreign errors into records.
///
/// # Examples
///
/// ```
/// use khata::{IntoRecord, Template};
///
/// let parse_failure = Template::new().with_type("ParseError").with_code(22);
///
/// let expected = "x1".parse::<u8>().unwrap_err();
/// let err = "x1".parse::<u8>().into_record_with(&parse_failure).unwrap_err();
/// assert!(err.is_instance_of(&parse_failure));
/// assert!(err.is(&expected));
/// ```
pub trait IntoRecord<T> {
    /// Wraps the error in a standalone record.
    fn into_record(self) -> Result<T, ErrorRecord>;

    /// Wraps the error in a record stamped by `template`.
    fn into_record_with(self, template: &Template) -> Result<T, ErrorRecord>;
}

impl<T, E> IntoRecord<T> for Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    fn into_record(self) -> Result<T, ErrorRecord> {
        self.map_err(ErrorRecord::wrap)
    }

    fn into_record_with(self, template: &Template) -> Result<T, ErrorRecord> {
        self.map_err(|err| template.wrap(err))
    }
}
