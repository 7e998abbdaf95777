//! Augmented errors for the khata library.
//!
//! An [`ErrorRecord`] wraps an underlying failure with a numeric code, a
//! type tag, a process exit code and free-form properties. As it propagates,
//! callers [explain](ErrorRecord::explain) what they were doing, and each
//! explanation remembers the exact call site that added it. At a reporting
//! boundary the record renders as a human report ([`ErrorRecord::debug`]) or a
//! JSON object ([`ErrorRecord::to_json`]), both with a freshly captured call
//! stack that hides khata's own frames.
//!
//! [`Template`]s stamp consistent metadata onto new records and form a
//! single-inheritance hierarchy for classification.
//!
//! # Examples
//!
//! ```
//! use khata::{ErrorRecord, ResultExt, Template, explain};
//!
//! let storage = Template::new().with_type("StorageError").with_exit_code(74);
//! let quota = storage.extend().with_code(507).with_property("tier", "free");
//!
//! fn save(quota: &Template) -> Result<(), ErrorRecord> {
//!     Err(quota.new_error(["quota exceeded"]))
//! }
//!
//! let mut err = save(&quota).explain("saving draft").unwrap_err();
//! explain!(err, "user {} retried {} times", 42, 3);
//!
//! assert!(err.is_related_to(&storage));
//! assert_eq!(err.explanations().len(), 2);
//! assert_eq!(err.property("tier"), Some("free".into()));
//! assert!(err.to_json().contains("\"errorCode\":507"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod explanation;
mod ext;
mod handle;
mod json;
mod properties;
mod record;
mod report;
mod template;
mod trace;

pub use config::ReportConfig;
pub use explanation::Explanation;
pub use ext::{IntoRecord, ResultExt};
pub use handle::{handle_khata, handle_khata_with};
pub use properties::{Properties, PropertyBag};
pub use record::{Cause, ErrorRecord, MessageError};
pub use template::{
    DEFAULT_ERROR_CODE, DEFAULT_ERROR_TYPE, DEFAULT_EXIT_CODE, DEFAULT_MESSAGE,
    NON_FATAL_EXIT_CODE, Template, TemplateId,
};
pub use trace::{BacktraceWalker, StackWalker, TraceCollector, TraceFrame};

pub use khata_error::{KhataError, KhataErrorKind, KhataResult};

/// Appends a formatted explanation located at the macro call.
///
/// # Examples
///
/// ```
/// use khata::{ErrorRecord, explain};
///
/// let mut err = ErrorRecord::new("timeout");
/// explain!(err, "waited {}ms for {}", 500, "db");
/// assert_eq!(err.explanations()[0].message(), "waited 500ms for db");
/// ```
#[macro_export]
macro_rules! explain {
    ($record:expr, $($arg:tt)+) => {
        $record.explain_fmt(::core::format_args!($($arg)+))
    };
}
