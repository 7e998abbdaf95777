//! The augmented error value.

use std::error::Error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::trace;

use crate::template::{
    DEFAULT_ERROR_CODE, DEFAULT_ERROR_TYPE, DEFAULT_EXIT_CODE, Lineage, NON_FATAL_EXIT_CODE,
};
use crate::{Explanation, PropertyBag, Template, TemplateId, TraceCollector, TraceFrame};

/// Shared handle to the failure a record decorates.
pub type Cause = Arc<dyn Error + Send + Sync + 'static>;

/// Plain-text failure used when a record is created from a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Error)]
#[display("{}", message)]
pub struct MessageError {
    message: String,
}

impl MessageError {
    /// Creates a message error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message text.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An error decorated with classification metadata, explanations and a trace.
///
/// The record never changes control flow on its own. It is returned and
/// propagated like any other error, gathers [explanations](ErrorRecord::explain)
/// on the way up, and is finally rendered with [`ErrorRecord::debug`] or
/// [`ErrorRecord::to_json`] (or handed to [`handle_khata`](crate::handle_khata)).
///
/// `Display` shows the underlying message and `source()` forwards to the
/// underlying error's own source.
///
/// Cloning a record shares its underlying error and its property bag with
/// the clone: a property set through either is visible through both.
/// Metadata, explanations and trace are copied. Call
/// [`ErrorRecord::detach_properties`] on the clone for a private bag.
///
/// # Examples
///
/// ```
/// use khata::ErrorRecord;
///
/// let mut err = ErrorRecord::new("boom");
/// err.set_code(404).set_exit_code(2);
///
/// assert_eq!(err.message(), "boom");
/// assert_eq!(err.code(), 404);
/// assert_eq!(err.exit_code(), 2);
/// assert!(err.is_fatal());
/// ```
#[derive(Debug, Clone, derive_more::Display)]
#[display("{}", cause)]
pub struct ErrorRecord {
    cause: Cause,
    created_at: DateTime<Utc>,
    code: i32,
    error_type: String,
    exit_code: i32,
    properties: PropertyBag,
    explanations: Vec<Explanation>,
    trace: Vec<TraceFrame>,
    template: Option<Arc<Lineage>>,
    collector: TraceCollector,
}

impl ErrorRecord {
    /// Creates a standalone record from a message, with default metadata.
    pub fn new(message: impl Into<String>) -> Self {
        Self::wrap(MessageError::new(message))
    }

    /// Wraps an existing error in a standalone record with default metadata.
    pub fn wrap<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::from_cause(Arc::new(err))
    }

    /// Wraps an already shared error, keeping its identity for [`ErrorRecord::is_same`].
    pub fn from_cause(cause: Cause) -> Self {
        Self {
            cause,
            created_at: Utc::now(),
            code: DEFAULT_ERROR_CODE,
            error_type: DEFAULT_ERROR_TYPE.to_string(),
            exit_code: DEFAULT_EXIT_CODE,
            properties: PropertyBag::new(),
            explanations: Vec::new(),
            trace: Vec::new(),
            template: None,
            collector: TraceCollector::default(),
        }
    }

    /// A record stamped by `template`, sharing its property bag.
    pub(crate) fn stamped(cause: Cause, template: &Template) -> Self {
        Self {
            code: template.code(),
            error_type: template.error_type().to_string(),
            exit_code: template.exit_code(),
            properties: template.properties().clone(),
            template: Some(Arc::clone(template.lineage())),
            ..Self::from_cause(cause)
        }
    }

    pub(crate) fn bind_template(&mut self, lineage: Arc<Lineage>) {
        self.template = Some(lineage);
    }

    /// Replaces the collector used for traces and explanation sites.
    pub fn set_collector(&mut self, collector: TraceCollector) -> &mut Self {
        self.collector = collector;
        self
    }

    /// Builder form of [`ErrorRecord::set_collector`].
    pub fn with_collector(mut self, collector: TraceCollector) -> Self {
        self.set_collector(collector);
        self
    }

    /// The underlying error's message.
    pub fn message(&self) -> String {
        self.cause.to_string()
    }

    /// The underlying error.
    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    /// Replaces the underlying error.
    ///
    /// This drops the link to whatever originally failed; use with care.
    pub fn set_error<E>(&mut self, err: E) -> &mut Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.cause = Arc::new(err);
        self
    }

    /// True if the underlying error is an `E` equal to `err`.
    pub fn is<E>(&self, err: &E) -> bool
    where
        E: Error + PartialEq + 'static,
    {
        self.cause.downcast_ref::<E>().is_some_and(|cause| cause == err)
    }

    /// True if the underlying error equals any of `errs`.
    pub fn is_any<'a, E, I>(&self, errs: I) -> bool
    where
        E: Error + PartialEq + 'static,
        I: IntoIterator<Item = &'a E>,
    {
        errs.into_iter().any(|err| self.is(err))
    }

    /// True if the underlying error is the very same allocation as `cause`.
    pub fn is_same(&self, cause: &Cause) -> bool {
        Arc::ptr_eq(&self.cause, cause)
    }

    /// When the record was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Error code; `-1` unless set.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Sets the error code.
    pub fn set_code(&mut self, code: i32) -> &mut Self {
        self.code = code;
        self
    }

    /// Builder form of [`ErrorRecord::set_code`].
    pub fn with_code(mut self, code: i32) -> Self {
        self.set_code(code);
        self
    }

    /// True if the code equals `code`.
    pub fn is_code(&self, code: i32) -> bool {
        self.code == code
    }

    /// True if the code equals any of `codes`.
    pub fn is_any_code(&self, codes: impl IntoIterator<Item = i32>) -> bool {
        codes.into_iter().any(|code| self.is_code(code))
    }

    /// Error type; `"KhataError"` unless set.
    pub fn error_type(&self) -> &str {
        &self.error_type
    }

    /// Sets the error type.
    pub fn set_type(&mut self, error_type: impl Into<String>) -> &mut Self {
        self.error_type = error_type.into();
        self
    }

    /// Builder form of [`ErrorRecord::set_type`].
    pub fn with_type(mut self, error_type: impl Into<String>) -> Self {
        self.set_type(error_type);
        self
    }

    /// True if the type equals `error_type`.
    pub fn is_type(&self, error_type: &str) -> bool {
        self.error_type == error_type
    }

    /// True if the type equals any of `error_types`.
    pub fn is_any_type<'a>(&self, error_types: impl IntoIterator<Item = &'a str>) -> bool {
        error_types
            .into_iter()
            .any(|error_type| self.is_type(error_type))
    }

    /// Exit code; `1` unless set, `-1` for non-fatal.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Sets the exit code.
    pub fn set_exit_code(&mut self, exit_code: i32) -> &mut Self {
        self.exit_code = exit_code;
        self
    }

    /// Builder form of [`ErrorRecord::set_exit_code`].
    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.set_exit_code(exit_code);
        self
    }

    /// True if the exit code equals `exit_code`.
    pub fn is_exit_code(&self, exit_code: i32) -> bool {
        self.exit_code == exit_code
    }

    /// True if the exit code equals any of `exit_codes`.
    pub fn is_any_exit_code(&self, exit_codes: impl IntoIterator<Item = i32>) -> bool {
        exit_codes
            .into_iter()
            .any(|exit_code| self.is_exit_code(exit_code))
    }

    /// True unless the exit code is the non-fatal sentinel `-1`.
    pub fn is_fatal(&self) -> bool {
        self.exit_code != NON_FATAL_EXIT_CODE
    }

    /// The process exit status to use, for fatal records only.
    pub fn fatal_exit_code(&self) -> Option<i32> {
        self.is_fatal().then_some(self.exit_code)
    }

    /// The property bag.
    ///
    /// Records created from a template share the template's bag.
    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    /// Sets a property.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.properties.set(key, value);
        self
    }

    /// Builder form of [`ErrorRecord::set_property`].
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_property(key, value);
        self
    }

    /// Removes a property.
    pub fn remove_property(&mut self, key: &str) -> &mut Self {
        self.properties.remove(key);
        self
    }

    /// True if the property has been set.
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains(key)
    }

    /// The value of a property.
    pub fn property(&self, key: &str) -> Option<Value> {
        self.properties.get(key)
    }

    /// Keys of every property.
    pub fn property_keys(&self) -> Vec<String> {
        self.properties.keys()
    }

    /// Gives this record a private copy of its property bag.
    pub fn detach_properties(&mut self) -> &mut Self {
        self.properties = self.properties.deep_clone();
        self
    }

    /// Identity of the template that created or last applied to this record.
    pub fn template_id(&self) -> Option<TemplateId> {
        self.template.as_ref().map(|lineage| lineage.id())
    }

    /// True if `template` is exactly this record's template.
    pub fn is_instance_of(&self, template: &Template) -> bool {
        self.template_id() == Some(template.id())
    }

    /// True if `template` is this record's template or any of its ancestors.
    pub fn is_related_to(&self, template: &Template) -> bool {
        self.template
            .as_deref()
            .is_some_and(|lineage| lineage.descends_from(template.id()))
    }

    /// Appends an explanation located at the caller.
    #[track_caller]
    pub fn explain(&mut self, message: impl Into<String>) -> &mut Self {
        self.push_explanation(Location::caller(), message.into());
        self
    }

    /// Appends a formatted explanation located at the caller.
    ///
    /// Usually reached through the [`explain!`](crate::explain) macro.
    #[track_caller]
    pub fn explain_fmt(&mut self, args: fmt::Arguments<'_>) -> &mut Self {
        self.push_explanation(Location::caller(), args.to_string());
        self
    }

    /// Builder form of [`ErrorRecord::explain`].
    #[track_caller]
    pub fn with_explanation(self, message: impl Into<String>) -> Self {
        self.explained_at(Location::caller(), message.into())
    }

    pub(crate) fn explained_at(mut self, location: &Location<'_>, message: String) -> Self {
        self.push_explanation(location, message);
        self
    }

    fn push_explanation(&mut self, location: &Location<'_>, message: String) {
        let site = self.collector.capture_immediate_caller(location);
        trace!(file = %site.file(), line = *site.line(), "Adding explanation");
        self.explanations.push(Explanation::new(message, site));
    }

    /// Every explanation, oldest first.
    pub fn explanations(&self) -> &[Explanation] {
        &self.explanations
    }

    /// Re-walks the current call stack and stores it as this record's trace.
    ///
    /// The result reflects the stack at the moment of the call, not at the
    /// moment the record was created.
    pub fn trace(&mut self) -> &[TraceFrame] {
        self.trace = self.collector.capture_call_stack();
        &self.trace
    }

    /// The trace stored by the last [`ErrorRecord::trace`] call.
    pub fn last_trace(&self) -> &[TraceFrame] {
        &self.trace
    }
}

impl Error for ErrorRecord {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.source()
    }
}
