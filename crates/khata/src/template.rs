//! Reusable, inheritable error blueprints.
//!
//! A [`Template`] carries the code, type, exit code, default message and
//! properties that every record it creates starts with. [`Template::extend`]
//! derives a child template, and the resulting parent links answer
//! classification questions ("is this error a kind of X?") by comparing
//! stable [`TemplateId`]s rather than addresses.

use std::error::Error;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::{ErrorRecord, MessageError, PropertyBag};

/// Exit code used when none is configured.
pub const DEFAULT_EXIT_CODE: i32 = 1;
/// Error code used when none is configured.
pub const DEFAULT_ERROR_CODE: i32 = -1;
/// Message used by templates that are asked for a record without one.
pub const DEFAULT_MESSAGE: &str = "error";
/// Error type used when none is configured.
pub const DEFAULT_ERROR_TYPE: &str = "KhataError";
/// Exit code marking a record as non-fatal.
pub const NON_FATAL_EXIT_CODE: i32 = -1;

/// Stable identity of a template, assigned at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("{}", _0)]
pub struct TemplateId(Uuid);

impl TemplateId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// One node of a template's ancestry: its own id and its parent's node.
#[derive(Debug)]
pub(crate) struct Lineage {
    id: TemplateId,
    parent: Option<Arc<Lineage>>,
}

impl Lineage {
    pub(crate) fn id(&self) -> TemplateId {
        self.id
    }

    /// True if `id` is this node or any node above it.
    ///
    /// Walks parent links until the root, whatever the depth.
    pub(crate) fn descends_from(&self, id: TemplateId) -> bool {
        let mut node = Some(self);
        while let Some(current) = node {
            if current.id == id {
                return true;
            }
            node = current.parent.as_deref();
        }
        false
    }
}

/// Blueprint that stamps consistent metadata onto new error records.
///
/// Cloning a template yields another handle to the same identity and the
/// same property bag; use [`Template::extend`] to derive a new one.
///
/// # Examples
///
/// ```
/// use khata::Template;
///
/// let not_found = Template::new()
///     .with_type("NotFound")
///     .with_code(404)
///     .with_exit_code(-1);
///
/// let user_missing = not_found.extend().with_message("user not found");
///
/// let err = user_missing.new_error(Vec::<String>::new());
/// assert_eq!(err.message(), "user not found");
/// assert_eq!(err.code(), 404);
/// assert!(!err.is_fatal());
/// assert!(err.is_instance_of(&user_missing));
/// assert!(err.is_related_to(&not_found));
/// assert!(user_missing.is_instance_of(&not_found));
/// ```
#[derive(Debug, Clone)]
pub struct Template {
    message: String,
    code: i32,
    error_type: String,
    exit_code: i32,
    properties: PropertyBag,
    lineage: Arc<Lineage>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            message: DEFAULT_MESSAGE.to_string(),
            code: DEFAULT_ERROR_CODE,
            error_type: DEFAULT_ERROR_TYPE.to_string(),
            exit_code: DEFAULT_EXIT_CODE,
            properties: PropertyBag::new(),
            lineage: Arc::new(Lineage {
                id: TemplateId::generate(),
                parent: None,
            }),
        }
    }
}

impl Template {
    /// Creates a root template with the default code, type, exit code and message.
    pub fn new() -> Self {
        Self::default()
    }

    /// This template's identity.
    pub fn id(&self) -> TemplateId {
        self.lineage.id
    }

    /// Identity of the template this one was extended from.
    pub fn parent_id(&self) -> Option<TemplateId> {
        self.lineage.parent.as_ref().map(|parent| parent.id)
    }

    pub(crate) fn lineage(&self) -> &Arc<Lineage> {
        &self.lineage
    }

    /// Derives a child template.
    ///
    /// Scalars are copied. The property bag is shared, not copied: entries
    /// set through the child are visible through the parent and vice versa.
    /// Call [`Template::detach_properties`] on the child for an independent
    /// bag.
    pub fn extend(&self) -> Template {
        let child = Template {
            message: self.message.clone(),
            code: self.code,
            error_type: self.error_type.clone(),
            exit_code: self.exit_code,
            properties: self.properties.clone(),
            lineage: Arc::new(Lineage {
                id: TemplateId::generate(),
                parent: Some(Arc::clone(&self.lineage)),
            }),
        };
        debug!(parent = %self.id(), child = %child.id(), "Extended template");
        child
    }

    /// Replaces the shared property bag with a private copy of its entries.
    pub fn detach_properties(&mut self) -> &mut Self {
        self.properties = self.properties.deep_clone();
        self
    }

    /// Default message for records created without one.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Sets the default message.
    pub fn set_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.message = message.into();
        self
    }

    /// Builder form of [`Template::set_message`].
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.set_message(message);
        self
    }

    /// Error code stamped onto records.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Sets the error code.
    pub fn set_code(&mut self, code: i32) -> &mut Self {
        self.code = code;
        self
    }

    /// Builder form of [`Template::set_code`].
    pub fn with_code(mut self, code: i32) -> Self {
        self.set_code(code);
        self
    }

    /// Error type stamped onto records.
    pub fn error_type(&self) -> &str {
        &self.error_type
    }

    /// Sets the error type.
    pub fn set_type(&mut self, error_type: impl Into<String>) -> &mut Self {
        self.error_type = error_type.into();
        self
    }

    /// Builder form of [`Template::set_type`].
    pub fn with_type(mut self, error_type: impl Into<String>) -> Self {
        self.set_type(error_type);
        self
    }

    /// Exit code stamped onto records; `-1` means non-fatal.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Sets the exit code.
    pub fn set_exit_code(&mut self, exit_code: i32) -> &mut Self {
        self.exit_code = exit_code;
        self
    }

    /// Builder form of [`Template::set_exit_code`].
    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.set_exit_code(exit_code);
        self
    }

    /// The (possibly shared) property bag.
    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    /// Sets a property.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.properties.set(key, value);
        self
    }

    /// Builder form of [`Template::set_property`].
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

    /// Creates a record whose message is `messages` joined by newlines.
    ///
    /// Falls back to the template's message when the joined text is empty.
    pub fn new_error<I, S>(&self, messages: I) -> ErrorRecord
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = messages
            .into_iter()
            .map(|message| message.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        let message = if joined.is_empty() {
            self.message.clone()
        } else {
            joined
        };
        self.wrap(MessageError::new(message))
    }

    /// Creates a record with exactly `message`, even when it is empty.
    pub fn new_error_with_message(&self, message: impl Into<String>) -> ErrorRecord {
        self.wrap(MessageError::new(message))
    }

    /// Wraps an existing error in a record stamped by this template.
    pub fn wrap<E>(&self, err: E) -> ErrorRecord
    where
        E: Error + Send + Sync + 'static,
    {
        debug!(template = %self.id(), error_type = %self.error_type, "Stamping new record");
        ErrorRecord::stamped(Arc::new(err), self)
    }

    /// Re-stamps an existing record with this template.
    ///
    /// Code, type and exit code are overwritten, this template's properties
    /// are merged into the record's bag (template wins on conflicts) and the
    /// record now counts as an instance of this template. The cause,
    /// explanations and trace are untouched.
    pub fn apply<'a>(&self, record: &'a mut ErrorRecord) -> &'a mut ErrorRecord {
        debug!(template = %self.id(), "Applying template to record");
        record
            .set_code(self.code)
            .set_type(self.error_type.clone())
            .set_exit_code(self.exit_code);
        record.properties().merge_from(&self.properties);
        record.bind_template(Arc::clone(&self.lineage));
        record
    }

    /// True if `other` is this template's direct parent.
    pub fn is_instance_of(&self, other: &Template) -> bool {
        self.parent_id() == Some(other.id())
    }

    /// True if this template is `other`'s direct parent.
    pub fn is_parent_of(&self, other: &Template) -> bool {
        other.parent_id() == Some(self.id())
    }

    /// True if `other` is anywhere above this template.
    ///
    /// A template is not related to itself.
    pub fn is_related_to(&self, other: &Template) -> bool {
        self.lineage
            .parent
            .as_deref()
            .is_some_and(|parent| parent.descends_from(other.id()))
    }
}
