//! Tests for standalone error records.

use std::error::Error;
use std::sync::Arc;

use khata::{Cause, ErrorRecord, MessageError, Template};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("outer")]
struct Outer {
    source: MessageError,
}

#[test]
fn test_new_sets_message() {
    let err = ErrorRecord::new("This is an error message");
    assert_eq!(err.message(), "This is an error message");
    assert_eq!(err.to_string(), "This is an error message");
}

#[test]
fn test_wrap_sets_message() {
    let original = MessageError::new("This is an error message");
    let err = ErrorRecord::wrap(original.clone());
    assert_eq!(err.message(), original.to_string());
}

#[test]
fn test_default_metadata() {
    let err = ErrorRecord::new("x");

    assert_eq!(err.exit_code(), 1);
    assert_eq!(err.code(), -1);
    assert_eq!(err.error_type(), "KhataError");
    assert!(err.is_fatal());
    assert_eq!(err.template_id(), None);
    assert!(err.explanations().is_empty());
    assert!(err.last_trace().is_empty());
}

#[test]
fn test_setters_chain() {
    let mut err = ErrorRecord::new("boom");
    err.set_code(404).set_exit_code(2);

    assert_eq!(err.message(), "boom");
    assert_eq!(err.code(), 404);
    assert_eq!(err.exit_code(), 2);
    assert!(err.is_fatal());
}

#[test]
fn test_builder_setters() {
    let err = ErrorRecord::new("boom")
        .with_code(404)
        .with_type("NotFound")
        .with_exit_code(0)
        .with_property("path", "/users/7");

    assert_eq!(err.code(), 404);
    assert_eq!(err.error_type(), "NotFound");
    assert_eq!(err.exit_code(), 0);
    assert_eq!(err.property("path"), Some("/users/7".into()));
}

#[test]
fn test_exit_code_zero_is_fatal() {
    let err = ErrorRecord::new("x").with_exit_code(0);
    assert!(err.is_fatal());
    assert_eq!(err.fatal_exit_code(), Some(0));
}

#[test]
fn test_non_fatal_sentinel() {
    let err = ErrorRecord::new("x").with_exit_code(-1);
    assert!(!err.is_fatal());
    assert_eq!(err.fatal_exit_code(), None);
}

#[test]
fn test_template_with_non_fatal_exit_code() {
    let template = Template::new().with_exit_code(-1);
    assert!(!template.new_error(["warn"]).is_fatal());
}

#[test]
fn test_code_predicates() {
    let err = ErrorRecord::new("x").with_code(500);

    assert!(err.is_code(500));
    assert!(!err.is_code(501));
    assert!(err.is_any_code([404, 500]));
    assert!(!err.is_any_code([404, 501]));
    assert!(!err.is_any_code(std::iter::empty()));
}

#[test]
fn test_type_predicates() {
    let err = ErrorRecord::new("x").with_type("Timeout");

    assert!(err.is_type("Timeout"));
    assert!(!err.is_type("timeout"));
    assert!(err.is_any_type(["Io", "Timeout"]));
    assert!(!err.is_any_type(["Io"]));
}

#[test]
fn test_exit_code_predicates() {
    let err = ErrorRecord::new("x").with_exit_code(3);

    assert!(err.is_exit_code(3));
    assert!(err.is_any_exit_code([1, 3]));
    assert!(!err.is_any_exit_code([1, 2]));
}

#[test]
fn test_is_compares_underlying_error_by_value() {
    let err = ErrorRecord::new("disk full");

    assert!(err.is(&MessageError::new("disk full")));
    assert!(!err.is(&MessageError::new("disk empty")));
    assert!(!err.is(&"1x".parse::<u8>().unwrap_err()));
}

#[test]
fn test_is_any_matches_one_of() {
    let err = ErrorRecord::new("b");
    let candidates = [MessageError::new("a"), MessageError::new("b")];

    assert!(err.is_any(&candidates));
    assert!(!err.is_any(&candidates[..1]));
    assert!(!err.is_any(&[] as &[MessageError]));
}

#[test]
fn test_is_same_compares_identity() {
    let cause: Cause = Arc::new(MessageError::new("shared"));
    let other: Cause = Arc::new(MessageError::new("shared"));
    let err = ErrorRecord::from_cause(Arc::clone(&cause));

    assert!(err.is_same(&cause));
    assert!(!err.is_same(&other));
}

#[test]
fn test_set_error_replaces_cause() {
    let mut err = ErrorRecord::new("first");
    err.explain("kept");
    err.set_error(MessageError::new("second"));

    assert_eq!(err.message(), "second");
    assert!(!err.is(&MessageError::new("first")));
    assert_eq!(err.explanations().len(), 1);
}

#[test]
fn test_source_forwards_to_the_cause_source() {
    let err = ErrorRecord::wrap(Outer {
        source: MessageError::new("inner"),
    });

    assert_eq!(err.to_string(), "outer");
    let source = err.source().expect("outer has a source");
    assert_eq!(source.to_string(), "inner");
    assert!(ErrorRecord::new("leaf").source().is_none());
}

#[test]
fn test_record_works_with_question_mark() {
    fn inner() -> Result<(), ErrorRecord> {
        Err(ErrorRecord::new("inner failed"))
    }

    fn outer() -> Result<(), Box<dyn Error + Send + Sync>> {
        inner()?;
        Ok(())
    }

    let err = outer().unwrap_err();
    assert_eq!(err.to_string(), "inner failed");
    assert!(err.downcast_ref::<ErrorRecord>().is_some());
}

#[test]
fn test_property_lifecycle() {
    let mut err = ErrorRecord::new("x");
    assert!(!err.has_property("k"));
    assert_eq!(err.property("k"), None);

    err.set_property("k", 10);
    assert!(err.has_property("k"));
    assert_eq!(err.property("k"), Some(10.into()));

    err.remove_property("k");
    assert!(!err.has_property("k"));
    assert_eq!(err.property("k"), None);
}

#[test]
fn test_property_keys_lists_exactly_the_stored_keys() {
    let err = ErrorRecord::new("x")
        .with_property("b", 2)
        .with_property("a", 1);

    assert_eq!(err.property_keys(), vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_stamped_record_shares_template_bag() {
    let template = Template::new();
    let mut err = template.new_error(["x"]);

    err.set_property("written_by_record", true);
    assert!(template.has_property("written_by_record"));

    err.detach_properties();
    err.set_property("private", true);
    assert!(!template.has_property("private"));
}

#[test]
fn test_created_at_is_recent() {
    let before = chrono::Utc::now();
    let err = ErrorRecord::new("x");
    let after = chrono::Utc::now();

    assert!(err.created_at() >= before);
    assert!(err.created_at() <= after);
}

#[test]
fn test_clone_shares_properties_but_copies_metadata() {
    let mut err = ErrorRecord::new("x").with_code(1);
    let mut copy = err.clone();

    copy.set_property("from_copy", true).set_code(2);
    assert!(err.has_property("from_copy"));
    assert_eq!(err.code(), 1);
    assert!(err.is_same(copy.cause()));

    copy.detach_properties();
    copy.set_property("private", 1);
    err.set_property("only_original", 2);
    assert!(!err.has_property("private"));
    assert!(!copy.has_property("only_original"));
}
