//! Tests for call stack capture and filtering.

use std::sync::atomic::{AtomicU32, Ordering};

use khata::{BacktraceWalker, ErrorRecord, StackWalker, TraceCollector, TraceFrame};

/// Walker returning a fixed stack, innermost first.
struct FixedWalker(Vec<TraceFrame>);

impl StackWalker for FixedWalker {
    fn walk(&self) -> Vec<TraceFrame> {
        self.0.clone()
    }
}

/// Walker whose caller line moves on every walk.
#[derive(Default)]
struct MovingWalker(AtomicU32);

impl StackWalker for MovingWalker {
    fn walk(&self) -> Vec<TraceFrame> {
        let call = self.0.fetch_add(1, Ordering::SeqCst);
        vec![
            TraceFrame::new("src/record.rs", 1, "khata::record::ErrorRecord::trace"),
            TraceFrame::new("src/jobs.rs", 100 + call, "worker::jobs::run"),
        ]
    }
}

fn mixed_stack() -> Vec<TraceFrame> {
    vec![
        TraceFrame::new("libunwind.rs", 1, "backtrace::backtrace::libunwind::trace"),
        TraceFrame::new("src/trace.rs", 2, "khata::trace::TraceCollector::capture_call_stack"),
        TraceFrame::new(
            "src/report.rs",
            3,
            "<khata::record::ErrorRecord as core::fmt::Display>::fmt",
        ),
        TraceFrame::new(
            "src/ext.rs",
            4,
            "<core::result::Result<T,khata::record::ErrorRecord> as khata::ext::ResultExt<T>>::explain",
        ),
        TraceFrame::new("src/handlers.rs", 5, "api::handlers::create_user"),
        TraceFrame::new("src/khata_bridge.rs", 6, "khata_bridge::report"),
        TraceFrame::new("src/main.rs", 7, "api::main"),
    ]
}

#[test]
fn test_capture_call_stack_drops_internal_frames() {
    let collector = TraceCollector::new(FixedWalker(mixed_stack()));

    let frames = collector.capture_call_stack();

    let names: Vec<&str> = frames
        .iter()
        .map(|frame| frame.function_name().as_str())
        .collect();
    assert_eq!(
        names,
        ["api::handlers::create_user", "khata_bridge::report", "api::main"]
    );
    assert_eq!(*frames[0].line(), 5);
}

#[test]
fn test_extra_namespace_is_filtered() {
    let collector = TraceCollector::new(FixedWalker(mixed_stack())).with_namespace("khata_bridge");

    let frames = collector.capture_call_stack();

    assert_eq!(frames.len(), 2);
    assert!(collector.is_internal("khata_bridge::report"));
}

#[test]
fn test_empty_stack_yields_empty_trace() {
    let collector = TraceCollector::new(FixedWalker(Vec::new()));

    assert!(collector.capture_call_stack().is_empty());

    let mut err = ErrorRecord::new("x").with_collector(collector);
    assert!(err.trace().is_empty());
}

#[test]
fn test_zero_frame_is_empty() {
    assert!(TraceFrame::default().is_empty());
    assert!(!TraceFrame::new("a.rs", 1, "a::b").is_empty());
}

#[test]
fn test_trace_recomputes_and_overwrites() {
    let mut err = ErrorRecord::new("x").with_collector(TraceCollector::new(MovingWalker::default()));

    let first = err.trace().to_vec();
    let second = err.trace().to_vec();

    assert_eq!(first.len(), 1);
    assert_eq!(*first[0].line(), 100);
    assert_eq!(*second[0].line(), 101);
    assert_eq!(err.last_trace(), second.as_slice());
}

#[test]
fn test_trace_reflects_inspection_time_not_creation_time() {
    let err = ErrorRecord::new("x").with_collector(TraceCollector::new(MovingWalker::default()));
    assert!(err.last_trace().is_empty());

    let mut err = err;
    assert_eq!(*err.trace()[0].line(), 100);
}

#[test]
fn test_real_trace_is_stable_from_the_same_call_site() {
    let mut err = ErrorRecord::new("x");

    let mut traces = Vec::new();
    for _ in 0..2 {
        traces.push(err.trace().to_vec());
    }

    assert!(!traces[0].is_empty());
    assert_eq!(traces[0], traces[1]);
}

#[test]
fn test_real_trace_hides_library_frames() {
    let mut err = ErrorRecord::new("x");
    let collector = TraceCollector::default();

    let frames = err.trace().to_vec();

    assert!(
        frames
            .iter()
            .all(|frame| !collector.is_internal(frame.function_name()))
    );
    assert!(
        frames.iter().any(|frame| frame
            .function_name()
            .ends_with("test_real_trace_hides_library_frames")),
        "caller frame missing from {frames:?}"
    );
}

#[test]
fn test_backtrace_walker_sees_the_caller() {
    let frames = BacktraceWalker.walk();
    assert!(
        frames.iter().any(|frame| frame
            .function_name()
            .ends_with("test_backtrace_walker_sees_the_caller"))
    );
}

#[test]
fn test_backtrace_walker_find_stops_at_first_match() {
    let found = BacktraceWalker.find(&|frame| {
        frame
            .function_name()
            .ends_with("test_backtrace_walker_find_stops_at_first_match")
    });

    let frame = found.expect("test frame on the stack");
    assert!(frame.file().ends_with("trace_test.rs"));
}

#[test]
fn test_frame_display() {
    let frame = TraceFrame::new("src/main.rs", 12, "app::main");
    assert_eq!(frame.to_string(), "src/main.rs:12 (app::main)");
}
