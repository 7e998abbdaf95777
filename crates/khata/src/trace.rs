//! Call stack capture.
//!
//! A [`TraceCollector`] asks a [`StackWalker`] for the frames of the calling
//! thread and drops every frame that belongs to an internal namespace, so a
//! captured trace only shows caller code. Capture happens at the instant of
//! the call and is never cached here.

use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use serde::Serialize;
use tracing::trace;

/// Namespaces whose frames never appear in a captured trace.
const INTERNAL_NAMESPACES: &[&str] = &["khata", "backtrace"];

/// One call stack location.
///
/// # Examples
///
/// ```
/// use khata::TraceFrame;
///
/// let frame = TraceFrame::new("src/main.rs", 12, "app::main");
/// assert_eq!(*frame.line(), 12);
/// assert_eq!(frame.to_string(), "src/main.rs:12 (app::main)");
/// ```
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    derive_getters::Getters,
    derive_more::Display,
)]
#[display("{}:{} ({})", file, line, function_name)]
#[serde(rename_all = "camelCase")]
pub struct TraceFrame {
    /// Source file of the frame
    file: String,
    /// Line within the source file
    line: u32,
    /// Fully qualified function name
    function_name: String,
}

impl TraceFrame {
    /// Creates a frame from its parts.
    pub fn new(file: impl Into<String>, line: u32, function_name: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            function_name: function_name.into(),
        }
    }

    /// True for the zero frame returned when nothing could be captured.
    pub fn is_empty(&self) -> bool {
        self.file.is_empty() && self.line == 0 && self.function_name.is_empty()
    }
}

/// Host capability that enumerates the current call stack.
///
/// Implementations return frames innermost first. Internal frames are
/// filtered by the [`TraceCollector`], not by the walker.
pub trait StackWalker: Send + Sync {
    /// Every resolvable frame of the calling thread, innermost first.
    fn walk(&self) -> Vec<TraceFrame>;

    /// The innermost frame accepted by `accept`, if any.
    ///
    /// The default walks the full stack; walkers that can stop early should
    /// override it.
    fn find(&self, accept: &dyn Fn(&TraceFrame) -> bool) -> Option<TraceFrame> {
        self.walk().into_iter().find(|frame| accept(frame))
    }
}

/// [`StackWalker`] backed by the `backtrace` crate.
///
/// Inlined functions resolve to their own frames. Names are demangled
/// without the trailing hash. Frames with neither a symbol name nor a file
/// are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceWalker;

impl BacktraceWalker {
    fn visit(mut visit: impl FnMut(TraceFrame) -> bool) {
        backtrace::trace(|frame| {
            let mut keep_going = true;
            backtrace::resolve_frame(frame, |symbol| {
                if !keep_going {
                    return;
                }
                let frame = TraceFrame {
                    file: symbol
                        .filename()
                        .map(|path| path.display().to_string())
                        .unwrap_or_default(),
                    line: symbol.lineno().unwrap_or(0),
                    function_name: symbol
                        .name()
                        .map(|name| format!("{name:#}"))
                        .unwrap_or_default(),
                };
                if frame.file.is_empty() && frame.function_name.is_empty() {
                    return;
                }
                keep_going = visit(frame);
            });
            keep_going
        });
    }
}

impl StackWalker for BacktraceWalker {
    fn walk(&self) -> Vec<TraceFrame> {
        let mut frames = Vec::new();
        Self::visit(|frame| {
            frames.push(frame);
            true
        });
        frames
    }

    fn find(&self, accept: &dyn Fn(&TraceFrame) -> bool) -> Option<TraceFrame> {
        let mut found = None;
        Self::visit(|frame| {
            if accept(&frame) {
                found = Some(frame);
                false
            } else {
                true
            }
        });
        found
    }
}

/// Captures caller-only call stacks.
///
/// Cloning a collector shares its walker.
///
/// # Examples
///
/// ```
/// use khata::TraceCollector;
///
/// let collector = TraceCollector::default();
/// assert!(collector.is_internal("khata::record::ErrorRecord::trace"));
/// assert!(collector.is_internal("<khata::record::ErrorRecord as core::fmt::Display>::fmt"));
/// assert!(!collector.is_internal("khata_demo::main"));
/// ```
#[derive(Clone)]
pub struct TraceCollector {
    walker: Arc<dyn StackWalker>,
    namespaces: Vec<String>,
}

impl Default for TraceCollector {
    fn default() -> Self {
        Self::new(BacktraceWalker)
    }
}

impl fmt::Debug for TraceCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceCollector")
            .field("namespaces", &self.namespaces)
            .finish_non_exhaustive()
    }
}

impl TraceCollector {
    /// Creates a collector around the given walker.
    pub fn new(walker: impl StackWalker + 'static) -> Self {
        Self {
            walker: Arc::new(walker),
            namespaces: INTERNAL_NAMESPACES.iter().map(|ns| ns.to_string()).collect(),
        }
    }

    /// Treats frames under `namespace` as internal too.
    ///
    /// Useful when callers route every annotation through their own helper
    /// crate and want that crate hidden from traces as well.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces.push(namespace.into());
        self
    }

    /// True if `function_name` belongs to an internal namespace.
    ///
    /// Matches free functions (`ns::f`), inherent and trait impls on internal
    /// types (`<ns::T as ..>::f`) and internal trait impls on foreign types
    /// (`<T as ns::Trait>::f`).
    pub fn is_internal(&self, function_name: &str) -> bool {
        self.namespaces.iter().any(|ns| {
            let path = format!("{ns}::");
            function_name.starts_with(&path)
                || function_name
                    .strip_prefix('<')
                    .is_some_and(|rest| rest.starts_with(&path))
                || function_name.contains(&format!(" as {path}"))
        })
    }

    /// Walks the current stack, innermost first, without internal frames.
    ///
    /// Returns an empty vector when the stack cannot be walked.
    pub fn capture_call_stack(&self) -> Vec<TraceFrame> {
        let frames: Vec<TraceFrame> = self
            .walker
            .walk()
            .into_iter()
            .filter(|frame| !self.is_internal(&frame.function_name))
            .collect();
        trace!(frames = frames.len(), "Captured call stack");
        frames
    }

    /// Describes the call site that invoked an annotation operation.
    ///
    /// The line comes from the `#[track_caller]` location of that operation,
    /// which stays exact whatever internal layers sit in between. File and
    /// function name come from the innermost non-internal frame, so paths
    /// read the same as in [`TraceCollector::capture_call_stack`]. Without
    /// such a frame the file falls back to the location's and the function
    /// name is empty.
    pub fn capture_immediate_caller(&self, location: &Location<'_>) -> TraceFrame {
        let caller = self
            .walker
            .find(&|frame| !self.is_internal(&frame.function_name))
            .unwrap_or_default();
        let file = if caller.file.is_empty() {
            location.file().to_string()
        } else {
            caller.file
        };
        TraceFrame {
            file,
            line: location.line(),
            function_name: caller.function_name,
        }
    }
}
