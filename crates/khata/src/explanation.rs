//! Human annotations attached while an error propagates.

use serde::Serialize;

use crate::TraceFrame;

/// A message plus the call site that added it.
///
/// Explanations are immutable once created and only ever appended to a
/// record's chain.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, derive_getters::Getters, derive_more::Display,
)]
#[display("{}:{} ({}): {}", file, line, function_name, message)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    /// Source file of the annotating call
    file: String,
    /// Line of the annotating call
    line: u32,
    /// Function that made the annotating call
    function_name: String,
    /// Human-authored text
    message: String,
}

impl Explanation {
    /// Creates an explanation located at `site`.
    pub fn new(message: impl Into<String>, site: TraceFrame) -> Self {
        Self {
            file: site.file().clone(),
            line: *site.line(),
            function_name: site.function_name().clone(),
            message: message.into(),
        }
    }

    /// The call site as a trace frame.
    pub fn site(&self) -> TraceFrame {
        TraceFrame::new(self.file.clone(), self.line, self.function_name.clone())
    }
}
