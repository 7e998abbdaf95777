//! Machine-readable serialized record.

use chrono::{DateTime, Utc};
use khata_error::{JsonError, JsonErrorKind, KhataResult};
use serde_json::error::Category;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{ErrorRecord, Explanation, PropertyBag, TraceFrame};

/// Timestamp layout used in serialized records, e.g. `2024-05-01T09:30:00.125Z+0000`.
const JSON_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ%z";

/// Wire shape of a serialized record.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SerializedRecord<'a> {
    trace: &'a [TraceFrame],
    explanations: &'a [Explanation],
    error: String,
    error_type: &'a str,
    error_code: i32,
    exit_code: i32,
    created_at: String,
    properties: &'a PropertyBag,
    handled_at: String,
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(JSON_TIME_FORMAT).to_string()
}

#[track_caller]
fn json_error(e: serde_json::Error) -> JsonError {
    let kind = match e.classify() {
        Category::Io => JsonErrorKind::Io(e.to_string()),
        _ => JsonErrorKind::Data(e.to_string()),
    };
    JsonError::new(kind)
}

impl ErrorRecord {
    /// Serializes the record to a JSON object.
    ///
    /// The trace is re-captured first, exactly as [`ErrorRecord::trace`]
    /// does, and `handledAt` is the time of this call.
    ///
    /// # Errors
    ///
    /// Returns a [`JsonError`] if a property cannot be represented.
    pub fn try_to_json(&mut self) -> KhataResult<String> {
        self.trace();
        let record = SerializedRecord {
            trace: self.last_trace(),
            explanations: self.explanations(),
            error: self.message(),
            error_type: self.error_type(),
            error_code: self.code(),
            exit_code: self.exit_code(),
            created_at: format_timestamp(self.created_at()),
            properties: self.properties(),
            handled_at: format_timestamp(Utc::now()),
        };
        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(e) => return Err(json_error(e).into()),
        };
        debug!(bytes = json.len(), "Serialized error record");
        Ok(json)
    }

    /// Serializes the record to a JSON object, or returns an empty string.
    ///
    /// An empty string means serialization failed; it is never a valid record.
    ///
    /// # Examples
    ///
    /// ```
    /// use khata::ErrorRecord;
    ///
    /// let mut err = ErrorRecord::new("disk full").with_code(28);
    /// let json: serde_json::Value = serde_json::from_str(&err.to_json()).unwrap();
    /// assert_eq!(json["error"], "disk full");
    /// assert_eq!(json["errorCode"], 28);
    /// assert_eq!(json["errorType"], "KhataError");
    /// ```
    pub fn to_json(&mut self) -> String {
        match self.try_to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize error record");
                String::new()
            }
        }
    }
}
