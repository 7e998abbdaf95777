//! Default top-level handling.

use tracing::debug;

use crate::{ErrorRecord, ReportConfig};

/// Prints the report and exits the process if the record is fatal.
///
/// Non-fatal records (exit code `-1`) return normally after printing.
pub fn handle_khata(record: ErrorRecord) {
    handle_khata_with(record, &ReportConfig::default());
}

/// [`handle_khata`] with an explicit report configuration.
pub fn handle_khata_with(mut record: ErrorRecord, config: &ReportConfig) {
    record.debug_with(config);

    if let Some(exit_code) = record.fatal_exit_code() {
        debug!(exit_code, error_type = %record.error_type(), "Exiting on fatal error");
        std::process::exit(exit_code);
    }
}
