//! Failure types for the khata library.
//!
//! `khata` decorates other people's errors; this crate covers the few ways
//! khata itself can fail (loading report configuration, serializing a record).
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - Constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use khata_error::{ConfigError, ConfigErrorKind, KhataResult};
//!
//! fn load() -> KhataResult<()> {
//!     Err(ConfigError::new(ConfigErrorKind::Parse("bad color".to_string())))?
//! }
//!
//! assert!(load().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod json;

pub use config::{ConfigError, ConfigErrorKind};
pub use error::{KhataError, KhataErrorKind, KhataResult};
pub use json::{JsonError, JsonErrorKind};
