//! # Vigil Log - Logging facade for the Vigil monitoring core
//!
//! This crate owns the logging subsystem shared by the Vigil service and its
//! registries:
//!
//! - [`Logger`]: formats and emits log lines, owns the lazily-opened file
//!   destination, and mirrors lines to an attached console sink gated by a
//!   noise level.
//! - [`Severity`]: the 4-letter severity tags written on disk.
//! - [`ConsoleSink`]: the minimal contract expected of a console surface.
//!
//! ## Noise levels
//!
//! The noise level is an unbounded integer threshold (default 0). A line is
//! mirrored to the attached console when the level meets the severity's
//! threshold: errors at 0 (always, unless the console is detached), warnings
//! at 1, informational lines at 2.
//!
//! ## Lazy file destination
//!
//! Attaching a log path is side-effect-free: the file is opened in append
//! mode on the first write and the handle is kept across subsequent writes.
//! With neither an open stream nor a configured path, log calls simply
//! produce no file output.

#![deny(unsafe_code)]

pub mod error;
pub mod logger;
pub mod severity;
pub mod sink;

// Re-export main types
pub use error::{LogError, Result};
pub use logger::{LogStream, Logger};
pub use severity::Severity;
pub use sink::{ConsoleSink, MemoryConsole};
