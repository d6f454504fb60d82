//! Shared pieces of the `jobdesk-admin` command line.
//!
//! The binary wires these to `clap` and the HTTP client; keeping them in a
//! library lets them run against a mock API in tests.

pub mod commands;
pub mod console;

pub use commands::{
    AttachArg, ValidationReport, load_record, prepare_form, submit_form, validate_record,
};
pub use console::{ConsoleNotifier, LogNavigator};
