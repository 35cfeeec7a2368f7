//! Output adapters for the command-line front end.

pub mod console;
pub mod csv;
