//! Outer surfaces: the command model and the CSV script/report formats used by the CLI.

pub mod command;
pub mod csv;
