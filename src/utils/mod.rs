//! Utilities for the library.

pub mod file_system;

/// Converts a vector of string slices into a vector of owned strings.
pub fn to_owned(args: Vec<&str>) -> Vec<String> {
    args.iter().map(|arg| arg.to_string()).collect()
}
