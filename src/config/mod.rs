//! JSON runtime configuration for the command-line tools.
pub mod shadow;
