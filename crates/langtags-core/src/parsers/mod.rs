//! Parsers for external data formats

pub mod registry_file;
