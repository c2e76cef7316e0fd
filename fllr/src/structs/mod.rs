//! Data structures of the container and of conversion results.

pub mod header;
pub mod manifest;
