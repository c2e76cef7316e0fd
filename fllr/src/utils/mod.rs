//! Supporting infrastructure: error types, byte-order helpers and
//! byte/time conversions.

pub mod byteorder;
pub mod errors;
pub mod timing;
