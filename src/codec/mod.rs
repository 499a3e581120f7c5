//! Reed-Solomon Codec
//!
//! Encodes aligned byte buffers into n+k slices over GF(2^8), decodes any
//! n of them back into the original bytes, and rebuilds lost slices from
//! survivors.
//!
//! # Data Layout
//!
//! A stripe is a row of n consecutive user bytes; each stripe produces one
//! coded byte per slice. For a 3+2 code, a 6-byte buffer becomes five
//! slices of two bytes each:
//!
//! ```text
//!   slice    0    1    2    3    4
//!   -------------------------------
//!   stripe 0 c00  c01  c02  c03  c04     <- coded from bytes 0..3
//!   stripe 1 c10  c11  c12  c13  c14     <- coded from bytes 3..6
//! ```
//!
//! Up to k slices may be lost entirely while the remaining ones still
//! recover every byte. The code layout is opaque: decoding runs through
//! the matrix kernel even when no slice is missing, so callers never
//! assume data bytes survive verbatim in any particular slice.

pub mod reed_solomon;

#[cfg(test)]
mod proptest;

pub use reed_solomon::{Code, Slice, FIELD_EXP, FIELD_POLY};
