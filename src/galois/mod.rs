//! Finite-Field Arithmetic
//!
//! This module implements the mathematical substrate of the Reed-Solomon
//! codec: a binary Galois field GF(2^m) and a small matrix kernel over it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Galois Subsystem                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────┐        ┌──────────────────────────┐   │
//! │  │   GaloisField    │        │         Matrix           │   │
//! │  │  add/mul/inv/    │◀───────│  identity / vandermonde  │   │
//! │  │  div/pow/dot     │        │  transform / invert      │   │
//! │  └──────────────────┘        └──────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **Field** (`field.rs`): elements are polynomials over GF(2) of degree
//!   below `m`, reduced modulo a generating polynomial. Addition is XOR;
//!   multiplication is a shift-and-xor product followed by reduction.
//!   Inverses are table-backed.
//!
//! - **Matrix kernel** (`matrix.rs`): row-major matrices of field elements
//!   with the operations the codec needs, most importantly the Vandermonde
//!   construction with an identity-topped transform, and Gauss-Jordan
//!   inversion.

pub mod field;
pub mod matrix;

pub use field::{Elem, GaloisField, DEFAULT_EXP, DEFAULT_POLY};
pub use matrix::Matrix;
