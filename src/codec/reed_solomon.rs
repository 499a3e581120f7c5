//! Reed-Solomon encode / decode / rebuild over the default field.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::galois::{Elem, GaloisField, Matrix, DEFAULT_EXP, DEFAULT_POLY};

/// Field exponent used by the default codec; GF(2^8) fits one element
/// per byte.
pub const FIELD_EXP: u32 = DEFAULT_EXP;

/// Generating polynomial of the default codec field:
/// x^8 + x^6 + x^5 + x^2 + 1.
pub const FIELD_POLY: Elem = DEFAULT_POLY;

// =============================================================================
// Slice
// =============================================================================

/// The per-replica byte stream of one encoding.
///
/// A slice carries its position in the code space; byte i of a slice is
/// the coded byte this slice contributes to stripe i. All n+k slices of
/// one encoding share the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    /// Position in the code space, `0..n+k`
    pub index: usize,
    /// One coded byte per stripe
    pub data: Vec<u8>,
}

impl Slice {
    /// Create a slice at the given code index.
    pub fn new(index: usize, data: Vec<u8>) -> Self {
        Self { index, data }
    }

    /// Number of stripes this slice covers.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the slice covers no stripes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// =============================================================================
// Code
// =============================================================================

/// An n+k Reed-Solomon code over GF(2^m).
///
/// Holds the generator matrix built from a transformed Vandermonde matrix;
/// every n-row subset of the generator is invertible, which is what lets
/// any n slices recover the data. Immutable after construction.
#[derive(Debug, Clone)]
pub struct Code {
    field: GaloisField,
    n: usize,
    k: usize,
    matrix: Matrix,
}

impl Code {
    /// Create an n+k code over the default GF(2^8) field.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when n or k is zero and
    /// `InsufficientFieldSize` when n + k exceeds the field size.
    pub fn new(n: usize, k: usize) -> Result<Self> {
        Self::with_field(GaloisField::new(FIELD_EXP, FIELD_POLY)?, n, k)
    }

    /// Create an n+k code over a caller-supplied field.
    pub fn with_field(field: GaloisField, n: usize, k: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::InvalidConfig(
                "data slice count must be greater than 0".to_string(),
            ));
        }
        if k == 0 {
            return Err(Error::InvalidConfig(
                "parity slice count must be greater than 0".to_string(),
            ));
        }

        let matrix = Matrix::transformed_vandermonde(&field, n, k)?;
        debug!(n, k, m = field.exponent(), "created Reed-Solomon code");
        Ok(Self { field, n, k, matrix })
    }

    /// Number of data slices.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of parity slices.
    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Total number of slices, n + k.
    #[inline]
    pub fn total(&self) -> usize {
        self.n + self.k
    }

    /// Encode an aligned byte buffer into n+k slices.
    ///
    /// Aligned means the buffer length is divisible by n; each group of n
    /// bytes forms one stripe vector, multiplied through the generator to
    /// yield one byte per slice.
    ///
    /// # Errors
    ///
    /// Returns `Misaligned` when the buffer is not a multiple of n.
    pub fn encode_aligned(&self, buf: &[u8]) -> Result<Vec<Slice>> {
        if buf.len() % self.n != 0 {
            return Err(Error::Misaligned {
                len: buf.len(),
                stripe: self.n,
            });
        }
        let slice_len = buf.len() / self.n;

        let mut slices: Vec<Slice> = (0..self.total())
            .map(|i| Slice::new(i, vec![0u8; slice_len]))
            .collect();

        let mut vec = vec![0 as Elem; self.n];
        for i in 0..slice_len {
            for (j, v) in vec.iter_mut().enumerate() {
                *v = Elem::from(buf[i * self.n + j]);
            }
            let cod = self.matrix.mul_vec(&self.field, &vec)?;
            for (slice, &c) in slices.iter_mut().zip(&cod) {
                slice.data[i] = c as u8;
            }
        }
        Ok(slices)
    }

    /// Decode n slices back into the aligned byte buffer they encode.
    ///
    /// The first n slices given are used, whatever their indices; the
    /// generator rows they select are inverted and applied stripe by
    /// stripe. Output length is `n * slice_len`.
    ///
    /// # Errors
    ///
    /// Returns `TooFewSlices` when fewer than n slices are given and
    /// `SliceMismatch` when the chosen slices disagree on length.
    pub fn decode_aligned(&self, slices: &[Slice]) -> Result<Vec<u8>> {
        if slices.len() < self.n {
            return Err(Error::TooFewSlices {
                available: slices.len(),
                required: self.n,
            });
        }
        let chosen = &slices[..self.n];
        let slice_len = consistent_len(chosen)?;
        let dec = self.decode_matrix(chosen)?;

        let mut bytes = vec![0u8; self.n * slice_len];
        let mut vec = vec![0 as Elem; self.n];
        for i in 0..slice_len {
            for (v, slice) in vec.iter_mut().zip(chosen) {
                *v = Elem::from(slice.data[i]);
            }
            let dat = dec.mul_vec(&self.field, &vec)?;
            for (j, &d) in dat.iter().enumerate() {
                bytes[i * self.n + j] = d as u8;
            }
        }
        Ok(bytes)
    }

    /// Regenerate all n+k slices from any n survivors.
    ///
    /// Slices whose index is present in the input are returned with the
    /// input bytes verbatim; the rest are recomputed by decoding each
    /// stripe and re-encoding it through the generator.
    ///
    /// # Errors
    ///
    /// Returns `TooFewSlices` when fewer than n slices are given and
    /// `SliceMismatch` when the input slices disagree on length.
    pub fn rebuild(&self, slices: &[Slice]) -> Result<Vec<Slice>> {
        if slices.len() < self.n {
            return Err(Error::TooFewSlices {
                available: slices.len(),
                required: self.n,
            });
        }
        let slice_len = consistent_len(slices)?;
        let chosen = &slices[..self.n];
        let dec = self.decode_matrix(chosen)?;

        let present: HashMap<usize, &Slice> = slices.iter().map(|s| (s.index, s)).collect();
        let missing: Vec<usize> = (0..self.total())
            .filter(|i| !present.contains_key(i))
            .collect();

        let mut result: Vec<Slice> = (0..self.total())
            .map(|i| match present.get(&i) {
                Some(s) => Slice::new(i, s.data.clone()),
                None => Slice::new(i, vec![0u8; slice_len]),
            })
            .collect();

        let mut vec = vec![0 as Elem; self.n];
        for i in 0..slice_len {
            for (v, slice) in vec.iter_mut().zip(chosen) {
                *v = Elem::from(slice.data[i]);
            }
            let dat = dec.mul_vec(&self.field, &vec)?;
            let cod = self.matrix.mul_vec(&self.field, &dat)?;
            for &idx in &missing {
                result[idx].data[i] = cod[idx] as u8;
            }
        }
        Ok(result)
    }

    /// Invert the generator rows selected by the given slices' indices.
    fn decode_matrix(&self, chosen: &[Slice]) -> Result<Matrix> {
        let indices: Vec<usize> = chosen.iter().map(|s| s.index).collect();
        self.matrix.select_rows(&indices)?.invert(&self.field)
    }
}

/// Common length of the slices, or `SliceMismatch`.
fn consistent_len(slices: &[Slice]) -> Result<usize> {
    let expected = slices[0].len();
    for s in slices {
        if s.len() != expected {
            return Err(Error::SliceMismatch {
                index: s.index,
                actual: s.len(),
                expected,
            });
        }
    }
    Ok(expected)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn code32() -> Code {
        Code::new(3, 2).unwrap()
    }

    // =========================================================================
    // Construction
    // =========================================================================

    #[test]
    fn test_new() {
        let code = code32();
        assert_eq!(code.n(), 3);
        assert_eq!(code.k(), 2);
        assert_eq!(code.total(), 5);
    }

    #[test]
    fn test_new_rejects_zero_counts() {
        assert!(matches!(Code::new(0, 2), Err(Error::InvalidConfig(_))));
        assert!(matches!(Code::new(3, 0), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_field_exhaustion() {
        assert!(matches!(
            Code::new(200, 100),
            Err(Error::InsufficientFieldSize {
                total: 300,
                field_size: 256
            })
        ));
    }

    // =========================================================================
    // Encode / Decode
    // =========================================================================

    #[test]
    fn test_empty_encode() {
        let code = code32();
        let slices = code.encode_aligned(b"").unwrap();
        assert_eq!(slices.len(), 5);
        assert!(slices.iter().all(|s| s.is_empty()));
        assert_eq!(code.decode_aligned(&slices).unwrap(), b"");
    }

    #[test]
    fn test_single_stripe_any_three_slices() {
        let code = code32();
        let slices = code.encode_aligned(b"abc").unwrap();
        assert_eq!(slices.len(), 5);
        assert!(slices.iter().all(|s| s.len() == 1));

        for a in 0..5 {
            for b in a + 1..5 {
                for c in b + 1..5 {
                    let subset = vec![slices[a].clone(), slices[b].clone(), slices[c].clone()];
                    assert_eq!(
                        code.decode_aligned(&subset).unwrap(),
                        b"abc",
                        "slices ({}, {}, {})",
                        a,
                        b,
                        c
                    );
                }
            }
        }
    }

    #[test]
    fn test_two_stripes_with_dropout() {
        let code = code32();
        let slices = code.encode_aligned(b"abcdef").unwrap();
        assert!(slices.iter().all(|s| s.len() == 2));

        // slices 0 and 2 unavailable
        let survivors = vec![slices[1].clone(), slices[3].clone(), slices[4].clone()];
        assert_eq!(code.decode_aligned(&survivors).unwrap(), b"abcdef");
    }

    #[test]
    fn test_decode_order_independent() {
        let code = code32();
        let slices = code.encode_aligned(b"abcdef").unwrap();
        let shuffled = vec![slices[4].clone(), slices[1].clone(), slices[3].clone()];
        assert_eq!(code.decode_aligned(&shuffled).unwrap(), b"abcdef");
    }

    #[test]
    fn test_encode_misaligned() {
        let code = code32();
        assert!(matches!(
            code.encode_aligned(b"ab"),
            Err(Error::Misaligned { len: 2, stripe: 3 })
        ));
    }

    #[test]
    fn test_decode_too_few_slices() {
        let code = code32();
        let slices = code.encode_aligned(b"abc").unwrap();
        assert!(matches!(
            code.decode_aligned(&slices[..2]),
            Err(Error::TooFewSlices {
                available: 2,
                required: 3
            })
        ));
    }

    #[test]
    fn test_decode_length_mismatch() {
        let code = code32();
        let mut slices = code.encode_aligned(b"abcdef").unwrap();
        slices[1].data.pop();
        assert!(matches!(
            code.decode_aligned(&slices[..3]),
            Err(Error::SliceMismatch { index: 1, .. })
        ));
    }

    // =========================================================================
    // Rebuild
    // =========================================================================

    #[test]
    fn test_rebuild_restores_dropped_slices() {
        let code = code32();
        let original = code.encode_aligned(b"abcdef").unwrap();

        // drop slices 1 and 4, rebuild from 0, 2, 3
        let survivors = vec![
            original[0].clone(),
            original[2].clone(),
            original[3].clone(),
        ];
        let rebuilt = code.rebuild(&survivors).unwrap();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_rebuild_from_parity_only_survivors() {
        let code = code32();
        let original = code.encode_aligned(b"abcdef").unwrap();
        let survivors = vec![
            original[2].clone(),
            original[3].clone(),
            original[4].clone(),
        ];
        assert_eq!(code.rebuild(&survivors).unwrap(), original);
    }

    #[test]
    fn test_rebuild_too_few_slices() {
        let code = code32();
        let original = code.encode_aligned(b"abcdef").unwrap();
        assert!(matches!(
            code.rebuild(&original[..2]),
            Err(Error::TooFewSlices { .. })
        ));
    }

    #[test]
    fn test_rebuild_slice_mismatch() {
        let code = code32();
        let mut slices = code.encode_aligned(b"abcdef").unwrap();
        slices[4].data.push(0);
        assert!(matches!(
            code.rebuild(&slices),
            Err(Error::SliceMismatch { index: 4, .. })
        ));
    }

    #[test]
    fn test_rebuild_of_complete_set_is_identity() {
        let code = code32();
        let original = code.encode_aligned(b"stripesix").unwrap();
        assert_eq!(code.rebuild(&original).unwrap(), original);
    }
}
