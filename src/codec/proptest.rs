//! Property-Based Tests for the Reed-Solomon Codec
//!
//! Uses proptest to verify codec correctness across configurations:
//!
//! 1. **Roundtrip**: decode(encode(buf)) = buf
//! 2. **Loss tolerance**: any subset of up to k slices may vanish
//! 3. **Rebuild fidelity**: any n survivors regenerate the full encoding
//! 4. **Determinism**: same input always produces the same slices

#![cfg(test)]

use proptest::prelude::*;

use super::reed_solomon::{Code, Slice};

// =============================================================================
// Strategies
// =============================================================================

/// Code shape plus an aligned payload for it.
fn code_and_buffer() -> impl Strategy<Value = (usize, usize, Vec<u8>)> {
    (2usize..=5, 1usize..=3, 0usize..=48).prop_flat_map(|(n, k, stripes)| {
        prop::collection::vec(any::<u8>(), n * stripes).prop_map(move |buf| (n, k, buf))
    })
}

/// Slice indices to erase, at most `max` of them.
fn erasures(total: usize, max: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..total, 0..=max).prop_map(|mut v| {
        v.sort();
        v.dedup();
        v
    })
}

fn drop_slices(slices: Vec<Slice>, gone: &[usize]) -> Vec<Slice> {
    slices
        .into_iter()
        .filter(|s| !gone.contains(&s.index))
        .collect()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Encoding then decoding with the full slice set returns the input.
    #[test]
    fn prop_roundtrip((n, k, buf) in code_and_buffer()) {
        let code = Code::new(n, k)?;
        let slices = code.encode_aligned(&buf)?;
        prop_assert_eq!(slices.len(), n + k);
        for s in &slices {
            prop_assert_eq!(s.len(), buf.len() / n);
        }
        prop_assert_eq!(code.decode_aligned(&slices)?, buf);
    }

    /// Decoding succeeds with any subset of up to k slices removed.
    #[test]
    fn prop_loss_tolerance(
        (n, k, buf) in code_and_buffer(),
        gone in erasures(8, 3),
    ) {
        let gone: Vec<usize> = gone.into_iter().filter(|&i| i < n + k).take(k).collect();

        let code = Code::new(n, k)?;
        let slices = code.encode_aligned(&buf)?;
        let survivors = drop_slices(slices, &gone);

        prop_assert!(survivors.len() >= n);
        prop_assert_eq!(code.decode_aligned(&survivors)?, buf);
    }

    /// Any n survivors regenerate all n+k slices byte-identical to the
    /// original encoding.
    #[test]
    fn prop_rebuild_fidelity(
        (n, k, buf) in code_and_buffer(),
        gone in erasures(8, 3),
    ) {
        let gone: Vec<usize> = gone.into_iter().filter(|&i| i < n + k).take(k).collect();

        let code = Code::new(n, k)?;
        let original = code.encode_aligned(&buf)?;
        let survivors = drop_slices(original.clone(), &gone);

        prop_assert_eq!(code.rebuild(&survivors)?, original);
    }

    /// Encoding is deterministic across calls and across instances.
    #[test]
    fn prop_encoding_deterministic((n, k, buf) in code_and_buffer()) {
        let code = Code::new(n, k)?;
        let other = Code::new(n, k)?;
        prop_assert_eq!(code.encode_aligned(&buf)?, code.encode_aligned(&buf)?);
        prop_assert_eq!(code.encode_aligned(&buf)?, other.encode_aligned(&buf)?);
    }

    /// One more loss than the code tolerates must fail the decode.
    #[test]
    fn prop_too_many_losses_fail((n, k, buf) in code_and_buffer()) {
        let code = Code::new(n, k)?;
        let slices = code.encode_aligned(&buf)?;
        let survivors = &slices[..n - 1];
        prop_assert!(code.decode_aligned(survivors).is_err());
    }
}
