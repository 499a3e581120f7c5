//! ecvol - Erasure-Coded Block Device Engine
//!
//! A virtual block-addressable storage target whose data is striped with
//! Reed-Solomon redundancy across N+K independent replica backends. Up to
//! K replicas may be lost entirely while the device keeps serving reads
//! and writes at arbitrary byte offsets.
//!
//! # Architecture
//!
//! ```text
//! write:  user buffer ─▶ stripe aligner (RMW pads) ─▶ codec ─▶ n+k slice writes
//! read:   n+k slice reads ─▶ first n payloads ─▶ codec ─▶ aligned buffer ─▶ range
//! ```
//!
//! # Modules
//!
//! - [`galois`] - GF(2^m) arithmetic and the matrix kernel
//! - [`codec`] - Reed-Solomon encode / decode / rebuild
//! - [`device`] - the erasure-coded device and its replica backends
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ecvol::{Backend, CoderConfig, ErasureCoder, MemoryBackend};
//!
//! let backends: Vec<Arc<dyn Backend>> = (0..5)
//!     .map(|_| Arc::new(MemoryBackend::new(1 << 20)) as Arc<dyn Backend>)
//!     .collect();
//! let dev = ErasureCoder::new(CoderConfig::new(3, 2, 1 << 20), backends)?;
//!
//! dev.write_at(b"hello world", 42).await?;
//! let mut buf = [0u8; 11];
//! dev.read_at(&mut buf, 42).await?;
//! assert_eq!(&buf, b"hello world");
//! ```
//!
//! The higher-level volume controller - replica discovery, health
//! checking, rebuild scheduling, snapshots - lives outside this crate and
//! consumes the device through its flat `read_at` / `write_at` surface.

pub mod codec;
pub mod device;
pub mod error;
pub mod galois;

// Re-export commonly used types
pub use codec::{Code, Slice};
#[cfg(unix)]
pub use device::FileBackend;
pub use device::{Backend, CoderConfig, ErasureCoder, MemoryBackend, StripeGeometry};
pub use error::{Error, Result};
pub use galois::{Elem, GaloisField, Matrix};
