//! Erasure-Coded Device
//!
//! Presents a flat byte-addressable surface over n+k replica backends,
//! striping every request through the Reed-Solomon codec.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                           ErasureCoder                                │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │                                                                       │
//! │  read_at / write_at ──▶ StripeGeometry ──▶ Codec ──▶ Fan-Out         │
//! │                              │                          │             │
//! │                              ▼                          ▼             │
//! │                    pre/post pad via RMW       one task per backend    │
//! │                                               two completion channels │
//! │                                                         │             │
//! │                                          ┌──────────────┴─────────┐   │
//! │                                          │ Backend 0 … Backend n+k│   │
//! │                                          └────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - **Backend port** (`backend.rs`): the replica contract, a raw
//!   positional read/write target, plus in-memory and file adapters.
//!
//! - **Stripe geometry** (`geometry.rs`): maps a byte range onto the
//!   stripe-aligned region that covers it.
//!
//! - **Device** (`erasure_coder.rs`): the fan-out engine. Reads gather
//!   the first n slice payloads and decode; writes promote unaligned
//!   ranges with a read-modify-write, encode, and push one slice to
//!   every backend.

pub mod backend;
pub mod erasure_coder;
pub mod geometry;

pub use backend::{Backend, MemoryBackend};
#[cfg(unix)]
pub use backend::FileBackend;
pub use erasure_coder::{CoderConfig, CoderStats, CoderStatsSnapshot, ErasureCoder};
pub use geometry::StripeGeometry;
