//! The erasure-coded device: parallel slice fan-out over n+k backends.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::codec::{Code, Slice};
use crate::error::{Error, Result};

use super::backend::Backend;
use super::geometry::StripeGeometry;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for an erasure-coded device.
#[derive(Debug, Clone)]
pub struct CoderConfig {
    /// Number of data slices (n)
    pub data_slices: usize,

    /// Number of parity slices (k)
    pub parity_slices: usize,

    /// Advisory logical size of the device in bytes. The device performs
    /// no bounds enforcement; backends police their own capacity.
    pub size: u64,
}

impl CoderConfig {
    /// Create a configuration for an n+k device of the given size.
    pub fn new(data_slices: usize, parity_slices: usize, size: u64) -> Self {
        Self {
            data_slices,
            parity_slices,
            size,
        }
    }

    /// Total number of slices (n + k).
    pub fn total_slices(&self) -> usize {
        self.data_slices + self.parity_slices
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.data_slices == 0 {
            return Err(Error::InvalidConfig("data_slices must be > 0".into()));
        }
        if self.parity_slices == 0 {
            return Err(Error::InvalidConfig("parity_slices must be > 0".into()));
        }
        Ok(())
    }
}

impl Default for CoderConfig {
    fn default() -> Self {
        Self {
            data_slices: 4,
            parity_slices: 2,
            size: 0,
        }
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Request counters for a device.
#[derive(Debug, Default)]
pub struct CoderStats {
    /// Total reads attempted
    pub reads_total: AtomicU64,

    /// Reads that succeeded despite one or more backend failures
    pub reads_degraded: AtomicU64,

    /// Reads that failed outright
    pub reads_failed: AtomicU64,

    /// Total writes attempted
    pub writes_total: AtomicU64,

    /// Writes acknowledged with fewer than n+k backend completions
    pub writes_degraded: AtomicU64,

    /// Writes that failed outright
    pub writes_failed: AtomicU64,

    /// User bytes returned by successful reads
    pub bytes_read: AtomicU64,

    /// User bytes accepted by successful writes
    pub bytes_written: AtomicU64,
}

impl CoderStats {
    fn record_read(&self, bytes: u64, failures: usize) {
        self.reads_total.fetch_add(1, Ordering::Relaxed);
        if failures > 0 {
            self.reads_degraded.fetch_add(1, Ordering::Relaxed);
        }
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    fn record_read_failed(&self) {
        self.reads_total.fetch_add(1, Ordering::Relaxed);
        self.reads_failed.fetch_add(1, Ordering::Relaxed);
    }

    fn record_write(&self, bytes: u64, failures: usize) {
        self.writes_total.fetch_add(1, Ordering::Relaxed);
        if failures > 0 {
            self.writes_degraded.fetch_add(1, Ordering::Relaxed);
        }
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    fn record_write_failed(&self) {
        self.writes_total.fetch_add(1, Ordering::Relaxed);
        self.writes_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of the current counters.
    pub fn snapshot(&self) -> CoderStatsSnapshot {
        CoderStatsSnapshot {
            reads_total: self.reads_total.load(Ordering::Relaxed),
            reads_degraded: self.reads_degraded.load(Ordering::Relaxed),
            reads_failed: self.reads_failed.load(Ordering::Relaxed),
            writes_total: self.writes_total.load(Ordering::Relaxed),
            writes_degraded: self.writes_degraded.load(Ordering::Relaxed),
            writes_failed: self.writes_failed.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the device counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoderStatsSnapshot {
    pub reads_total: u64,
    pub reads_degraded: u64,
    pub reads_failed: u64,
    pub writes_total: u64,
    pub writes_degraded: u64,
    pub writes_failed: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
}

// =============================================================================
// Device
// =============================================================================

/// Virtual block device striped across n+k replica backends.
///
/// Reads fan out to every backend and decode the first n slice payloads
/// to arrive, so up to k replicas may be lost without the caller
/// noticing. Writes promote unaligned ranges to full stripes with a
/// read-modify-write, encode, and push one slice to every backend;
/// the call succeeds once at least n replicas acknowledge.
///
/// The device provides no ordering between concurrent requests: two
/// overlapping writes race per-slice and callers must serialize them
/// externally.
pub struct ErasureCoder {
    size: u64,
    code: Code,
    backends: Vec<Arc<dyn Backend>>,
    stats: Arc<CoderStats>,
}

impl ErasureCoder {
    /// Create a device over positionally-bound backends: backend i
    /// stores slice i.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when the backend count does not match
    /// n + k, and `InsufficientFieldSize` when n + k exceeds the field.
    pub fn new(config: CoderConfig, backends: Vec<Arc<dyn Backend>>) -> Result<Self> {
        config.validate()?;
        if backends.len() != config.total_slices() {
            return Err(Error::InvalidConfig(format!(
                "expected {} backends, got {}",
                config.total_slices(),
                backends.len()
            )));
        }

        let code = Code::new(config.data_slices, config.parity_slices)?;
        info!(
            n = config.data_slices,
            k = config.parity_slices,
            size = config.size,
            "created erasure-coded device"
        );

        Ok(Self {
            size: config.size,
            code,
            backends,
            stats: Arc::new(CoderStats::default()),
        })
    }

    /// Advisory logical size of the device in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The code this device stripes with.
    pub fn code(&self) -> &Code {
        &self.code
    }

    /// Request counters.
    pub fn stats(&self) -> Arc<CoderStats> {
        Arc::clone(&self.stats)
    }

    /// Read `buf.len()` bytes at logical offset `off`.
    ///
    /// Issues one slice read per backend, decodes the first n payloads
    /// to arrive and copies the requested range out of the aligned
    /// buffer. Returns the number of bytes read.
    ///
    /// # Errors
    ///
    /// Returns `TooFewSlices` when fewer than n backends deliver.
    #[instrument(skip(self, buf), fields(len = buf.len()))]
    pub async fn read_at(&self, buf: &mut [u8], off: u64) -> Result<usize> {
        let geom = StripeGeometry::compute(off, buf.len(), self.code.n());
        debug!(?geom, "aligned read");

        let (slices, failures) = match self.fanout_read(geom.slice_off, geom.slice_len).await {
            Ok(gathered) => gathered,
            Err(err) => {
                self.stats.record_read_failed();
                return Err(err);
            }
        };

        let aligned = match self.code.decode_aligned(&slices) {
            Ok(bytes) => bytes,
            Err(err) => {
                self.stats.record_read_failed();
                return Err(err);
            }
        };

        buf.copy_from_slice(&aligned[geom.pre_pad..geom.pre_pad + buf.len()]);
        self.stats.record_read(buf.len() as u64, failures);
        Ok(buf.len())
    }

    /// Write `buf` at logical offset `off`.
    ///
    /// Unaligned ranges are promoted to full stripes by reading the head
    /// and tail pad bytes through `read_at`, which itself tolerates
    /// replica loss. The aligned buffer is encoded and one slice is
    /// pushed to every backend; all n+k completions are awaited and the
    /// write is acknowledged once at least n replicas took their slice.
    /// Returns the number of user bytes written.
    ///
    /// # Errors
    ///
    /// Returns `TooFewSlices` when fewer than n backends acknowledge.
    #[instrument(skip(self, buf), fields(len = buf.len()))]
    pub async fn write_at(&self, buf: &[u8], off: u64) -> Result<usize> {
        let n = self.code.n();
        let geom = StripeGeometry::compute(off, buf.len(), n);
        debug!(?geom, "aligned write");

        let mut aligned = vec![0u8; geom.aligned_len];
        aligned[geom.pre_pad..geom.pre_pad + buf.len()].copy_from_slice(buf);

        if geom.pre_pad > 0 {
            let mut line = vec![0u8; n];
            self.read_at(&mut line, geom.start).await?;
            aligned[..geom.pre_pad].copy_from_slice(&line[..geom.pre_pad]);
        }
        if geom.post_pad > 0 {
            let mut line = vec![0u8; n];
            self.read_at(&mut line, geom.end - n as u64).await?;
            aligned[geom.aligned_len - geom.post_pad..].copy_from_slice(&line[n - geom.post_pad..]);
        }

        let slices = self.code.encode_aligned(&aligned)?;
        let successes = self.fanout_write(slices, geom.slice_off).await;
        let failures = self.backends.len() - successes;

        if successes < n {
            self.stats.record_write_failed();
            return Err(Error::TooFewSlices {
                available: successes,
                required: n,
            });
        }

        self.stats.record_write(buf.len() as u64, failures);
        Ok(buf.len())
    }

    /// Deallocate `length` bytes at `off`. Reserved surface.
    ///
    /// # Errors
    ///
    /// Always returns `NotImplemented`.
    pub async fn unmap_at(&self, _length: u32, _off: u64) -> Result<usize> {
        Err(Error::NotImplemented)
    }

    /// Fan a slice read out to every backend and gather the first n
    /// payloads. Returns the slices in arrival order together with the
    /// number of failures observed on the way.
    ///
    /// Channels are bounded at the backend count, so tasks finishing
    /// after the n-th payload park their send on a dropped receiver and
    /// leak nothing.
    async fn fanout_read(&self, slice_off: u64, slice_len: usize) -> Result<(Vec<Slice>, usize)> {
        let total = self.backends.len();
        let n = self.code.n();

        let (slice_tx, mut slice_rx) = mpsc::channel::<Slice>(total);
        let (err_tx, mut err_rx) = mpsc::channel::<usize>(total);

        for (index, backend) in self.backends.iter().enumerate() {
            let backend = Arc::clone(backend);
            let slice_tx = slice_tx.clone();
            let err_tx = err_tx.clone();
            tokio::spawn(async move {
                let mut data = vec![0u8; slice_len];
                match backend.read_at(&mut data, slice_off).await {
                    Ok(_) => {
                        let _ = slice_tx.send(Slice::new(index, data)).await;
                    }
                    Err(err) => {
                        warn!(backend = index, %err, "slice read failed");
                        let _ = err_tx.send(index).await;
                    }
                }
            });
        }
        drop(slice_tx);
        drop(err_tx);

        let mut slices = Vec::with_capacity(n);
        let mut failures = 0usize;
        while slices.len() < n {
            tokio::select! {
                Some(slice) = slice_rx.recv() => slices.push(slice),
                Some(_) = err_rx.recv() => {
                    failures += 1;
                    if failures > self.code.k() {
                        break;
                    }
                }
                else => break,
            }
        }

        if slices.len() < n {
            return Err(Error::TooFewSlices {
                available: slices.len(),
                required: n,
            });
        }
        Ok((slices, failures))
    }

    /// Push one slice to every backend and await all n+k completions.
    /// Returns the number of successful writes; failures are logged.
    async fn fanout_write(&self, slices: Vec<Slice>, slice_off: u64) -> usize {
        let total = self.backends.len();

        let (done_tx, mut done_rx) = mpsc::channel::<usize>(total);
        let (err_tx, mut err_rx) = mpsc::channel::<usize>(total);

        for (slice, backend) in slices.into_iter().zip(&self.backends) {
            let backend = Arc::clone(backend);
            let done_tx = done_tx.clone();
            let err_tx = err_tx.clone();
            tokio::spawn(async move {
                let index = slice.index;
                match backend.write_at(&slice.data, slice_off).await {
                    Ok(_) => {
                        let _ = done_tx.send(index).await;
                    }
                    Err(err) => {
                        warn!(backend = index, %err, "slice write failed");
                        let _ = err_tx.send(index).await;
                    }
                }
            });
        }
        drop(done_tx);
        drop(err_tx);

        let mut successes = 0usize;
        let mut responses = 0usize;
        while responses < total {
            tokio::select! {
                Some(_) = done_rx.recv() => {
                    successes += 1;
                    responses += 1;
                }
                Some(_) = err_rx.recv() => responses += 1,
                else => break,
            }
        }
        successes
    }
}

// =============================================================================
// Tests
// =============================================================================
