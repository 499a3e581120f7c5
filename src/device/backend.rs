//! Replica backend port and adapters.
//!
//! A backend is a raw positional read/write target holding exactly one
//! slice of the code space: backend i stores slice i, and that positional
//! binding is its only identity. The device hands backends slice-local
//! offsets only; logical device offsets never reach them.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{Error, Result};

// =============================================================================
// Port
// =============================================================================

/// A raw replica target addressed by slice-local byte offsets.
///
/// Implementations must be safe under concurrent calls with
/// non-overlapping offsets; the device never issues overlapping writes
/// within a single request.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Fill `buf` from the replica starting at `off`.
    async fn read_at(&self, buf: &mut [u8], off: u64) -> Result<usize>;

    /// Write `buf` to the replica starting at `off`.
    async fn write_at(&self, buf: &[u8], off: u64) -> Result<usize>;
}

// =============================================================================
// Memory Adapter
// =============================================================================

/// Fixed-size, zero-initialized in-memory replica.
pub struct MemoryBackend {
    data: RwLock<Vec<u8>>,
}

impl MemoryBackend {
    /// Create a zeroed replica of the given capacity in bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: RwLock::new(vec![0u8; capacity]),
        }
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.data.read().len()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn read_at(&self, buf: &mut [u8], off: u64) -> Result<usize> {
        let data = self.data.read();
        let range = checked_range(off, buf.len(), data.len())?;
        buf.copy_from_slice(&data[range]);
        Ok(buf.len())
    }

    async fn write_at(&self, buf: &[u8], off: u64) -> Result<usize> {
        let mut data = self.data.write();
        let len = data.len();
        let range = checked_range(off, buf.len(), len)?;
        data[range].copy_from_slice(buf);
        Ok(buf.len())
    }
}

fn checked_range(off: u64, len: usize, capacity: usize) -> Result<std::ops::Range<usize>> {
    let start = usize::try_from(off)
        .map_err(|_| Error::Io(io::Error::new(io::ErrorKind::InvalidInput, "offset too large")))?;
    let end = start.checked_add(len).filter(|&end| end <= capacity).ok_or_else(|| {
        Error::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "access past end of replica",
        ))
    })?;
    Ok(start..end)
}

// =============================================================================
// File Adapter
// =============================================================================

/// Replica backed by a regular file, one file per slice.
///
/// Positional I/O runs on the blocking pool so a slow disk never stalls
/// the fan-out tasks of other replicas.
#[cfg(unix)]
pub struct FileBackend {
    file: Arc<std::fs::File>,
}

#[cfg(unix)]
impl FileBackend {
    /// Create (or truncate) a replica file of the given size.
    pub fn create(path: impl AsRef<std::path::Path>, size: u64) -> Result<Self> {
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(size)?;
        Ok(Self {
            file: Arc::new(file),
        })
    }

    /// Open an existing replica file.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let file = std::fs::OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self {
            file: Arc::new(file),
        })
    }
}

#[cfg(unix)]
#[async_trait]
impl Backend for FileBackend {
    async fn read_at(&self, buf: &mut [u8], off: u64) -> Result<usize> {
        use std::os::unix::fs::FileExt;

        let file = Arc::clone(&self.file);
        let len = buf.len();
        let data = tokio::task::spawn_blocking(move || {
            let mut data = vec![0u8; len];
            file.read_exact_at(&mut data, off)?;
            Ok::<_, io::Error>(data)
        })
        .await
        .map_err(|e| Error::Internal(format!("replica read task failed: {e}")))??;

        buf.copy_from_slice(&data);
        Ok(len)
    }

    async fn write_at(&self, buf: &[u8], off: u64) -> Result<usize> {
        use std::os::unix::fs::FileExt;

        let file = Arc::clone(&self.file);
        let data = buf.to_vec();
        tokio::task::spawn_blocking(move || file.write_all_at(&data, off))
            .await
            .map_err(|e| Error::Internal(format!("replica write task failed: {e}")))??;
        Ok(buf.len())
    }
}

// =============================================================================
// Tests
// =============================================================================
