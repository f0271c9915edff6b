//! Builder for creating and preallocating the destination file.

use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

use super::writer::StorageWriter;
use super::{AllocationMode, StorageError};

/// Builder for a new destination file. Call `preallocate` then `build` to get
/// a `StorageWriter` that supports concurrent `write_at` from multiple threads.
pub struct StorageWriterBuilder {
    file: File,
    path: PathBuf,
}

impl StorageWriterBuilder {
    /// Create the file at `path`, truncating it if it already exists.
    pub fn create(path: &Path) -> Result<Self, StorageError> {
        let file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|source| StorageError::Create {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(StorageWriterBuilder {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Grow the file to exactly `size` bytes. A zero size leaves it empty.
    pub fn preallocate(&mut self, size: u64, mode: AllocationMode) -> Result<(), StorageError> {
        if size == 0 {
            return Ok(());
        }
        if mode == AllocationMode::Reserve {
            #[cfg(target_os = "linux")]
            {
                let fd = self.file.as_raw_fd();
                let r = unsafe { libc::posix_fallocate(fd, 0, size as libc::off_t) };
                if r == 0 {
                    return Ok(());
                }
                tracing::debug!(errno = r, "posix_fallocate failed, falling back to sparse extension");
            }
        }
        self.extend_sparse(size)
    }

    fn extend_sparse(&mut self, size: u64) -> Result<(), StorageError> {
        let path = &self.path;
        let extend_err = |source| StorageError::Extend {
            path: path.clone(),
            size,
            source,
        };
        self.file.seek(SeekFrom::Start(size - 1)).map_err(extend_err)?;
        self.file.write_all(&[0]).map_err(extend_err)?;
        Ok(())
    }

    /// Finish building and return a writer that can be shared for concurrent writes.
    pub fn build(self) -> StorageWriter {
        StorageWriter::from_file_and_path(self.file, self.path)
    }
}
