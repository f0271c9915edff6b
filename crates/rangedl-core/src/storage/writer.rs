//! Concurrent offset writer for the destination file.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
#[cfg(unix)]
use std::os::unix::fs::FileExt;
#[cfg(windows)]
use std::os::windows::fs::FileExt;

use super::StorageError;

/// Shared handle to the destination file. Cheap to clone; every clone writes
/// through the same descriptor with positional writes, so callers writing
/// disjoint ranges need no further coordination.
#[derive(Debug, Clone)]
pub struct StorageWriter {
    file: Arc<File>,
    path: PathBuf,
}

impl StorageWriter {
    pub(crate) fn from_file_and_path(file: File, path: PathBuf) -> Self {
        Self {
            file: Arc::new(file),
            path,
        }
    }

    /// Write all of `data` at `offset`. Does not move any shared cursor.
    pub fn write_at(&self, offset: u64, data: &[u8]) -> Result<(), StorageError> {
        self.write_all_at(offset, data)
            .map_err(|source| StorageError::Write {
                path: self.path.clone(),
                offset,
                len: data.len(),
                source,
            })
    }

    #[cfg(unix)]
    fn write_all_at(&self, offset: u64, data: &[u8]) -> std::io::Result<()> {
        self.file.write_all_at(data, offset)
    }

    #[cfg(windows)]
    fn write_all_at(&self, mut offset: u64, mut data: &[u8]) -> std::io::Result<()> {
        while !data.is_empty() {
            let n = self.file.seek_write(data, offset)?;
            if n == 0 {
                return Err(std::io::ErrorKind::WriteZero.into());
            }
            data = &data[n..];
            offset += n as u64;
        }
        Ok(())
    }

    /// Current on-disk length of the file.
    pub fn len(&self) -> std::io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }
}
