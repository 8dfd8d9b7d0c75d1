use std::io::{Seek, SeekFrom, Write};
/// Mock drive infrastructure for testing
///
/// Temp files stand in for block devices: they exist at a path, can be
/// sampled, and can be rewritten to simulate an erase reaching the media.
use tempfile::NamedTempFile;

/// Byte pattern written to a fresh mock drive to simulate user data
pub const USED_PATTERN: u8 = 0xAB;

/// Mock drive instance
pub struct MockDrive {
    pub temp_file: NamedTempFile,
    size_bytes: u64,
}

impl MockDrive {
    /// Create a mock drive of `size_mb` MiB filled with `USED_PATTERN`
    pub fn create(size_mb: u64) -> std::io::Result<Self> {
        let mut temp_file = NamedTempFile::new()?;
        let size_bytes = size_mb * 1024 * 1024;
        let chunk = vec![USED_PATTERN; 1024 * 1024];

        let mut written = 0u64;
        while written < size_bytes {
            let write_size = (size_bytes - written).min(chunk.len() as u64);
            temp_file.write_all(&chunk[..write_size as usize])?;
            written += write_size;
        }
        temp_file.flush()?;

        Ok(Self {
            temp_file,
            size_bytes,
        })
    }

    pub fn path_str(&self) -> &str {
        self.temp_file.path().to_str().expect("temp path is UTF-8")
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Overwrite the whole drive with `byte`, as an erase would
    pub fn fill(&mut self, byte: u8) -> std::io::Result<()> {
        let file = self.temp_file.as_file_mut();
        file.seek(SeekFrom::Start(0))?;
        let chunk = vec![byte; 1024 * 1024];
        let mut written = 0u64;
        while written < self.size_bytes {
            let write_size = (self.size_bytes - written).min(chunk.len() as u64);
            file.write_all(&chunk[..write_size as usize])?;
            written += write_size;
        }
        file.sync_all()
    }
}
