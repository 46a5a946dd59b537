use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Supplies the raw bytes of a `.torrent` file.
pub trait ByteSource {
    /// Returns the total size of the backing bytes.
    fn size(&self) -> u64;

    /// Fills `buf` from the start of the source, returning the byte count.
    fn read_all(&mut self, buf: &mut [u8]) -> std::io::Result<u64>;

    /// Returns the creation time of the backing file as epoch seconds.
    fn ctime(&self) -> i64;
}

/// An in-memory byte source.
pub struct MemorySource {
    data: Vec<u8>,
    ctime: i64,
}

impl MemorySource {
    pub fn new(data: Vec<u8>, ctime: i64) -> Self {
        Self { data, ctime }
    }
}

impl ByteSource for MemorySource {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_all(&mut self, buf: &mut [u8]) -> std::io::Result<u64> {
        let n = buf.len().min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        Ok(n as u64)
    }

    fn ctime(&self) -> i64 {
        self.ctime
    }
}

/// A byte source over a file on disk.
pub struct FileSource {
    file: fs::File,
    size: u64,
    ctime: i64,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = fs::File::open(path)?;
        let metadata = file.metadata()?;
        // not every filesystem reports a birth time
        let created = metadata.created().or_else(|_| metadata.modified())?;
        let ctime = match created.duration_since(UNIX_EPOCH) {
            Ok(elapsed) => elapsed.as_secs() as i64,
            Err(before) => -(before.duration().as_secs() as i64),
        };
        Ok(Self {
            file,
            size: metadata.len(),
            ctime,
        })
    }
}

impl ByteSource for FileSource {
    fn size(&self) -> u64 {
        self.size
    }

    fn read_all(&mut self, buf: &mut [u8]) -> std::io::Result<u64> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.file.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled as u64)
    }

    fn ctime(&self) -> i64 {
        self.ctime
    }
}
