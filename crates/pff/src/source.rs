//! Random-access byte source backing a reader.

use std::{
    io::{self, Read, Seek, SeekFrom},
    sync::Mutex,
};

use crate::ndb::PffError;

/// Bounded positional reads over a seekable stream.
///
/// The stream stays open for the life of the reader and is shared behind
/// a mutex, so concurrent lookups serialize instead of racing on seek
/// state. Short reads are errors.
#[derive(Debug)]
pub struct ByteSource<R> {
    inner: Mutex<R>,
}

impl<R> ByteSource<R>
where
    R: Read + Seek,
{
    pub fn new(inner: R) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }

    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let mut inner = self.inner.lock().map_err(|_| PffError::FailedToLockFile)?;
        inner.seek(SeekFrom::Start(offset))?;
        inner.read_exact(buf)
    }

    pub fn read_vec_at(&self, offset: u64, length: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0; length];
        self.read_at(offset, &mut buf)?;
        Ok(buf)
    }
}
