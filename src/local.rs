//! Local byte sources feeding the outbound payload.
//!
//! [`StdinSource`] reads fd 0 directly with `libc::read`. We deliberately
//! bypass `std::io::stdin()` because its internal `BufReader` keeps its own
//! buffer; the readiness wait checks the kernel fd, and bytes already pulled
//! into that buffer would be invisible to it.

use std::io::{self, Read};
use std::os::fd::RawFd;

/// A readable byte source that may expose a descriptor for readiness waits.
pub trait LocalSource {
    /// Reads up to `buf.len()` bytes. `Ok(0)` is end of data.
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Descriptor to include in the readiness wait, if any.
    ///
    /// Sources without one are treated as always ready.
    fn poll_fd(&self) -> Option<RawFd> {
        None
    }
}

/// Standard input, read straight from fd 0.
#[derive(Debug, Default)]
pub struct StdinSource;

impl StdinSource {
    /// Creates a source over the process's standard input.
    pub fn new() -> Self {
        Self
    }
}

impl LocalSource for StdinSource {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // SAFETY: `buf` is a valid, writable region of `buf.len()` bytes for
        // the duration of the call, and fd 0 stays open for the process.
        let n = unsafe {
            libc::read(
                libc::STDIN_FILENO,
                buf.as_mut_ptr().cast::<libc::c_void>(),
                buf.len(),
            )
        };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }

    fn poll_fd(&self) -> Option<RawFd> {
        Some(libc::STDIN_FILENO)
    }
}

/// Any [`Read`] implementation, treated as always ready.
#[derive(Debug)]
pub struct ReaderSource<R> {
    inner: R,
}

impl<R: Read> ReaderSource<R> {
    /// Wraps a reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> LocalSource for ReaderSource<R> {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_source_reads_then_eof() {
        let mut source = ReaderSource::new(&b"abc"[..]);
        let mut buf = [0u8; 2];
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 2);
        assert_eq!(&buf, b"ab");
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 1);
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 0);
        assert!(source.poll_fd().is_none());
    }

    #[test]
    fn test_stdin_source_exposes_fd_zero() {
        assert_eq!(StdinSource::new().poll_fd(), Some(0));
    }
}
