//! Stream splitting.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;

#[cfg(unix)]
use std::os::unix::net::UnixStream;

/// A connection that can be split into independently owned read and write halves.
///
/// The halves may be moved to different threads, which is how a traced
/// connection runs its decoder on a reader thread while commands are written
/// from elsewhere.
pub trait Split {
    /// Read half.
    type Reader: Read;
    /// Write half.
    type Writer: Write;

    /// Splits the connection.
    fn into_split(self) -> io::Result<(Self::Reader, Self::Writer)>;
}

/// Owned read half of a shared socket.
#[derive(Debug)]
pub struct OwnedReadHalf<S> {
    inner: Arc<S>,
}

/// Owned write half of a shared socket.
#[derive(Debug)]
pub struct OwnedWriteHalf<S> {
    inner: Arc<S>,
}

impl<S> OwnedReadHalf<S> {
    /// Gets a reference to the shared socket.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

impl<S> OwnedWriteHalf<S> {
    /// Gets a reference to the shared socket.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

/// Splits a socket whose shared reference implements `Read` and `Write`.
fn split_shared<S>(stream: S) -> (OwnedReadHalf<S>, OwnedWriteHalf<S>) {
    let inner = Arc::new(stream);
    (
        OwnedReadHalf {
            inner: Arc::clone(&inner),
        },
        OwnedWriteHalf { inner },
    )
}

impl<S> Read for OwnedReadHalf<S>
where
    for<'a> &'a S: Read,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut inner = &*self.inner;
        inner.read(buf)
    }
}

impl<S> Write for OwnedWriteHalf<S>
where
    for<'a> &'a S: Write,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = &*self.inner;
        inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut inner = &*self.inner;
        inner.flush()
    }
}

impl OwnedWriteHalf<TcpStream> {
    /// Shuts down the write direction of the socket.
    pub fn shutdown(&self) -> io::Result<()> {
        self.inner.shutdown(Shutdown::Write)
    }
}

impl Split for TcpStream {
    type Reader = OwnedReadHalf<Self>;
    type Writer = OwnedWriteHalf<Self>;

    fn into_split(self) -> io::Result<(Self::Reader, Self::Writer)> {
        Ok(split_shared(self))
    }
}

#[cfg(unix)]
impl OwnedWriteHalf<UnixStream> {
    /// Shuts down the write direction of the socket.
    pub fn shutdown(&self) -> io::Result<()> {
        self.inner.shutdown(Shutdown::Write)
    }
}

#[cfg(unix)]
impl Split for UnixStream {
    type Reader = OwnedReadHalf<Self>;
    type Writer = OwnedWriteHalf<Self>;

    fn into_split(self) -> io::Result<(Self::Reader, Self::Writer)> {
        Ok(split_shared(self))
    }
}

impl<R: Read, W: Write> Split for (R, W) {
    type Reader = R;
    type Writer = W;

    fn into_split(self) -> io::Result<(R, W)> {
        Ok(self)
    }
}
