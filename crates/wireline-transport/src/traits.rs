use std::io;
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;

/// A blocking duplex byte stream.
///
/// All three operations take `&self` so that one thread can block in
/// `read` while another thread writes or closes. Implementations make no
/// serialization promises: concurrent `write` calls may interleave their
/// bytes, and callers that share a transport for writing must coordinate
/// externally.
///
/// `close` must unblock a pending `read`, which then observes either
/// `Ok(0)` or an error. Closing an already-closed transport may return an
/// error but must not misbehave otherwise.
pub trait Transport: Send + Sync {
    /// Read bytes into `buf`, blocking until data arrives or the stream
    /// ends. `Ok(0)` means the peer closed the stream.
    fn read(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write bytes from `buf`, blocking until the stream accepts them.
    /// May write fewer bytes than provided.
    fn write(&self, buf: &[u8]) -> io::Result<usize>;

    /// Shut down both directions of the stream.
    fn close(&self) -> io::Result<()>;
}

/// Sharing a transport through `Arc` keeps the caller a handle for
/// inspection while a session owns its own clone.
impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn close(&self) -> io::Result<()> {
        (**self).close()
    }
}

impl Transport for TcpStream {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(&mut &*self, buf)
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(&mut &*self, buf)
    }

    fn close(&self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

#[cfg(unix)]
impl Transport for std::os::unix::net::UnixStream {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(&mut &*self, buf)
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(&mut &*self, buf)
    }

    fn close(&self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn unix_pair_roundtrip() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();

        assert_eq!(Transport::write(&left, b"hello").unwrap(), 5);

        let mut buf = [0u8; 16];
        let n = Transport::read(&right, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello");
    }

    #[test]
    #[cfg(unix)]
    fn close_unblocks_pending_read() {
        use std::sync::Arc;

        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let right = Arc::new(right);

        let reader = {
            let right = Arc::clone(&right);
            std::thread::spawn(move || {
                let mut buf = [0u8; 16];
                Transport::read(&*right, &mut buf)
            })
        };

        // Give the reader a moment to park in read().
        std::thread::sleep(std::time::Duration::from_millis(20));
        right.close().unwrap();
        drop(left);

        let result = reader.join().unwrap();
        assert!(matches!(result, Ok(0) | Err(_)));
    }

    #[test]
    #[cfg(unix)]
    fn double_close_does_not_panic() {
        let (left, _right) = std::os::unix::net::UnixStream::pair().unwrap();
        left.close().unwrap();
        // The second shutdown may report NotConnected; it must not panic.
        let _ = left.close();
    }
}
