//! Transport abstraction: any byte-oriented channel to the robot.
//!
//! Concrete implementations:
//! - TCP socket to the robot's bridge endpoint ([`TcpTransport`])
//! - scripted in-memory channels in tests
//!
//! The session is generic over `Transport`, so adding a new transport
//! requires zero changes to the call/event logic.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::{debug, info};

/// Byte-oriented transport channel.
pub trait Transport {
    /// Read up to `buf.len()` bytes into `buf`.
    ///
    /// Returns `Ok(0)` if nothing arrived within the transport's poll
    /// window.  A closed peer is an error of kind
    /// [`ErrorKind::UnexpectedEof`].
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write all of `data`.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Flush any buffered output.
    fn flush(&mut self) -> io::Result<()>;

    /// Close the channel.  Further reads and writes fail.
    fn close(&mut self) -> io::Result<()>;
}

/// TCP transport with a bounded read wait.
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    /// Connect to `host:port`, trying every resolved address in turn.
    pub fn connect(host: &str, port: u16, connect_timeout: Duration, poll: Duration) -> io::Result<Self> {
        let mut last_err = None;
        for addr in (host, port).to_socket_addrs()? {
            debug!("Connecting to {}", addr);
            match TcpStream::connect_timeout(&addr, connect_timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(poll))?;
                    stream.set_nodelay(true)?;
                    info!("Connected to {}", addr);
                    return Ok(Self { stream });
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(ErrorKind::AddrNotAvailable, format!("{host} did not resolve"))
        }))
    }
}

impl Transport for TcpTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.stream.read(buf) {
            Ok(0) => Err(io::Error::new(ErrorKind::UnexpectedEof, "peer closed")),
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(0),
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.stream.write_all(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            Err(e) if e.kind() == ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}
