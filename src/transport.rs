//! Transports the client writes packets to.
//!
//! The client only needs to write whole packets and, once, close the
//! endpoint. Anything satisfying [`Transport`] can be used: a UDP socket,
//! any `io::Write` stream, or the in-memory [`MemoryTransport`] used in tests.

use std::io::{self, Write};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;


/// A packet-oriented endpoint the client owns.
pub trait Transport: Send {
    /// Write one packet, returning the number of bytes written.
    fn write(&mut self, packet: &[u8]) -> io::Result<usize>;

    /// Release the endpoint. Called at most once by the client.
    fn close(&mut self) -> io::Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, packet: &[u8]) -> io::Result<usize> {
        (**self).write(packet)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}


/// UDP transport sending each packet as one datagram.
#[derive(Debug)]
pub struct UdpTransport {
    socket: Option<UdpSocket>,
}

impl UdpTransport {
    /// Bind a local socket and connect it to the statsd server at `host`.
    pub fn connect<A: ToSocketAddrs>(host: A) -> io::Result<UdpTransport> {
        // Bind to a generic port as we'll only be writing on this
        // socket.
        let client_address = SocketAddr::from_str("0.0.0.0:0")
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let socket = UdpSocket::bind(client_address)?;
        socket.connect(host)?;
        Ok(UdpTransport::from(socket))
    }
}

impl From<UdpSocket> for UdpTransport {
    /// Use an already connected socket.
    fn from(socket: UdpSocket) -> UdpTransport {
        UdpTransport { socket: Some(socket) }
    }
}

impl Transport for UdpTransport {
    fn write(&mut self, packet: &[u8]) -> io::Result<usize> {
        match self.socket {
            Some(ref socket) => socket.send(packet),
            None => Err(io::Error::new(io::ErrorKind::NotConnected, "socket closed")),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        self.socket.take();
        Ok(())
    }
}


/// Transport over any byte stream, such as stdout or a file.
///
/// Packets are written in full and the stream is flushed after each one.
#[derive(Debug)]
pub struct StreamTransport<W> {
    inner: W,
}

impl<W: Write + Send> StreamTransport<W> {
    pub fn new(inner: W) -> StreamTransport<W> {
        StreamTransport { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Send> Transport for StreamTransport<W> {
    fn write(&mut self, packet: &[u8]) -> io::Result<usize> {
        self.inner.write_all(packet)?;
        self.inner.flush()?;
        Ok(packet.len())
    }

    fn close(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}


#[derive(Debug, Default)]
struct MemoryLog {
    packets: Vec<Vec<u8>>,
    closes: usize,
}

/// In-memory transport recording every packet.
///
/// Clones share the same log, so a test can keep one handle while the
/// client owns another.
#[derive(Clone, Debug, Default)]
pub struct MemoryTransport {
    log: Arc<Mutex<MemoryLog>>,
}

impl MemoryTransport {
    pub fn new() -> MemoryTransport {
        MemoryTransport::default()
    }

    /// Packets written so far, oldest first.
    pub fn packets(&self) -> Vec<Vec<u8>> {
        self.log.lock().packets.clone()
    }

    /// Packets written so far, decoded as UTF-8.
    pub fn packet_strings(&self) -> Vec<String> {
        self.log
            .lock()
            .packets
            .iter()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.log.lock().packets.len()
    }

    /// How many times `close` was called.
    pub fn close_count(&self) -> usize {
        self.log.lock().closes
    }

    pub fn is_closed(&self) -> bool {
        self.close_count() > 0
    }
}

impl Transport for MemoryTransport {
    fn write(&mut self, packet: &[u8]) -> io::Result<usize> {
        self.log.lock().packets.push(packet.to_vec());
        Ok(packet.len())
    }

    fn close(&mut self) -> io::Result<()> {
        self.log.lock().closes += 1;
        Ok(())
    }
}
