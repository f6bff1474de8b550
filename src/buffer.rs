//! Packet batching.
//!
//! Lines are kept newline-terminated in a single pending packet. When the
//! next line would push the packet past the size limit, the pending packet
//! is written first and the line starts a new one. A line that is larger
//! than the limit on its own is written as its own packet, untruncated.

use log::trace;

use crate::error::Result;
use crate::transport::Transport;

/// Default maximum packet size in bytes.
pub const DEFAULT_MAX_PACKET_SIZE: usize = 512;


#[derive(Debug)]
pub struct PacketBuffer {
    pending: Vec<u8>,
    max_packet_size: usize,
}

impl PacketBuffer {
    pub fn new(max_packet_size: usize) -> PacketBuffer {
        PacketBuffer {
            pending: Vec::with_capacity(max_packet_size),
            max_packet_size,
        }
    }

    pub fn max_packet_size(&self) -> usize {
        self.max_packet_size
    }

    /// Takes effect for subsequent appends only.
    pub fn set_max_packet_size(&mut self, max_packet_size: usize) {
        self.max_packet_size = max_packet_size;
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Add a line, writing out the pending packet if the line does not fit.
    ///
    /// The line is buffered even when writing the previous packet fails;
    /// only that previous packet is dropped, and its error is returned.
    pub fn append<T: Transport + ?Sized>(&mut self, line: &str, transport: &mut T) -> Result<()> {
        let entry_len = line.len() + 1;
        let mut result = Ok(());
        if !self.pending.is_empty() && self.pending.len() + entry_len > self.max_packet_size {
            result = self.flush(transport);
        }

        self.pending.extend_from_slice(line.as_bytes());
        self.pending.push(b'\n');

        if self.pending.len() > self.max_packet_size {
            // oversized single line
            let oversized = self.flush(transport);
            if result.is_ok() {
                result = oversized;
            }
        }
        result
    }

    /// Write the pending packet, if any. The buffer is emptied even when
    /// the write fails.
    pub fn flush<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        trace!("flushing {} byte statsd packet", self.len());
        let result = transport.write(&self.pending);
        self.pending.clear();
        result?;
        Ok(())
    }
}
