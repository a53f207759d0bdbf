// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Per-stream state as the session sees it: an identity plus bytes
// queued for the send loop.  Flow control and the stream state machine
// are the session's business, not this type's.

use std::{cell::RefCell, cmp::min, collections::VecDeque, rc::Rc};

use quetz_common::qtrace;

use crate::stream_id::StreamId;

pub const SEND_BUFFER_SIZE: usize = 0x10_0000; // 1 MiB

/// Shared handle to a [`Stream`].  The session creates the stream and
/// keeps one of these; the streams map stores another clone.  The
/// stream is only dropped once every holder has let go, so the map can
/// never be left pointing at a dead stream.
pub type StreamRef = Rc<RefCell<Stream>>;

#[derive(Debug)]
pub struct Stream {
    stream_id: StreamId,
    send_buf: VecDeque<u8>,
}

impl Stream {
    #[must_use]
    pub const fn new(stream_id: StreamId) -> Self {
        Self {
            stream_id,
            send_buf: VecDeque::new(),
        }
    }

    /// Make a new stream, wrapped for sharing with a
    /// [`crate::StreamsMap`].
    #[must_use]
    pub fn new_ref(stream_id: StreamId) -> StreamRef {
        Rc::new(RefCell::new(Self::new(stream_id)))
    }

    #[must_use]
    pub const fn id(&self) -> StreamId {
        self.stream_id
    }

    /// Queue bytes for transmission.  Returns how much was accepted;
    /// anything past the buffer cap stays with the caller.
    pub fn send(&mut self, buf: &[u8]) -> usize {
        let can_buffer = min(SEND_BUFFER_SIZE - self.send_buf.len(), buf.len());
        if can_buffer > 0 {
            self.send_buf.extend(&buf[..can_buffer]);
            qtrace!([self], "queued {} bytes", can_buffer);
        }
        can_buffer
    }

    #[must_use]
    pub fn has_data_to_send(&self) -> bool {
        !self.send_buf.is_empty()
    }

    #[must_use]
    pub fn buffered(&self) -> usize {
        self.send_buf.len()
    }

    /// Hand up to `limit` queued bytes to the packetizer.
    pub fn next_bytes(&mut self, limit: usize) -> Vec<u8> {
        let len = min(limit, self.send_buf.len());
        self.send_buf.drain(..len).collect()
    }
}

impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Stream {}", self.stream_id)
    }
}
