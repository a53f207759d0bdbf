// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Tracking every open stream of a session, with a resumable
// round-robin traversal for the send loop.

use std::collections::HashSet;

use indexmap::IndexMap;
use quetz_common::qtrace;

use crate::{stream::StreamRef, stream_id::StreamId, Error, Res};

/// All streams currently open in one session, plus a memory of the
/// ones that used to be.
///
/// Lookup wants a keyed map; the send loop wants a stable traversal
/// order so no stream is starved.  An `IndexMap` provides both at
/// once: iteration follows insertion order, and `shift_remove` closes
/// the gap left by a removal instead of swapping, so relative order
/// survives.
///
/// Fairness across packets comes from `round_robin_iterate`, which
/// remembers where it stopped as a *position* in that order.  A
/// position needs no hash lookup per visited stream; the cost is that
/// `remove` must compensate when it shortens the order to the left of
/// the cursor.  Remembering a stream id instead would need a lookup on
/// every call plus a fallback for ids closed in the meantime.
#[derive(Debug, Default)]
pub struct StreamsMap {
    streams: IndexMap<StreamId, StreamRef>,
    closed: HashSet<StreamId>,
    round_robin_index: usize,
}

impl StreamsMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a live stream.  `None` covers both a stream that never
    /// existed and one that has been closed; [`Self::is_closed`] tells
    /// them apart.
    #[must_use]
    pub fn get(&self, id: StreamId) -> Option<StreamRef> {
        self.streams.get(&id).cloned()
    }

    /// Whether this id was once live here and has since been removed.
    /// The session uses this to answer a late frame with a
    /// stream-closed signal instead of treating it as a new stream.
    #[must_use]
    pub fn is_closed(&self, id: StreamId) -> bool {
        self.closed.contains(&id)
    }

    /// Add a stream under its own id, at the back of the traversal
    /// order.
    ///
    /// The closed set is not consulted.  Stream ids are issued
    /// monotonically, so the session never hands in the id of a closed
    /// stream; nothing here would catch it if it did.
    ///
    /// # Errors
    /// When a stream with the same id is already live.  The map is
    /// unchanged in that case.
    pub fn put(&mut self, stream: StreamRef) -> Res<()> {
        let id = stream.borrow().id();
        if self.streams.contains_key(&id) {
            return Err(Error::DuplicateStream(id));
        }
        self.streams.insert(id, stream);
        qtrace!("put stream {}, {} open", id, self.streams.len());
        Ok(())
    }

    /// Close out a stream: drop it from the live map and remember its
    /// id in the closed set.
    ///
    /// # Errors
    /// When no stream with this id is live.
    pub fn remove(&mut self, id: StreamId) -> Res<()> {
        let Some(pos) = self.streams.get_index_of(&id) else {
            return Err(Error::NoSuchStream(id));
        };
        self.streams.shift_remove_index(pos);
        self.closed.insert(id);

        // Everything right of `pos` slid one slot left.  If that
        // includes the entry under the cursor, follow it.  If the
        // removed entry sat under the cursor itself, its successor now
        // occupies the slot, which is where the next round should
        // resume anyway.
        if pos < self.round_robin_index {
            self.round_robin_index -= 1;
        }
        if self.round_robin_index >= self.streams.len() {
            self.round_robin_index = 0;
        }
        qtrace!("removed stream {}, {} remain", id, self.streams.len());
        Ok(())
    }

    /// The number of live streams.
    #[must_use]
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Visit every live stream at most once, in no particular order.
    /// `f` returns `Ok(false)` to stop early.  The round-robin cursor
    /// is not touched.
    ///
    /// `f` cannot get back into this map while the traversal runs; a
    /// caller that wants to insert or remove as a consequence of a
    /// visit buffers those changes and applies them afterwards.
    ///
    /// # Errors
    /// The first error `f` returns ends the traversal and is passed
    /// back unchanged.
    pub fn iterate<F, E>(&self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&StreamRef) -> Result<bool, E>,
    {
        for stream in self.streams.values() {
            if !f(stream)? {
                break;
            }
        }
        Ok(())
    }

    /// Visit live streams as a ring, starting at the cursor.
    ///
    /// A completed pass visits every stream exactly once and leaves
    /// the cursor where it started, so repeated full passes are
    /// identical.  If `f` stops the traversal, the cursor parks **on**
    /// that stream and the next call offers it again first: a sender
    /// that declined a stream because the packet was full gets to
    /// retry it before anything else.
    ///
    /// # Errors
    /// The first error `f` returns ends the traversal and is passed
    /// back unchanged; the cursor parks as for an early stop.
    pub fn round_robin_iterate<F, E>(&mut self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&StreamRef) -> Result<bool, E>,
    {
        for i in 0..self.streams.len() {
            let pos = (self.round_robin_index + i) % self.streams.len();
            let Some((_, stream)) = self.streams.get_index(pos) else {
                unreachable!();
            };
            match f(stream) {
                Ok(true) => (),
                Ok(false) => {
                    self.round_robin_index = pos;
                    return Ok(());
                }
                Err(e) => {
                    self.round_robin_index = pos;
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}
