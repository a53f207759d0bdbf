// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Drive the streams map the way a session does: a send loop filling
// fixed-size packets round-robin, and frame processing telling late
// frames apart from unknown streams.

use quetz_transport::{Stream, StreamId, StreamsMap};

const PACKET_SIZE: usize = 1200;

#[derive(Debug)]
struct Unreachable;

#[test]
fn send_loop_fills_packets_round_robin() {
    quetz_common::log::init(None);

    let mut map = StreamsMap::new();
    for (id, len) in [(0_u64, 3000_usize), (4, 1800), (8, 600), (12, 2400)] {
        let stream = Stream::new_ref(StreamId::new(id));
        assert_eq!(stream.borrow_mut().send(&vec![0; len]), len);
        map.put(stream).unwrap();
    }

    let mut packets = Vec::new();
    loop {
        let mut budget = PACKET_SIZE;
        let mut wrote = false;
        map.round_robin_iterate::<_, Unreachable>(|stream| {
            let mut stream = stream.borrow_mut();
            if !stream.has_data_to_send() {
                return Ok(true);
            }
            if budget == 0 {
                // Packet full.  Stopping here parks the cursor on
                // this stream, so it goes first into the next packet.
                return Ok(false);
            }
            let chunk = stream.next_bytes(budget);
            budget -= chunk.len();
            wrote = true;
            Ok(true)
        })
        .unwrap();
        if !wrote {
            break;
        }
        packets.push(PACKET_SIZE - budget);
    }

    assert_eq!(packets, [1200, 1200, 1200, 1200, 1200, 1200, 600]);
    map.iterate::<_, Unreachable>(|stream| {
        assert!(!stream.borrow().has_data_to_send());
        Ok(true)
    })
    .unwrap();
}

#[test]
fn late_frames_are_told_apart_from_unknown_streams() {
    let mut map = StreamsMap::new();
    let id = StreamId::new(4);
    map.put(Stream::new_ref(id)).unwrap();
    map.remove(id).unwrap();

    // A late frame names a stream we used to have.
    assert!(map.get(id).is_none());
    assert!(map.is_closed(id));

    // A frame for a stream this session has never seen.
    let unknown = StreamId::new(8);
    assert!(map.get(unknown).is_none());
    assert!(!map.is_closed(unknown));
}

#[test]
fn stream_teardown_is_reported_once() {
    let mut map = StreamsMap::new();
    let id = StreamId::new(3);
    map.put(Stream::new_ref(id)).unwrap();
    map.remove(id).unwrap();
    assert_eq!(
        map.remove(id).unwrap_err().to_string(),
        "attempted to remove non-existing stream: 3"
    );
}
