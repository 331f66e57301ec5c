//! Demo recording
//!
//! A demo file is a sequence of length-prefixed server message blocks: an
//! i32 little-endian byte count followed by the payload, terminated by a
//! count of -1. Recording starts mid-session, so the first blocks are a
//! synthesized snapshot of the current server state (serverdata header,
//! configstrings, entity spawn baselines, a precache trigger) so playback
//! can spawn into the level without having seen the original handshake.

use std::io::{self, Write};

use crate::session::{ClientState, EntityBaseline};

/// Network protocol revision stamped into the serverdata header.
pub const PROTOCOL_VERSION: i32 = 34;

/// Maximum server message size. Snapshot blocks are flushed at half of
/// this so delta-compressed playback has headroom.
pub const MAX_MSG_LEN: usize = 1400;

const SVC_STUFFTEXT: u8 = 11;
const SVC_SERVERDATA: u8 = 12;
const SVC_CONFIGSTRING: u8 = 13;
const SVC_SPAWNBASELINE: u8 = 14;

/// Incoming server messages carry sequencing numbers that mean nothing on
/// disk; they are stripped before writing.
const SEQUENCE_HEADER_LEN: usize = 8;

/// Little-endian message builder for snapshot blocks.
#[derive(Debug, Default)]
struct MessageBuffer {
    data: Vec<u8>,
}

impl MessageBuffer {
    fn new() -> Self {
        Self::default()
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn write_u8(&mut self, v: u8) {
        self.data.push(v);
    }

    fn write_i16(&mut self, v: i16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    /// NUL-terminated string.
    fn write_string(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
        self.data.push(0);
    }

    /// World coordinate, 1/8 unit fixed point.
    fn write_coord(&mut self, v: f32) {
        self.write_i16((v * 8.0) as i16);
    }

    /// Angle quantized to a byte.
    fn write_angle(&mut self, v: f32) {
        self.write_u8((v * 256.0 / 360.0) as i32 as u8);
    }

    fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.data)
    }
}

/// Writes server messages to a demo sink. Inert until [`start`] is
/// called.
///
/// [`start`]: DemoRecorder::start
#[derive(Default)]
pub struct DemoRecorder {
    sink: Option<Box<dyn Write + Send>>,
}

impl DemoRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.sink.is_some()
    }

    /// Begin recording to `sink`, writing the session snapshot first.
    ///
    /// On write failure the sink is dropped and recording does not start.
    pub fn start(&mut self, sink: Box<dyn Write + Send>, cl: &ClientState) -> io::Result<()> {
        self.sink = Some(sink);

        if let Err(err) = self.write_snapshot(cl) {
            self.sink = None;
            return Err(err);
        }
        Ok(())
    }

    fn write_snapshot(&mut self, cl: &ClientState) -> io::Result<()> {
        let mut msg = MessageBuffer::new();

        // serverdata header, marked as a demo (attract loop)
        msg.write_u8(SVC_SERVERDATA);
        msg.write_i32(PROTOCOL_VERSION);
        msg.write_i32(cl.server_count);
        msg.write_u8(1);
        msg.write_string(&cl.game_dir);
        msg.write_i16(cl.player_num);
        msg.write_string(&cl.level_name);

        for (index, cs) in cl.configstrings.iter().enumerate() {
            if cs.is_empty() {
                continue;
            }
            if msg.len() + cs.len() + 32 > MAX_MSG_LEN / 2 {
                self.write_block(&msg.take())?;
            }
            msg.write_u8(SVC_CONFIGSTRING);
            msg.write_i16(index as i16);
            msg.write_string(cs);
        }

        for ent in &cl.baselines {
            if ent.is_empty() {
                continue;
            }
            if msg.len() + 64 > MAX_MSG_LEN / 2 {
                self.write_block(&msg.take())?;
            }
            write_baseline(&mut msg, ent);
        }

        msg.write_u8(SVC_STUFFTEXT);
        msg.write_string("precache\n");
        self.write_block(&msg.take())
    }

    /// Record one incoming server message, stripping its sequencing
    /// header. Does nothing when not recording.
    pub fn record_message(&mut self, msg: &[u8]) -> io::Result<()> {
        if self.sink.is_none() {
            return Ok(());
        }
        if msg.len() <= SEQUENCE_HEADER_LEN {
            tracing::warn!("dropping undersized demo message ({} bytes)", msg.len());
            return Ok(());
        }
        self.write_block(&msg[SEQUENCE_HEADER_LEN..])
    }

    /// Finish the recording with the end-of-demo marker and release the
    /// sink. Returns false if nothing was being recorded.
    pub fn stop(&mut self) -> io::Result<bool> {
        let Some(mut sink) = self.sink.take() else {
            return Ok(false);
        };
        sink.write_all(&(-1i32).to_le_bytes())?;
        sink.flush()?;
        Ok(true)
    }

    fn write_block(&mut self, payload: &[u8]) -> io::Result<()> {
        let sink = self.sink.as_mut().expect("write_block without sink");
        sink.write_all(&(payload.len() as i32).to_le_bytes())?;
        sink.write_all(payload)
    }
}

fn write_baseline(msg: &mut MessageBuffer, ent: &EntityBaseline) {
    msg.write_u8(SVC_SPAWNBASELINE);
    msg.write_i16(ent.number as i16);
    msg.write_u8(ent.model_index);
    msg.write_u8(ent.frame);
    for i in 0..3 {
        msg.write_coord(ent.origin[i]);
    }
    for i in 0..3 {
        msg.write_angle(ent.angles[i]);
    }
}

impl std::fmt::Debug for DemoRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoRecorder")
            .field("recording", &self.is_recording())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Write half of a shared byte buffer, so tests can inspect what the
    /// recorder produced after handing over the sink.
    #[derive(Clone, Default)]
    struct SharedSink(Arc<Mutex<Vec<u8>>>);

    impl SharedSink {
        fn contents(&self) -> Vec<u8> {
            self.0.lock().clone()
        }
    }

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Split a demo stream into blocks, asserting the -1 terminator.
    fn read_blocks(data: &[u8]) -> Vec<Vec<u8>> {
        let mut blocks = Vec::new();
        let mut at = 0;
        loop {
            let len = i32::from_le_bytes(data[at..at + 4].try_into().unwrap());
            at += 4;
            if len == -1 {
                assert_eq!(at, data.len(), "data after terminator");
                return blocks;
            }
            blocks.push(data[at..at + len as usize].to_vec());
            at += len as usize;
        }
    }

    fn session() -> ClientState {
        let mut cl = ClientState::new();
        cl.server_count = 42;
        cl.player_num = 3;
        cl.game_dir = "baseq2".to_string();
        cl.level_name = "Outer Base".to_string();
        cl.configstrings = vec![
            "maps/base1.bsp".to_string(),
            String::new(),
            "models/weapons/v_blast/tris.md2".to_string(),
        ];
        cl.baselines = vec![
            EntityBaseline::default(), // empty, skipped
            EntityBaseline {
                number: 7,
                model_index: 2,
                frame: 0,
                origin: [16.0, -32.0, 24.0],
                angles: [0.0, 90.0, 0.0],
            },
        ];
        cl
    }

    #[test]
    fn test_snapshot_layout() {
        let sink = SharedSink::default();
        let mut rec = DemoRecorder::new();
        rec.start(Box::new(sink.clone()), &session()).unwrap();
        rec.stop().unwrap();

        let blocks = read_blocks(&sink.contents());
        assert_eq!(blocks.len(), 1);
        let snap = &blocks[0];

        assert_eq!(snap[0], SVC_SERVERDATA);
        assert_eq!(
            i32::from_le_bytes(snap[1..5].try_into().unwrap()),
            PROTOCOL_VERSION
        );
        assert_eq!(i32::from_le_bytes(snap[5..9].try_into().unwrap()), 42);
        // attract loop marker
        assert_eq!(snap[9], 1);

        // empty configstrings are not written
        assert_eq!(
            snap.iter().filter(|&&b| b == SVC_CONFIGSTRING).count(),
            2
        );
        // one non-empty baseline
        assert_eq!(
            snap.iter().filter(|&&b| b == SVC_SPAWNBASELINE).count(),
            1
        );

        let text = String::from_utf8_lossy(snap);
        assert!(text.contains("maps/base1.bsp"));
        assert!(text.contains("Outer Base"));
        assert!(text.contains("precache\n"));
    }

    #[test]
    fn test_messages_stripped_of_sequencing() {
        let sink = SharedSink::default();
        let mut rec = DemoRecorder::new();
        rec.start(Box::new(sink.clone()), &ClientState::new()).unwrap();

        let mut msg = vec![0xAA; SEQUENCE_HEADER_LEN];
        msg.extend_from_slice(b"payload");
        rec.record_message(&msg).unwrap();

        // header-only messages are dropped
        rec.record_message(&[0u8; SEQUENCE_HEADER_LEN]).unwrap();

        rec.stop().unwrap();
        let blocks = read_blocks(&sink.contents());
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1], b"payload");
    }

    #[test]
    fn test_large_snapshot_splits_blocks() {
        let mut cl = session();
        cl.configstrings = (0..200)
            .map(|i| format!("models/long/path/to/asset_{:03}.md2", i))
            .collect();

        let sink = SharedSink::default();
        let mut rec = DemoRecorder::new();
        rec.start(Box::new(sink.clone()), &cl).unwrap();
        rec.stop().unwrap();

        let blocks = read_blocks(&sink.contents());
        assert!(blocks.len() > 1);
        for block in &blocks {
            assert!(block.len() <= MAX_MSG_LEN / 2);
        }
    }

    #[test]
    fn test_stop_without_start() {
        let mut rec = DemoRecorder::new();
        assert!(!rec.stop().unwrap());
        assert!(!rec.is_recording());
        // messages while idle are ignored
        rec.record_message(b"0123456789abcdef").unwrap();
    }
}
