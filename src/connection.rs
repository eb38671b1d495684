//! Per-connection receive buffering and incremental frame extraction.
//!
//! Mirrors the growable-buffer strategy of a classic blocking socket reader:
//! bytes are appended as they arrive, [`codec::decode`] is run in a loop to
//! pull out every complete frame currently buffered, and the consumed prefix
//! is compacted away. The buffer grows when slack gets tight and shrinks
//! back down to a floor once it's mostly drained, so one connection that
//! briefly sent a huge frame doesn't permanently hold megabytes of unused
//! capacity.

use crate::codec::{self, Decoded};

/// Bytes below which the buffer grows before the next read.
const GROW_THRESHOLD: usize = 1024;
/// How much capacity to add each time the buffer grows.
const GROW_BY: usize = 4096;
/// Capacity floor: the buffer never shrinks below this after compaction.
const SHRINK_FLOOR: usize = 1024;

/// Decoded frames plus a flag for whether the stream needs to resynchronize
/// (bad magic was seen and the buffer was drained).
pub struct IngestResult {
    pub frames: Vec<(u8, Vec<u8>)>,
    pub resynced: bool,
}

/// Holds one connection's partially-received bytes and turns them into
/// frames as they complete.
pub struct Pipeline {
    buf: Vec<u8>,
    cursor: usize,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(SHRINK_FLOOR),
            cursor: 0,
        }
    }

    /// Appends freshly-read bytes and extracts every complete frame now
    /// available. Safe to call repeatedly as more bytes trickle in.
    pub fn ingest(&mut self, bytes: &[u8]) -> IngestResult {
        self.buf.extend_from_slice(bytes);

        let mut frames = Vec::new();
        let mut resynced = false;
        loop {
            match codec::decode(&self.buf, &mut self.cursor) {
                Decoded::Frame { msg_type, payload } => frames.push((msg_type, payload)),
                Decoded::Resync => {
                    resynced = true;
                    break;
                }
                Decoded::Incomplete => break,
            }
        }

        self.compact();
        IngestResult { frames, resynced }
    }

    /// Drops the consumed prefix and resizes the backing buffer: grows it
    /// when remaining slack is tight, shrinks it back to the floor once
    /// the unconsumed tail is small.
    fn compact(&mut self) {
        if self.cursor > 0 {
            self.buf.drain(..self.cursor);
            self.cursor = 0;
        }

        let slack = self.buf.capacity() - self.buf.len();
        if slack < GROW_THRESHOLD {
            self.buf.reserve(GROW_BY);
        } else if self.buf.capacity() > SHRINK_FLOOR && self.buf.len() < SHRINK_FLOOR {
            self.buf.shrink_to(SHRINK_FLOOR);
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
