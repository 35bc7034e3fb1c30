//! Length-prefix frame codec.
//!
//! Wire format:
//! ```text
//! ┌────────────┬──────────────────────────┐
//! │ Length (4B)│ JSON payload (N B)       │
//! │ LE u32     │                          │
//! └────────────┴──────────────────────────┘
//! ```
//!
//! The codec accumulates incoming bytes and yields complete frames.  A
//! single transport read may return part of the header, part of the
//! payload, or several frames concatenated.

use crate::config::CAPTURE_REPLY_LIMIT;

/// Room for the JSON envelope around the largest pixel payload.
const ENVELOPE_SLACK: usize = 4096;

/// Maximum frame payload size: the largest `getImageRemote` reply the
/// camera config accepts, plus its envelope.
pub const MAX_FRAME_SIZE: usize = CAPTURE_REPLY_LIMIT + ENVELOPE_SLACK;

/// Frame header size (4-byte little-endian length).
pub const HEADER_SIZE: usize = 4;

/// Decoder state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    /// Waiting for header bytes.
    ReadingHeader { collected: usize },
    /// Header received, reading payload.
    ReadingPayload { expected: usize },
    /// Oversize header: discarding its payload to stay aligned.
    Skipping { remaining: usize },
}

/// Streaming frame decoder.
pub struct FrameDecoder {
    state: DecoderState,
    header_buf: [u8; HEADER_SIZE],
    payload_buf: Vec<u8>,
    rejected: u64,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::ReadingHeader { collected: 0 },
            header_buf: [0; HEADER_SIZE],
            payload_buf: Vec::new(),
            rejected: 0,
        }
    }

    /// Feed bytes into the decoder and collect every frame they complete.
    pub fn feed(&mut self, input: &[u8]) -> Vec<Vec<u8>> {
        let mut frames = Vec::new();
        let mut offset = 0;

        while offset < input.len() {
            match self.state {
                DecoderState::ReadingHeader { collected } => {
                    let to_copy = (HEADER_SIZE - collected).min(input.len() - offset);
                    self.header_buf[collected..collected + to_copy]
                        .copy_from_slice(&input[offset..offset + to_copy]);
                    offset += to_copy;
                    let collected = collected + to_copy;

                    if collected < HEADER_SIZE {
                        self.state = DecoderState::ReadingHeader { collected };
                        continue;
                    }

                    let expected = u32::from_le_bytes(self.header_buf) as usize;
                    if expected == 0 {
                        self.rejected += 1;
                        self.state = DecoderState::ReadingHeader { collected: 0 };
                        continue;
                    }
                    if expected > MAX_FRAME_SIZE {
                        self.rejected += 1;
                        self.state = DecoderState::Skipping { remaining: expected };
                        continue;
                    }
                    self.payload_buf.clear();
                    self.payload_buf.reserve(expected);
                    self.state = DecoderState::ReadingPayload { expected };
                }

                DecoderState::ReadingPayload { expected } => {
                    let needed = expected - self.payload_buf.len();
                    let to_copy = needed.min(input.len() - offset);
                    self.payload_buf
                        .extend_from_slice(&input[offset..offset + to_copy]);
                    offset += to_copy;

                    if self.payload_buf.len() == expected {
                        frames.push(std::mem::take(&mut self.payload_buf));
                        self.state = DecoderState::ReadingHeader { collected: 0 };
                    }
                }

                DecoderState::Skipping { remaining } => {
                    let skipped = remaining.min(input.len() - offset);
                    offset += skipped;
                    self.state = if skipped == remaining {
                        DecoderState::ReadingHeader { collected: 0 }
                    } else {
                        DecoderState::Skipping {
                            remaining: remaining - skipped,
                        }
                    };
                }
            }
        }

        frames
    }

    /// Number of headers rejected as zero-length or oversize.  An oversize
    /// frame's payload is skipped, so later frames still decode.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// `true` if a frame is partially received.
    pub fn is_mid_frame(&self) -> bool {
        self.state != DecoderState::ReadingHeader { collected: 0 }
    }

    /// Reset decoder state (e.g. after a transport reconnect).
    pub fn reset(&mut self) {
        self.state = DecoderState::ReadingHeader { collected: 0 };
        self.payload_buf.clear();
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a payload into a length-prefixed frame.
///
/// Returns `None` if the payload is empty or exceeds [`MAX_FRAME_SIZE`].
pub fn encode_frame(payload: &[u8]) -> Option<Vec<u8>> {
    if payload.is_empty() || payload.len() > MAX_FRAME_SIZE {
        return None;
    }
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    Some(out)
}
