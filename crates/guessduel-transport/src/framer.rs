//! Newline-delimited framing over a byte stream.
//!
//! TCP has no message boundaries: one `read` may return half a message,
//! or three messages glued together. [`LineFramer`] keeps the bytes that
//! have arrived so far and hands out complete frames, one per delimiter.
//!
//! ```text
//! read #1: {"type":"send_nickname","da
//! read #2: ta":"Ann"}\n{"type":"leave","data":null}\n{"ty
//!          └──────── frame 1 ────────┘└────── frame 2 ──────┘└ buffered
//! ```

use crate::TransportError;

/// The byte that terminates every frame on the wire.
pub const DELIMITER: u8 = b'\n';

/// Upper bound on a single buffered frame. A peer that streams more than
/// this without a newline is cut off instead of growing the buffer forever.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Per-connection accumulation buffer for delimited frames.
#[derive(Debug)]
pub struct LineFramer {
    buffer: Vec<u8>,
    max_frame_len: usize,
}

impl LineFramer {
    /// Creates an empty framer with the default frame limit.
    pub fn new() -> Self {
        Self::with_max_frame_len(MAX_FRAME_LEN)
    }

    /// Creates an empty framer with a custom frame limit.
    pub fn with_max_frame_len(max_frame_len: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_frame_len,
        }
    }

    /// Appends freshly read bytes to the buffer.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Pops the next complete frame, without its delimiter.
    ///
    /// Returns `Ok(None)` when no delimiter is buffered yet; the partial
    /// bytes stay put until the next [`extend`](Self::extend).
    ///
    /// # Errors
    /// [`TransportError::FrameTooLong`] if the pending frame already
    /// exceeds the limit.
    pub fn next_frame(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        match self.buffer.iter().position(|b| *b == DELIMITER) {
            Some(pos) => {
                if pos > self.max_frame_len {
                    return Err(TransportError::FrameTooLong {
                        limit: self.max_frame_len,
                    });
                }
                // `drain(..=pos)` removes the frame AND its delimiter from
                // the front, shifting the remainder down.
                let mut frame: Vec<u8> = self.buffer.drain(..=pos).collect();
                frame.pop();
                if frame.last() == Some(&b'\r') {
                    frame.pop();
                }
                Ok(Some(frame))
            }
            None if self.buffer.len() > self.max_frame_len => {
                Err(TransportError::FrameTooLong {
                    limit: self.max_frame_len,
                })
            }
            None => Ok(None),
        }
    }

    /// Number of bytes waiting for a delimiter.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Terminates a payload with the delimiter, ready to be written.
    ///
    /// # Errors
    /// [`TransportError::InvalidFrame`] if the payload itself contains a
    /// raw delimiter, since the peer would split it in two.
    pub fn encode(payload: &[u8]) -> Result<Vec<u8>, TransportError> {
        if payload.contains(&DELIMITER) {
            return Err(TransportError::InvalidFrame(
                "payload contains a raw newline".into(),
            ));
        }
        let mut frame = Vec::with_capacity(payload.len() + 1);
        frame.extend_from_slice(payload);
        frame.push(DELIMITER);
        Ok(frame)
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}
