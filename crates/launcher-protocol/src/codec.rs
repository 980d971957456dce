//! JSON Lines framing shared by both ends of a launcher channel.

use std::io::{self, BufRead, Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::PROTOCOL_VERSION;

/// Largest frame either side will read, newline included.
pub const MAX_FRAME_BYTES: usize = 4 * 1024 * 1024;

/// Errors raised while encoding, decoding, or moving frames.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The frame could not be serialised.
    #[error("failed to encode frame: {0}")]
    Encode(#[source] serde_json::Error),
    /// The frame was not valid JSON for the expected shape.
    #[error("failed to decode frame: {0}")]
    Decode(#[source] serde_json::Error),
    /// Reading or writing the underlying stream failed.
    #[error("frame transport failed: {0}")]
    Io(#[from] io::Error),
    /// The stream ended part-way through a frame.
    #[error("stream ended part-way through a frame")]
    Truncated,
    /// The frame exceeded [`MAX_FRAME_BYTES`]. The rest of the oversized
    /// line is left unread, so the stream is no longer aligned on a frame
    /// boundary.
    #[error("frame exceeds {limit} bytes")]
    TooLarge {
        /// Configured limit.
        limit: usize,
    },
    /// The peer stamped a different protocol version.
    #[error("peer speaks protocol version {found}, expected {expected}")]
    VersionMismatch {
        /// Version this build speaks.
        expected: u16,
        /// Version found on the frame.
        found: u16,
    },
}

impl FrameError {
    /// Reports whether the error means the peer's end of the stream is gone.
    ///
    /// Truncated frames count: a peer that dies mid-write leaves exactly
    /// that behind.
    #[must_use]
    pub fn is_disconnect(&self) -> bool {
        match self {
            Self::Truncated => true,
            Self::Io(error) => is_disconnect_kind(error.kind()),
            Self::Encode(_) | Self::Decode(_) | Self::TooLarge { .. } | Self::VersionMismatch { .. } => {
                false
            }
        }
    }

    /// Reports whether the reader stopped part-way through a line, leaving
    /// later frames on the stream unattributable to their requests.
    #[must_use]
    pub const fn leaves_stream_unaligned(&self) -> bool {
        matches!(self, Self::TooLarge { .. })
    }
}

fn is_disconnect_kind(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::NotConnected
    )
}

/// Rejects frames stamped with a foreign protocol version.
pub fn check_version(found: u16) -> Result<(), FrameError> {
    if found == PROTOCOL_VERSION {
        return Ok(());
    }
    Err(FrameError::VersionMismatch {
        expected: PROTOCOL_VERSION,
        found,
    })
}

/// Serialises `frame` as one line and flushes the writer.
///
/// The line is assembled before writing so a frame reaches the stream in a
/// single `write_all`.
pub fn write_frame<W, T>(writer: &mut W, frame: &T) -> Result<(), FrameError>
where
    W: Write + ?Sized,
    T: Serialize,
{
    let mut line = serde_json::to_vec(frame).map_err(FrameError::Encode)?;
    line.push(b'\n');
    writer.write_all(&line)?;
    writer.flush()?;
    Ok(())
}

/// Reads one frame.
///
/// Returns `Ok(None)` when the stream ends cleanly before any byte of a new
/// frame arrives.
pub fn read_frame<R, T>(reader: &mut R) -> Result<Option<T>, FrameError>
where
    R: BufRead,
    T: DeserializeOwned,
{
    let mut line = Vec::new();
    let limit = u64::try_from(MAX_FRAME_BYTES).unwrap_or(u64::MAX);
    let read = reader.by_ref().take(limit).read_until(b'\n', &mut line)?;
    if read == 0 {
        return Ok(None);
    }
    if line.last() != Some(&b'\n') {
        if line.len() >= MAX_FRAME_BYTES {
            return Err(FrameError::TooLarge {
                limit: MAX_FRAME_BYTES,
            });
        }
        return Err(FrameError::Truncated);
    }

    serde_json::from_slice(&line)
        .map(Some)
        .map_err(FrameError::Decode)
}
