//! Frames on the shared medium.
//!
//! A [`Frame`] is what one arbitration slot resolves to: a single
//! successful transmission ([`Frame::Data`]), no transmission at all
//! ([`Frame::Silence`]), or overlapping transmissions that destroyed each
//! other ([`Frame::Corrupt`]). Data frames carry at most
//! [`Frame::SIZE_LIMIT`] payload bytes plus the id of the sending peer.

use crate::PeerId;
use bytes::Bytes;
use std::fmt;
use thiserror::Error;

/// Errors from frame construction and access.
///
/// Both variants are fail-fast precondition violations: they indicate a
/// caller bug, never a condition to retry or recover from.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// Payload exceeds [`Frame::SIZE_LIMIT`].
    #[error("frame payload too large: {len} bytes (limit {limit})")]
    TooLarge { len: usize, limit: usize },

    /// Payload access on a corrupt frame.
    #[error("payload access on a corrupt frame")]
    CorruptAccess,
}

/// A single frame on the medium.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A transmission: payload bytes plus the peer that produced them.
    Data {
        /// At most [`Frame::SIZE_LIMIT`] bytes, non-empty when chunked.
        payload: Bytes,
        /// The transmitting peer.
        origin: PeerId,
    },
    /// Nobody transmitted in the slot, or nothing was heard.
    Silence,
    /// Two or more peers transmitted in the same slot. The signal is
    /// unrecoverable and the colliders' identities are lost with it.
    Corrupt,
}

impl Frame {
    /// Maximum payload size of a data frame, in bytes.
    pub const SIZE_LIMIT: usize = 4;

    /// Create a data frame, enforcing the payload bound.
    pub fn data(payload: impl Into<Bytes>, origin: PeerId) -> Result<Self, FrameError> {
        let payload = payload.into();
        if payload.len() > Self::SIZE_LIMIT {
            return Err(FrameError::TooLarge {
                len: payload.len(),
                limit: Self::SIZE_LIMIT,
            });
        }
        Ok(Self::Data { payload, origin })
    }

    /// Whether this frame is the silence sentinel.
    pub fn is_silence(&self) -> bool {
        matches!(self, Self::Silence)
    }

    /// Whether this frame is the corrupt sentinel.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt)
    }

    /// Whether this frame carries data.
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data { .. })
    }

    /// Payload of a non-corrupt frame; silence has an empty payload.
    ///
    /// Reading the payload of a destroyed signal is a caller bug and fails
    /// with [`FrameError::CorruptAccess`].
    pub fn payload(&self) -> Result<Bytes, FrameError> {
        match self {
            Self::Data { payload, .. } => Ok(payload.clone()),
            Self::Silence => Ok(Bytes::new()),
            Self::Corrupt => Err(FrameError::CorruptAccess),
        }
    }

    /// The transmitting peer, present only for data frames.
    pub fn origin(&self) -> Option<PeerId> {
        match self {
            Self::Data { origin, .. } => Some(*origin),
            Self::Silence | Self::Corrupt => None,
        }
    }

    /// Split `payload` into data frames of up to [`Frame::SIZE_LIMIT`] bytes.
    ///
    /// Yields `ceil(len / SIZE_LIMIT)` frames, the final one possibly
    /// shorter; concatenating the yielded payloads reproduces the input
    /// exactly. An empty payload yields no frames.
    pub fn chunk(payload: impl Into<Bytes>, origin: PeerId) -> Chunks {
        Chunks {
            rest: payload.into(),
            origin,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data { payload, origin } => {
                write!(f, "Data({:?} from peer {origin})", payload)
            }
            Self::Silence => write!(f, "SILENCE"),
            Self::Corrupt => write!(f, "CORRUPT"),
        }
    }
}

/// Lazy iterator over the data frames of a chunked payload.
///
/// Finite and cheap to clone; a clone iterates the remaining frames
/// independently, so the sequence can be replayed from any point.
#[derive(Debug, Clone)]
pub struct Chunks {
    rest: Bytes,
    origin: PeerId,
}

impl Iterator for Chunks {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.rest.is_empty() {
            return None;
        }
        let take = self.rest.len().min(Frame::SIZE_LIMIT);
        let payload = self.rest.split_to(take);
        Some(Frame::Data {
            payload,
            origin: self.origin,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.rest.len().div_ceil(Frame::SIZE_LIMIT);
        (n, Some(n))
    }
}

impl ExactSizeIterator for Chunks {}
