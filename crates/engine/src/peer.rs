//! Peer contention state machine.
//!
//! Pure synchronous state machine: no I/O, no clock, no global state. The
//! channel drives each tick in two phases — [`Peer::offer`] then
//! [`Peer::resolve`] — and the only randomness is the backoff draw from
//! the channel's seeded RNG handle.
//!
//! A peer senses the medium solely through the previous tick's resolved
//! outcome (no mid-tick carrier sense in the slotted model) and commits to
//! transmit at the start of a tick, before seeing anyone else's offer.
//! That commitment is what produces genuine simultaneous collisions.

use bytes::Bytes;
use csma_types::{Frame, FrameError, PeerId};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// Upper bound of the uniform backoff draw, inclusive (16 possible delays).
pub const MAX_BACKOFF: u32 = 15;

/// Conceptual state of a peer, derived from its attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    /// Ready to contend for the medium on the next free slot.
    Idle,
    /// Mid-transmission of its outbox.
    Transmitting,
    /// Waiting out a collision backoff.
    Sleeping,
    /// Outbox fully transmitted.
    Done,
}

/// A sender contending for the shared medium.
///
/// Owns an immutable outbox of data frames produced by chunking its
/// payload at construction, and tracks how far the channel has carried it.
/// Mutated only through the channel's two-phase tick protocol; reaches the
/// terminal [`PeerState::Done`] once the whole outbox has been delivered.
#[derive(Debug, Clone)]
pub struct Peer {
    id: PeerId,
    /// Data frames to send, fixed at construction.
    outbox: Vec<Frame>,
    /// Frames successfully transmitted so far.
    cursor: usize,
    /// Mid-transmission flag. Never set while sleeping or done.
    transmitting: bool,
    /// Remaining backoff ticks after a collision.
    sleep_remaining: u32,
    /// Whether another peer successfully occupied the medium last tick.
    medium_busy: bool,
}

impl Peer {
    /// Create a peer with its full outbox by chunking `payload`.
    ///
    /// Chunking already enforces the frame bound, so this only fails if
    /// [`Frame::SIZE_LIMIT`] itself is misconfigured. An empty payload
    /// yields an empty outbox and the peer is immediately done.
    pub fn new(payload: impl Into<Bytes>, id: PeerId) -> Result<Self, FrameError> {
        let outbox: Vec<Frame> = Frame::chunk(payload, id)
            .map(|frame| match frame {
                Frame::Data { payload, origin } => Frame::data(payload, origin),
                other => Ok(other),
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            id,
            outbox,
            cursor: 0,
            transmitting: false,
            sleep_remaining: 0,
            medium_busy: false,
        })
    }

    /// This peer's identifier.
    pub fn id(&self) -> PeerId {
        self.id
    }

    /// Whether the whole outbox has been transmitted.
    pub fn is_done(&self) -> bool {
        self.cursor == self.outbox.len()
    }

    /// Frames not yet successfully transmitted.
    pub fn frames_remaining(&self) -> usize {
        self.outbox.len() - self.cursor
    }

    /// Current conceptual state.
    pub fn state(&self) -> PeerState {
        if self.is_done() {
            PeerState::Done
        } else if self.sleep_remaining > 0 {
            PeerState::Sleeping
        } else if self.transmitting {
            PeerState::Transmitting
        } else {
            PeerState::Idle
        }
    }

    /// Offer phase: decide whether to transmit this tick.
    ///
    /// Commits to transmit when there are frames left, no backoff is
    /// pending, and the medium was not observed busy on the previous tick.
    /// Returns the frame at the cursor while transmitting, otherwise
    /// [`Frame::Silence`] (sleeping, deferring to a busy medium, or done).
    pub fn offer(&mut self, tick: u64) -> Frame {
        if !self.is_done() && self.sleep_remaining == 0 && !self.medium_busy {
            self.transmitting = true;
        }

        if self.transmitting {
            trace!(tick, peer = %self.id, frame = self.cursor, "offering frame");
            return self.outbox[self.cursor].clone();
        }
        Frame::Silence
    }

    /// Resolve phase: consume the tick's single arbitrated winner.
    ///
    /// Called for every registered peer regardless of whether it offered.
    /// On a collision, every peer restarts its backoff — the medium was
    /// busy and corrupted for all of them, offering or not.
    ///
    /// # Panics
    ///
    /// Panics on internal invariant violations (transmitting while asleep,
    /// winner mismatch while transmitting, idle on a free medium with
    /// frames pending). These signal a defect in the arbitration logic,
    /// never an expected condition.
    pub fn resolve(&mut self, tick: u64, winner: &Frame, rng: &mut ChaCha8Rng) {
        // This tick's offer already used the old observation; the new one
        // takes effect starting next tick.
        let was_busy = self.medium_busy;
        self.medium_busy = winner.is_data() && winner.origin() != Some(self.id);

        if winner.is_corrupt() {
            self.sleep_remaining = rng.gen_range(0..=MAX_BACKOFF);
            self.transmitting = false;
            trace!(
                tick,
                peer = %self.id,
                backoff = self.sleep_remaining,
                "collision, backing off"
            );
            return;
        }

        if self.sleep_remaining > 0 {
            assert!(
                !self.transmitting,
                "peer {} transmitted while sleeping",
                self.id
            );
            self.sleep_remaining -= 1;
            return;
        }

        if self.transmitting {
            // A non-corrupt winner while transmitting can only be our own
            // frame; the channel never picks sides between offers.
            assert_eq!(
                winner, &self.outbox[self.cursor],
                "peer {} saw a foreign frame win without a collision",
                self.id
            );
            self.cursor += 1;
            if self.is_done() {
                self.transmitting = false;
                trace!(tick, peer = %self.id, "outbox drained");
            }
            return;
        }

        if !was_busy {
            // Idle on a free medium is only legal once the outbox is
            // drained; anything else should have transmitted this tick.
            assert_eq!(self.sleep_remaining, 0);
            assert!(
                self.is_done(),
                "peer {} idle on a free medium with frames pending",
                self.id
            );
        }
    }
}
