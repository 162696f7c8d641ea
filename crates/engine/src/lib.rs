//! Deterministic CSMA/CD arbitration engine.
//!
//! Peers contend for a single shared channel in discrete ticks. Each tick
//! runs two phases over every registered peer, always in registration
//! order:
//!
//! ```text
//! Channel::tick()
//! ┌──────────────────────────────────────────────────────────┐
//! │  offer phase     every peer submits a Frame (or Silence) │
//! │        │         without seeing anyone else's offer      │
//! │        ▼                                                 │
//! │  arbitration     0 offers → Silence                      │
//! │        │         1 offer  → that frame, verbatim         │
//! │        │         2+       → Corrupt (collision)          │
//! │        ▼                                                 │
//! │  resolve phase   every peer consumes the single winner   │
//! │                  and advances its own state machine      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine is strictly single-threaded and synchronous: one tick fully
//! completes before the next begins, and the only randomness (collision
//! backoff) flows through one seeded RNG. Given the same seed and the same
//! registration order, a run reproduces bit for bit.

mod channel;
mod peer;

pub use channel::{Channel, ChannelStats};
pub use peer::{Peer, PeerState, MAX_BACKOFF};
