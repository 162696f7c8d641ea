//! Scenario configuration.

use csma_engine::{Channel, Peer};
use csma_types::{FrameError, PeerId};
use tracing::debug;

/// A set of peer payloads and a seed describing one simulation run.
///
/// Peer ids are assigned from the payload order, which also becomes the
/// channel registration order.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// One outbound payload per peer.
    pub payloads: Vec<Vec<u8>>,
    /// Seed for the channel RNG.
    pub seed: u64,
}

impl Scenario {
    /// The classic three-peer demonstration workload.
    pub fn demo(seed: u64) -> Self {
        Self {
            payloads: vec![
                b"Some data by peer 0".to_vec(),
                b"Hello, I'm 1".to_vec(),
                b"Dancin' is what to do".to_vec(),
            ],
            seed,
        }
    }

    /// Demo workload truncated or padded to exactly `peers` peers.
    pub fn with_peers(peers: usize, seed: u64) -> Self {
        let mut scenario = Self::demo(seed);
        scenario.payloads.truncate(peers);
        for id in scenario.payloads.len()..peers {
            scenario
                .payloads
                .push(format!("Synthetic payload from peer {id}").into_bytes());
        }
        scenario
    }

    /// Build a channel with every peer registered, ready to run.
    pub fn build(&self) -> Result<Channel, FrameError> {
        let mut channel = Channel::with_seed(self.seed);
        for (id, payload) in self.payloads.iter().enumerate() {
            channel.register(Peer::new(payload.clone(), PeerId(id as u32))?);
        }
        debug!(peers = self.payloads.len(), seed = self.seed, "scenario built");
        Ok(channel)
    }
}
