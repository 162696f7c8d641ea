//! Run report and timeline rendering.

use csma_engine::{Channel, ChannelStats};
use csma_types::{Frame, PeerId};
use serde::Serialize;
use std::fmt;

/// What a timeline slot carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineKind {
    Data,
    Silence,
    Corrupt,
}

/// One resolved slot of the run.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
    /// Tick index, starting at 0.
    pub tick: u64,
    pub kind: TimelineKind,
    /// Payload as lossy UTF-8; present only for data slots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    /// Transmitting peer; present only for data slots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<PeerId>,
}

/// Full record of a run, suitable for text or JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub seed: u64,
    pub stats: ChannelStats,
    pub timeline: Vec<TimelineEntry>,
}

impl RunReport {
    /// Capture a report from a channel's timeline so far.
    pub fn from_channel(channel: &Channel) -> Self {
        let timeline = channel
            .history()
            .iter()
            .enumerate()
            .map(|(tick, frame)| {
                let tick = tick as u64;
                match frame {
                    Frame::Data { payload, origin } => TimelineEntry {
                        tick,
                        kind: TimelineKind::Data,
                        payload: Some(String::from_utf8_lossy(payload).into_owned()),
                        origin: Some(*origin),
                    },
                    Frame::Silence => TimelineEntry {
                        tick,
                        kind: TimelineKind::Silence,
                        payload: None,
                        origin: None,
                    },
                    Frame::Corrupt => TimelineEntry {
                        tick,
                        kind: TimelineKind::Corrupt,
                        payload: None,
                        origin: None,
                    },
                }
            })
            .collect();

        Self {
            seed: channel.seed(),
            stats: channel.stats().clone(),
            timeline,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Timeline (seed {}):", self.seed)?;
        for entry in &self.timeline {
            match entry.kind {
                TimelineKind::Silence => writeln!(f, "{:>5}  SILENCE", entry.tick)?,
                TimelineKind::Corrupt => writeln!(f, "{:>5}  CORRUPT", entry.tick)?,
                TimelineKind::Data => {
                    let origin = entry.origin.map(|p| p.to_string()).unwrap_or_default();
                    let payload = entry.payload.as_deref().unwrap_or("");
                    writeln!(f, "{:>5}  peer {:<3} {payload:?}", entry.tick, origin)?;
                }
            }
        }
        writeln!(
            f,
            "{} ticks: {} delivered, {} collisions, {} silent",
            self.stats.ticks, self.stats.delivered, self.stats.collisions, self.stats.silent
        )
    }
}
