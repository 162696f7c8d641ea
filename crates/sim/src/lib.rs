//! Scenario driver and presentation for the CSMA/CD engine.
//!
//! This crate builds channels from declarative [`Scenario`] configs, runs
//! them to completion, and turns the resulting timeline into a
//! human-readable or JSON [`RunReport`].
//!
//! # Example
//!
//! ```ignore
//! use csma_sim::{RunReport, Scenario};
//!
//! let mut channel = Scenario::demo(1337).build()?;
//! channel.run_to_completion();
//!
//! let report = RunReport::from_channel(&channel);
//! println!("{report}");
//! ```

mod report;
mod scenario;

pub use report::{RunReport, TimelineEntry, TimelineKind};
pub use scenario::Scenario;
