//! Core types for the CSMA/CD simulator.
//!
//! This crate provides the foundation layer shared by the arbitration
//! engine and the driver:
//!
//! - **Frames**: the tagged union of what one slot on the medium can carry
//! - **Chunking**: fixed-size splitting of a payload into data frames
//! - **Identifiers**: the `PeerId` newtype
//!
//! It is self-contained and does not depend on any other workspace crate.

mod frame;
mod identifiers;

pub use frame::{Chunks, Frame, FrameError};
pub use identifiers::PeerId;
