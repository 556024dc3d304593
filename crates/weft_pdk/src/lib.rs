//! Technology mapping for Weft designs.
//!
//! A [`Pdk`] maps technology-independent primitives onto its own external
//! modules. [`compile`] applies such a mapping to a whole module tree,
//! producing a new frozen tree in which every primitive instance has been
//! replaced (or deliberately kept). [`SamplePdk`] is a made-up technology
//! demonstrating the interface.

#![warn(missing_docs)]

pub mod compile;
pub mod corner;
pub mod error;
pub mod pdk;
pub mod sample;

pub use compile::{compile, Compiler};
pub use corner::{CmosCorner, CmosCornerPair, Corner, CornerType};
pub use error::PdkError;
pub use pdk::{pdk_fn, ExternalMapping, FnPdk, Mapping, Pdk};
pub use sample::SamplePdk;
