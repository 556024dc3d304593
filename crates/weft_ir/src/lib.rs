//! The Weft hardware-graph data model.
//!
//! This crate defines [`Design`], [`Module`], [`Signal`], [`Instance`],
//! [`Bundle`] and the leaf targets ([`PrimitiveKind`], [`ExternalModule`])
//! shared by elaboration, PDK compilation and export.

#![warn(missing_docs)]

pub mod arena;
pub mod bundle;
pub mod design;
pub mod direction;
pub mod error;
pub mod external;
pub mod ids;
pub mod instance;
pub mod module;
pub mod primitive;
pub mod signal;

pub use arena::{Arena, ArenaId};
pub use bundle::{Bundle, BundleBuilder, BundleInstance, BundleKind, BundleMember, MemberDir};
pub use design::{Design, FlatPort, TargetPort, TargetPortKind};
pub use direction::Direction;
pub use error::IrError;
pub use external::{ExternalModule, PortSpec};
pub use ids::*;
pub use instance::{Connection, ExternalCall, Instance, PrimitiveCall, Target};
pub use module::{Module, PortEntry, Slot};
pub use primitive::PrimitiveKind;
pub use signal::{Signal, SignalKind};
