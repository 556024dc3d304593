//! Signals and ports.

use crate::direction::Direction;
use crate::ids::BundleInstId;
use weft_common::Ident;

/// Whether a signal is internal or part of its module's boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// An internal wire.
    Internal,
    /// A boundary port with a direction.
    Port(Direction),
}

/// A wire owned by exactly one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    /// The signal name, unique in its module's namespace.
    pub name: Ident,
    /// Bit width, at least 1.
    pub width: u32,
    /// Internal or port.
    pub kind: SignalKind,
    /// The bundle instance this signal was flattened from, if any.
    pub bundle: Option<BundleInstId>,
}

impl Signal {
    /// Returns the port direction, or `None` for internal signals.
    pub fn direction(&self) -> Option<Direction> {
        match self.kind {
            SignalKind::Port(d) => Some(d),
            SignalKind::Internal => None,
        }
    }

    /// Returns `true` for boundary ports.
    pub fn is_port(&self) -> bool {
        matches!(self.kind, SignalKind::Port(_))
    }
}
