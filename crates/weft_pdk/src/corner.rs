//! Process corners.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A generic corner: the typical, fast or slow variant of a device or process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Corner {
    /// Typical.
    Typ,
    /// Fast.
    Fast,
    /// Slow.
    Slow,
}

/// The kinds of content a PDK varies by corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CornerType {
    /// A single transistor flavor.
    Mos,
    /// An NMOS/PMOS pair.
    Cmos,
    /// Resistors.
    Res,
    /// Capacitors.
    Cap,
}

/// Per-device corners of a CMOS pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CmosCornerPair {
    /// NMOS corner.
    pub nmos: Corner,
    /// PMOS corner.
    pub pmos: Corner,
}

/// A CMOS corner, named NMOS first: `Fs` is fast NMOS with slow PMOS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CmosCorner {
    /// Typical/typical.
    Tt,
    /// Fast/fast.
    Ff,
    /// Slow/slow.
    Ss,
    /// Fast NMOS, slow PMOS.
    Fs,
    /// Slow NMOS, fast PMOS.
    Sf,
}

impl CmosCorner {
    /// All CMOS corners.
    pub const ALL: [CmosCorner; 5] = [
        CmosCorner::Tt,
        CmosCorner::Ff,
        CmosCorner::Ss,
        CmosCorner::Fs,
        CmosCorner::Sf,
    ];

    /// The per-device corners.
    pub fn pair(self) -> CmosCornerPair {
        let (nmos, pmos) = match self {
            CmosCorner::Tt => (Corner::Typ, Corner::Typ),
            CmosCorner::Ff => (Corner::Fast, Corner::Fast),
            CmosCorner::Ss => (Corner::Slow, Corner::Slow),
            CmosCorner::Fs => (Corner::Fast, Corner::Slow),
            CmosCorner::Sf => (Corner::Slow, Corner::Fast),
        };
        CmosCornerPair { nmos, pmos }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Corner::Typ => "TYP",
            Corner::Fast => "FAST",
            Corner::Slow => "SLOW",
        })
    }
}

impl fmt::Display for CmosCorner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CmosCorner::Tt => "TT",
            CmosCorner::Ff => "FF",
            CmosCorner::Ss => "SS",
            CmosCorner::Fs => "FS",
            CmosCorner::Sf => "SF",
        })
    }
}
