//! Port directions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The direction of a port on a module boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Driven from outside the module.
    Input,
    /// Driven from inside the module.
    Output,
    /// Bidirectional.
    Inout,
    /// No declared direction.
    Undirected,
}

impl Direction {
    /// Swaps `Input` and `Output`; `Inout` and `Undirected` are unchanged.
    pub fn flip(self) -> Self {
        match self {
            Direction::Input => Direction::Output,
            Direction::Output => Direction::Input,
            other => other,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Input => "input",
            Direction::Output => "output",
            Direction::Inout => "inout",
            Direction::Undirected => "undirected",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_is_an_involution() {
        for d in [
            Direction::Input,
            Direction::Output,
            Direction::Inout,
            Direction::Undirected,
        ] {
            assert_eq!(d.flip().flip(), d);
        }
        assert_eq!(Direction::Input.flip(), Direction::Output);
        assert_eq!(Direction::Inout.flip(), Direction::Inout);
    }
}
