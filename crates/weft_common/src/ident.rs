//! Interned names for modules, signals, ports and instances.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// An interned name.
///
/// Every named entity of a design (modules, signals, ports, instances, bundle
/// members) stores its name as an `Ident`: a `u32` key into the design's
/// [`Interner`]. Comparing and copying names is therefore O(1), and name
/// collisions inside a namespace are detected by integer comparison.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Creates an `Ident` from a raw key.
    ///
    /// Only meaningful for keys previously handed out by an [`Interner`].
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw key of this identifier.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `Ident` is a plain `u32`; `try_from_usize` refuses keys that do not fit.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// String interner owned by a design.
///
/// Backed by [`lasso::ThreadedRodeo`], so a shared reference is enough to
/// intern new names while the rest of the design is borrowed mutably.
pub struct Interner {
    rodeo: ThreadedRodeo<Ident>,
}

impl Interner {
    /// Creates an empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns `s`, returning the existing key when it was seen before.
    pub fn get_or_intern(&self, s: &str) -> Ident {
        self.rodeo.get_or_intern(s)
    }

    /// Looks up `s` without interning it.
    pub fn get(&self, s: &str) -> Option<Ident> {
        self.rodeo.get(s)
    }

    /// Resolves an [`Ident`] back to its text.
    ///
    /// # Panics
    ///
    /// Panics if `ident` was produced by a different interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }

    /// Joins the resolved names of `idents` with `sep`.
    pub fn join(&self, idents: &[Ident], sep: &str) -> String {
        idents
            .iter()
            .map(|id| self.resolve(*id))
            .collect::<Vec<_>>()
            .join(sep)
    }

    /// Number of distinct names interned so far.
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    /// Returns `true` if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Interner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interner").field("len", &self.len()).finish()
    }
}
