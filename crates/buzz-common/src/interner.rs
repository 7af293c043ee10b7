//! String interning for identifier and type-string deduplication.
//!
//! Identifiers, string literals, and canonical type strings all go through one
//! [`Interner`]. Interning gives every distinct string a stable [`Atom`] so
//! equality checks and hash lookups are integer comparisons, and the same
//! spelling is stored once no matter how many tokens produce it.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// A handle to an interned string.
///
/// Atoms are only meaningful relative to the [`Interner`] that produced them.
/// `Atom::NONE` is a sentinel for "no string" (e.g. a token with no lexeme).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Atom(pub u32);

impl Atom {
    /// Sentinel for the absence of a string.
    pub const NONE: Atom = Atom(u32::MAX);

    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

/// Interner mapping strings to stable [`Atom`] handles.
///
/// Interior mutability lets the scanner, parser, and type registry share one
/// table behind `&self`. The front end is single-threaded (imports parse as
/// strictly nested recursion), so a `RefCell` is sufficient.
#[derive(Debug, Default)]
pub struct Interner {
    map: RefCell<FxHashMap<Box<str>, Atom>>,
    strings: RefCell<Vec<Box<str>>>,
}

impl Interner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its atom. Repeated calls with the same
    /// contents return the same atom.
    pub fn intern(&self, text: &str) -> Atom {
        if let Some(&atom) = self.map.borrow().get(text) {
            return atom;
        }
        let mut strings = self.strings.borrow_mut();
        let atom = Atom(u32::try_from(strings.len()).expect("interner overflow"));
        strings.push(text.into());
        self.map.borrow_mut().insert(text.into(), atom);
        atom
    }

    /// Resolve an atom back to its string contents.
    ///
    /// # Panics
    ///
    /// Panics if the atom is `Atom::NONE` or was produced by another interner.
    #[must_use]
    pub fn resolve(&self, atom: Atom) -> String {
        self.strings.borrow()[atom.0 as usize].to_string()
    }

    /// Look up a string without interning it.
    #[must_use]
    pub fn get(&self, text: &str) -> Option<Atom> {
        self.map.borrow().get(text).copied()
    }

    /// Number of distinct strings interned so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.borrow().is_empty()
    }
}

#[cfg(test)]
#[path = "../tests/interner.rs"]
mod tests;
