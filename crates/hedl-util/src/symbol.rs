//! String interning, scoped to a single document.
//!
//! Schema names, field names, alias names and root keys are each looked up
//! by name during resolution (the declaration pass hashes every name it
//! sees to detect collisions) and then compared by identity repeatedly
//! during type-checking and canonicalization. Interning turns those
//! comparisons into `u32` equality instead of repeated string hashing.
//!
//! Unlike a compiler's interner, which is a process-wide singleton that
//! leaks every string for the program's lifetime, [`Interner`] is owned by
//! a single [`Document`](../../hedl_model/struct.Document.html) and dropped
//! with it -- a long-lived host process parsing many documents should not
//! accumulate unbounded leaked strings (see DESIGN.md).

use crate::FxHashMap;

/// A compact handle to a string owned by some [`Interner`].
///
/// Two symbols are equal iff they were interned from equal strings by the
/// *same* interner; comparing symbols from different interners is a logic
/// error the type system does not catch (interners are not tagged), so
/// symbols should not outlive or cross the document that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

/// Owns the strings behind every [`Symbol`] handed out for one document.
#[derive(Default)]
pub struct Interner {
    strings: Vec<Box<str>>,
    lookup: FxHashMap<Box<str>, Symbol>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `s`, returning its existing symbol if already interned.
    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&sym) = self.lookup.get(s) {
            return sym;
        }
        let sym = Symbol(self.strings.len() as u32);
        let boxed: Box<str> = s.into();
        self.strings.push(boxed.clone());
        self.lookup.insert(boxed, sym);
        sym
    }

    /// Resolve a symbol back to its string.
    ///
    /// # Panics
    /// Panics if `sym` was not produced by this interner.
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.0 as usize]
    }

    /// Look up `s`'s symbol without interning it, for callers (e.g. a
    /// traversal API's name-based lookup) that only want to know whether a
    /// name is already present.
    pub fn lookup(&self, s: &str) -> Option<Symbol> {
        self.lookup.get(s).copied()
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
