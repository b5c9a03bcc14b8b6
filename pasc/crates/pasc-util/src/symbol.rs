//! String interning.
//!
//! All identifiers, string literals, and generated names are interned into a
//! global table and handled as [`Symbol`] values. Interned strings are leaked
//! to obtain `'static` references; the table lives for the whole process and
//! entries are never removed, so this is a fixed cost per distinct string.

use std::fmt;
use std::sync::{LazyLock, RwLock};

use ahash::RandomState;
use dashmap::DashMap;

/// An interned string.
///
/// Two symbols are equal iff their underlying strings are equal, which makes
/// symbol comparison an integer comparison. The compiler interns identifiers
/// in lowercased form (the canonical form of a case-insensitive language), so
/// `Begin`, `BEGIN`, and `begin` intern to the same symbol.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

static TABLE: LazyLock<StringTable> = LazyLock::new(StringTable::new);

/// Global string table.
///
/// `indices` maps an interned string to its symbol index; `strings` is the
/// reverse mapping. Strings are stored exactly once, leaked into `'static`.
struct StringTable {
    indices: DashMap<&'static str, u32, RandomState>,
    strings: RwLock<Vec<&'static str>>,
}

impl StringTable {
    fn new() -> Self {
        Self {
            indices: DashMap::with_hasher(RandomState::new()),
            strings: RwLock::new(Vec::new()),
        }
    }

    fn intern(&self, string: &str) -> u32 {
        if let Some(index) = self.indices.get(string) {
            return *index;
        }

        let mut strings = self.strings.write().expect("interner poisoned");
        // Re-check under the write lock: another thread may have interned
        // the same string between the lookup above and acquiring the lock.
        if let Some(index) = self.indices.get(string) {
            return *index;
        }

        let leaked: &'static str = Box::leak(string.to_owned().into_boxed_str());
        let index = strings.len() as u32;
        strings.push(leaked);
        self.indices.insert(leaked, index);
        index
    }

    fn get(&self, index: u32) -> &'static str {
        self.strings.read().expect("interner poisoned")[index as usize]
    }
}

impl Symbol {
    /// Interns a string and returns its symbol.
    pub fn intern(string: &str) -> Self {
        Symbol(TABLE.intern(string))
    }

    /// Interns the lowercased form of a string.
    ///
    /// This is the canonicalization applied to every identifier and keyword
    /// lexeme of the (case-insensitive) source language.
    pub fn intern_lower(string: &str) -> Self {
        if string.chars().all(|c| !c.is_ascii_uppercase()) {
            return Self::intern(string);
        }
        Self::intern(&string.to_ascii_lowercase())
    }

    /// Returns the interned string.
    pub fn as_str(self) -> &'static str {
        TABLE.get(self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedup() {
        let a = Symbol::intern("contador");
        let b = Symbol::intern("contador");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "contador");
    }

    #[test]
    fn test_distinct_strings_distinct_symbols() {
        assert_ne!(Symbol::intern("x"), Symbol::intern("y"));
    }

    #[test]
    fn test_intern_lower_canonicalizes() {
        let a = Symbol::intern_lower("Begin");
        let b = Symbol::intern_lower("BEGIN");
        let c = Symbol::intern("begin");
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_intern_lower_ascii_only_fast_path() {
        assert_eq!(Symbol::intern_lower("soma_1"), Symbol::intern("soma_1"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Symbol::intern("writeln").to_string(), "writeln");
    }
}
