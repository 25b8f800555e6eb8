//! String interning for identifiers, member names, and qualified names.
//!
//! Names are represented as lightweight `Atom` handles. Equality is O(1),
//! and the same spelling always resolves to the same atom.

use rustc_hash::FxHashMap;
use std::sync::{Arc, RwLock};

/// A lightweight handle to an interned string.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Atom(pub u32);

impl Atom {
    /// The empty string.
    pub const NONE: Atom = Atom(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

struct StringTable {
    strings: Vec<Arc<str>>,
    map: FxHashMap<Arc<str>, u32>,
}

/// Thread-safe string interner.
///
/// Writers take the lock only on a miss; resolving an existing atom is a
/// read-lock plus an index.
pub struct StringInterner {
    table: RwLock<StringTable>,
}

impl StringInterner {
    pub fn new() -> Self {
        let empty: Arc<str> = Arc::from("");
        let mut map = FxHashMap::default();
        map.insert(empty.clone(), 0);
        StringInterner {
            table: RwLock::new(StringTable {
                strings: vec![empty],
                map,
            }),
        }
    }

    pub fn intern(&self, s: &str) -> Atom {
        if s.is_empty() {
            return Atom::NONE;
        }

        {
            let table = self.table.read().expect("string table lock poisoned");
            if let Some(&id) = table.map.get(s) {
                return Atom(id);
            }
        }

        let mut table = self.table.write().expect("string table lock poisoned");
        if let Some(&id) = table.map.get(s) {
            return Atom(id);
        }
        let arc: Arc<str> = Arc::from(s);
        let id = table.strings.len() as u32;
        table.strings.push(arc.clone());
        table.map.insert(arc, id);
        Atom(id)
    }

    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        let table = self.table.read().expect("string table lock poisoned");
        table
            .strings
            .get(atom.0 as usize)
            .cloned()
            .unwrap_or_else(|| table.strings[0].clone())
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
