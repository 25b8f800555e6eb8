//! Class definition identifiers and storage.
//!
//! A `ClassDefId` identifies the shared declaration of a class: its name,
//! declared type parameters, base classes, and field table. Every
//! specialization of the class points at the same definition, which is what
//! makes "same generic class" an O(1) comparison.
//!
//! The method resolution order is stored here too, in a write-once slot per
//! definition: it is computed exactly once and shared by all
//! specializations.

use crate::interner::Atom;
use crate::types::{Symbol, TypeId, TypeVarScopeId};
use dashmap::DashMap;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Stable identity of a class declaration. This is the `sameGenericClass`
/// key: two class types denote the same generic class iff their
/// `ClassDefId`s are equal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ClassDefId(pub u32);

impl ClassDefId {
    /// Sentinel value for an invalid definition.
    pub const INVALID: ClassDefId = ClassDefId(0);

    /// First valid definition id.
    pub const FIRST_VALID: u32 = 1;

    pub fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }
}

/// Member tables preserve declaration order for deterministic iteration.
pub type SymbolTable = IndexMap<Atom, Symbol, FxBuildHasher>;

bitflags::bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct ClassDefFlags: u32 {
        /// Structural membership (protocol) class.
        const PROTOCOL = 1 << 0;
        /// TypedDict class.
        const TYPED_DICT = 1 << 1;
        /// Data class (field declarations synthesize an `__init__`).
        const DATA_CLASS = 1 << 2;
        /// Untyped class treated as generic over its constructor
        /// parameters.
        const PSEUDO_GENERIC = 1 << 3;
        /// Special-form builtin (`type`, `tuple`, `Generic`, ...): may
        /// need specialization handling even without declared parameters.
        const SPECIAL_BUILTIN = 1 << 4;
        /// `tuple` and subclasses: carries structural element types.
        const TUPLE_CLASS = 1 << 5;
    }
}

/// Shared declaration details of a class.
#[derive(Clone, Debug)]
pub struct ClassDef {
    pub module_name: Atom,
    pub name: Atom,
    pub full_name: Atom,
    pub flags: ClassDefFlags,
    /// Scope that the class's own type variables belong to.
    pub type_var_scope_id: TypeVarScopeId,
    /// Declared type parameters, in order. Each is a TypeVar type.
    pub type_params: Vec<TypeId>,
    /// Direct base classes, in declaration order.
    pub base_classes: Vec<TypeId>,
    pub fields: SymbolTable,
    pub effective_metaclass: Option<TypeId>,
}

impl ClassDef {
    pub fn new(
        module_name: Atom,
        name: Atom,
        full_name: Atom,
        type_var_scope_id: TypeVarScopeId,
    ) -> Self {
        ClassDef {
            module_name,
            name,
            full_name,
            flags: ClassDefFlags::default(),
            type_var_scope_id,
            type_params: Vec::new(),
            base_classes: Vec::new(),
            fields: SymbolTable::default(),
            effective_metaclass: None,
        }
    }

    pub fn is_protocol(&self) -> bool {
        self.flags.contains(ClassDefFlags::PROTOCOL)
    }

    pub fn is_tuple_class(&self) -> bool {
        self.flags.contains(ClassDefFlags::TUPLE_CLASS)
    }
}

/// Storage for class declarations.
///
/// Definitions are registered once and then read concurrently; the field
/// table and base-class list may be filled in after registration (methods
/// routinely reference their own class), so updates replace the whole
/// `Arc`.
pub struct DefinitionStore {
    defs: DashMap<ClassDefId, Arc<ClassDef>>,
    /// Write-once linearization slot per definition.
    mros: DashMap<ClassDefId, Arc<[TypeId]>>,
    next_id: AtomicU32,
}

impl DefinitionStore {
    pub fn new() -> Self {
        DefinitionStore {
            defs: DashMap::new(),
            mros: DashMap::new(),
            next_id: AtomicU32::new(ClassDefId::FIRST_VALID),
        }
    }

    pub fn register(&self, def: ClassDef) -> ClassDefId {
        let id = ClassDefId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.defs.insert(id, Arc::new(def));
        id
    }

    pub fn get(&self, id: ClassDefId) -> Arc<ClassDef> {
        self.defs
            .get(&id)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| {
                Arc::new(ClassDef::new(
                    Atom::NONE,
                    Atom::NONE,
                    Atom::NONE,
                    TypeVarScopeId(0),
                ))
            })
    }

    pub fn update_fields(&self, id: ClassDefId, fields: SymbolTable) {
        if let Some(mut entry) = self.defs.get_mut(&id) {
            let mut def = (**entry.value()).clone();
            def.fields = fields;
            *entry.value_mut() = Arc::new(def);
        }
    }

    pub fn update_base_classes(&self, id: ClassDefId, base_classes: Vec<TypeId>) {
        if let Some(mut entry) = self.defs.get_mut(&id) {
            let mut def = (**entry.value()).clone();
            def.base_classes = base_classes;
            *entry.value_mut() = Arc::new(def);
        }
    }

    pub fn update_type_params(&self, id: ClassDefId, type_params: Vec<TypeId>) {
        if let Some(mut entry) = self.defs.get_mut(&id) {
            let mut def = (**entry.value()).clone();
            def.type_params = type_params;
            *entry.value_mut() = Arc::new(def);
        }
    }

    pub fn mro(&self, id: ClassDefId) -> Option<Arc<[TypeId]>> {
        self.mros.get(&id).map(|entry| entry.value().clone())
    }

    /// First write wins; later writes return the already-published MRO.
    pub fn set_mro(&self, id: ClassDefId, mro: Vec<TypeId>) -> Arc<[TypeId]> {
        self.mros
            .entry(id)
            .or_insert_with(|| Arc::from(mro))
            .value()
            .clone()
    }
}

impl Default for DefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}
