//! Member lookup through the method resolution order.
//!
//! Lookup walks the MRO and returns the first matching symbol, with each
//! entry partially specialized against the class being asked about so
//! inherited annotations are seen through the subclass's type arguments.

use crate::db::TypeDatabase;
use crate::def::ClassDefFlags;
use crate::instantiate::partially_specialize_type;
use crate::interner::Atom;
use crate::mro::class_mro;
use crate::types::*;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::sync::Arc;

bitflags::bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct ClassMemberLookupFlags: u32 {
        /// Start the search at the first base class.
        const SKIP_ORIGINAL_CLASS = 1 << 0;
        /// Search only the class itself.
        const SKIP_BASE_CLASSES = 1 << 1;
        /// Ignore the root `object` class.
        const SKIP_OBJECT_BASE_CLASS = 1 << 2;
        /// Ignore instance-only members.
        const SKIP_INSTANCE_VARIABLES = 1 << 3;
        /// Skip symbols without a declared type, remembering that one was
        /// skipped.
        const DECLARED_TYPES_ONLY = 1 << 4;
        /// Ignore the `type` class.
        const SKIP_TYPE_BASE_CLASS = 1 << 5;
    }
}

/// A member found along the MRO.
#[derive(Clone, Debug)]
pub struct ClassMember {
    pub symbol: Symbol,
    /// The (partially specialized) MRO entry providing the member, or
    /// `Any`/`Unknown` for a synthetic member.
    pub class_type: TypeId,
    pub is_instance_member: bool,
    pub is_class_member: bool,
    pub is_class_var: bool,
    pub is_type_declared: bool,
    /// An untyped declaration of the same name was skipped in a more
    /// derived class; the checker can warn about shadowing.
    pub skipped_undeclared_type: bool,
}

/// Lazy MRO-order iterator over the members matching `name`.
pub struct ClassMemberIterator<'a> {
    db: &'a dyn TypeDatabase,
    class_ty: TypeId,
    name: Atom,
    flags: ClassMemberLookupFlags,
    mro: Arc<[TypeId]>,
    index: usize,
    skipped_undeclared: bool,
}

impl<'a> ClassMemberIterator<'a> {
    pub fn new(
        db: &'a dyn TypeDatabase,
        class_ty: TypeId,
        name: Atom,
        flags: ClassMemberLookupFlags,
    ) -> Self {
        let mro = class_mro(db, class_ty).unwrap_or_else(|| Arc::from(Vec::new()));
        ClassMemberIterator {
            db,
            class_ty,
            name,
            flags,
            mro,
            index: 0,
            skipped_undeclared: false,
        }
    }
}

impl Iterator for ClassMemberIterator<'_> {
    type Item = ClassMember;

    fn next(&mut self) -> Option<ClassMember> {
        while self.index < self.mro.len() {
            let entry_index = self.index;
            self.index += 1;
            let entry = self.mro[entry_index];

            if entry_index == 0
                && self
                    .flags
                    .contains(ClassMemberLookupFlags::SKIP_ORIGINAL_CLASS)
            {
                continue;
            }
            if entry_index > 0
                && self
                    .flags
                    .contains(ClassMemberLookupFlags::SKIP_BASE_CLASSES)
            {
                return None;
            }

            let entry_data = self.db.type_data(entry);
            let class_id = match entry_data.kind {
                TypeKind::Class(class_id) => class_id,
                // An unknown ancestor can provide any member; yield a
                // synthetic one so the caller can decide whether to
                // suppress diagnostics.
                TypeKind::Any | TypeKind::Unknown => {
                    return Some(ClassMember {
                        symbol: Symbol::class_member(Some(TypeId::UNKNOWN)),
                        class_type: entry,
                        is_instance_member: false,
                        is_class_member: true,
                        is_class_var: false,
                        is_type_declared: false,
                        skipped_undeclared_type: self.skipped_undeclared,
                    });
                }
                _ => continue,
            };

            let def = self.db.class_def(self.db.class_shape(class_id).def);
            let full_name = self.db.resolve_atom(def.full_name);
            if self
                .flags
                .contains(ClassMemberLookupFlags::SKIP_OBJECT_BASE_CLASS)
                && full_name.as_ref() == "builtins.object"
            {
                continue;
            }
            if self
                .flags
                .contains(ClassMemberLookupFlags::SKIP_TYPE_BASE_CLASS)
                && full_name.as_ref() == "builtins.type"
            {
                continue;
            }

            let symbol = match def.fields.get(&self.name) {
                Some(symbol) => symbol.clone(),
                None => continue,
            };

            let mut is_instance_member = symbol.flags.contains(SymbolFlags::INSTANCE_MEMBER);
            // Data classes and typed dicts bind declared class-body
            // variables per instance.
            if def
                .flags
                .intersects(ClassDefFlags::DATA_CLASS | ClassDefFlags::TYPED_DICT)
                && symbol.has_typed_declarations()
            {
                is_instance_member = true;
            }

            if is_instance_member
                && !symbol.flags.contains(SymbolFlags::CLASS_MEMBER)
                && self
                    .flags
                    .contains(ClassMemberLookupFlags::SKIP_INSTANCE_VARIABLES)
            {
                continue;
            }
            if self
                .flags
                .contains(ClassMemberLookupFlags::DECLARED_TYPES_ONLY)
                && !symbol.has_typed_declarations()
            {
                self.skipped_undeclared = true;
                continue;
            }

            // Inherited annotations are reported through the subclass's
            // type arguments.
            let specialized_entry = partially_specialize_type(self.db, entry, self.class_ty, None);

            return Some(ClassMember {
                is_type_declared: symbol.has_typed_declarations(),
                is_instance_member,
                is_class_member: symbol.flags.contains(SymbolFlags::CLASS_MEMBER),
                is_class_var: symbol.flags.contains(SymbolFlags::CLASS_VAR),
                symbol,
                class_type: specialized_entry,
                skipped_undeclared_type: self.skipped_undeclared,
            });
        }
        None
    }
}

/// The first member matching `name` along the MRO, under the given lookup
/// policy.
pub fn lookup_class_member(
    db: &dyn TypeDatabase,
    class_ty: TypeId,
    name: Atom,
    flags: ClassMemberLookupFlags,
) -> Option<ClassMember> {
    ClassMemberIterator::new(db, class_ty, name, flags).next()
}

/// The declared type of a member, seen through the providing class's type
/// arguments.
pub fn get_type_of_member(db: &dyn TypeDatabase, member: &ClassMember) -> TypeId {
    let declared = match member.symbol.declared_type {
        Some(declared) => declared,
        None => return TypeId::UNKNOWN,
    };
    match db.type_data(member.class_type).kind {
        TypeKind::Class(_) => partially_specialize_type(db, declared, member.class_type, None),
        _ => declared,
    }
}

/// All typed declarations across the MRO, collected in reverse order so a
/// descendant's declaration overrides an ancestor's. Iteration order is
/// deterministic: ancestors first, fields in declaration order.
pub fn get_class_fields_recursive(
    db: &dyn TypeDatabase,
    class_ty: TypeId,
) -> IndexMap<Atom, ClassMember, FxBuildHasher> {
    let mut result: IndexMap<Atom, ClassMember, FxBuildHasher> = IndexMap::default();
    let mro = match class_mro(db, class_ty) {
        Some(mro) => mro,
        None => return result,
    };

    for &entry in mro.iter().rev() {
        let class_id = match db.type_data(entry).kind {
            TypeKind::Class(class_id) => class_id,
            _ => continue,
        };
        let def = db.class_def(db.class_shape(class_id).def);
        let specialized_entry = partially_specialize_type(db, entry, class_ty, None);
        for (&name, symbol) in &def.fields {
            if !symbol.has_typed_declarations() {
                continue;
            }
            let member = ClassMember {
                symbol: symbol.clone(),
                class_type: specialized_entry,
                is_instance_member: symbol.flags.contains(SymbolFlags::INSTANCE_MEMBER),
                is_class_member: symbol.flags.contains(SymbolFlags::CLASS_MEMBER),
                is_class_var: symbol.flags.contains(SymbolFlags::CLASS_VAR),
                is_type_declared: true,
                skipped_undeclared_type: false,
            };
            result.insert(name, member);
        }
    }
    result
}

#[cfg(test)]
#[path = "tests/members_tests.rs"]
mod tests;
