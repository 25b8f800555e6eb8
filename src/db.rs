//! Type database abstraction.
//!
//! This trait isolates algebra logic from concrete storage so a query
//! system can be swapped in without touching core logic. All algorithmic
//! operations take `&dyn TypeDatabase`.

use crate::def::{ClassDef, ClassDefId, SymbolTable};
use crate::intern::TypeInterner;
use crate::interner::Atom;
use crate::types::*;
use smallvec::SmallVec;
use std::sync::Arc;

/// Most unions are small; keep them off the heap while flattening.
type UnionBuffer = SmallVec<[TypeId; 8]>;

/// Query and construction interface for the type algebra.
pub trait TypeDatabase {
    fn intern_type(&self, data: TypeData) -> TypeId;
    fn type_data(&self, id: TypeId) -> TypeData;
    fn intern_string(&self, s: &str) -> Atom;
    fn resolve_atom(&self, atom: Atom) -> Arc<str>;

    fn intern_type_list(&self, items: Vec<TypeId>) -> TypeListId;
    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]>;
    fn intern_tuple_list(&self, items: Vec<TupleTypeArg>) -> TupleListId;
    fn tuple_list(&self, id: TupleListId) -> Arc<[TupleTypeArg]>;

    fn intern_class_shape(&self, shape: ClassShape) -> ClassId;
    fn class_shape(&self, id: ClassId) -> Arc<ClassShape>;
    fn intern_function_shape(&self, shape: FunctionShape) -> FunctionId;
    fn function_shape(&self, id: FunctionId) -> Arc<FunctionShape>;
    fn intern_type_var_shape(&self, shape: TypeVarShape) -> TypeVarId;
    fn type_var_shape(&self, id: TypeVarId) -> Arc<TypeVarShape>;
    fn intern_module_shape(&self, shape: ModuleShape) -> ModuleId;
    fn module_shape(&self, id: ModuleId) -> Arc<ModuleShape>;

    fn register_class(&self, def: ClassDef) -> ClassDefId;
    fn class_def(&self, id: ClassDefId) -> Arc<ClassDef>;
    fn set_class_fields(&self, id: ClassDefId, fields: SymbolTable);
    fn set_base_classes(&self, id: ClassDefId, base_classes: Vec<TypeId>);
    fn set_type_params(&self, id: ClassDefId, type_params: Vec<TypeId>);
    fn class_mro(&self, id: ClassDefId) -> Option<Arc<[TypeId]>>;
    fn set_class_mro(&self, id: ClassDefId, mro: Vec<TypeId>) -> Arc<[TypeId]>;

    fn cached_instance_form(&self, id: TypeId) -> Option<TypeId>;
    fn cache_instance_form(&self, id: TypeId, instance: TypeId);
    fn cached_instantiable_form(&self, id: TypeId) -> Option<TypeId>;
    fn cache_instantiable_form(&self, id: TypeId, instantiable: TypeId);

    // =========================================================================
    // Factories
    // =========================================================================

    /// An instance of a class (`C[int]` as a value's type).
    fn class_instance(&self, def: ClassDefId, type_args: Option<Vec<TypeId>>) -> TypeId {
        let shape = ClassShape {
            def,
            type_args,
            tuple_type_args: None,
            is_unpacked: false,
            literal: None,
        };
        let class_id = self.intern_class_shape(shape);
        self.intern_type(TypeData::new(TypeKind::Class(class_id), TypeFlags::INSTANCE))
    }

    /// The class object itself (`type[C[int]]` positions).
    fn instantiable_class(&self, def: ClassDefId, type_args: Option<Vec<TypeId>>) -> TypeId {
        let shape = ClassShape {
            def,
            type_args,
            tuple_type_args: None,
            is_unpacked: false,
            literal: None,
        };
        let class_id = self.intern_class_shape(shape);
        self.intern_type(TypeData::new(
            TypeKind::Class(class_id),
            TypeFlags::INSTANTIABLE,
        ))
    }

    /// A literal instance (`Literal[3]`) of the given class.
    fn literal_instance(&self, def: ClassDefId, value: LiteralValue) -> TypeId {
        let shape = ClassShape {
            def,
            type_args: None,
            tuple_type_args: None,
            is_unpacked: false,
            literal: Some(value),
        };
        let class_id = self.intern_class_shape(shape);
        self.intern_type(TypeData::new(TypeKind::Class(class_id), TypeFlags::INSTANCE))
    }

    fn class_instance_from_shape(&self, shape: ClassShape) -> TypeId {
        let class_id = self.intern_class_shape(shape);
        self.intern_type(TypeData::new(TypeKind::Class(class_id), TypeFlags::INSTANCE))
    }

    fn function(&self, shape: FunctionShape) -> TypeId {
        let function_id = self.intern_function_shape(shape);
        self.intern_type(TypeData::new(
            TypeKind::Function(function_id),
            TypeFlags::INSTANCE,
        ))
    }

    /// An ordered overload set. Members must be Function-kind types.
    fn overloaded(&self, overloads: Vec<TypeId>) -> TypeId {
        debug_assert!(!overloads.is_empty());
        if overloads.len() == 1 {
            return overloads[0];
        }
        let list = self.intern_type_list(overloads);
        self.intern_type(TypeData::new(
            TypeKind::Overloaded(list),
            TypeFlags::INSTANCE,
        ))
    }

    fn module(&self, name: Atom) -> TypeId {
        let module_id = self.intern_module_shape(ModuleShape { name });
        self.intern_type(TypeData::new(
            TypeKind::Module(module_id),
            TypeFlags::INSTANCE,
        ))
    }

    /// A type variable in instance form.
    fn type_var(&self, shape: TypeVarShape) -> TypeId {
        let type_var_id = self.intern_type_var_shape(shape);
        self.intern_type(TypeData::new(
            TypeKind::TypeVar(type_var_id),
            TypeFlags::INSTANCE,
        ))
    }

    /// A type variable in instantiable form (`type[T]` positions).
    fn instantiable_type_var(&self, shape: TypeVarShape) -> TypeId {
        let type_var_id = self.intern_type_var_shape(shape);
        self.intern_type(TypeData::new(
            TypeKind::TypeVar(type_var_id),
            TypeFlags::INSTANTIABLE,
        ))
    }

    /// Canonical union construction: flattens nested unions, absorbs
    /// `Never`, removes duplicates, and collapses singletons. The empty
    /// union is `Never`.
    fn union(&self, members: Vec<TypeId>) -> TypeId {
        let mut flat: UnionBuffer = UnionBuffer::with_capacity(members.len());
        let mut includes_recursive_alias = false;
        let mut pending = std::collections::VecDeque::from(members);
        while let Some(member) = pending.pop_front() {
            let data = self.type_data(member);
            match data.kind {
                TypeKind::Never => continue,
                TypeKind::Union {
                    members: inner,
                    includes_recursive_alias: inner_flag,
                } => {
                    includes_recursive_alias |= inner_flag;
                    // Preserve relative order of the flattened subtypes.
                    for (offset, &inner_member) in self.type_list(inner).iter().enumerate() {
                        pending.insert(offset, inner_member);
                    }
                }
                TypeKind::TypeVar(tv) => {
                    if self.type_var_shape(tv).recursive_alias.is_some() {
                        includes_recursive_alias = true;
                    }
                    if !flat.contains(&member) {
                        flat.push(member);
                    }
                }
                _ => {
                    if !flat.contains(&member) {
                        flat.push(member);
                    }
                }
            }
        }

        match flat.len() {
            0 => TypeId::NEVER,
            1 => flat[0],
            _ => {
                let list = self.intern_type_list(flat.into_vec());
                self.intern_type(TypeData::new(
                    TypeKind::Union {
                        members: list,
                        includes_recursive_alias,
                    },
                    TypeFlags::INSTANCE,
                ))
            }
        }
    }

    /// Two-member convenience union.
    fn union2(&self, left: TypeId, right: TypeId) -> TypeId {
        self.union(vec![left, right])
    }
}

impl TypeDatabase for TypeInterner {
    fn intern_type(&self, data: TypeData) -> TypeId {
        TypeInterner::intern_type(self, data)
    }

    fn type_data(&self, id: TypeId) -> TypeData {
        TypeInterner::type_data(self, id)
    }

    fn intern_string(&self, s: &str) -> Atom {
        TypeInterner::intern_string(self, s)
    }

    fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        TypeInterner::resolve_atom(self, atom)
    }

    fn intern_type_list(&self, items: Vec<TypeId>) -> TypeListId {
        TypeInterner::intern_type_list(self, items)
    }

    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        TypeInterner::type_list(self, id)
    }

    fn intern_tuple_list(&self, items: Vec<TupleTypeArg>) -> TupleListId {
        TypeInterner::intern_tuple_list(self, items)
    }

    fn tuple_list(&self, id: TupleListId) -> Arc<[TupleTypeArg]> {
        TypeInterner::tuple_list(self, id)
    }

    fn intern_class_shape(&self, shape: ClassShape) -> ClassId {
        TypeInterner::intern_class_shape(self, shape)
    }

    fn class_shape(&self, id: ClassId) -> Arc<ClassShape> {
        TypeInterner::class_shape(self, id)
    }

    fn intern_function_shape(&self, shape: FunctionShape) -> FunctionId {
        TypeInterner::intern_function_shape(self, shape)
    }

    fn function_shape(&self, id: FunctionId) -> Arc<FunctionShape> {
        TypeInterner::function_shape(self, id)
    }

    fn intern_type_var_shape(&self, shape: TypeVarShape) -> TypeVarId {
        TypeInterner::intern_type_var_shape(self, shape)
    }

    fn type_var_shape(&self, id: TypeVarId) -> Arc<TypeVarShape> {
        TypeInterner::type_var_shape(self, id)
    }

    fn intern_module_shape(&self, shape: ModuleShape) -> ModuleId {
        TypeInterner::intern_module_shape(self, shape)
    }

    fn module_shape(&self, id: ModuleId) -> Arc<ModuleShape> {
        TypeInterner::module_shape(self, id)
    }

    fn register_class(&self, def: ClassDef) -> ClassDefId {
        TypeInterner::register_class(self, def)
    }

    fn class_def(&self, id: ClassDefId) -> Arc<ClassDef> {
        TypeInterner::class_def(self, id)
    }

    fn set_class_fields(&self, id: ClassDefId, fields: SymbolTable) {
        TypeInterner::set_class_fields(self, id, fields);
    }

    fn set_base_classes(&self, id: ClassDefId, base_classes: Vec<TypeId>) {
        TypeInterner::set_base_classes(self, id, base_classes);
    }

    fn set_type_params(&self, id: ClassDefId, type_params: Vec<TypeId>) {
        TypeInterner::set_type_params(self, id, type_params);
    }

    fn class_mro(&self, id: ClassDefId) -> Option<Arc<[TypeId]>> {
        TypeInterner::class_mro(self, id)
    }

    fn set_class_mro(&self, id: ClassDefId, mro: Vec<TypeId>) -> Arc<[TypeId]> {
        TypeInterner::set_class_mro(self, id, mro)
    }

    fn cached_instance_form(&self, id: TypeId) -> Option<TypeId> {
        TypeInterner::cached_instance_form(self, id)
    }

    fn cache_instance_form(&self, id: TypeId, instance: TypeId) {
        TypeInterner::cache_instance_form(self, id, instance);
    }

    fn cached_instantiable_form(&self, id: TypeId) -> Option<TypeId> {
        TypeInterner::cached_instantiable_form(self, id)
    }

    fn cache_instantiable_form(&self, id: TypeId, instantiable: TypeId) {
        TypeInterner::cache_instantiable_form(self, id, instantiable);
    }
}
