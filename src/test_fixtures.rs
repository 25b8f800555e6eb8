//! Shared class hierarchy fixtures for unit tests.

use crate::db::TypeDatabase;
use crate::def::{ClassDef, ClassDefFlags, ClassDefId, SymbolTable};
use crate::intern::TypeInterner;
use crate::interner::Atom;
use crate::tuples::specialize_tuple_class;
use crate::types::*;
use std::cell::Cell;

pub(crate) struct Fixture {
    pub db: TypeInterner,
    next_scope: Cell<u32>,

    pub object_def: ClassDefId,
    /// `builtins.object` in instantiable form.
    pub object: TypeId,
    pub type_def: ClassDefId,
    pub type_class: TypeId,
    pub generic_class: TypeId,

    pub int_def: ClassDefId,
    pub int: TypeId,
    pub str_def: ClassDefId,
    pub str_: TypeId,
    pub bool_def: ClassDefId,
    pub bool_: TypeId,

    pub tuple_def: ClassDefId,
    pub list_def: ClassDefId,
    pub list_t: TypeId,
    pub dict_def: ClassDefId,
    pub dict_k: TypeId,
    pub dict_v: TypeId,
}

impl Fixture {
    pub fn new() -> Self {
        let db = TypeInterner::new();
        let next_scope = Cell::new(1u32);

        let alloc_scope = || {
            let id = next_scope.get();
            next_scope.set(id + 1);
            TypeVarScopeId(id)
        };

        // builtins.object
        let object_def = {
            let def = class_def(&db, "builtins", "object", alloc_scope());
            db.register_class(def)
        };
        let object = db.instantiable_class(object_def, None);

        // builtins.type
        let type_def = {
            let mut def = class_def(&db, "builtins", "type", alloc_scope());
            def.flags |= ClassDefFlags::SPECIAL_BUILTIN;
            def.base_classes = vec![object];
            db.register_class(def)
        };
        let type_class = db.instantiable_class(type_def, None);

        // typing.Generic
        let generic_def = {
            let mut def = class_def(&db, "typing", "Generic", alloc_scope());
            def.flags |= ClassDefFlags::SPECIAL_BUILTIN;
            def.base_classes = vec![object];
            db.register_class(def)
        };
        let generic_class = db.instantiable_class(generic_def, None);

        let int_def = db.register_class({
            let mut def = class_def(&db, "builtins", "int", alloc_scope());
            def.base_classes = vec![object];
            def
        });
        let int = db.class_instance(int_def, None);

        let str_def = db.register_class({
            let mut def = class_def(&db, "builtins", "str", alloc_scope());
            def.base_classes = vec![object];
            def
        });
        let str_ = db.class_instance(str_def, None);

        let bool_def = db.register_class({
            let mut def = class_def(&db, "builtins", "bool", alloc_scope());
            def.base_classes = vec![db.instantiable_class(int_def, None)];
            def
        });
        let bool_ = db.class_instance(bool_def, None);

        // builtins.tuple
        let tuple_scope = alloc_scope();
        let tuple_t = plain_var(&db, "_T_co", tuple_scope, Variance::Covariant);
        let tuple_def = db.register_class({
            let mut def = class_def(&db, "builtins", "tuple", tuple_scope);
            def.flags |= ClassDefFlags::TUPLE_CLASS;
            def.type_params = vec![tuple_t];
            def.base_classes = vec![object];
            def
        });

        // builtins.list
        let list_scope = alloc_scope();
        let list_t = plain_var(&db, "_T", list_scope, Variance::Invariant);
        let list_def = db.register_class({
            let mut def = class_def(&db, "builtins", "list", list_scope);
            def.type_params = vec![list_t];
            def.base_classes = vec![object];
            def
        });

        // builtins.dict
        let dict_scope = alloc_scope();
        let dict_k = plain_var(&db, "_KT", dict_scope, Variance::Invariant);
        let dict_v = plain_var(&db, "_VT", dict_scope, Variance::Invariant);
        let dict_def = db.register_class({
            let mut def = class_def(&db, "builtins", "dict", dict_scope);
            def.type_params = vec![dict_k, dict_v];
            def.base_classes = vec![object];
            def
        });

        Fixture {
            db,
            next_scope,
            object_def,
            object,
            type_def,
            type_class,
            generic_class,
            int_def,
            int,
            str_def,
            str_,
            bool_def,
            bool_,
            tuple_def,
            list_def,
            list_t,
            dict_def,
            dict_k,
            dict_v,
        }
    }

    pub fn new_scope(&self) -> TypeVarScopeId {
        let id = self.next_scope.get();
        self.next_scope.set(id + 1);
        TypeVarScopeId(id)
    }

    pub fn atom(&self, s: &str) -> Atom {
        self.db.intern_string(s)
    }

    /// Register a user class; bases are instantiable class types.
    pub fn register_class(
        &self,
        name: &str,
        type_params: Vec<TypeId>,
        base_classes: Vec<TypeId>,
        scope: TypeVarScopeId,
    ) -> (ClassDefId, TypeId) {
        let mut def = class_def(&self.db, "test", name, scope);
        def.type_params = type_params;
        def.base_classes = base_classes;
        let def_id = self.db.register_class(def);
        (def_id, self.db.instantiable_class(def_id, None))
    }

    pub fn plain_var(&self, name: &str, scope: TypeVarScopeId) -> TypeId {
        plain_var(&self.db, name, scope, Variance::Invariant)
    }

    pub fn variadic_var(&self, name: &str, scope: TypeVarScopeId) -> TypeId {
        let mut shape = TypeVarShape::variadic(self.db.intern_string(name), Some(scope));
        shape.is_variadic_unpacked = true;
        self.db.type_var(shape)
    }

    pub fn param_spec_var(&self, name: &str, scope: TypeVarScopeId) -> TypeId {
        self.db
            .type_var(TypeVarShape::param_spec(self.db.intern_string(name), Some(scope)))
    }

    /// `P.args` / `P.kwargs` access forms of a parameter specification.
    pub fn param_spec_access(&self, param_spec: TypeId, access: ParamSpecAccess) -> TypeId {
        let mut data = self.db.type_data(param_spec);
        let tv = match data.kind {
            TypeKind::TypeVar(tv) => tv,
            _ => panic!("expected a TypeVar type"),
        };
        let mut shape = (*self.db.type_var_shape(tv)).clone();
        shape.access = Some(access);
        data.kind = TypeKind::TypeVar(self.db.intern_type_var_shape(shape));
        self.db.intern_type(data)
    }

    pub fn list_of(&self, element: TypeId) -> TypeId {
        self.db.class_instance(self.list_def, Some(vec![element]))
    }

    pub fn dict_of(&self, key: TypeId, value: TypeId) -> TypeId {
        self.db.class_instance(self.dict_def, Some(vec![key, value]))
    }

    pub fn tuple_of(&self, elements: &[TypeId]) -> TypeId {
        let base = self.db.class_instance(self.tuple_def, None);
        let entries = elements.iter().map(|&ty| TupleTypeArg::fixed(ty)).collect();
        specialize_tuple_class(&self.db, base, entries)
    }

    /// A positional callable `(p0, p1, ...) -> ret`.
    pub fn callable(&self, params: &[TypeId], ret: TypeId) -> TypeId {
        let shape_params: Vec<FunctionParam> = params
            .iter()
            .enumerate()
            .map(|(i, &ty)| FunctionParam::simple(self.atom(&format!("p{i}")), ty))
            .collect();
        self.db.function(FunctionShape::new(
            self.atom("f"),
            shape_params,
            Some(ret),
        ))
    }

    pub fn set_fields(&self, def_id: ClassDefId, fields: Vec<(&str, Symbol)>) {
        let mut table = SymbolTable::default();
        for (name, symbol) in fields {
            table.insert(self.atom(name), symbol);
        }
        self.db.set_class_fields(def_id, table);
    }
}

fn class_def(db: &TypeInterner, module: &str, name: &str, scope: TypeVarScopeId) -> ClassDef {
    let module_name = db.intern_string(module);
    let short_name = db.intern_string(name);
    let full_name = db.intern_string(&format!("{module}.{name}"));
    ClassDef::new(module_name, short_name, full_name, scope)
}

fn plain_var(db: &TypeInterner, name: &str, scope: TypeVarScopeId, variance: Variance) -> TypeId {
    let mut shape = TypeVarShape::plain(db.intern_string(name), Some(scope));
    shape.variance = variance;
    db.type_var(shape)
}
