//! Kind predicates and structural equality.
//!
//! `is_type_same` is the equivalence relation used everywhere in the
//! algebra. Interning makes identical handles structurally identical, so
//! the common case is an O(1) comparison; the full walk only runs when the
//! handles differ and the options relax the comparison.

use crate::db::TypeDatabase;
use crate::types::*;

// =========================================================================
// Kind predicates
// =========================================================================

pub fn is_any_or_unknown(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    matches!(
        db.type_data(ty).kind,
        TypeKind::Any | TypeKind::Unknown
    )
}

pub fn is_unknown(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    matches!(db.type_data(ty).kind, TypeKind::Unknown)
}

pub fn is_never(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    matches!(db.type_data(ty).kind, TypeKind::Never)
}

pub fn is_none_type(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    matches!(db.type_data(ty).kind, TypeKind::None)
}

pub fn is_class(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    matches!(db.type_data(ty).kind, TypeKind::Class(_))
}

/// A class in instance form (an object of the class).
pub fn is_class_instance(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    let data = db.type_data(ty);
    matches!(data.kind, TypeKind::Class(_)) && data.is_instance()
}

/// A class in instantiable form (the class object itself).
pub fn is_instantiable_class(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    let data = db.type_data(ty);
    matches!(data.kind, TypeKind::Class(_)) && data.is_instantiable()
}

pub fn is_function(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    matches!(db.type_data(ty).kind, TypeKind::Function(_))
}

pub fn is_overloaded(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    matches!(db.type_data(ty).kind, TypeKind::Overloaded(_))
}

pub fn is_union(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    matches!(db.type_data(ty).kind, TypeKind::Union { .. })
}

pub fn is_module(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    matches!(db.type_data(ty).kind, TypeKind::Module(_))
}

pub fn is_type_var(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    matches!(db.type_data(ty).kind, TypeKind::TypeVar(_))
}

/// A plain type variable: not a parameter specification, not variadic.
pub fn is_plain_type_var(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    match db.type_data(ty).kind {
        TypeKind::TypeVar(tv) => db.type_var_shape(tv).kind == TypeVarKind::Plain,
        _ => false,
    }
}

pub fn is_param_spec(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    match db.type_data(ty).kind {
        TypeKind::TypeVar(tv) => db.type_var_shape(tv).kind == TypeVarKind::ParamSpec,
        _ => false,
    }
}

pub fn is_variadic_type_var(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    match db.type_data(ty).kind {
        TypeKind::TypeVar(tv) => db.type_var_shape(tv).kind == TypeVarKind::Variadic,
        _ => false,
    }
}

pub fn is_tuple_class(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    match db.type_data(ty).kind {
        TypeKind::Class(class_id) => {
            let shape = db.class_shape(class_id);
            db.class_def(shape.def).is_tuple_class()
        }
        _ => false,
    }
}

/// An unpacked tuple instance (`*tuple[int, str]`).
pub fn is_unpacked_tuple(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    match db.type_data(ty).kind {
        TypeKind::Class(class_id) => {
            let shape = db.class_shape(class_id);
            shape.is_unpacked && db.class_def(shape.def).is_tuple_class()
        }
        _ => false,
    }
}

/// A literal class instance (`Literal[3]`).
pub fn is_literal_type(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    match db.type_data(ty).kind {
        TypeKind::Class(class_id) => db.class_shape(class_id).literal.is_some(),
        _ => false,
    }
}

/// True if the type is or contains a literal class instance at the top
/// level of a union.
pub fn contains_literal_type(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    match db.type_data(ty).kind {
        TypeKind::Class(class_id) => db.class_shape(class_id).literal.is_some(),
        TypeKind::Union { members, .. } => db
            .type_list(members)
            .iter()
            .any(|&member| is_literal_type(db, member)),
        _ => false,
    }
}

// =========================================================================
// Structural equality
// =========================================================================

#[derive(Clone, Copy, Debug, Default)]
pub struct TypeSameOptions {
    /// Treat two specializations of a pseudo-generic class as the same.
    pub ignore_pseudo_generic: bool,
    /// Compare only structure, not instance/instantiable form.
    pub ignore_type_flags: bool,
}

/// Structural equality modulo the configured options.
pub fn is_type_same(db: &dyn TypeDatabase, a: TypeId, b: TypeId, options: TypeSameOptions) -> bool {
    is_type_same_inner(db, a, b, options, 0)
}

fn is_type_same_inner(
    db: &dyn TypeDatabase,
    a: TypeId,
    b: TypeId,
    options: TypeSameOptions,
    depth: u32,
) -> bool {
    if a == b {
        return true;
    }
    if depth > MAX_TYPE_RECURSION_DEPTH {
        return true;
    }
    let depth = depth + 1;

    let data_a = db.type_data(a);
    let data_b = db.type_data(b);

    if !options.ignore_type_flags && data_a.flags != data_b.flags {
        return false;
    }

    match (&data_a.kind, &data_b.kind) {
        (TypeKind::Unbound, TypeKind::Unbound)
        | (TypeKind::Unknown, TypeKind::Unknown)
        | (TypeKind::Any, TypeKind::Any)
        | (TypeKind::None, TypeKind::None)
        | (TypeKind::Never, TypeKind::Never) => true,

        (TypeKind::Class(class_a), TypeKind::Class(class_b)) => {
            class_same(db, *class_a, *class_b, options, depth)
        }

        (TypeKind::Function(fn_a), TypeKind::Function(fn_b)) => {
            function_same(db, *fn_a, *fn_b, options, depth)
        }

        (TypeKind::Overloaded(list_a), TypeKind::Overloaded(list_b)) => {
            let overloads_a = db.type_list(*list_a);
            let overloads_b = db.type_list(*list_b);
            overloads_a.len() == overloads_b.len()
                && overloads_a
                    .iter()
                    .zip(overloads_b.iter())
                    .all(|(&oa, &ob)| is_type_same_inner(db, oa, ob, options, depth))
        }

        (TypeKind::Module(module_a), TypeKind::Module(module_b)) => {
            db.module_shape(*module_a).name == db.module_shape(*module_b).name
        }

        (
            TypeKind::Union {
                members: members_a, ..
            },
            TypeKind::Union {
                members: members_b, ..
            },
        ) => union_same(db, *members_a, *members_b, options, depth),

        (TypeKind::TypeVar(tv_a), TypeKind::TypeVar(tv_b)) => {
            db.type_var_shape(*tv_a) == db.type_var_shape(*tv_b)
        }

        _ => false,
    }
}

fn class_same(
    db: &dyn TypeDatabase,
    a: ClassId,
    b: ClassId,
    options: TypeSameOptions,
    depth: u32,
) -> bool {
    let shape_a = db.class_shape(a);
    let shape_b = db.class_shape(b);

    if shape_a.def != shape_b.def {
        return false;
    }
    if options.ignore_pseudo_generic
        && db
            .class_def(shape_a.def)
            .flags
            .contains(crate::def::ClassDefFlags::PSEUDO_GENERIC)
    {
        return true;
    }
    if shape_a.literal != shape_b.literal || shape_a.is_unpacked != shape_b.is_unpacked {
        return false;
    }

    match (&shape_a.type_args, &shape_b.type_args) {
        (None, None) => {}
        (Some(args_a), Some(args_b)) => {
            if args_a.len() != args_b.len() {
                return false;
            }
            for (&arg_a, &arg_b) in args_a.iter().zip(args_b.iter()) {
                if !is_type_same_inner(db, arg_a, arg_b, options, depth) {
                    return false;
                }
            }
        }
        _ => return false,
    }

    match (&shape_a.tuple_type_args, &shape_b.tuple_type_args) {
        (None, None) => true,
        (Some(tuple_a), Some(tuple_b)) => {
            tuple_a.len() == tuple_b.len()
                && tuple_a.iter().zip(tuple_b.iter()).all(|(ea, eb)| {
                    ea.is_unbounded == eb.is_unbounded
                        && is_type_same_inner(db, ea.ty, eb.ty, options, depth)
                })
        }
        _ => false,
    }
}

/// Index of the position-only boundary: parameters before the last unnamed
/// `/` separator are purely positional, so their names are not compared.
fn position_only_boundary(params: &[FunctionParam]) -> usize {
    params
        .iter()
        .rposition(|p| p.is_position_only_separator())
        .map(|i| i + 1)
        .unwrap_or(0)
}

fn function_same(
    db: &dyn TypeDatabase,
    a: FunctionId,
    b: FunctionId,
    options: TypeSameOptions,
    depth: u32,
) -> bool {
    let shape_a = db.function_shape(a);
    let shape_b = db.function_shape(b);

    if shape_a.params.len() != shape_b.params.len() {
        return false;
    }

    let boundary_a = position_only_boundary(&shape_a.params);
    let boundary_b = position_only_boundary(&shape_b.params);

    for (i, (param_a, param_b)) in shape_a.params.iter().zip(shape_b.params.iter()).enumerate() {
        if param_a.category != param_b.category {
            return false;
        }
        let positional = i < boundary_a && i < boundary_b;
        if !positional && param_a.name != param_b.name {
            return false;
        }
        if param_a.has_default != param_b.has_default {
            return false;
        }
        let ty_a = shape_a.effective_param_type(i);
        let ty_b = shape_b.effective_param_type(i);
        if !is_type_same_inner(db, ty_a, ty_b, options, depth) {
            return false;
        }
    }

    match (shape_a.effective_return_type(), shape_b.effective_return_type()) {
        (None, None) => {}
        (Some(ret_a), Some(ret_b)) => {
            if !is_type_same_inner(db, ret_a, ret_b, options, depth) {
                return false;
            }
        }
        _ => return false,
    }

    // Parameter-spec tails compare by identity of the variable.
    match (shape_a.param_spec, shape_b.param_spec) {
        (None, None) => true,
        (Some(ps_a), Some(ps_b)) => {
            let key_a = type_var_key(db, ps_a);
            let key_b = type_var_key(db, ps_b);
            key_a.is_some() && key_a == key_b
        }
        _ => false,
    }
}

fn union_same(
    db: &dyn TypeDatabase,
    a: TypeListId,
    b: TypeListId,
    options: TypeSameOptions,
    depth: u32,
) -> bool {
    if a == b {
        return true;
    }
    let members_a = db.type_list(a);
    let members_b = db.type_list(b);
    if members_a.len() != members_b.len() {
        return false;
    }

    // Order-insensitive set comparison.
    let mut used = vec![false; members_b.len()];
    for &member_a in members_a.iter() {
        let mut found = false;
        for (i, &member_b) in members_b.iter().enumerate() {
            if !used[i] && is_type_same_inner(db, member_a, member_b, options, depth) {
                used[i] = true;
                found = true;
                break;
            }
        }
        if !found {
            return false;
        }
    }
    true
}

/// The identity key of a TypeVar-kind type, if it is one.
pub fn type_var_key(db: &dyn TypeDatabase, ty: TypeId) -> Option<TypeVarKey> {
    match db.type_data(ty).kind {
        TypeKind::TypeVar(tv) => Some(db.type_var_shape(tv).key()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/equality_tests.rs"]
mod tests;
