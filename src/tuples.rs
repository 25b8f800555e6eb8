//! Tuple specialization utilities.
//!
//! Tuple classes carry two views of their element types: the structural
//! ordered list (`tuple_type_args`) used for indexing and unpacking, and a
//! flattened union stored as the single regular type argument, used
//! wherever the class behaves like its `Sequence` ancestors.

use crate::db::TypeDatabase;
use crate::equality::{is_class_instance, is_tuple_class, is_variadic_type_var};
use crate::types::*;
use crate::utils::with_class_shape;

/// The structural element list of a tuple class, if `ty` is one.
pub fn tuple_type_args(db: &dyn TypeDatabase, ty: TypeId) -> Option<Vec<TupleTypeArg>> {
    match db.type_data(ty).kind {
        TypeKind::Class(class_id) => {
            let shape = db.class_shape(class_id);
            if !db.class_def(shape.def).is_tuple_class() {
                return None;
            }
            shape.tuple_type_args.clone()
        }
        _ => None,
    }
}

/// True when the element list has a single unbounded entry and nothing
/// else (`tuple[int, ...]`).
pub fn is_unbounded_tuple(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    match tuple_type_args(db, ty) {
        Some(entries) => entries.len() == 1 && entries[0].is_unbounded,
        None => false,
    }
}

/// Produce the tuple class with the given structural element list and a
/// refreshed flattened-union view.
///
/// Unpacked variadic type variables among the entries appear in the union
/// view as in-union variadic markers, so later substitution can unpack
/// them in place.
pub fn specialize_tuple_class(
    db: &dyn TypeDatabase,
    class_ty: TypeId,
    entries: Vec<TupleTypeArg>,
) -> TypeId {
    let class_id = match db.type_data(class_ty).kind {
        TypeKind::Class(class_id) => class_id,
        _ => return class_ty,
    };
    let shape = db.class_shape(class_id);

    let mut union_members: Vec<TypeId> = Vec::with_capacity(entries.len());
    for entry in &entries {
        let member = match db.type_data(entry.ty).kind {
            TypeKind::TypeVar(tv) => {
                let tv_shape = db.type_var_shape(tv);
                if tv_shape.kind == TypeVarKind::Variadic && !tv_shape.is_variadic_in_union {
                    let mut marked = (*tv_shape).clone();
                    marked.is_variadic_in_union = true;
                    let mut data = db.type_data(entry.ty);
                    data.kind = TypeKind::TypeVar(db.intern_type_var_shape(marked));
                    db.intern_type(data)
                } else {
                    entry.ty
                }
            }
            _ => entry.ty,
        };
        union_members.push(member);
    }
    let union_view = db.union(union_members);

    let new_shape = ClassShape {
        def: shape.def,
        type_args: Some(vec![union_view]),
        tuple_type_args: Some(entries),
        is_unpacked: shape.is_unpacked,
        literal: shape.literal.clone(),
    };
    with_class_shape(db, class_ty, new_shape)
}

/// Mark or unmark a tuple class as unpacked (`*tuple[int, str]`).
pub fn clone_tuple_with_unpacked(db: &dyn TypeDatabase, ty: TypeId, is_unpacked: bool) -> TypeId {
    let class_id = match db.type_data(ty).kind {
        TypeKind::Class(class_id) => class_id,
        _ => return ty,
    };
    let shape = db.class_shape(class_id);
    if shape.is_unpacked == is_unpacked {
        return ty;
    }
    let mut new_shape = (*shape).clone();
    new_shape.is_unpacked = is_unpacked;
    with_class_shape(db, ty, new_shape)
}

/// If a union contains only fixed-length tuples of the same arity, fuse
/// them into a single tuple whose i-th element is the union of the i-th
/// elements. Otherwise return the type unchanged.
pub fn combine_same_sized_tuples(db: &dyn TypeDatabase, ty: TypeId) -> TypeId {
    let members = match db.type_data(ty).kind {
        TypeKind::Union { members, .. } => db.type_list(members),
        _ => return ty,
    };

    let mut arity: Option<usize> = None;
    let mut element_lists: Vec<Vec<TupleTypeArg>> = Vec::with_capacity(members.len());
    for &member in members.iter() {
        if !is_class_instance(db, member) || !is_tuple_class(db, member) {
            return ty;
        }
        let entries = match tuple_type_args(db, member) {
            Some(entries) => entries,
            None => return ty,
        };
        let fixed_length = entries
            .iter()
            .all(|entry| !entry.is_unbounded && !is_variadic_type_var(db, entry.ty));
        if !fixed_length {
            return ty;
        }
        match arity {
            None => arity = Some(entries.len()),
            Some(n) if n == entries.len() => {}
            Some(_) => return ty,
        }
        element_lists.push(entries);
    }

    let arity = match arity {
        Some(n) => n,
        None => return ty,
    };

    let fused: Vec<TupleTypeArg> = (0..arity)
        .map(|i| {
            let elements: Vec<TypeId> = element_lists.iter().map(|list| list[i].ty).collect();
            TupleTypeArg::fixed(db.union(elements))
        })
        .collect();

    specialize_tuple_class(db, members[0], fused)
}

#[cfg(test)]
#[path = "tests/tuples_tests.rs"]
mod tests;
