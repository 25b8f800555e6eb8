//! Deterministic total order over types.
//!
//! Used to produce stable outputs (union display, deduplicated member
//! lists) regardless of construction order. The order is documented, not
//! semantic: nothing in the algebra depends on it beyond determinism.

use crate::db::TypeDatabase;
use crate::types::*;
use std::cmp::Ordering;

/// Primary key: tag rank, compared descending.
fn kind_rank(kind: &TypeKind) -> u8 {
    match kind {
        TypeKind::Unbound => 0,
        TypeKind::Unknown => 1,
        TypeKind::Any => 2,
        TypeKind::None => 3,
        TypeKind::Never => 4,
        TypeKind::Function(_) => 5,
        TypeKind::Overloaded(_) => 6,
        TypeKind::Class(_) => 7,
        TypeKind::Module(_) => 8,
        TypeKind::Union { .. } => 9,
        TypeKind::TypeVar(_) => 10,
    }
}

/// Sort types into the canonical order.
pub fn sort_types(db: &dyn TypeDatabase, types: &mut [TypeId]) {
    types.sort_by(|&a, &b| compare_types(db, a, b));
}

pub fn compare_types(db: &dyn TypeDatabase, a: TypeId, b: TypeId) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let data_a = db.type_data(a);
    let data_b = db.type_data(b);

    let rank_order = kind_rank(&data_b.kind).cmp(&kind_rank(&data_a.kind));
    if rank_order != Ordering::Equal {
        return rank_order;
    }

    match (&data_a.kind, &data_b.kind) {
        (TypeKind::Class(class_a), TypeKind::Class(class_b)) => {
            compare_classes(db, &data_a, *class_a, &data_b, *class_b)
        }
        (TypeKind::Function(fn_a), TypeKind::Function(fn_b)) => {
            compare_functions(db, *fn_a, *fn_b)
        }
        (TypeKind::Overloaded(list_a), TypeKind::Overloaded(list_b)) => {
            let overloads_a = db.type_list(*list_a);
            let overloads_b = db.type_list(*list_b);
            overloads_b
                .len()
                .cmp(&overloads_a.len())
                .then_with(|| {
                    for (&oa, &ob) in overloads_a.iter().zip(overloads_b.iter()) {
                        let order = compare_types(db, oa, ob);
                        if order != Ordering::Equal {
                            return order;
                        }
                    }
                    Ordering::Equal
                })
                .then_with(|| a.0.cmp(&b.0))
        }
        (TypeKind::Module(module_a), TypeKind::Module(module_b)) => {
            let name_a = db.resolve_atom(db.module_shape(*module_a).name);
            let name_b = db.resolve_atom(db.module_shape(*module_b).name);
            name_a.cmp(&name_b)
        }
        (TypeKind::TypeVar(tv_a), TypeKind::TypeVar(tv_b)) => {
            let name_a = db.resolve_atom(db.type_var_shape(*tv_a).name);
            let name_b = db.resolve_atom(db.type_var_shape(*tv_b).name);
            name_a.cmp(&name_b).then_with(|| a.0.cmp(&b.0))
        }
        _ => a.0.cmp(&b.0),
    }
}

fn compare_classes(
    db: &dyn TypeDatabase,
    data_a: &TypeData,
    class_a: ClassId,
    data_b: &TypeData,
    class_b: ClassId,
) -> Ordering {
    // Instances before instantiables.
    let instance_a = data_a.flags.contains(TypeFlags::INSTANCE);
    let instance_b = data_b.flags.contains(TypeFlags::INSTANCE);
    if instance_a != instance_b {
        return if instance_a {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }

    let shape_a = db.class_shape(class_a);
    let shape_b = db.class_shape(class_b);

    // Literals before non-literals.
    let literal_a = shape_a.literal.is_some();
    let literal_b = shape_b.literal.is_some();
    if literal_a != literal_b {
        return if literal_a {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }

    // Non-generics before generics.
    let generic_a = !db.class_def(shape_a.def).type_params.is_empty();
    let generic_b = !db.class_def(shape_b.def).type_params.is_empty();
    if generic_a != generic_b {
        return if generic_a {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }

    let name_a = db.resolve_atom(db.class_def(shape_a.def).full_name);
    let name_b = db.resolve_atom(db.class_def(shape_b.def).full_name);
    name_a.cmp(&name_b).then_with(|| class_a.0.cmp(&class_b.0))
}

fn compare_functions(db: &dyn TypeDatabase, a: FunctionId, b: FunctionId) -> Ordering {
    let shape_a = db.function_shape(a);
    let shape_b = db.function_shape(b);

    // Longer signatures first.
    let length_order = shape_b.params.len().cmp(&shape_a.params.len());
    if length_order != Ordering::Equal {
        return length_order;
    }

    for i in 0..shape_a.params.len() {
        let order = compare_types(
            db,
            shape_a.effective_param_type(i),
            shape_b.effective_param_type(i),
        );
        if order != Ordering::Equal {
            return order;
        }
    }

    match (shape_a.effective_return_type(), shape_b.effective_return_type()) {
        (Some(ret_a), Some(ret_b)) => {
            let order = compare_types(db, ret_a, ret_b);
            if order != Ordering::Equal {
                return order;
            }
        }
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        (None, None) => {}
    }

    let name_a = db.resolve_atom(shape_a.name);
    let name_b = db.resolve_atom(shape_b.name);
    name_a.cmp(&name_b).then_with(|| a.0.cmp(&b.0))
}

#[cfg(test)]
#[path = "tests/type_ordering_tests.rs"]
mod tests;
