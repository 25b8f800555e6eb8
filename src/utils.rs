//! Cross-cutting helpers: the union mapper, condition attachment,
//! instance/instantiable conversions, and the specialization predicate.

use crate::db::TypeDatabase;
use crate::equality::is_never;
use crate::types::*;

/// Apply `f` to each subtype of a union, dropping subtypes for which `f`
/// returns `None` (folding to `Never` when everything is dropped). The
/// union's condition is propagated onto each kept subtype and alias
/// metadata is preserved. Falls through to `f(ty)` when `ty` is not a
/// union.
///
/// This is the central "map over the sum of alternatives" combinator.
pub fn map_subtypes(
    db: &dyn TypeDatabase,
    ty: TypeId,
    mut f: impl FnMut(TypeId) -> Option<TypeId>,
) -> TypeId {
    let data = db.type_data(ty);
    let members = match data.kind {
        TypeKind::Union { members, .. } => members,
        _ => return f(ty).unwrap_or(TypeId::NEVER),
    };

    let member_list = db.type_list(members);
    let mut mapped: Vec<TypeId> = Vec::with_capacity(member_list.len());
    let mut changed = false;
    for &member in member_list.iter() {
        match f(member) {
            Some(new_member) => {
                if new_member != member {
                    changed = true;
                }
                mapped.push(new_member);
            }
            None => changed = true,
        }
    }

    if !changed {
        return ty;
    }

    if let Some(condition) = &data.condition {
        mapped = mapped
            .into_iter()
            .map(|member| add_condition_to_type(db, member, condition))
            .collect();
    }

    let result = db.union(mapped);
    match &data.alias {
        Some(alias) if !is_never(db, result) => {
            let mut result_data = db.type_data(result);
            result_data.alias = Some(alias.clone());
            db.intern_type(result_data)
        }
        _ => result,
    }
}

/// Attach narrowing conditions to a type (AND with any it already has).
/// Distributes over unions and overload sets; identity for atomic tags
/// that cannot carry a condition.
pub fn add_condition_to_type(
    db: &dyn TypeDatabase,
    ty: TypeId,
    condition: &[TypeCondition],
) -> TypeId {
    if condition.is_empty() {
        return ty;
    }
    let data = db.type_data(ty);
    match data.kind {
        TypeKind::Any
        | TypeKind::Unknown
        | TypeKind::Unbound
        | TypeKind::Never
        | TypeKind::Module(_)
        | TypeKind::TypeVar(_) => ty,

        TypeKind::Union { members, .. } => {
            let member_list = db.type_list(members);
            let conditioned: Vec<TypeId> = member_list
                .iter()
                .map(|&member| add_condition_to_type(db, member, condition))
                .collect();
            let result = db.union(conditioned);
            match &data.alias {
                Some(alias) => {
                    let mut result_data = db.type_data(result);
                    result_data.alias = Some(alias.clone());
                    db.intern_type(result_data)
                }
                None => result,
            }
        }

        TypeKind::Overloaded(list) => {
            let overloads = db.type_list(list);
            let conditioned: Vec<TypeId> = overloads
                .iter()
                .map(|&overload| add_condition_to_type(db, overload, condition))
                .collect();
            db.overloaded(conditioned)
        }

        TypeKind::None | TypeKind::Class(_) | TypeKind::Function(_) => {
            let mut merged = data.condition.clone().unwrap_or_default();
            for clause in condition {
                if !merged.contains(clause) {
                    merged.push(clause.clone());
                }
            }
            let mut new_data = data;
            new_data.condition = Some(merged);
            db.intern_type(new_data)
        }
    }
}

/// Project a type into instance form. Memoized on the interner.
pub fn convert_to_instance(db: &dyn TypeDatabase, ty: TypeId) -> TypeId {
    if let Some(cached) = db.cached_instance_form(ty) {
        return cached;
    }
    let data = db.type_data(ty);
    let result = match data.kind {
        TypeKind::Class(_) | TypeKind::TypeVar(_) => {
            if data.flags == TypeFlags::INSTANCE {
                ty
            } else {
                let mut new_data = data;
                new_data.flags = TypeFlags::INSTANCE;
                db.intern_type(new_data)
            }
        }
        TypeKind::Union { members, .. } => {
            let member_list = db.type_list(members);
            let converted: Vec<TypeId> = member_list
                .iter()
                .map(|&member| convert_to_instance(db, member))
                .collect();
            db.union(converted)
        }
        _ => ty,
    };
    db.cache_instance_form(ty, result);
    result
}

/// Project a type into instantiable form. Memoized on the interner.
pub fn convert_to_instantiable(db: &dyn TypeDatabase, ty: TypeId) -> TypeId {
    if let Some(cached) = db.cached_instantiable_form(ty) {
        return cached;
    }
    let data = db.type_data(ty);
    let result = match data.kind {
        TypeKind::Class(_) | TypeKind::TypeVar(_) => {
            if data.flags == TypeFlags::INSTANTIABLE {
                ty
            } else {
                let mut new_data = data;
                new_data.flags = TypeFlags::INSTANTIABLE;
                db.intern_type(new_data)
            }
        }
        TypeKind::Union { members, .. } => {
            let member_list = db.type_list(members);
            let converted: Vec<TypeId> = member_list
                .iter()
                .map(|&member| convert_to_instantiable(db, member))
                .collect();
            db.union(converted)
        }
        _ => ty,
    };
    db.cache_instantiable_form(ty, result);
    result
}

/// When combining two types, `Unknown` (missing information) dominates a
/// declared type so the distinction survives.
pub fn preserve_unknown(db: &dyn TypeDatabase, a: TypeId, b: TypeId) -> TypeId {
    if matches!(db.type_data(a).kind, TypeKind::Unknown)
        || matches!(db.type_data(b).kind, TypeKind::Unknown)
    {
        TypeId::UNKNOWN
    } else {
        b
    }
}

/// True when every subtype can be a member of a `X | Y` expression: the
/// bitwise AND of the flags must be exactly instantiable. Untyped
/// sentinels carry both bits, so an all-sentinel list does not qualify.
pub fn is_unionable_type(db: &dyn TypeDatabase, subtypes: &[TypeId]) -> bool {
    if subtypes.is_empty() {
        return false;
    }
    let mut flags = TypeFlags::INSTANCE | TypeFlags::INSTANTIABLE;
    for &subtype in subtypes {
        flags &= db.type_data(subtype).flags;
    }
    flags == TypeFlags::INSTANTIABLE
}

/// Clone a Class-kind type with a new shape, preserving the type-level
/// attributes (flags, alias, condition).
pub(crate) fn with_class_shape(db: &dyn TypeDatabase, ty: TypeId, shape: ClassShape) -> TypeId {
    let mut data = db.type_data(ty);
    let class_id = db.intern_class_shape(shape);
    data.kind = TypeKind::Class(class_id);
    db.intern_type(data)
}

/// Clone a Function-kind type with a new shape, preserving the type-level
/// attributes (flags, alias, condition).
pub(crate) fn with_function_shape(db: &dyn TypeDatabase, ty: TypeId, shape: FunctionShape) -> TypeId {
    let mut data = db.type_data(ty);
    let function_id = db.intern_function_shape(shape);
    data.kind = TypeKind::Function(function_id);
    db.intern_type(data)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RequiresSpecializationOptions {
    /// Pseudo-generic classes never require specialization at call sites.
    pub ignore_pseudo_generic: bool,
    /// Skip the synthesized `Self` variable (protocol matching).
    pub ignore_self: bool,
}

/// Could applying a substitution change this type? Used to skip the
/// transformer entirely; this is the single most important optimization in
/// the algebra.
pub fn requires_specialization(
    db: &dyn TypeDatabase,
    ty: TypeId,
    options: RequiresSpecializationOptions,
) -> bool {
    requires_specialization_inner(db, ty, options, 0)
}

fn requires_specialization_inner(
    db: &dyn TypeDatabase,
    ty: TypeId,
    options: RequiresSpecializationOptions,
    depth: u32,
) -> bool {
    if depth > MAX_TYPE_RECURSION_DEPTH {
        return false;
    }
    let depth = depth + 1;
    let data = db.type_data(ty);

    match data.kind {
        TypeKind::Class(class_id) => {
            let shape = db.class_shape(class_id);
            let def = db.class_def(shape.def);
            if options.ignore_pseudo_generic
                && def.flags.contains(crate::def::ClassDefFlags::PSEUDO_GENERIC)
            {
                return false;
            }
            if let Some(tuple_args) = &shape.tuple_type_args {
                if tuple_args
                    .iter()
                    .any(|entry| requires_specialization_inner(db, entry.ty, options, depth))
                {
                    return true;
                }
            }
            match &shape.type_args {
                Some(args) => args
                    .iter()
                    .any(|&arg| requires_specialization_inner(db, arg, options, depth)),
                None => !def.type_params.is_empty(),
            }
        }

        TypeKind::Function(fn_id) => {
            let shape = db.function_shape(fn_id);
            if shape.param_spec.is_some() {
                return true;
            }
            for i in 0..shape.params.len() {
                if requires_specialization_inner(db, shape.effective_param_type(i), options, depth)
                {
                    return true;
                }
            }
            match shape.effective_return_type() {
                Some(ret) => requires_specialization_inner(db, ret, options, depth),
                None => false,
            }
        }

        TypeKind::Overloaded(list) => db
            .type_list(list)
            .iter()
            .any(|&overload| requires_specialization_inner(db, overload, options, depth)),

        TypeKind::Union { members, .. } => db
            .type_list(members)
            .iter()
            .any(|&member| requires_specialization_inner(db, member, options, depth)),

        TypeKind::TypeVar(tv) => {
            let shape = db.type_var_shape(tv);
            if shape.recursive_alias.is_some() {
                // A resolved recursive alias with no generic arguments is
                // inert; one with arguments may still need its arguments
                // substituted.
                return match &data.alias {
                    Some(alias) => match &alias.type_args {
                        Some(args) => args
                            .iter()
                            .any(|&arg| requires_specialization_inner(db, arg, options, depth)),
                        None => false,
                    },
                    None => false,
                };
            }
            if shape.is_synthesized_self && options.ignore_self {
                return false;
            }
            true
        }

        _ => false,
    }
}

#[cfg(test)]
#[path = "tests/utils_tests.rs"]
mod tests;
