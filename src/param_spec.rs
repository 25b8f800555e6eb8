//! Parameter-specification bridges.
//!
//! A parameter specification's solved value is a Function-shaped parameter
//! list, not a single type. The two conversion functions here are inverse
//! bridges between that Function-kind value and the Type-level
//! representation, keeping the rest of the algebra oblivious to the
//! encoding.

use crate::db::TypeDatabase;
use crate::interner::Atom;
use crate::types::*;
use crate::utils::with_function_shape;

/// The gradual parameter list `(*args: Unknown, **kwargs: Unknown)`, used
/// when a parameter specification is in scope but unsolved.
pub fn unknown_param_spec_value(db: &dyn TypeDatabase) -> TypeId {
    let args = db.intern_string("args");
    let kwargs = db.intern_string("kwargs");
    let mut shape = FunctionShape::new(
        Atom::NONE,
        vec![
            FunctionParam::args_list(args, TypeId::UNKNOWN),
            FunctionParam::kwargs_dict(kwargs, TypeId::UNKNOWN),
        ],
        None,
    );
    shape.flags = FunctionFlags::PARAM_SPEC_VALUE | FunctionFlags::SKIP_ARGS_KWARGS_CHECK;
    db.function(shape)
}

/// Convert a type into a parameter-spec value (a Function-kind type marked
/// `PARAM_SPEC_VALUE`).
///
/// - A parameter-spec TypeVar becomes a "free" value: no parameters, the
///   variable itself bound at the tail.
/// - A function is marked as a value; a single positional separator with
///   no name is treated as "no parameters".
/// - Anything else degrades to the gradual `(*args, **kwargs)` form.
pub fn convert_type_to_param_spec_value(db: &dyn TypeDatabase, ty: TypeId) -> TypeId {
    let data = db.type_data(ty);
    match data.kind {
        TypeKind::TypeVar(tv) => {
            let shape = db.type_var_shape(tv);
            if shape.kind == TypeVarKind::ParamSpec {
                let mut value = FunctionShape::new(Atom::NONE, Vec::new(), None);
                value.flags = FunctionFlags::PARAM_SPEC_VALUE;
                value.param_spec = Some(ty);
                return db.function(value);
            }
            unknown_param_spec_value(db)
        }
        TypeKind::Function(fn_id) => {
            let source = db.function_shape(fn_id);
            let mut value = (*source).clone();
            value.flags |= FunctionFlags::PARAM_SPEC_VALUE;
            if value.params.len() == 1 && value.params[0].is_position_only_separator() {
                value.params.clear();
                if let Some(specialized) = &mut value.specialized {
                    specialized.param_types.clear();
                    specialized.default_arg_types = None;
                }
            }
            with_function_shape(db, ty, value)
        }
        _ => unknown_param_spec_value(db),
    }
}

/// Inverse of [`convert_type_to_param_spec_value`]: a free value collapses
/// back to the parameter-spec variable itself, anything else becomes an
/// ordinary Function-kind type.
pub fn convert_param_spec_value_to_type(db: &dyn TypeDatabase, value: TypeId) -> TypeId {
    let data = db.type_data(value);
    let fn_id = match data.kind {
        TypeKind::Function(fn_id) => fn_id,
        _ => return value,
    };
    let shape = db.function_shape(fn_id);
    if shape.params.is_empty() {
        if let Some(param_spec) = shape.param_spec {
            return param_spec;
        }
    }
    if shape.flags.contains(FunctionFlags::PARAM_SPEC_VALUE) {
        let mut plain = (*shape).clone();
        plain.flags -= FunctionFlags::PARAM_SPEC_VALUE;
        return with_function_shape(db, value, plain);
    }
    value
}

/// Detect the tail `*args: P.args, **kwargs: P.kwargs` pattern. Returns
/// the parameter-spec variable (with the access marker stripped) when both
/// sides name the same variable.
pub fn get_param_spec_from_args_kwargs(
    db: &dyn TypeDatabase,
    shape: &FunctionShape,
) -> Option<TypeId> {
    if shape.params.len() < 2 {
        return None;
    }
    let args_param = &shape.params[shape.params.len() - 2];
    let kwargs_param = &shape.params[shape.params.len() - 1];
    if args_param.category != ParamCategory::ArgsList
        || kwargs_param.category != ParamCategory::KwargsDict
    {
        return None;
    }

    let args_shape = param_spec_shape(db, args_param.ty)?;
    let kwargs_shape = param_spec_shape(db, kwargs_param.ty)?;
    if args_shape.access != Some(ParamSpecAccess::Args)
        || kwargs_shape.access != Some(ParamSpecAccess::Kwargs)
        || args_shape.key() != kwargs_shape.key()
    {
        return None;
    }

    let mut stripped = (*args_shape).clone();
    stripped.access = None;
    let mut data = db.type_data(args_param.ty);
    data.kind = TypeKind::TypeVar(db.intern_type_var_shape(stripped));
    Some(db.intern_type(data))
}

fn param_spec_shape(
    db: &dyn TypeDatabase,
    ty: TypeId,
) -> Option<std::sync::Arc<TypeVarShape>> {
    match db.type_data(ty).kind {
        TypeKind::TypeVar(tv) => {
            let shape = db.type_var_shape(tv);
            (shape.kind == TypeVarKind::ParamSpec).then_some(shape)
        }
        _ => None,
    }
}

/// Strip a trailing `*args: P.args, **kwargs: P.kwargs` pair, binding `P`
/// at the signature tail instead. Used before signature matching.
pub fn remove_param_spec_variadics_from_signature(db: &dyn TypeDatabase, ty: TypeId) -> TypeId {
    let fn_id = match db.type_data(ty).kind {
        TypeKind::Function(fn_id) => fn_id,
        _ => return ty,
    };
    let source = db.function_shape(fn_id);
    let param_spec = match get_param_spec_from_args_kwargs(db, &source) {
        Some(param_spec) => param_spec,
        None => return ty,
    };

    let mut shape = (*source).clone();
    shape.params.truncate(shape.params.len() - 2);
    if let Some(specialized) = &mut shape.specialized {
        specialized.param_types.truncate(shape.params.len());
        if let Some(defaults) = &mut specialized.default_arg_types {
            defaults.truncate(shape.params.len());
        }
    }
    shape.param_spec = Some(param_spec);
    with_function_shape(db, ty, shape)
}

/// Apply a parameter-spec value to a signature: the tail pair (or bound
/// tail variable) is replaced by the value's concrete parameters, appended
/// after the existing non-variadic parameters. The substituted overlay is
/// invalidated; the caller rebuilds it.
pub fn apply_param_spec_value(
    db: &dyn TypeDatabase,
    shape: &FunctionShape,
    value: TypeId,
) -> FunctionShape {
    let mut result = shape.clone();
    if get_param_spec_from_args_kwargs(db, &result).is_some() {
        result.params.truncate(result.params.len() - 2);
    }
    result.param_spec = None;
    result.specialized = None;

    let value_shape = match db.type_data(value).kind {
        TypeKind::Function(fn_id) => db.function_shape(fn_id),
        _ => return result,
    };
    result.params.extend(value_shape.params.iter().cloned());
    result.param_spec = value_shape.param_spec;
    if value_shape
        .flags
        .contains(FunctionFlags::SKIP_ARGS_KWARGS_CHECK)
    {
        result.flags |= FunctionFlags::SKIP_ARGS_KWARGS_CHECK;
    }
    result
}

#[cfg(test)]
#[path = "tests/param_spec_tests.rs"]
mod tests;
