//! Variance compatibility of type arguments.
//!
//! Given a type in argument position `i` of a generic instantiation and
//! the declared variance of the corresponding parameter, decide whether
//! the argument may legally occupy that position. Concrete arguments are
//! fine in covariant and invariant positions; only a contravariant type
//! variable can stand in a contravariant one. Nested instantiations
//! compose: covariance preserves the inner declared variance,
//! contravariance flips it, and invariance pins it.

use crate::db::TypeDatabase;
use crate::types::*;

fn compose_variance(outer: Variance, inner: Variance) -> Variance {
    match outer {
        Variance::Covariant => inner,
        Variance::Contravariant => match inner {
            Variance::Covariant => Variance::Contravariant,
            Variance::Contravariant => Variance::Covariant,
            other => other,
        },
        _ => Variance::Invariant,
    }
}

pub fn is_variance_of_type_argument_compatible(
    db: &dyn TypeDatabase,
    ty: TypeId,
    declared: Variance,
) -> bool {
    variance_compatible_inner(db, ty, declared, 0)
}

fn variance_compatible_inner(
    db: &dyn TypeDatabase,
    ty: TypeId,
    declared: Variance,
    depth: u32,
) -> bool {
    if depth > MAX_TYPE_RECURSION_DEPTH {
        return true;
    }
    if matches!(declared, Variance::Unknown | Variance::Auto) {
        return true;
    }
    let depth = depth + 1;

    let data = db.type_data(ty);
    match data.kind {
        TypeKind::TypeVar(tv) => {
            let shape = db.type_var_shape(tv);
            if shape.kind != TypeVarKind::Plain {
                return true;
            }
            match shape.variance {
                Variance::Covariant | Variance::Contravariant => shape.variance == declared,
                _ => true,
            }
        }

        TypeKind::Class(class_id) => {
            if declared == Variance::Contravariant {
                return false;
            }
            let shape = db.class_shape(class_id);
            let args = match &shape.type_args {
                Some(args) => args,
                None => return true,
            };
            let def = db.class_def(shape.def);
            for (index, &arg) in args.iter().enumerate() {
                let param_variance = match def.type_params.get(index) {
                    Some(&param) => match db.type_data(param).kind {
                        TypeKind::TypeVar(param_tv) => db.type_var_shape(param_tv).variance,
                        _ => Variance::Invariant,
                    },
                    None => Variance::Invariant,
                };
                if param_variance == Variance::Auto {
                    continue;
                }
                let effective = compose_variance(declared, param_variance);
                if !variance_compatible_inner(db, arg, effective, depth) {
                    return false;
                }
            }
            true
        }

        TypeKind::Union { members, .. } => db
            .type_list(members)
            .iter()
            .all(|&member| variance_compatible_inner(db, member, declared, depth)),

        _ => declared != Variance::Contravariant,
    }
}

#[cfg(test)]
#[path = "tests/variance_tests.rs"]
mod tests;
