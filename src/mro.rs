//! Method resolution order.
//!
//! Implements the C3-merge linearization for multiple inheritance. The
//! computed order is stored once per class definition and shared by every
//! specialization; member lookup re-specializes entries against the class
//! it is asked about.
//!
//! Linearization can fail (inconsistent hierarchies). The algebra still
//! produces a best-effort order so member lookup keeps working; the caller
//! receives `false` and reports the diagnostic.

use crate::db::TypeDatabase;
use crate::instantiate::{partially_specialize_type, self_specialize_class};
use crate::types::*;
use std::collections::VecDeque;

/// Do two MRO entries denote the same class? Classes compare by their
/// definition (the "same generic class" key); `Any`/`Unknown` entries
/// compare by tag.
fn mro_entry_matches(db: &dyn TypeDatabase, a: TypeId, b: TypeId) -> bool {
    match (db.type_data(a).kind, db.type_data(b).kind) {
        (TypeKind::Class(class_a), TypeKind::Class(class_b)) => {
            db.class_shape(class_a).def == db.class_shape(class_b).def
        }
        (TypeKind::Any, TypeKind::Any) | (TypeKind::Unknown, TypeKind::Unknown) => true,
        _ => false,
    }
}

fn is_generic_special_form(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    match db.type_data(ty).kind {
        TypeKind::Class(class_id) => {
            let shape = db.class_shape(class_id);
            let def = db.class_def(shape.def);
            db.resolve_atom(def.full_name).as_ref() == "typing.Generic"
        }
        _ => false,
    }
}

fn has_explicit_type_args(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    match db.type_data(ty).kind {
        TypeKind::Class(class_id) => db.class_shape(class_id).type_args.is_some(),
        _ => false,
    }
}

/// Compute and publish the linearization for a class. Returns `true` on a
/// consistent linearization; on failure a best-effort order is still
/// published and `false` is returned.
pub fn compute_mro_linearization(db: &dyn TypeDatabase, class_ty: TypeId) -> bool {
    let class_id = match db.type_data(class_ty).kind {
        TypeKind::Class(class_id) => class_id,
        _ => {
            tracing::debug!(type_id = class_ty.0, "MRO requested for a non-class type");
            return false;
        }
    };
    let def_id = db.class_shape(class_id).def;
    if db.class_mro(def_id).is_some() {
        return true;
    }
    let def = db.class_def(def_id);

    // Base linearizations must exist first.
    for &base in &def.base_classes {
        if let TypeKind::Class(base_class_id) = db.type_data(base).kind {
            let base_def = db.class_shape(base_class_id).def;
            if base_def != def_id && db.class_mro(base_def).is_none() {
                compute_mro_linearization(db, base);
            }
        }
    }

    // A `Generic` base only declares type parameters; drop it when the
    // class is a protocol or a later base carries explicit arguments
    // (variance is declared there instead).
    let mut filtered_bases: Vec<TypeId> = Vec::with_capacity(def.base_classes.len());
    for (index, &base) in def.base_classes.iter().enumerate() {
        if is_generic_special_form(db, base) {
            let later_specialized = def.base_classes[index + 1..]
                .iter()
                .any(|&later| has_explicit_type_args(db, later));
            if def.is_protocol() || later_specialized {
                continue;
            }
        }
        filtered_bases.push(base);
    }

    // The published order belongs to the definition, not to whichever
    // specialization happened to ask first: linearize the declared form
    // with identity arguments.
    let declared_form = db.instantiable_class(def_id, None);
    let self_specialized = self_specialize_class(db, declared_form);

    // The lists to merge: each base's MRO seen through that base's
    // arguments, then the direct bases seen through the class itself.
    let mut sequences: Vec<VecDeque<TypeId>> = Vec::with_capacity(filtered_bases.len() + 1);
    for &base in &filtered_bases {
        match db.type_data(base).kind {
            TypeKind::Class(base_class_id) => {
                let base_def = db.class_shape(base_class_id).def;
                match db.class_mro(base_def) {
                    Some(base_mro) => {
                        sequences.push(
                            base_mro
                                .iter()
                                .map(|&entry| partially_specialize_type(db, entry, base, None))
                                .collect(),
                        );
                    }
                    None => sequences.push(VecDeque::from([base])),
                }
            }
            TypeKind::Any | TypeKind::Unknown => {
                sequences.push(VecDeque::from([base]));
            }
            _ => {
                tracing::debug!(type_id = base.0, "ignoring non-class base in linearization");
            }
        }
    }
    sequences.push(
        filtered_bases
            .iter()
            .map(|&base| partially_specialize_type(db, base, self_specialized, None))
            .collect(),
    );

    let mut mro: Vec<TypeId> = Vec::with_capacity(8);
    mro.push(self_specialized);
    let mut ok = true;

    loop {
        sequences.retain(|sequence| !sequence.is_empty());
        if sequences.is_empty() {
            break;
        }

        // A candidate that still appears deeper in another list is not
        // ready; take the first head for which that does not hold.
        let candidate = sequences.iter().find_map(|outer| {
            let head = outer[0];
            let not_in_tail = sequences
                .iter()
                .all(|sequence| sequence.iter().skip(1).all(|&entry| !mro_entry_matches(db, entry, head)));
            not_in_tail.then_some(head)
        });

        let entry = match candidate {
            Some(entry) => entry,
            None => {
                // Inconsistent hierarchy. Emit the head of the first
                // non-empty list so the merge always makes progress.
                ok = false;
                let fallback = sequences[0][0];
                tracing::debug!(
                    class = &*db.resolve_atom(def.full_name),
                    "MRO linearization failed; continuing best-effort"
                );
                fallback
            }
        };

        if !mro.iter().any(|&existing| mro_entry_matches(db, existing, entry)) {
            mro.push(entry);
        }
        for sequence in &mut sequences {
            if !sequence.is_empty() && mro_entry_matches(db, sequence[0], entry) {
                sequence.pop_front();
            }
        }
    }

    db.set_class_mro(def_id, mro);
    ok
}

/// The linearization for the class behind `class_ty`, computing it on
/// first use.
pub fn class_mro(db: &dyn TypeDatabase, class_ty: TypeId) -> Option<std::sync::Arc<[TypeId]>> {
    let class_id = match db.type_data(class_ty).kind {
        TypeKind::Class(class_id) => class_id,
        _ => return None,
    };
    let def_id = db.class_shape(class_id).def;
    if db.class_mro(def_id).is_none() {
        compute_mro_linearization(db, class_ty);
    }
    db.class_mro(def_id)
}

#[cfg(test)]
#[path = "tests/mro_tests.rs"]
mod tests;
