//! Type algebra for the pyz type checker.
//!
//! This crate provides the interned type system shared by every analysis
//! layer:
//! - `TypeInterner` - interned type storage
//! - Structural equality and ordering
//! - Type-variable substitution (the recursive transformer)
//! - MRO linearization and member lookup
//! - Tuple and parameter-specification utilities
//!
//! The algebra never refuses to produce a type: structural contradictions
//! recover with `Unknown`/`Any`, the depth budget returns inputs
//! unchanged, and the checker that embeds this crate turns both into
//! diagnostics.

#[cfg(test)]
pub(crate) mod test_fixtures;

pub mod db;
pub mod def;
pub mod equality;
pub mod format;
pub mod instantiate;
pub mod intern;
pub mod interner;
pub mod members;
pub mod mro;
pub mod param_spec;
pub mod tuples;
pub mod type_ordering;
pub mod type_var_context;
pub mod types;
pub mod utils;
pub mod variance;

pub use db::TypeDatabase;
pub use def::{ClassDef, ClassDefFlags, ClassDefId, SymbolTable};
pub use equality::{is_type_same, TypeSameOptions};
pub use format::format_type;
pub use instantiate::{
    apply_solved_type_vars, build_type_var_context_from_specialized_class,
    partially_specialize_type, self_specialize_class, specialize_for_base_class,
    transform_type_vars, ApplyTypeVarOptions, TypeVarTransformer, MAX_TYPE_TRANSFORM_DEPTH,
};
pub use intern::TypeInterner;
pub use interner::Atom;
pub use members::{
    get_class_fields_recursive, get_type_of_member, lookup_class_member, ClassMember,
    ClassMemberIterator, ClassMemberLookupFlags,
};
pub use mro::{class_mro, compute_mro_linearization};
pub use param_spec::{
    convert_param_spec_value_to_type, convert_type_to_param_spec_value,
    remove_param_spec_variadics_from_signature,
};
pub use tuples::{combine_same_sized_tuples, specialize_tuple_class, tuple_type_args};
pub use type_ordering::sort_types;
pub use type_var_context::{SignatureContext, TypeVarContext, TypeVarEntry};
pub use types::*;
pub use utils::{
    add_condition_to_type, convert_to_instance, convert_to_instantiable, is_unionable_type,
    map_subtypes, preserve_unknown, requires_specialization, RequiresSpecializationOptions,
};
pub use variance::is_variance_of_type_argument_compatible;
