//! Type-variable substitution.
//!
//! This module implements the recursive transformer that walks an
//! arbitrary type and rewrites its type variables through a pluggable
//! policy, plus the standard policy that applies a solved substitution
//! context.
//!
//! Key features:
//! - Four-hook policy trait (plain variable, parameter spec, variadic,
//!   union post-processing)
//! - Cycle cutting through in-progress variable and function sets
//! - Depth budget: above the threshold the input is returned unchanged

use crate::db::TypeDatabase;
use crate::equality::{contains_literal_type, is_never, is_param_spec, is_unpacked_tuple};
use crate::param_spec::{
    apply_param_spec_value, convert_param_spec_value_to_type, convert_type_to_param_spec_value,
    get_param_spec_from_args_kwargs, unknown_param_spec_value,
};
use crate::tuples::{specialize_tuple_class, tuple_type_args};
use crate::type_var_context::TypeVarContext;
use crate::types::*;
use crate::utils::{
    convert_to_instantiable, map_subtypes, requires_specialization,
    RequiresSpecializationOptions, with_class_shape, with_function_shape,
};
use rustc_hash::FxHashSet;

/// Maximum depth for one substitution walk. Above this the transformer
/// returns its input unchanged, which is conservatively correct.
pub const MAX_TYPE_TRANSFORM_DEPTH: u32 = MAX_TYPE_RECURSION_DEPTH;

/// Substitution policy. Each hook may return `None` to leave the entity
/// untouched.
pub trait TypeVarTransformer {
    /// Replacement for a plain (or variadic) type variable.
    fn transform_type_var(
        &mut self,
        _db: &dyn TypeDatabase,
        _type_var: TypeId,
        _shape: &TypeVarShape,
        _depth: u32,
    ) -> Option<TypeId> {
        None
    }

    /// Replacement for a parameter specification: a Function-kind
    /// param-spec value.
    fn transform_param_spec(
        &mut self,
        _db: &dyn TypeDatabase,
        _type_var: TypeId,
        _shape: &TypeVarShape,
        _depth: u32,
    ) -> Option<TypeId> {
        None
    }

    /// Replacement for a variadic type variable positioned in a tuple
    /// element list.
    fn transform_tuple_type_var(
        &mut self,
        _db: &dyn TypeDatabase,
        _type_var: TypeId,
        _shape: &TypeVarShape,
        _depth: u32,
    ) -> Option<Vec<TupleTypeArg>> {
        None
    }

    /// Post-processing hook per union subtype; returning `None` drops the
    /// subtype.
    fn transform_union_subtype(
        &mut self,
        _db: &dyn TypeDatabase,
        _pre: TypeId,
        post: TypeId,
        _depth: u32,
    ) -> Option<TypeId> {
        Some(post)
    }

    /// Number of alternative solution sets; functions are rewritten once
    /// per set and combined into an overload when more than one.
    fn signature_context_count(&self) -> usize {
        1
    }

    fn set_active_signature_context(&mut self, _index: usize) {}
}

/// Walk `ty` and rewrite its type variables through the policy.
pub fn transform_type_vars(
    db: &dyn TypeDatabase,
    ty: TypeId,
    transformer: &mut dyn TypeVarTransformer,
) -> TypeId {
    let mut visitor = TransformVisitor {
        db,
        transformer,
        pending_type_vars: FxHashSet::default(),
        pending_functions: Vec::new(),
    };
    visitor.apply(ty, 0)
}

struct TransformVisitor<'a> {
    db: &'a dyn TypeDatabase,
    transformer: &'a mut dyn TypeVarTransformer,
    /// Variables whose replacement is being resolved; cuts cycles through
    /// a variable's own bound or a recursive alias.
    pending_type_vars: FxHashSet<TypeVarKey>,
    /// Function and overload types currently being rewritten; cuts
    /// identity cycles in overload sets.
    pending_functions: Vec<TypeId>,
}

impl TransformVisitor<'_> {
    fn apply(&mut self, ty: TypeId, depth: u32) -> TypeId {
        if depth > MAX_TYPE_TRANSFORM_DEPTH {
            tracing::debug!(type_id = ty.0, "type transform depth budget exhausted");
            return ty;
        }
        let depth = depth + 1;

        if !requires_specialization(self.db, ty, RequiresSpecializationOptions::default()) {
            return ty;
        }

        let data = self.db.type_data(ty);
        let result = match data.kind {
            TypeKind::Unbound
            | TypeKind::Unknown
            | TypeKind::Any
            | TypeKind::None
            | TypeKind::Never
            | TypeKind::Module(_) => return ty,
            // The placeholder handles its own alias arguments.
            TypeKind::TypeVar(tv) => return self.apply_type_var(ty, &data, tv, depth),
            TypeKind::Union { .. } => self.apply_union(ty, depth),
            TypeKind::Class(class_id) => self.apply_class(ty, class_id, depth),
            TypeKind::Function(fn_id) => self.apply_function(ty, fn_id, depth),
            TypeKind::Overloaded(list) => self.apply_overloaded(ty, list, depth),
        };

        self.reapply_alias(ty, result, &data, depth)
    }

    /// Generic type alias: transform the applied alias arguments and carry
    /// the alias name and scope onto the result.
    fn reapply_alias(&mut self, original: TypeId, result: TypeId, data: &TypeData, depth: u32) -> TypeId {
        let alias = match &data.alias {
            Some(alias) => alias,
            None => return result,
        };
        let args = match &alias.type_args {
            Some(args) => args,
            None => return result,
        };
        let new_args: Vec<TypeId> = args.iter().map(|&arg| self.apply(arg, depth)).collect();
        if result == original && new_args == *args {
            return original;
        }
        let mut new_alias = alias.clone();
        new_alias.type_args = Some(new_args);
        let mut result_data = self.db.type_data(result);
        result_data.alias = Some(new_alias);
        self.db.intern_type(result_data)
    }

    fn apply_type_var(&mut self, ty: TypeId, data: &TypeData, tv: TypeVarId, depth: u32) -> TypeId {
        let shape = self.db.type_var_shape(tv);

        // A recursive type alias placeholder is never substituted itself;
        // only its applied alias arguments are.
        if shape.recursive_alias.is_some() {
            let alias = match &data.alias {
                Some(alias) => alias,
                None => return ty,
            };
            let args = match &alias.type_args {
                Some(args) => args,
                None => return ty,
            };
            let new_args: Vec<TypeId> = args.iter().map(|&arg| self.apply(arg, depth)).collect();
            if new_args == *args {
                return ty;
            }
            let mut new_alias = alias.clone();
            new_alias.type_args = Some(new_args);
            let mut new_data = data.clone();
            new_data.alias = Some(new_alias);
            return self.db.intern_type(new_data);
        }

        let key = shape.key();
        if self.pending_type_vars.contains(&key) {
            return ty;
        }

        if shape.kind == TypeVarKind::ParamSpec && shape.access.is_none() {
            if let Some(value) = self.transformer.transform_param_spec(self.db, ty, &shape, depth) {
                return convert_param_spec_value_to_type(self.db, value);
            }
            return ty;
        }

        let mut replacement = ty;
        if let Some(new_type) = self.transformer.transform_type_var(self.db, ty, &shape, depth) {
            if new_type != ty {
                // Resolve chained substitutions, guarding against cycles
                // through the variable itself.
                self.pending_type_vars.insert(key);
                replacement = self.apply(new_type, depth);
                self.pending_type_vars.remove(&key);
            } else {
                replacement = new_type;
            }
        }

        if replacement != ty {
            // A replacement landing in an instantiable position keeps the
            // `type[...]` form.
            if data.flags == TypeFlags::INSTANTIABLE {
                replacement = convert_to_instantiable(self.db, replacement);
            }

            // A variadic positioned inside a union unpacks its solution
            // back into that union.
            if shape.kind == TypeVarKind::Variadic && shape.is_variadic_in_union {
                if let Some(entries) = tuple_type_args(self.db, replacement) {
                    if entries.iter().all(|entry| !entry.is_unbounded) {
                        let members: Vec<TypeId> =
                            entries.iter().map(|entry| entry.ty).collect();
                        replacement = self.db.union(members);
                    }
                }
            }
        }

        replacement
    }

    fn apply_union(&mut self, ty: TypeId, depth: u32) -> TypeId {
        let db = self.db;
        let new_type = map_subtypes(db, ty, |subtype| {
            let transformed = self.apply(subtype, depth);
            self.transformer
                .transform_union_subtype(db, subtype, transformed, depth)
        });
        // A union that loses every subtype to substitution reports the
        // absence of information, not the absence of values.
        if is_never(db, new_type) {
            TypeId::UNKNOWN
        } else {
            new_type
        }
    }

    fn apply_class(&mut self, ty: TypeId, class_id: ClassId, depth: u32) -> TypeId {
        let shape = self.db.class_shape(class_id);
        let def = self.db.class_def(shape.def);
        if def.type_params.is_empty()
            && !def
                .flags
                .contains(crate::def::ClassDefFlags::SPECIAL_BUILTIN)
        {
            return ty;
        }

        let mut changed = false;
        let new_type_args: Option<Vec<TypeId>> = match &shape.type_args {
            Some(args) => {
                let mut out = Vec::with_capacity(args.len());
                for &arg in args.iter() {
                    // Parameter-spec positions route through the policy's
                    // param-spec hook via the TypeVar branch; solved values
                    // are rewritten as ordinary functions.
                    let new_arg = self.apply(arg, depth);
                    if new_arg != arg {
                        changed = true;
                    }
                    out.push(new_arg);
                }
                Some(out)
            }
            None => {
                // Unspecialized: ask the policy about each declared
                // parameter; any answer means the class now needs explicit
                // arguments.
                let mut out = Vec::with_capacity(def.type_params.len());
                let mut any = false;
                for &param in &def.type_params {
                    let new_arg = self.apply(param, depth);
                    if new_arg != param {
                        any = true;
                    }
                    out.push(new_arg);
                }
                if any {
                    changed = true;
                    Some(out)
                } else {
                    None
                }
            }
        };

        let mut new_tuple_args: Option<Vec<TupleTypeArg>> = None;
        if let Some(tuple_args) = &shape.tuple_type_args {
            let mut out: Vec<TupleTypeArg> = Vec::with_capacity(tuple_args.len());
            let mut tuple_changed = false;
            for entry in tuple_args.iter() {
                if let TypeKind::TypeVar(entry_tv) = self.db.type_data(entry.ty).kind {
                    let entry_shape = self.db.type_var_shape(entry_tv);
                    if entry_shape.kind == TypeVarKind::Variadic {
                        if let Some(expansion) = self.transformer.transform_tuple_type_var(
                            self.db,
                            entry.ty,
                            &entry_shape,
                            depth,
                        ) {
                            out.extend(expansion);
                            tuple_changed = true;
                            continue;
                        }
                    }
                }

                let new_entry_ty = self.apply(entry.ty, depth);
                if new_entry_ty == entry.ty {
                    out.push(entry.clone());
                    continue;
                }
                tuple_changed = true;
                // Variadic expansion: a substitution that produced another
                // tuple class splices its elements in place.
                if crate::equality::is_variadic_type_var(self.db, entry.ty) {
                    if let Some(inner) = tuple_type_args(self.db, new_entry_ty) {
                        out.extend(inner);
                        continue;
                    }
                }
                out.push(TupleTypeArg {
                    ty: new_entry_ty,
                    is_unbounded: entry.is_unbounded,
                });
            }
            if tuple_changed {
                changed = true;
                new_tuple_args = Some(out);
            }
        }

        if !changed {
            return ty;
        }

        let updated = with_class_shape(
            self.db,
            ty,
            ClassShape {
                def: shape.def,
                type_args: new_type_args.or_else(|| shape.type_args.clone()),
                tuple_type_args: shape.tuple_type_args.clone(),
                is_unpacked: shape.is_unpacked,
                literal: shape.literal.clone(),
            },
        );
        match new_tuple_args {
            // Tuple entries changed: rebuild so the flattened union view
            // stays in sync with the structural list.
            Some(entries) => specialize_tuple_class(self.db, updated, entries),
            None => updated,
        }
    }

    fn apply_overloaded(&mut self, ty: TypeId, list: TypeListId, depth: u32) -> TypeId {
        if self.pending_functions.contains(&ty) {
            return ty;
        }
        self.pending_functions.push(ty);

        let overloads = self.db.type_list(list);
        let mut new_overloads: Vec<TypeId> = Vec::with_capacity(overloads.len());
        let mut changed = false;
        for &overload in overloads.iter() {
            let transformed = self.apply(overload, depth);
            if transformed != overload {
                changed = true;
            }
            // A rewritten overload may itself have expanded into an
            // overload set; flatten.
            match self.db.type_data(transformed).kind {
                TypeKind::Overloaded(inner) => {
                    new_overloads.extend(self.db.type_list(inner).iter().copied());
                }
                _ => new_overloads.push(transformed),
            }
        }

        self.pending_functions.pop();
        if !changed {
            return ty;
        }
        self.db.overloaded(new_overloads)
    }

    fn apply_function(&mut self, ty: TypeId, fn_id: FunctionId, depth: u32) -> TypeId {
        if self.pending_functions.contains(&ty) {
            return ty;
        }
        self.pending_functions.push(ty);

        let count = self.transformer.signature_context_count().max(1);
        let result = if count == 1 {
            self.apply_function_once(ty, fn_id, depth)
        } else {
            let mut variants: Vec<TypeId> = Vec::with_capacity(count);
            for index in 0..count {
                self.transformer.set_active_signature_context(index);
                let variant = self.apply_function_once(ty, fn_id, depth);
                if !variants.contains(&variant) {
                    variants.push(variant);
                }
            }
            self.transformer.set_active_signature_context(0);
            if variants.len() == 1 {
                variants[0]
            } else {
                self.db.overloaded(variants)
            }
        };

        self.pending_functions.pop();
        result
    }

    fn apply_function_once(&mut self, ty: TypeId, fn_id: FunctionId, depth: u32) -> TypeId {
        let source = self.db.function_shape(fn_id);
        let mut shape: FunctionShape = (*source).clone();
        let mut shape_changed = false;

        // Tail `*args: P.args, **kwargs: P.kwargs` pattern: substituting P
        // yields a concrete parameter list appended after the non-variadic
        // parameters.
        if let Some(param_spec_ty) = get_param_spec_from_args_kwargs(self.db, &shape) {
            if let Some(value) = self.transform_param_spec_for(param_spec_ty, depth) {
                if !is_free_param_spec_identity(self.db, value, param_spec_ty) {
                    shape = apply_param_spec_value(self.db, &shape, value);
                    shape_changed = true;
                }
            }
        }

        // A parameter specification bound at the signature tail.
        if let Some(param_spec_ty) = shape.param_spec {
            if is_param_spec(self.db, param_spec_ty) {
                if let Some(value) = self.transform_param_spec_for(param_spec_ty, depth) {
                    if !is_free_param_spec_identity(self.db, value, param_spec_ty) {
                        shape.param_spec = None;
                        shape = apply_param_spec_value(self.db, &shape, value);
                        shape_changed = true;
                    }
                }
            }
        }

        // Parameter and default-argument types.
        let mut param_types: Vec<TypeId> = Vec::with_capacity(shape.params.len());
        let mut default_types: Vec<TypeId> = Vec::with_capacity(shape.params.len());
        let mut any_default = false;
        let mut types_changed = false;
        for i in 0..shape.params.len() {
            let source_ty = shape.effective_param_type(i);
            let transformed = self.apply(source_ty, depth);
            if transformed != source_ty {
                types_changed = true;
            }
            param_types.push(transformed);

            match shape.params[i].default_type {
                Some(default) => {
                    any_default = true;
                    let transformed_default = self.apply(default, depth);
                    if transformed_default != default {
                        types_changed = true;
                    }
                    default_types.push(transformed_default);
                }
                None => default_types.push(TypeId::INVALID),
            }
        }

        // Return type: substituted overlay if present, else declared.
        let return_type = match shape.effective_return_type() {
            Some(source_return) => {
                let transformed = self.apply(source_return, depth);
                if transformed != source_return {
                    types_changed = true;
                }
                transformed
            }
            None => TypeId::UNKNOWN,
        };

        // An unpacked tuple substituted into `*args` splices into
        // individual positional parameters.
        let args_index = shape.params.iter().position(|param| {
            param.category == ParamCategory::ArgsList && param.name.is_some()
        });
        if let Some(args_index) = args_index {
            let substituted = param_types[args_index];
            if is_unpacked_tuple(self.db, substituted) {
                if let Some(entries) = tuple_type_args(self.db, substituted) {
                    let spliced = splice_variadic_entries(
                        self.db,
                        &shape,
                        &param_types,
                        &default_types,
                        args_index,
                        &entries,
                    );
                    shape.params = spliced.params;
                    param_types = spliced.param_types;
                    default_types = spliced.default_types;
                    shape.flags |= FunctionFlags::SYNTHESIZED;
                    shape_changed = true;
                    types_changed = true;
                }
            }
        }

        if !shape_changed && !types_changed {
            return ty;
        }

        shape.specialized = Some(SpecializedFunction {
            param_types,
            default_arg_types: any_default.then_some(default_types),
            return_type,
        });
        with_function_shape(self.db, ty, shape)
    }

    fn transform_param_spec_for(&mut self, param_spec_ty: TypeId, depth: u32) -> Option<TypeId> {
        match self.db.type_data(param_spec_ty).kind {
            TypeKind::TypeVar(tv) => {
                let shape = self.db.type_var_shape(tv);
                self.transformer
                    .transform_param_spec(self.db, param_spec_ty, &shape, depth)
            }
            _ => None,
        }
    }
}

/// Is `value` the free param-spec value naming `param_spec_ty` itself?
/// Applying it would be an identity rewrite.
fn is_free_param_spec_identity(
    db: &dyn TypeDatabase,
    value: TypeId,
    param_spec_ty: TypeId,
) -> bool {
    match db.type_data(value).kind {
        TypeKind::Function(fn_id) => {
            let shape = db.function_shape(fn_id);
            shape.params.is_empty() && shape.param_spec == Some(param_spec_ty)
        }
        TypeKind::TypeVar(_) => value == param_spec_ty,
        _ => false,
    }
}

struct SplicedSignature {
    params: Vec<FunctionParam>,
    param_types: Vec<TypeId>,
    default_types: Vec<TypeId>,
}

/// Replace the `*args` parameter at `args_index` with one positional
/// parameter per tuple entry. An unbounded entry stays a `*args` suffix;
/// otherwise a keyword-only separator keeps any following parameters
/// keyword-only. A trailing position-only separator is swallowed when an
/// unbounded tail was emitted.
fn splice_variadic_entries(
    db: &dyn TypeDatabase,
    shape: &FunctionShape,
    param_types: &[TypeId],
    default_types: &[TypeId],
    args_index: usize,
    entries: &[TupleTypeArg],
) -> SplicedSignature {
    let mut params: Vec<FunctionParam> = Vec::with_capacity(shape.params.len() + entries.len());
    let mut types: Vec<TypeId> = Vec::with_capacity(params.capacity());
    let mut defaults: Vec<TypeId> = Vec::with_capacity(params.capacity());

    for i in 0..args_index {
        let mut param = shape.params[i].clone();
        param.ty = param_types[i];
        params.push(param);
        types.push(param_types[i]);
        defaults.push(default_types[i]);
    }

    let original_args = &shape.params[args_index];
    let mut emitted_unbounded_tail = false;
    for (position, entry) in entries.iter().enumerate() {
        if entry.is_unbounded {
            params.push(FunctionParam {
                category: ParamCategory::ArgsList,
                name: original_args.name,
                ty: entry.ty,
                has_default: false,
                default_type: None,
            });
            emitted_unbounded_tail = true;
        } else {
            let name = db.intern_string(&format!("__p{position}"));
            params.push(FunctionParam {
                category: ParamCategory::Simple,
                name: Some(name),
                ty: entry.ty,
                has_default: false,
                default_type: None,
            });
        }
        types.push(entry.ty);
        defaults.push(TypeId::INVALID);
    }

    let rest = &shape.params[args_index + 1..];
    if !emitted_unbounded_tail {
        let has_following = rest.iter().any(|param| {
            !param.is_keyword_separator() && !param.is_position_only_separator()
        });
        let already_separated = rest.first().map_or(false, |param| param.is_keyword_separator());
        if has_following && !already_separated {
            params.push(FunctionParam::keyword_separator());
            types.push(TypeId::UNKNOWN);
            defaults.push(TypeId::INVALID);
        }
    }

    for (offset, param) in rest.iter().enumerate() {
        let index = args_index + 1 + offset;
        if emitted_unbounded_tail && param.is_position_only_separator() {
            continue;
        }
        let mut param = param.clone();
        param.ty = param_types[index];
        params.push(param);
        types.push(param_types[index]);
        defaults.push(default_types[index]);
    }

    SplicedSignature {
        params,
        param_types: types,
        default_types: defaults,
    }
}

// =========================================================================
// Applying a solved substitution context
// =========================================================================

/// Options for [`apply_solved_type_vars`].
#[derive(Clone, Debug, Default)]
pub struct ApplyTypeVarOptions {
    /// Replace in-scope unsolved variables with `Unknown` (or their
    /// default).
    pub unknown_if_not_found: bool,
    /// With `unknown_if_not_found`, prefer `Unknown` over the variable's
    /// declared default.
    pub use_unknown_over_default: bool,
    /// Prefer the narrow bound; fall back to a literal-containing wide
    /// bound only.
    pub use_narrow_bound_only: bool,
    /// Remove in-scope unsolved variables from unions (residual return
    /// types).
    pub eliminate_unsolved_in_unions: bool,
    /// The `type` class; `Unknown` replacements in instantiable positions
    /// are wrapped as `type[Unknown]` through it.
    pub type_class_type: Option<TypeId>,
}

struct ApplySolvedTypeVars<'a> {
    context: &'a TypeVarContext,
    options: ApplyTypeVarOptions,
    active_index: usize,
    is_solving_default_type: bool,
}

impl TypeVarTransformer for ApplySolvedTypeVars<'_> {
    fn signature_context_count(&self) -> usize {
        self.context.signature_context_count()
    }

    fn set_active_signature_context(&mut self, index: usize) {
        self.active_index = index;
    }

    fn transform_type_var(
        &mut self,
        db: &dyn TypeDatabase,
        type_var: TypeId,
        shape: &TypeVarShape,
        _depth: u32,
    ) -> Option<TypeId> {
        // Scopeless variables are placeholders while a default is being
        // resolved; leave them alone.
        if self.is_solving_default_type && shape.scope_id.is_none() {
            return None;
        }
        let scope_id = shape.scope_id?;
        if !self.context.has_solve_for_scope(scope_id) {
            return None;
        }

        let key = shape.key();
        let signature = self.context.signature_context(self.active_index);
        if let Some(entry) = signature.get_type_var(key) {
            let solved = if self.options.use_narrow_bound_only {
                entry.narrow_bound.or_else(|| {
                    entry
                        .wide_bound
                        .filter(|&wide| contains_literal_type(db, wide))
                })
            } else {
                entry.narrow_bound.or(entry.wide_bound)
            };
            if solved.is_some() {
                return solved;
            }
        }

        if self.options.unknown_if_not_found {
            if !self.options.use_unknown_over_default {
                if let Some(default) = shape.default {
                    let mut nested = ApplySolvedTypeVars {
                        context: self.context,
                        options: self.options.clone(),
                        active_index: self.active_index,
                        is_solving_default_type: true,
                    };
                    return Some(transform_type_vars(db, default, &mut nested));
                }
            }
            if let Some(type_class) = self.options.type_class_type {
                if db.type_data(type_var).flags == TypeFlags::INSTANTIABLE {
                    return Some(specialize_type_class(db, type_class, TypeId::UNKNOWN));
                }
            }
            return Some(TypeId::UNKNOWN);
        }

        None
    }

    fn transform_param_spec(
        &mut self,
        db: &dyn TypeDatabase,
        _type_var: TypeId,
        shape: &TypeVarShape,
        _depth: u32,
    ) -> Option<TypeId> {
        let scope_id = shape.scope_id?;
        if !self.context.has_solve_for_scope(scope_id) {
            return None;
        }
        let signature = self.context.signature_context(self.active_index);
        if let Some(value) = signature.get_param_spec(shape.key()) {
            return Some(value);
        }
        if self.options.unknown_if_not_found {
            return Some(unknown_param_spec_value(db));
        }
        None
    }

    fn transform_tuple_type_var(
        &mut self,
        _db: &dyn TypeDatabase,
        _type_var: TypeId,
        shape: &TypeVarShape,
        _depth: u32,
    ) -> Option<Vec<TupleTypeArg>> {
        let scope_id = shape.scope_id?;
        if !self.context.has_solve_for_scope(scope_id) {
            return None;
        }
        let signature = self.context.signature_context(self.active_index);
        signature
            .get_tuple_type_var(shape.key())
            .map(|entries| entries.to_vec())
    }

    fn transform_union_subtype(
        &mut self,
        db: &dyn TypeDatabase,
        pre: TypeId,
        post: TypeId,
        _depth: u32,
    ) -> Option<TypeId> {
        if self.options.eliminate_unsolved_in_unions {
            if let TypeKind::TypeVar(tv) = db.type_data(pre).kind {
                let shape = db.type_var_shape(tv);
                if let Some(scope_id) = shape.scope_id {
                    let unsolved = post == pre
                        || matches!(db.type_data(post).kind, TypeKind::Unknown);
                    if self.context.has_solve_for_scope(scope_id) && unsolved {
                        return None;
                    }
                }
            }
        }
        Some(post)
    }
}

/// Specialize the `type` class with a single argument (`type[arg]`).
fn specialize_type_class(db: &dyn TypeDatabase, type_class: TypeId, arg: TypeId) -> TypeId {
    match db.type_data(type_class).kind {
        TypeKind::Class(class_id) => {
            let shape = db.class_shape(class_id);
            let mut new_shape = (*shape).clone();
            new_shape.type_args = Some(vec![arg]);
            db.class_instance_from_shape(new_shape)
        }
        _ => TypeId::UNKNOWN,
    }
}

/// Apply a solved substitution context to a type.
pub fn apply_solved_type_vars(
    db: &dyn TypeDatabase,
    ty: TypeId,
    context: &TypeVarContext,
    options: &ApplyTypeVarOptions,
) -> TypeId {
    if context.is_empty() && !options.unknown_if_not_found {
        return ty;
    }
    let mut transformer = ApplySolvedTypeVars {
        context,
        options: options.clone(),
        active_index: 0,
        is_solving_default_type: false,
    };
    transform_type_vars(db, ty, &mut transformer)
}

// =========================================================================
// Partial specialization
// =========================================================================

/// Build a substitution context mapping a class's declared type parameters
/// to its applied arguments. An unspecialized class maps each parameter to
/// its default, else `Unknown`.
pub fn build_type_var_context_from_specialized_class(
    db: &dyn TypeDatabase,
    class_ty: TypeId,
) -> TypeVarContext {
    let class_id = match db.type_data(class_ty).kind {
        TypeKind::Class(class_id) => class_id,
        _ => return TypeVarContext::empty(),
    };
    let shape = db.class_shape(class_id);
    let def = db.class_def(shape.def);
    let mut context = TypeVarContext::new(vec![def.type_var_scope_id]);

    for (index, &param) in def.type_params.iter().enumerate() {
        let (key, param_shape) = match db.type_data(param).kind {
            TypeKind::TypeVar(tv) => {
                let param_shape = db.type_var_shape(tv);
                (param_shape.key(), param_shape)
            }
            _ => continue,
        };

        let value = match &shape.type_args {
            Some(args) => match args.get(index) {
                Some(&arg) => arg,
                None => {
                    tracing::debug!(
                        class = &*db.resolve_atom(def.full_name),
                        expected = def.type_params.len(),
                        actual = args.len(),
                        "type argument arity mismatch; recovering with Unknown"
                    );
                    param_shape.default.unwrap_or(TypeId::UNKNOWN)
                }
            },
            None => param_shape.default.unwrap_or(TypeId::UNKNOWN),
        };

        match param_shape.kind {
            TypeVarKind::ParamSpec => {
                context.set_param_spec_type(key, convert_type_to_param_spec_value(db, value));
            }
            TypeVarKind::Variadic => {
                if let Some(entries) = tuple_type_args(db, value) {
                    context.set_tuple_type_var(key, entries);
                }
                context.set_type_var_type(key, Some(value), None, true);
            }
            TypeVarKind::Plain => {
                context.set_type_var_type(key, Some(value), None, true);
            }
        }
    }

    context
}

/// Substitute `context_class`'s type arguments into `ty`. When
/// `self_class` is provided, a synthesized `Self` in the class's scope is
/// bound to it as well.
pub fn partially_specialize_type(
    db: &dyn TypeDatabase,
    ty: TypeId,
    context_class: TypeId,
    self_class: Option<TypeId>,
) -> TypeId {
    let mut context = build_type_var_context_from_specialized_class(db, context_class);
    if let Some(self_class) = self_class {
        if let TypeKind::Class(class_id) = db.type_data(context_class).kind {
            let def = db.class_def(db.class_shape(class_id).def);
            let self_key = TypeVarKey {
                name: db.intern_string("Self"),
                scope_id: Some(def.type_var_scope_id),
            };
            context.set_type_var_type(self_key, Some(self_class), None, true);
        }
    }
    apply_solved_type_vars(db, ty, &context, &ApplyTypeVarOptions::default())
}

/// The identity instantiation of a class: its own parameters applied as
/// arguments. This is the form stored as `mro[0]`.
pub fn self_specialize_class(db: &dyn TypeDatabase, class_ty: TypeId) -> TypeId {
    let class_id = match db.type_data(class_ty).kind {
        TypeKind::Class(class_id) => class_id,
        _ => return class_ty,
    };
    let shape = db.class_shape(class_id);
    let def = db.class_def(shape.def);
    if def.type_params.is_empty() || shape.type_args.is_some() {
        return class_ty;
    }
    let mut new_shape = (*shape).clone();
    new_shape.type_args = Some(def.type_params.clone());
    with_class_shape(db, class_ty, new_shape)
}

/// Specialize an ancestor `base_class` as seen through `child_class`'s
/// type arguments.
pub fn specialize_for_base_class(
    db: &dyn TypeDatabase,
    child_class: TypeId,
    base_class: TypeId,
) -> TypeId {
    partially_specialize_type(db, base_class, child_class, None)
}

#[cfg(test)]
#[path = "tests/instantiate_tests.rs"]
mod tests;
