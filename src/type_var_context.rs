//! Substitution context: the map from type-variable identity to solved
//! values, with stacked signature contexts.
//!
//! A context is created at the start of a call or assignment decision,
//! mutated by the solver, applied by the transformer, and discarded. It is
//! the only mutable state the algebra touches.
//!
//! Multiple signature contexts model the result of solving against an
//! overload set: each alternative yields one context, and a downstream
//! consumer may emit one overload per context.

use crate::types::{TupleTypeArg, TypeId, TypeVarKey, TypeVarScopeId};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Solved value of a plain type variable.
#[derive(Clone, Debug, Default)]
pub struct TypeVarEntry {
    /// The lower bound established by solving (the "best" answer).
    pub narrow_bound: Option<TypeId>,
    /// The upper bound; used when the narrow bound is absent or too narrow.
    pub wide_bound: Option<TypeId>,
    /// Keep literal types in the solution instead of widening them.
    pub retain_literals: bool,
}

/// One alternative solution set.
#[derive(Clone, Debug, Default)]
pub struct SignatureContext {
    type_vars: FxHashMap<TypeVarKey, TypeVarEntry>,
    /// Parameter specifications solve to Function-kind param-spec values.
    param_specs: FxHashMap<TypeVarKey, TypeId>,
    /// Variadic type variables solve to ordered tuple entries.
    tuple_vars: FxHashMap<TypeVarKey, Arc<[TupleTypeArg]>>,
}

impl SignatureContext {
    pub fn new() -> Self {
        SignatureContext::default()
    }

    pub fn is_empty(&self) -> bool {
        self.type_vars.is_empty() && self.param_specs.is_empty() && self.tuple_vars.is_empty()
    }

    pub fn get_type_var(&self, key: TypeVarKey) -> Option<&TypeVarEntry> {
        self.type_vars.get(&key)
    }

    pub fn get_param_spec(&self, key: TypeVarKey) -> Option<TypeId> {
        self.param_specs.get(&key).copied()
    }

    pub fn get_tuple_type_var(&self, key: TypeVarKey) -> Option<Arc<[TupleTypeArg]>> {
        self.tuple_vars.get(&key).cloned()
    }

    fn set_type_var(
        &mut self,
        key: TypeVarKey,
        narrow_bound: Option<TypeId>,
        wide_bound: Option<TypeId>,
        retain_literals: bool,
    ) {
        let entry = self.type_vars.entry(key).or_default();
        if narrow_bound.is_some() {
            entry.narrow_bound = narrow_bound;
        }
        if wide_bound.is_some() {
            entry.wide_bound = wide_bound;
        }
        entry.retain_literals |= retain_literals;
    }
}

/// Stacked substitution context.
#[derive(Clone, Debug)]
pub struct TypeVarContext {
    solve_for_scopes: Vec<TypeVarScopeId>,
    signature_contexts: Vec<SignatureContext>,
    locked: bool,
}

impl TypeVarContext {
    pub fn new(solve_for_scopes: Vec<TypeVarScopeId>) -> Self {
        TypeVarContext {
            solve_for_scopes,
            signature_contexts: vec![SignatureContext::new()],
            locked: false,
        }
    }

    /// A context that solves variables from every scope.
    pub fn wildcard() -> Self {
        Self::new(vec![TypeVarScopeId::WILDCARD])
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn add_solve_for_scope(&mut self, scope_id: TypeVarScopeId) {
        if !self.solve_for_scopes.contains(&scope_id) {
            self.solve_for_scopes.push(scope_id);
        }
    }

    pub fn has_solve_for_scope(&self, scope_id: TypeVarScopeId) -> bool {
        self.solve_for_scopes.contains(&TypeVarScopeId::WILDCARD)
            || self.solve_for_scopes.contains(&scope_id)
    }

    pub fn solve_for_scopes(&self) -> &[TypeVarScopeId] {
        &self.solve_for_scopes
    }

    /// A locked context rejects further solving; applying it is still
    /// allowed.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_empty(&self) -> bool {
        self.signature_contexts.iter().all(|sc| sc.is_empty())
    }

    pub fn signature_context_count(&self) -> usize {
        self.signature_contexts.len()
    }

    pub fn signature_context(&self, index: usize) -> &SignatureContext {
        &self.signature_contexts[index.min(self.signature_contexts.len() - 1)]
    }

    pub fn signature_contexts(&self) -> &[SignatureContext] {
        &self.signature_contexts
    }

    /// Push an additional alternative (one per overload candidate).
    pub fn add_signature_context(&mut self, context: SignatureContext) {
        self.signature_contexts.push(context);
    }

    /// Solve a plain type variable in every signature context.
    pub fn set_type_var_type(
        &mut self,
        key: TypeVarKey,
        narrow_bound: Option<TypeId>,
        wide_bound: Option<TypeId>,
        retain_literals: bool,
    ) {
        debug_assert!(!self.locked, "mutating a locked TypeVarContext");
        if self.locked {
            return;
        }
        for context in &mut self.signature_contexts {
            context.set_type_var(key, narrow_bound, wide_bound, retain_literals);
        }
    }

    /// Solve a parameter specification to a Function-kind value.
    pub fn set_param_spec_type(&mut self, key: TypeVarKey, value: TypeId) {
        debug_assert!(!self.locked, "mutating a locked TypeVarContext");
        if self.locked {
            return;
        }
        for context in &mut self.signature_contexts {
            context.param_specs.insert(key, value);
        }
    }

    /// Solve a variadic type variable to an ordered tuple.
    pub fn set_tuple_type_var(&mut self, key: TypeVarKey, entries: Vec<TupleTypeArg>) {
        debug_assert!(!self.locked, "mutating a locked TypeVarContext");
        if self.locked {
            return;
        }
        let entries: Arc<[TupleTypeArg]> = entries.into();
        for context in &mut self.signature_contexts {
            context.tuple_vars.insert(key, entries.clone());
        }
    }

    /// Convenience lookup in the primary signature context.
    pub fn get_type_var_type(&self, key: TypeVarKey, narrow_only: bool) -> Option<TypeId> {
        let entry = self.signature_contexts[0].get_type_var(key)?;
        if narrow_only {
            entry.narrow_bound
        } else {
            entry.narrow_bound.or(entry.wide_bound)
        }
    }

    pub fn get_param_spec_type(&self, key: TypeVarKey) -> Option<TypeId> {
        self.signature_contexts[0].get_param_spec(key)
    }

    pub fn get_tuple_type_var(&self, key: TypeVarKey) -> Option<Arc<[TupleTypeArg]>> {
        self.signature_contexts[0].get_tuple_type_var(key)
    }
}

impl Default for TypeVarContext {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
#[path = "tests/type_var_context_tests.rs"]
mod tests;
