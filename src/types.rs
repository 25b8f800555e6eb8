//! Type representation for the type algebra.
//!
//! Types are represented as lightweight `TypeId` handles that point into
//! an interning table. The actual structure is stored in `TypeData`.

use crate::def::ClassDefId;
use crate::interner::Atom;
use serde::Serialize;

/// Depth budget for every recursive walk over types. Above this the
/// operation returns its input unchanged (conservatively correct).
pub const MAX_TYPE_RECURSION_DEPTH: u32 = 64;

/// A lightweight handle to an interned type.
/// Equality check is O(1) - just compare the u32 values.
///
/// # Sentinel Value Semantics
///
/// ## `TypeId::UNBOUND`
/// A name that has no binding on some code path. Member access on an
/// unbound value is always an error at the checker layer; the algebra
/// simply carries the tag through.
///
/// ## `TypeId::UNKNOWN`
/// A type the checker could not determine. Unlike `ANY`, `UNKNOWN` marks
/// *missing* information rather than *declared* dynamism; the two are kept
/// distinct through every operation (see `preserve_unknown`).
///
/// ## `TypeId::ANY`
/// The gradual-typing escape hatch. Compatible with everything in both
/// directions; substitution and specialization leave it untouched.
///
/// ## `TypeId::NONE`
/// The singleton `None` value's type. Like the other untyped sentinels it
/// carries both the instance and instantiable flags.
///
/// ## `TypeId::NEVER`
/// The bottom type. Absorbed by union construction; a union that loses all
/// of its subtypes collapses to `NEVER`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Default)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Internal placeholder - no valid type.
    pub const INVALID: TypeId = TypeId(0);

    /// A name with no binding on the current code path.
    pub const UNBOUND: TypeId = TypeId(1);

    /// Type information is unavailable. Distinct from `ANY`.
    pub const UNKNOWN: TypeId = TypeId(2);

    /// The gradual `Any` type - declared dynamism.
    pub const ANY: TypeId = TypeId(3);

    /// The type of `None`.
    pub const NONE: TypeId = TypeId(4);

    /// The bottom type - no value inhabits it.
    pub const NEVER: TypeId = TypeId(5);

    /// First user-defined type ID (after built-in sentinels).
    pub const FIRST_USER: u32 = 16;

    pub fn is_sentinel(self) -> bool {
        self.0 != 0 && self.0 < Self::FIRST_USER
    }

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

/// Interned list of TypeId values (union subtypes, overloads, type arguments).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeListId(pub u32);

/// Interned tuple element list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleListId(pub u32);

/// Interned class instantiation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassId(pub u32);

/// Interned function shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionId(pub u32);

/// Interned type variable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeVarId(pub u32);

/// Interned module shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModuleId(pub u32);

/// Identifier for a type-variable scope (a generic class, function, or
/// type alias declaration).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TypeVarScopeId(pub u32);

impl TypeVarScopeId {
    /// The wildcard scope: a substitution context carrying it solves
    /// variables from every scope.
    pub const WILDCARD: TypeVarScopeId = TypeVarScopeId(u32::MAX);
}

bitflags::bitflags! {
    /// Form flags carried on every type.
    ///
    /// Untyped sentinels (`Any`, `Unknown`, `Unbound`, `None`, `Never`) set
    /// both bits; a class or type variable is in exactly one form at a time.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct TypeFlags: u32 {
        /// The value form: an object of the class, a bound type variable.
        const INSTANCE = 1 << 0;
        /// The type form: the class object itself, `type[C]` positions.
        const INSTANTIABLE = 1 << 1;
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct FunctionFlags: u32 {
        /// The function is the value of a parameter specification, not a
        /// real callable declaration.
        const PARAM_SPEC_VALUE = 1 << 0;
        /// Suppress arity checking of `*args`/`**kwargs` (gradual form).
        const SKIP_ARGS_KWARGS_CHECK = 1 << 1;
        /// The signature was synthesized by the algebra (spliced variadics,
        /// generated overloads), not written by the user.
        const SYNTHESIZED = 1 << 2;
    }
}

bitflags::bitflags! {
    /// Flags on a symbol-table entry.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct SymbolFlags: u32 {
        const INSTANCE_MEMBER = 1 << 0;
        const CLASS_MEMBER = 1 << 1;
        const CLASS_VAR = 1 << 2;
    }
}

/// A narrowing predicate attached to a type: the type is valid only while
/// the named type variable is bound to the constraint at `constraint_index`.
/// A list of conditions is the AND of its clauses.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeCondition {
    pub type_var_name: Atom,
    pub scope_id: Option<TypeVarScopeId>,
    pub constraint_index: u32,
}

/// Alias metadata preserved on a type that was spelled through a type alias.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeAliasInfo {
    pub name: Atom,
    pub full_name: Atom,
    pub type_var_scope_id: TypeVarScopeId,
    /// Declared type parameters of the alias (TypeVar types).
    pub type_params: Vec<TypeId>,
    /// Applied type arguments, if the alias was specialized.
    pub type_args: Option<Vec<TypeId>>,
}

/// The structural content of a type. This is the key used for interning -
/// structurally identical types have the same `TypeId`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Unbound,
    Unknown,
    Any,
    None,
    Never,
    Class(ClassId),
    Function(FunctionId),
    /// An ordered sequence of Function-kind overloads.
    Overloaded(TypeListId),
    Module(ModuleId),
    Union {
        members: TypeListId,
        /// Pruning hint: some member is (or contains) a recursive type
        /// alias placeholder.
        includes_recursive_alias: bool,
    },
    TypeVar(TypeVarId),
}

/// The interned record behind a `TypeId`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeData {
    pub kind: TypeKind,
    pub flags: TypeFlags,
    pub alias: Option<TypeAliasInfo>,
    pub condition: Option<Vec<TypeCondition>>,
}

impl TypeData {
    pub fn new(kind: TypeKind, flags: TypeFlags) -> Self {
        TypeData {
            kind,
            flags,
            alias: None,
            condition: None,
        }
    }

    pub fn with_alias(mut self, alias: TypeAliasInfo) -> Self {
        self.alias = Some(alias);
        self
    }

    pub fn with_condition(mut self, condition: Vec<TypeCondition>) -> Self {
        self.condition = if condition.is_empty() {
            None
        } else {
            Some(condition)
        };
        self
    }

    pub fn is_instance(&self) -> bool {
        self.flags.contains(TypeFlags::INSTANCE)
    }

    pub fn is_instantiable(&self) -> bool {
        self.flags.contains(TypeFlags::INSTANTIABLE)
    }
}

/// Literal values for literal types (`Literal[3]`, `Literal["r"]`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    Int(i64),
    Str(Atom),
    Bytes(Atom),
    Bool(bool),
    /// An enum member, identified by its attribute name.
    EnumMember(Atom),
}

/// One element of a tuple class's structural element list.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleTypeArg {
    pub ty: TypeId,
    /// `tuple[int, ...]` - the element repeats zero or more times.
    pub is_unbounded: bool,
}

impl TupleTypeArg {
    pub fn fixed(ty: TypeId) -> Self {
        TupleTypeArg {
            ty,
            is_unbounded: false,
        }
    }

    pub fn unbounded(ty: TypeId) -> Self {
        TupleTypeArg {
            ty,
            is_unbounded: true,
        }
    }
}

/// A class instantiation: shared declaration details live in the
/// `DefinitionStore` under `def`; this shape carries only what varies per
/// specialization.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassShape {
    pub def: ClassDefId,
    /// Applied type arguments, same length as the declared parameters.
    /// Absent = unspecialized.
    pub type_args: Option<Vec<TypeId>>,
    /// For tuple classes: the ordered structural element list.
    pub tuple_type_args: Option<Vec<TupleTypeArg>>,
    /// Tuple class used as an unpacked variadic (`*tuple[int, str]`).
    pub is_unpacked: bool,
    /// Literal classes: the compile-time value (`Literal[3]`).
    pub literal: Option<LiteralValue>,
}

impl ClassShape {
    pub fn unspecialized(def: ClassDefId) -> Self {
        ClassShape {
            def,
            type_args: None,
            tuple_type_args: None,
            is_unpacked: false,
            literal: None,
        }
    }
}

/// Parameter category, as supplied by the parser.
///
/// Separators follow the unnamed convention: an unnamed `Simple` parameter
/// is the position-only separator (`/`), an unnamed `ArgsList` parameter is
/// the keyword-only separator (`*`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParamCategory {
    /// Positional-or-keyword parameter.
    Simple,
    /// `*args` variadic positional.
    ArgsList,
    /// `**kwargs` variadic keyword.
    KwargsDict,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionParam {
    pub category: ParamCategory,
    pub name: Option<Atom>,
    pub ty: TypeId,
    pub has_default: bool,
    pub default_type: Option<TypeId>,
}

impl FunctionParam {
    pub fn simple(name: Atom, ty: TypeId) -> Self {
        FunctionParam {
            category: ParamCategory::Simple,
            name: Some(name),
            ty,
            has_default: false,
            default_type: None,
        }
    }

    pub fn args_list(name: Atom, ty: TypeId) -> Self {
        FunctionParam {
            category: ParamCategory::ArgsList,
            name: Some(name),
            ty,
            has_default: false,
            default_type: None,
        }
    }

    pub fn kwargs_dict(name: Atom, ty: TypeId) -> Self {
        FunctionParam {
            category: ParamCategory::KwargsDict,
            name: Some(name),
            ty,
            has_default: false,
            default_type: None,
        }
    }

    /// The `*` keyword-only separator.
    pub fn keyword_separator() -> Self {
        FunctionParam {
            category: ParamCategory::ArgsList,
            name: None,
            ty: TypeId::UNKNOWN,
            has_default: false,
            default_type: None,
        }
    }

    /// The `/` position-only separator.
    pub fn position_only_separator() -> Self {
        FunctionParam {
            category: ParamCategory::Simple,
            name: None,
            ty: TypeId::UNKNOWN,
            has_default: false,
            default_type: None,
        }
    }

    pub fn is_keyword_separator(&self) -> bool {
        self.category == ParamCategory::ArgsList && self.name.is_none()
    }

    pub fn is_position_only_separator(&self) -> bool {
        self.category == ParamCategory::Simple && self.name.is_none()
    }
}

/// Substituted overlay attached to a specialized function. Parallel to the
/// declared parameter list: `param_types.len() == params.len()`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpecializedFunction {
    pub param_types: Vec<TypeId>,
    /// Substituted default-argument types, parallel to `params`;
    /// `TypeId::INVALID` where a parameter has no default.
    pub default_arg_types: Option<Vec<TypeId>>,
    pub return_type: TypeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShape {
    pub name: Atom,
    pub flags: FunctionFlags,
    pub params: Vec<FunctionParam>,
    pub declared_return: Option<TypeId>,
    pub inferred_return: Option<TypeId>,
    /// Parameter specification bound at the tail of the signature
    /// (`def f(x: int, *args: P.args, **kwargs: P.kwargs)` after stripping,
    /// or a Concatenate remainder).
    pub param_spec: Option<TypeId>,
    pub specialized: Option<SpecializedFunction>,
}

impl FunctionShape {
    pub fn new(name: Atom, params: Vec<FunctionParam>, declared_return: Option<TypeId>) -> Self {
        FunctionShape {
            name,
            flags: FunctionFlags::default(),
            params,
            declared_return,
            inferred_return: None,
            param_spec: None,
            specialized: None,
        }
    }

    /// The substituted parameter type if an overlay is present, else the
    /// declared one.
    pub fn effective_param_type(&self, index: usize) -> TypeId {
        if let Some(specialized) = &self.specialized {
            if let Some(&ty) = specialized.param_types.get(index) {
                return ty;
            }
        }
        self.params
            .get(index)
            .map(|p| p.ty)
            .unwrap_or(TypeId::UNKNOWN)
    }

    /// Overlay return type, else declared, else inferred.
    pub fn effective_return_type(&self) -> Option<TypeId> {
        if let Some(specialized) = &self.specialized {
            return Some(specialized.return_type);
        }
        self.declared_return.or(self.inferred_return)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeVarKind {
    /// An ordinary type variable standing for a single type.
    Plain,
    /// A parameter specification standing for an entire parameter list.
    ParamSpec,
    /// A variadic type variable standing for an ordered sequence of types.
    Variadic,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Variance {
    Unknown,
    Invariant,
    Covariant,
    Contravariant,
    /// Inferred from usage (PEP 695 `infer_variance`).
    Auto,
}

/// `P.args` / `P.kwargs` member access on a parameter specification.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParamSpecAccess {
    Args,
    Kwargs,
}

/// Placeholder marker for a recursive type alias under construction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecursiveAliasInfo {
    pub name: Atom,
    pub scope_id: TypeVarScopeId,
}

/// Identity of a type variable: the (name, scope) pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeVarKey {
    pub name: Atom,
    pub scope_id: Option<TypeVarScopeId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeVarShape {
    pub name: Atom,
    pub scope_id: Option<TypeVarScopeId>,
    pub kind: TypeVarKind,
    pub variance: Variance,
    pub bound: Option<TypeId>,
    pub default: Option<TypeId>,
    pub access: Option<ParamSpecAccess>,
    /// The variadic was written inside a union position (`Union[*Ts]`).
    pub is_variadic_in_union: bool,
    /// The variadic appears in unpacked form (`*Ts`).
    pub is_variadic_unpacked: bool,
    /// Synthesized `Self` for method binding.
    pub is_synthesized_self: bool,
    /// Set when this variable is a recursive type alias placeholder.
    /// Invariant: when present, `bound` is also present once the alias is
    /// resolved.
    pub recursive_alias: Option<RecursiveAliasInfo>,
}

impl TypeVarShape {
    pub fn plain(name: Atom, scope_id: Option<TypeVarScopeId>) -> Self {
        TypeVarShape {
            name,
            scope_id,
            kind: TypeVarKind::Plain,
            variance: Variance::Unknown,
            bound: None,
            default: None,
            access: None,
            is_variadic_in_union: false,
            is_variadic_unpacked: false,
            is_synthesized_self: false,
            recursive_alias: None,
        }
    }

    pub fn param_spec(name: Atom, scope_id: Option<TypeVarScopeId>) -> Self {
        TypeVarShape {
            kind: TypeVarKind::ParamSpec,
            ..Self::plain(name, scope_id)
        }
    }

    pub fn variadic(name: Atom, scope_id: Option<TypeVarScopeId>) -> Self {
        TypeVarShape {
            kind: TypeVarKind::Variadic,
            ..Self::plain(name, scope_id)
        }
    }

    pub fn key(&self) -> TypeVarKey {
        TypeVarKey {
            name: self.name,
            scope_id: self.scope_id,
        }
    }
}

/// Module namespace type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModuleShape {
    pub name: Atom,
}

/// A symbol-table entry: declaration kind flags plus the declared type,
/// when the declarations carry one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Symbol {
    pub flags: SymbolFlags,
    pub declared_type: Option<TypeId>,
}

impl Symbol {
    pub fn instance_member(declared_type: Option<TypeId>) -> Self {
        Symbol {
            flags: SymbolFlags::INSTANCE_MEMBER,
            declared_type,
        }
    }

    pub fn class_member(declared_type: Option<TypeId>) -> Self {
        Symbol {
            flags: SymbolFlags::CLASS_MEMBER,
            declared_type,
        }
    }

    pub fn class_var(declared_type: Option<TypeId>) -> Self {
        Symbol {
            flags: SymbolFlags::CLASS_MEMBER | SymbolFlags::CLASS_VAR,
            declared_type,
        }
    }

    pub fn has_typed_declarations(&self) -> bool {
        self.declared_type.is_some()
    }
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
