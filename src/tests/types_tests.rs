use super::*;
use crate::interner::Atom;

#[test]
fn test_sentinel_ids() {
    assert!(TypeId::UNBOUND.is_sentinel());
    assert!(TypeId::UNKNOWN.is_sentinel());
    assert!(TypeId::ANY.is_sentinel());
    assert!(TypeId::NONE.is_sentinel());
    assert!(TypeId::NEVER.is_sentinel());
    assert!(!TypeId::INVALID.is_sentinel());
    assert!(!TypeId(TypeId::FIRST_USER).is_sentinel());
    assert!(!TypeId::INVALID.is_valid());
    assert!(TypeId::ANY.is_valid());
}

#[test]
fn test_type_data_builders() {
    let data = TypeData::new(TypeKind::Any, TypeFlags::INSTANCE | TypeFlags::INSTANTIABLE);
    assert!(data.is_instance());
    assert!(data.is_instantiable());
    assert!(data.alias.is_none());
    assert!(data.condition.is_none());

    let conditioned = data.clone().with_condition(vec![TypeCondition {
        type_var_name: Atom(7),
        scope_id: Some(TypeVarScopeId(1)),
        constraint_index: 0,
    }]);
    assert_eq!(conditioned.condition.as_ref().map(|c| c.len()), Some(1));

    // An empty condition list normalizes to no condition.
    let empty = data.with_condition(Vec::new());
    assert!(empty.condition.is_none());
}

#[test]
fn test_param_separators() {
    let keyword = FunctionParam::keyword_separator();
    assert!(keyword.is_keyword_separator());
    assert!(!keyword.is_position_only_separator());

    let positional = FunctionParam::position_only_separator();
    assert!(positional.is_position_only_separator());
    assert!(!positional.is_keyword_separator());

    let named = FunctionParam::args_list(Atom(3), TypeId::ANY);
    assert!(!named.is_keyword_separator());
}

#[test]
fn test_effective_types_prefer_overlay() {
    let mut shape = FunctionShape::new(
        Atom(1),
        vec![FunctionParam::simple(Atom(2), TypeId::ANY)],
        Some(TypeId::ANY),
    );
    assert_eq!(shape.effective_param_type(0), TypeId::ANY);
    assert_eq!(shape.effective_return_type(), Some(TypeId::ANY));

    shape.specialized = Some(SpecializedFunction {
        param_types: vec![TypeId::UNKNOWN],
        default_arg_types: None,
        return_type: TypeId::NEVER,
    });
    assert_eq!(shape.effective_param_type(0), TypeId::UNKNOWN);
    assert_eq!(shape.effective_return_type(), Some(TypeId::NEVER));
}

#[test]
fn test_effective_return_falls_back_to_inferred() {
    let mut shape = FunctionShape::new(Atom(1), Vec::new(), None);
    assert_eq!(shape.effective_return_type(), None);
    shape.inferred_return = Some(TypeId::NONE);
    assert_eq!(shape.effective_return_type(), Some(TypeId::NONE));
}

#[test]
fn test_symbol_helpers() {
    let typed = Symbol::instance_member(Some(TypeId::ANY));
    assert!(typed.has_typed_declarations());
    assert!(typed.flags.contains(SymbolFlags::INSTANCE_MEMBER));

    let untyped = Symbol::class_member(None);
    assert!(!untyped.has_typed_declarations());

    let class_var = Symbol::class_var(Some(TypeId::ANY));
    assert!(class_var.flags.contains(SymbolFlags::CLASS_VAR));
    assert!(class_var.flags.contains(SymbolFlags::CLASS_MEMBER));
}

#[test]
fn test_type_var_shape_key() {
    let a = TypeVarShape::plain(Atom(5), Some(TypeVarScopeId(1)));
    let b = TypeVarShape::param_spec(Atom(5), Some(TypeVarScopeId(1)));
    // Identity is (name, scope); the kind is not part of it.
    assert_eq!(a.key(), b.key());

    let other_scope = TypeVarShape::plain(Atom(5), Some(TypeVarScopeId(2)));
    assert_ne!(a.key(), other_scope.key());
}
