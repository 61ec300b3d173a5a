use super::*;
use cxx_ir::Name;
use cxx_types::SymbolId;
use pretty_assertions::assert_eq;

fn param(index: u16) -> ParamRef {
    ParamRef::new(0, index, false, Name::EMPTY)
}

fn pack(index: u16) -> ParamRef {
    ParamRef::new(0, index, true, Name::EMPTY)
}

fn lvalue(ty: Idx) -> CallArg {
    CallArg {
        ty: Some(ty),
        category: ValueCategory::LValue,
    }
}

fn prvalue(ty: Idx) -> CallArg {
    CallArg {
        ty: Some(ty),
        category: ValueCategory::PRValue,
    }
}

#[test]
fn const_reference_deduces_unqualified_type() {
    let pool = TypePool::new();
    let t = pool.template_param(param(0));
    let p = pool.lvalue_ref(pool.const_of(t));

    let mut deduction = Deduction::new(&pool, 0);
    assert!(deduction.deduce_call(&[p], &[lvalue(Idx::INT)]));
    assert_eq!(deduction.bindings.get(param(0)), Some(&TemplateArg::Type(Idx::INT)));
}

#[test]
fn forwarding_reference_keeps_lvalue_ness() {
    let pool = TypePool::new();
    let t = pool.template_param(param(0));
    let p = pool.rvalue_ref(t);

    let mut from_lvalue = Deduction::new(&pool, 0);
    assert!(from_lvalue.deduce_call(&[p], &[lvalue(Idx::INT)]));
    assert_eq!(
        from_lvalue.bindings.get(param(0)),
        Some(&TemplateArg::Type(pool.lvalue_ref(Idx::INT)))
    );

    let mut from_prvalue = Deduction::new(&pool, 0);
    assert!(from_prvalue.deduce_call(&[p], &[prvalue(Idx::INT)]));
    assert_eq!(from_prvalue.bindings.get(param(0)), Some(&TemplateArg::Type(Idx::INT)));
}

#[test]
fn by_value_parameter_deduces_decayed_argument() {
    let pool = TypePool::new();
    let t = pool.template_param(param(0));
    let array = pool.array(Idx::CHAR, Some(4));

    let mut deduction = Deduction::new(&pool, 0);
    assert!(deduction.deduce_call(&[t], &[lvalue(array)]));
    assert_eq!(
        deduction.bindings.get(param(0)),
        Some(&TemplateArg::Type(pool.pointer(Idx::CHAR)))
    );
}

#[test]
fn conflicting_deductions_fail() {
    let pool = TypePool::new();
    let t = pool.template_param(param(0));

    let mut deduction = Deduction::new(&pool, 0);
    assert!(!deduction.deduce_call(&[t, t], &[prvalue(Idx::INT), prvalue(Idx::DOUBLE)]));

    let mut agreeing = Deduction::new(&pool, 0);
    assert!(agreeing.deduce_call(&[t, t], &[prvalue(Idx::INT), lvalue(Idx::INT)]));
}

#[test]
fn pointer_pattern_rejects_non_pointer() {
    let pool = TypePool::new();
    let t = pool.template_param(param(0));

    let mut deduction = Deduction::new(&pool, 0);
    assert!(!deduction.deduce(pool.pointer(t), Idx::INT));

    let mut nested = Deduction::new(&pool, 0);
    assert!(nested.deduce(pool.pointer(t), pool.pointer(pool.pointer(Idx::INT))));
    assert_eq!(
        nested.bindings.get(param(0)),
        Some(&TemplateArg::Type(pool.pointer(Idx::INT)))
    );
}

#[test]
fn trailing_pack_absorbs_remaining_arguments() {
    let pool = TypePool::new();
    let t = pool.template_param(param(0));
    let ts = pool.pack_expansion(pool.template_param(pack(1)));

    let mut deduction = Deduction::new(&pool, 0);
    let args = [prvalue(Idx::INT), prvalue(Idx::CHAR), lvalue(Idx::DOUBLE)];
    assert!(deduction.deduce_call(&[t, ts], &args));
    assert_eq!(deduction.bindings.get(param(0)), Some(&TemplateArg::Type(Idx::INT)));
    let expected: Arc<[TemplateArg]> = Arc::from(vec![TemplateArg::Type(Idx::CHAR), TemplateArg::Type(Idx::DOUBLE)]);
    assert_eq!(deduction.bindings.get(pack(1)), Some(&TemplateArg::Pack(expected)));
}

#[test]
fn empty_pack_is_valid() {
    let pool = TypePool::new();
    let ts = pool.pack_expansion(pool.template_param(pack(0)));

    let mut deduction = Deduction::new(&pool, 0);
    assert!(deduction.deduce_call(&[ts], &[]));
    let empty: Arc<[TemplateArg]> = Arc::from(Vec::new());
    assert_eq!(deduction.bindings.get(pack(0)), Some(&TemplateArg::Pack(empty)));
}

#[test]
fn specialization_arguments_deduce() {
    let pool = TypePool::new();
    let vector = SymbolId::new(7);
    let other = SymbolId::new(8);
    let t = pool.template_param(param(0));
    let p = pool.specialization(vector, vec![TemplateArg::Type(t)]);

    let mut deduction = Deduction::new(&pool, 0);
    let a = pool.specialization(vector, vec![TemplateArg::Type(Idx::LONG)]);
    assert!(deduction.deduce(p, a));
    assert_eq!(deduction.bindings.get(param(0)), Some(&TemplateArg::Type(Idx::LONG)));

    let mut mismatch = Deduction::new(&pool, 0);
    let b = pool.specialization(other, vec![TemplateArg::Type(Idx::LONG)]);
    assert!(!mismatch.deduce(p, b));
}

#[test]
fn parameters_of_other_lists_only_match_themselves() {
    let pool = TypePool::new();
    let outer = pool.template_param(ParamRef::new(1, 0, false, Name::EMPTY));

    let mut deduction = Deduction::new(&pool, 0);
    assert!(!deduction.deduce(outer, Idx::INT));
    assert!(deduction.deduce(outer, outer));
    assert!(deduction.bindings.is_empty());
}

#[test]
fn members_of_dependent_types_are_not_deduced() {
    let pool = TypePool::new();
    let t = pool.template_param(param(0));
    let member = pool.dependent_member(t, Name::EMPTY);

    let mut deduction = Deduction::new(&pool, 0);
    assert!(deduction.deduce_call(&[member, t], &[prvalue(Idx::INT), prvalue(Idx::CHAR)]));
    assert_eq!(deduction.bindings.get(param(0)), Some(&TemplateArg::Type(Idx::CHAR)));
}

#[test]
fn overload_set_arguments_are_skipped() {
    let pool = TypePool::new();
    let t = pool.template_param(param(0));
    let set = CallArg {
        ty: None,
        category: ValueCategory::LValue,
    };

    let mut deduction = Deduction::new(&pool, 0);
    assert!(deduction.deduce_call(&[t], &[set]));
    assert!(deduction.bindings.is_empty());
}
