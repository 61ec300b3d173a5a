use super::*;
use cxx_ir::Name;
use pretty_assertions::assert_eq;

fn param(index: u16) -> ParamRef {
    ParamRef::new(0, index, false, Name::EMPTY)
}

fn pack(index: u16) -> ParamRef {
    ParamRef::new(0, index, true, Name::EMPTY)
}

#[test]
fn substitutes_nested_params() {
    let pool = TypePool::new();
    let t = pool.template_param(param(0));
    let pattern = pool.pointer(pool.const_of(t));

    let mut env = ParamBindings::new();
    env.insert(param(0), TemplateArg::Type(Idx::CHAR));
    let result = subst(&pool, pattern, &mut env);
    assert_eq!(result, pool.pointer(pool.const_of(Idx::CHAR)));
}

#[test]
fn unbound_params_stay_in_place() {
    let pool = TypePool::new();
    let t = pool.template_param(param(0));
    let u = pool.template_param(param(1));
    let f = pool.function(&[t, u], t, false);

    let mut env = ParamBindings::new();
    env.insert(param(0), TemplateArg::Type(Idx::INT));
    let result = subst(&pool, f, &mut env);
    assert_eq!(result, pool.function(&[Idx::INT, u], Idx::INT, false));
    assert!(pool.is_dependent(result));
}

#[test]
fn forwarding_reference_collapses() {
    let pool = TypePool::new();
    let t = pool.template_param(param(0));
    let fwd = pool.rvalue_ref(t);

    let mut env = ParamBindings::new();
    env.insert(param(0), TemplateArg::Type(pool.lvalue_ref(Idx::INT)));
    assert_eq!(subst(&pool, fwd, &mut env), pool.lvalue_ref(Idx::INT));
}

#[test]
fn pack_expansion_in_parameter_list() {
    let pool = TypePool::new();
    let ts = pool.template_param(pack(0));
    let expansion = pool.pack_expansion(pool.lvalue_ref(ts));
    let f = pool.function(&[Idx::INT, expansion], Idx::VOID, false);

    let mut env = ParamBindings::new();
    env.insert(
        pack(0),
        TemplateArg::Pack(vec![TemplateArg::Type(Idx::CHAR), TemplateArg::Type(Idx::DOUBLE)].into()),
    );
    let result = subst(&pool, f, &mut env);
    let expected = pool.function(
        &[Idx::INT, pool.lvalue_ref(Idx::CHAR), pool.lvalue_ref(Idx::DOUBLE)],
        Idx::VOID,
        false,
    );
    assert_eq!(result, expected);
}

#[test]
fn empty_pack_expands_to_nothing() {
    let pool = TypePool::new();
    let ts = pool.template_param(pack(0));
    let f = pool.function(&[pool.pack_expansion(ts)], Idx::VOID, false);

    let mut env = ParamBindings::new();
    env.insert(pack(0), TemplateArg::Pack(Vec::new().into()));
    assert_eq!(subst(&pool, f, &mut env), pool.function(&[], Idx::VOID, false));
}

#[test]
fn mismatched_pack_lengths_fail() {
    let pool = TypePool::new();
    let ts = pool.template_param(pack(0));
    let us = pool.template_param(pack(1));
    let pair = pool.function(&[ts], us, false);
    let list = [pool.pack_expansion(pool.pointer(pair))];

    let mut env = ParamBindings::new();
    env.insert(pack(0), TemplateArg::Pack(vec![TemplateArg::Type(Idx::INT)].into()));
    env.insert(pack(1), TemplateArg::Pack(Vec::new().into()));
    let result = subst_list(&pool, &list, &mut env);
    assert_eq!(result, vec![Idx::problem(ProblemKind::DeductionFailure)]);
}

#[test]
fn specialization_args_expand_packs() {
    let pool = TypePool::new();
    let ts = pool.template_param(pack(0));
    let template = SymbolId::new(3);
    let spec = pool.specialization(
        template,
        vec![TemplateArg::Pack(vec![TemplateArg::Type(pool.pack_expansion(ts))].into())],
    );

    let mut env = ParamBindings::new();
    env.insert(
        pack(0),
        TemplateArg::Pack(vec![TemplateArg::Type(Idx::INT), TemplateArg::Type(Idx::BOOL)].into()),
    );
    let result = subst(&pool, spec, &mut env);
    let expected = pool.specialization(
        template,
        vec![TemplateArg::Pack(
            vec![TemplateArg::Type(Idx::INT), TemplateArg::Type(Idx::BOOL)].into(),
        )],
    );
    assert_eq!(result, expected);
    assert!(!pool.is_dependent(result));
}

#[test]
fn non_type_params_substitute_values() {
    let pool = TypePool::new();
    let n = ParamRef::new(0, 0, false, Name::EMPTY);
    let mut env = ParamBindings::new();
    env.insert(n, TemplateArg::Value(Value::Int(4)));

    assert_eq!(subst_value(Value::Param(n), &env), Value::Int(4));
    let args = subst_args(&pool, &[TemplateArg::Value(Value::Param(n))], &mut env);
    assert_eq!(args, vec![TemplateArg::Value(Value::Int(4))]);
}

struct MemberEnv(ParamBindings);

impl SubstEnv for MemberEnv {
    fn lookup_param(&self, param: ParamRef) -> Option<TemplateArg> {
        self.0.lookup_param(param)
    }

    fn member_type(&mut self, _pool: &TypePool, scope: Idx, _name: Name) -> Idx {
        if scope == Idx::INT {
            Idx::LONG
        } else {
            Idx::problem(ProblemKind::UnresolvedName)
        }
    }
}

#[test]
fn dependent_member_resolves_once_scope_is_concrete() {
    let pool = TypePool::new();
    let t = pool.template_param(param(0));
    let member = pool.dependent_member(t, Name::EMPTY);

    let mut env = MemberEnv(ParamBindings::new());
    assert_eq!(subst(&pool, member, &mut env), member);

    env.0.insert(param(0), TemplateArg::Type(Idx::INT));
    assert_eq!(subst(&pool, member, &mut env), Idx::LONG);
}

#[test]
fn unexpanded_packs_skips_expansions() {
    let pool = TypePool::new();
    let ts = pool.template_param(pack(0));
    let us = pool.template_param(pack(1));
    let f = pool.function(&[pool.pack_expansion(ts), us], Idx::VOID, false);
    assert_eq!(unexpanded_packs(&pool, f).as_slice(), &[pack(1)]);
}
