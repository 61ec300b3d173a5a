use super::*;

#[test]
fn builtin_indices_follow_declaration_order() {
    for (i, builtin) in BuiltinType::ALL.iter().enumerate() {
        assert_eq!(Idx::builtin(*builtin).raw() as usize, i);
        assert_eq!(Idx::builtin(*builtin).as_builtin(), Some(*builtin));
    }
    assert_eq!(Idx::builtin(BuiltinType::Int), Idx::INT);
    assert_eq!(Idx::builtin(BuiltinType::NullPtr), Idx::NULLPTR);
}

#[test]
fn problem_indices_round_trip() {
    for kind in ProblemKind::ALL {
        let idx = Idx::problem(kind);
        assert!(idx.is_problem());
        assert_eq!(idx.as_problem(), Some(kind));
        assert_eq!(idx.as_builtin(), None);
    }
    assert!(!Idx::INT.is_problem());
    assert!(!Idx::DEPENDENT.is_problem());
}

#[test]
fn shard_local_encoding() {
    let idx = Idx::from_shard_local(3, 77);
    assert_eq!(idx.shard(), 3);
    assert_eq!(idx.local(), 77);
    assert_eq!(format!("{idx:?}"), "Idx(3:77)");
}
