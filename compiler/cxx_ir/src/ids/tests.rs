use super::*;

#[test]
fn test_id_invalid_sentinel() {
    assert!(!ExprId::INVALID.is_valid());
    assert!(ExprId::new(3).is_valid());
    assert_eq!(ExprId::default(), ExprId::INVALID);
    assert_eq!(format!("{:?}", DeclId::new(7)), "DeclId(7)");
    assert_eq!(format!("{:?}", DeclId::INVALID), "DeclId::INVALID");
}

#[test]
fn test_range_iter_yields_ids() {
    let range = ParamRange::new(4, 3);
    let ids: Vec<ParamId> = range.iter().collect();
    assert_eq!(ids, vec![ParamId::new(4), ParamId::new(5), ParamId::new(6)]);
    assert_eq!(range.indices(), 4..7);
}

#[test]
fn test_empty_range() {
    let range = ExprRange::EMPTY;
    assert!(range.is_empty());
    assert_eq!(range.len(), 0);
    assert_eq!(range, ExprRange::default());
}
