use pretty_assertions::assert_eq;

use super::*;

#[test]
fn integer_arithmetic_folds() {
    assert_eq!(fold_binary(BinaryOp::Add, Value::Int(2), Value::Int(3)), Some(Value::Int(5)));
    assert_eq!(fold_binary(BinaryOp::Shl, Value::Int(1), Value::Int(4)), Some(Value::Int(16)));
    assert_eq!(fold_binary(BinaryOp::Rem, Value::Int(7), Value::Int(4)), Some(Value::Int(3)));
    assert_eq!(fold_binary(BinaryOp::Lt, Value::Int(1), Value::Int(2)), Some(Value::Bool(true)));
}

#[test]
fn division_by_zero_is_not_constant() {
    assert_eq!(fold_binary(BinaryOp::Div, Value::Int(1), Value::Int(0)), None);
    assert_eq!(fold_binary(BinaryOp::Div, Value::float(1.0), Value::float(0.0)), None);
}

#[test]
fn overflow_is_not_constant() {
    assert_eq!(fold_binary(BinaryOp::Mul, Value::Int(i64::MAX), Value::Int(2)), None);
    assert_eq!(fold_unary(UnaryOp::Neg, Value::Int(i64::MIN)), None);
}

#[test]
fn mixed_operands_fold_as_floating() {
    assert_eq!(fold_binary(BinaryOp::Mul, Value::Int(2), Value::float(1.5)), Some(Value::float(3.0)));
    assert_eq!(fold_unary(UnaryOp::Neg, Value::float(2.5)), Some(Value::float(-2.5)));
}

#[test]
fn logical_operators_yield_bool() {
    assert_eq!(fold_binary(BinaryOp::And, Value::Int(1), Value::Bool(false)), Some(Value::Bool(false)));
    assert_eq!(fold_unary(UnaryOp::Not, Value::Int(0)), Some(Value::Bool(true)));
    assert_eq!(fold_unary(UnaryOp::Plus, Value::Bool(true)), Some(Value::Int(1)));
}
