use super::*;

#[test]
fn test_builtin_classification() {
    assert!(BuiltinType::Int.is_integral());
    assert!(BuiltinType::Bool.is_integral());
    assert!(!BuiltinType::Double.is_integral());
    assert!(BuiltinType::Double.is_floating());
    assert!(!BuiltinType::NullPtr.is_arithmetic());
    assert!(BuiltinType::UInt.is_unsigned());
    assert_eq!(BuiltinType::Short.integer_rank(), Some(2));
    assert_eq!(BuiltinType::Float.integer_rank(), None);
}

#[test]
fn test_operator_function_names() {
    assert_eq!(BinaryOp::Add.function_name(), "operator+");
    assert_eq!(UnaryOp::PostInc.function_name(), "operator++");
    assert!(BinaryOp::Le.is_comparison());
    assert!(BinaryOp::AddAssign.is_assignment());
}

#[test]
fn test_builtin_all_is_exhaustive() {
    assert_eq!(BuiltinType::ALL.len(), 20);
    assert_eq!(BuiltinType::ALL[10], BuiltinType::Int);
}
