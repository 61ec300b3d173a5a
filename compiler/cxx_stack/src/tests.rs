use super::*;

/// Nesting depth of a chain like `((((0))))`, walked recursively.
fn nesting(n: u32) -> u32 {
    ensure_sufficient_stack(|| if n == 0 { 0 } else { 1 + nesting(n - 1) })
}

#[test]
fn deep_nesting_does_not_overflow() {
    assert_eq!(nesting(100_000), 100_000);
}

#[test]
fn shallow_calls_pass_the_result_through() {
    assert_eq!(nesting(3), 3);
    let result: Result<u32, &str> = ensure_sufficient_stack(|| Err("unresolved"));
    assert_eq!(result, Err("unresolved"));
}
