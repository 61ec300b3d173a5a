use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_problem_codes_are_distinct() {
    let mut codes: Vec<_> = ProblemKind::ALL.iter().map(|k| k.code().as_str()).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), ProblemKind::ALL.len());
}

#[test]
fn test_index_matches_all_order() {
    for (i, kind) in ProblemKind::ALL.iter().enumerate() {
        assert_eq!(kind.index(), i);
    }
}

#[test]
fn test_problem_is_std_error() {
    let problem = Problem::new(ProblemKind::Ambiguous, Span::new(1, 2));
    let err: &dyn std::error::Error = &problem;
    assert_eq!(err.to_string(), "ambiguous reference");
}

#[test]
fn test_to_diagnostic_names_subject() {
    let interner = StringInterner::new();
    let problem =
        Problem::new(ProblemKind::NoViableCandidate, Span::new(4, 5)).with_name(interner.intern("g"));
    let diag = problem.to_diagnostic(&interner);

    assert_eq!(diag.code, ErrorCode::E3003);
    assert_eq!(diag.message, "no matching overload for `g`");
    assert_eq!(diag.primary_span(), Some(Span::new(4, 5)));
}
