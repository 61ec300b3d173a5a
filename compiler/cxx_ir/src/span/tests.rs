use super::*;

#[test]
fn test_span_merge() {
    let a = Span::new(4, 10);
    let b = Span::new(8, 20);
    assert_eq!(a.merge(b), Span::new(4, 20));
    assert_eq!(b.merge(a), Span::new(4, 20));
}

#[test]
fn test_span_contains() {
    let span = Span::new(10, 20);
    assert!(span.contains(10));
    assert!(span.contains(19));
    assert!(!span.contains(20));
    assert!(!span.contains(9));
}

#[test]
fn test_point_span_is_empty() {
    assert!(Span::point(7).is_empty());
    assert_eq!(Span::new(3, 9).len(), 6);
    assert_eq!(format!("{:?}", Span::new(1, 2)), "1..2");
}
