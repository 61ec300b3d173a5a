#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use crate::test_helpers::session;
use crate::Binding;
use cxx_diagnostic::ProblemKind;
use cxx_ir::{AstBuilder, ClassKey, NameId, TemplateArg};
use pretty_assertions::assert_eq;

/// A unit declaring `Box<int> ident;`, with the name of `Box<int>`.
fn box_user(session: &AnalysisSession, ident: &str) -> (UnitId, NameId) {
    let mut b = AstBuilder::new(session.interner());
    let int = b.int_ty();
    let name = b.template_id("Box", vec![TemplateArg::Type(int)]);
    let ty = b.name_ty(name);
    let var = b.var(ident, ty, None);
    let file = format!("{ident}.cpp");
    (session.add_unit(b.finish(&file, vec![var])), name)
}

fn binding_of(resolution: &UnitResolution, name: NameId) -> Binding {
    resolution
        .bindings
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, binding)| binding.clone())
        .unwrap()
}

#[test]
fn units_share_instances_across_workers() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let t = b.type_param("T");
    let class = b.class("Box", ClassKey::Struct, vec![], vec![]);
    let template = b.template(vec![t], class);
    session.add_unit(b.finish("box.h", vec![template]));

    let (first, first_name) = box_user(&session, "first");
    let (second, second_name) = box_user(&session, "second");

    let results = resolve_units_parallel(&session, &[first, second], &CancellationToken::new());
    assert_eq!(results.len(), 2);
    let first_resolution = results[0].as_ref().unwrap();
    let second_resolution = results[1].as_ref().unwrap();
    assert_eq!(first_resolution.unit, first);
    assert_eq!(second_resolution.unit, second);
    assert_eq!(first_resolution.problems().count(), 0);

    let a = binding_of(first_resolution, first_name);
    let b = binding_of(second_resolution, second_name);
    assert!(a.as_instance().is_some());
    assert_eq!(a, b);
    assert_eq!(session.instance_count(), 1);
}

#[test]
fn cancelled_units_report_cancellation() {
    let session = session();
    let (first, _) = box_user(&session, "first");
    let (second, _) = box_user(&session, "second");

    let cancel = CancellationToken::new();
    cancel.cancel();
    let results = resolve_units_parallel(&session, &[first, second], &cancel);
    assert_eq!(results.len(), 2);
    for result in results {
        assert_eq!(result.unwrap_err().kind, ProblemKind::Cancelled);
    }
    assert_eq!(session.instance_count(), 0);
}
