//! Helpers for resolver scenario tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use cxx_ir::{AstBuilder, DeclId, ExprId, ExprKind, NameId, StmtId};
use cxx_types::SymbolId;

use crate::{AnalysisSession, CancellationToken, Resolver, SessionConfig, UnitId};

pub(crate) fn session() -> AnalysisSession {
    crate::init_tracing();
    AnalysisSession::new(SessionConfig::default())
}

pub(crate) fn resolver(session: &AnalysisSession) -> Resolver<'_> {
    session.resolver(CancellationToken::new())
}

/// `void name() { stmts }`, holding the expressions under test.
pub(crate) fn function_with(b: &mut AstBuilder<'_>, name: &str, stmts: Vec<StmtId>) -> DeclId {
    let body = b.block(stmts);
    let ret = b.void_ty();
    b.func(name, ret, Vec::new(), Some(body))
}

/// Expression statements of `exprs`, in order.
pub(crate) fn stmts(b: &mut AstBuilder<'_>, exprs: &[ExprId]) -> Vec<StmtId> {
    exprs.iter().map(|&expr| b.expr_stmt(expr)).collect()
}

/// Name node of an identifier expression.
pub(crate) fn id_name(session: &AnalysisSession, unit: UnitId, expr: ExprId) -> NameId {
    match session.unit(unit).arena().expr(expr).kind {
        ExprKind::Id(name) => name,
        ExprKind::Call { callee, .. } => id_name(session, unit, callee),
        ExprKind::Member { member, .. } => member,
        ref other => panic!("expected a name expression, got {other:?}"),
    }
}

/// Symbol a declaration declares.
pub(crate) fn symbol_of(session: &AnalysisSession, unit: UnitId, decl: DeclId) -> SymbolId {
    session
        .unit(unit)
        .symbol_of(decl)
        .expect("declaration without a symbol")
}
