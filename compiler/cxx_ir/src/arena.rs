//! Arena storage for one translation unit's AST.

use crate::ids::ArenaId;
use crate::{
    Capture, CaptureId, Decl, DeclId, DeclRange, Expr, ExprId, IdRange, Name, NameId, NameNode,
    Param, ParamId, Stmt, StmtId, TemplateArg, TemplateArgId, TemplateParam, TemplateParamId,
    TypeExpr, TypeExprId,
};

/// Convert a vector length to a 32-bit arena index.
///
/// # Panics
/// Panics if the arena outgrows the id space.
#[inline]
#[track_caller]
fn to_u32(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("{what} arena exceeded u32::MAX entries"))
}

/// Flat storage for every node of a translation unit.
///
/// Indexing with an id that was not allocated here is a contract violation
/// and panics.
#[derive(Clone, Default, Debug)]
pub struct AstArena {
    names: Vec<NameNode>,
    type_exprs: Vec<TypeExpr>,
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    decls: Vec<Decl>,
    params: Vec<Param>,
    template_params: Vec<TemplateParam>,
    captures: Vec<Capture>,
    template_args: Vec<TemplateArg>,

    expr_lists: Vec<ExprId>,
    stmt_lists: Vec<StmtId>,
    decl_lists: Vec<DeclId>,
    type_lists: Vec<TypeExprId>,
}

macro_rules! node_accessors {
    ($field:ident, $node:ty, $id:ty, $alloc:ident, $get:ident, $get_mut:ident, $len:ident) => {
        #[inline]
        pub fn $alloc(&mut self, node: $node) -> $id {
            let id = <$id>::new(to_u32(self.$field.len(), stringify!($field)));
            self.$field.push(node);
            id
        }

        #[inline]
        #[track_caller]
        pub fn $get(&self, id: $id) -> &$node {
            &self.$field[id.index()]
        }

        #[inline]
        #[track_caller]
        pub fn $get_mut(&mut self, id: $id) -> &mut $node {
            &mut self.$field[id.index()]
        }

        #[inline]
        pub fn $len(&self) -> usize {
            self.$field.len()
        }
    };
}

macro_rules! list_accessors {
    ($field:ident, $id:ty, $alloc:ident, $get:ident) => {
        pub fn $alloc(&mut self, ids: impl IntoIterator<Item = $id>) -> IdRange<$id> {
            let start = to_u32(self.$field.len(), stringify!($field));
            self.$field.extend(ids);
            let len = to_u32(self.$field.len(), stringify!($field)) - start;
            IdRange::new(start, len)
        }

        #[inline]
        #[track_caller]
        pub fn $get(&self, range: IdRange<$id>) -> &[$id] {
            &self.$field[range.indices()]
        }
    };
}

macro_rules! batch_accessors {
    ($field:ident, $node:ty, $id:ty, $alloc:ident, $get_all:ident, $get:ident) => {
        pub fn $alloc(&mut self, nodes: impl IntoIterator<Item = $node>) -> IdRange<$id> {
            let start = to_u32(self.$field.len(), stringify!($field));
            self.$field.extend(nodes);
            let len = to_u32(self.$field.len(), stringify!($field)) - start;
            IdRange::new(start, len)
        }

        #[inline]
        #[track_caller]
        pub fn $get_all(&self, range: IdRange<$id>) -> &[$node] {
            &self.$field[range.indices()]
        }

        #[inline]
        #[track_caller]
        pub fn $get(&self, id: $id) -> &$node {
            &self.$field[ArenaId::raw(id) as usize]
        }
    };
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    node_accessors!(names, NameNode, NameId, alloc_name, name, name_mut, name_count);
    node_accessors!(
        type_exprs,
        TypeExpr,
        TypeExprId,
        alloc_type_expr,
        type_expr,
        type_expr_mut,
        type_expr_count
    );
    node_accessors!(exprs, Expr, ExprId, alloc_expr, expr, expr_mut, expr_count);
    node_accessors!(stmts, Stmt, StmtId, alloc_stmt, stmt, stmt_mut, stmt_count);
    node_accessors!(decls, Decl, DeclId, alloc_decl, decl, decl_mut, decl_count);

    list_accessors!(expr_lists, ExprId, alloc_expr_list, expr_list);
    list_accessors!(stmt_lists, StmtId, alloc_stmt_list, stmt_list);
    list_accessors!(decl_lists, DeclId, alloc_decl_list, decl_list);
    list_accessors!(type_lists, TypeExprId, alloc_type_list, type_list);

    batch_accessors!(params, Param, ParamId, alloc_params, params, param);
    batch_accessors!(
        template_params,
        TemplateParam,
        TemplateParamId,
        alloc_template_params,
        template_params,
        template_param
    );
    batch_accessors!(captures, Capture, CaptureId, alloc_captures, captures, capture);
    batch_accessors!(
        template_args,
        TemplateArg,
        TemplateArgId,
        alloc_template_args,
        template_args,
        template_arg
    );

    /// Identifier text of a name node.
    #[inline]
    #[track_caller]
    pub fn ident(&self, id: NameId) -> Name {
        self.names[id.index()].ident
    }

    /// Iterate all expression ids in allocation order.
    pub fn expr_ids(&self) -> impl Iterator<Item = ExprId> {
        (0..to_u32(self.exprs.len(), "exprs")).map(ExprId::new)
    }

    /// Iterate all name ids in allocation order.
    pub fn name_ids(&self) -> impl Iterator<Item = NameId> {
        (0..to_u32(self.names.len(), "names")).map(NameId::new)
    }
}

/// One translation unit as produced by the parser.
#[derive(Clone, Debug)]
pub struct TranslationUnit {
    /// File path or other identifying label.
    pub file: Name,
    pub arena: AstArena,
    /// Top-level declarations in source order.
    pub decls: DeclRange,
}

impl TranslationUnit {
    pub fn top_level(&self) -> &[DeclId] {
        self.arena.decl_list(self.decls)
    }
}

#[cfg(test)]
mod tests;
