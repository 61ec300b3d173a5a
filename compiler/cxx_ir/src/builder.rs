//! Programmatic construction of translation units.
//!
//! The parser collaborator and tests emit trees through `AstBuilder`. Every
//! node gets a fresh span at a strictly increasing offset, so spans follow
//! construction order. Build children before the nodes that contain them,
//! and statements in source order.

use crate::{
    Access, AstArena, BinaryOp, BuiltinType, Capture, CaptureDefault, CaptureKind, CastKind,
    ClassKey, Decl, DeclId, DeclKind, DeclSpecifiers, Expr, ExprId, ExprKind, FunctionDecl,
    Initializer, IntSuffix, LambdaExpr, Literal, NameId, NameNode, Param, Span, SpecialMember,
    Stmt, StmtId, StmtKind, StringInterner, TemplateArg, TemplateParam, TemplateParamKind,
    TranslationUnit, TypeExpr, TypeExprId, TypeExprKind, UnaryOp,
};

pub struct AstBuilder<'a> {
    interner: &'a StringInterner,
    arena: AstArena,
    offset: u32,
}

impl<'a> AstBuilder<'a> {
    pub fn new(interner: &'a StringInterner) -> Self {
        AstBuilder {
            interner,
            arena: AstArena::new(),
            offset: 1,
        }
    }

    pub fn interner(&self) -> &'a StringInterner {
        self.interner
    }

    /// Arena built so far.
    pub fn arena(&self) -> &AstArena {
        &self.arena
    }

    fn next_span(&mut self) -> Span {
        let span = Span::new(self.offset, self.offset + 1);
        self.offset += 2;
        span
    }

    // Names

    pub fn name(&mut self, ident: &str) -> NameId {
        self.name_node(ident, None, None)
    }

    /// `qualifier::ident`
    pub fn qualified(&mut self, qualifier: NameId, ident: &str) -> NameId {
        self.name_node(ident, Some(qualifier), None)
    }

    /// `ident<args...>`
    pub fn template_id(&mut self, ident: &str, args: Vec<TemplateArg>) -> NameId {
        self.name_node(ident, None, Some(args))
    }

    /// `::ident`
    pub fn global_name(&mut self, ident: &str) -> NameId {
        let id = self.name(ident);
        self.arena.name_mut(id).global = true;
        id
    }

    fn name_node(
        &mut self,
        ident: &str,
        qualifier: Option<NameId>,
        args: Option<Vec<TemplateArg>>,
    ) -> NameId {
        let template_args = args.map(|args| self.arena.alloc_template_args(args));
        let span = self.next_span();
        self.arena.alloc_name(NameNode {
            ident: self.interner.intern(ident),
            qualifier,
            global: false,
            template_args,
            span,
        })
    }

    // Type expressions

    fn type_expr(&mut self, kind: TypeExprKind) -> TypeExprId {
        let span = self.next_span();
        self.arena.alloc_type_expr(TypeExpr { kind, span })
    }

    pub fn builtin(&mut self, ty: BuiltinType) -> TypeExprId {
        self.type_expr(TypeExprKind::Builtin(ty))
    }

    pub fn int_ty(&mut self) -> TypeExprId {
        self.builtin(BuiltinType::Int)
    }

    pub fn void_ty(&mut self) -> TypeExprId {
        self.builtin(BuiltinType::Void)
    }

    /// A type named by a plain identifier.
    pub fn named_ty(&mut self, ident: &str) -> TypeExprId {
        let name = self.name(ident);
        self.type_expr(TypeExprKind::Named(name))
    }

    pub fn name_ty(&mut self, name: NameId) -> TypeExprId {
        self.type_expr(TypeExprKind::Named(name))
    }

    pub fn auto_ty(&mut self) -> TypeExprId {
        self.type_expr(TypeExprKind::Auto)
    }

    pub fn decltype_auto_ty(&mut self) -> TypeExprId {
        self.type_expr(TypeExprKind::DecltypeAuto)
    }

    pub fn decltype_ty(&mut self, expr: ExprId) -> TypeExprId {
        self.type_expr(TypeExprKind::Decltype(expr))
    }

    pub fn const_ty(&mut self, inner: TypeExprId) -> TypeExprId {
        self.type_expr(TypeExprKind::Qualified {
            inner,
            is_const: true,
            is_volatile: false,
        })
    }

    pub fn volatile_ty(&mut self, inner: TypeExprId) -> TypeExprId {
        self.type_expr(TypeExprKind::Qualified {
            inner,
            is_const: false,
            is_volatile: true,
        })
    }

    pub fn pointer_ty(&mut self, inner: TypeExprId) -> TypeExprId {
        self.type_expr(TypeExprKind::Pointer(inner))
    }

    pub fn lref_ty(&mut self, inner: TypeExprId) -> TypeExprId {
        self.type_expr(TypeExprKind::LValueRef(inner))
    }

    pub fn rref_ty(&mut self, inner: TypeExprId) -> TypeExprId {
        self.type_expr(TypeExprKind::RValueRef(inner))
    }

    pub fn array_ty(&mut self, elem: TypeExprId, size: Option<ExprId>) -> TypeExprId {
        self.type_expr(TypeExprKind::Array { elem, size })
    }

    pub fn function_ty(
        &mut self,
        ret: TypeExprId,
        params: Vec<TypeExprId>,
        variadic: bool,
    ) -> TypeExprId {
        let params = self.arena.alloc_type_list(params);
        self.type_expr(TypeExprKind::Function {
            ret,
            params,
            variadic,
        })
    }

    /// `ret(*)(params...)`
    pub fn function_ptr_ty(&mut self, ret: TypeExprId, params: Vec<TypeExprId>) -> TypeExprId {
        let function = self.function_ty(ret, params, false);
        self.pointer_ty(function)
    }

    pub fn pack_ty(&mut self, pattern: TypeExprId) -> TypeExprId {
        self.type_expr(TypeExprKind::PackExpansion(pattern))
    }

    // Expressions

    fn expr(&mut self, kind: ExprKind) -> ExprId {
        let span = self.next_span();
        self.arena.alloc_expr(Expr { kind, span })
    }

    pub fn literal(&mut self, literal: Literal) -> ExprId {
        self.expr(ExprKind::Literal(literal))
    }

    pub fn int_lit(&mut self, value: u64) -> ExprId {
        self.literal(Literal::Int {
            value,
            suffix: IntSuffix::None,
        })
    }

    pub fn int_lit_suffixed(&mut self, value: u64, suffix: IntSuffix) -> ExprId {
        self.literal(Literal::Int { value, suffix })
    }

    /// `double` literal.
    pub fn float_lit(&mut self, value: f64) -> ExprId {
        self.literal(Literal::Float {
            bits: value.to_bits(),
            single: false,
        })
    }

    /// `float` literal (`f` suffix).
    pub fn float_lit_single(&mut self, value: f64) -> ExprId {
        self.literal(Literal::Float {
            bits: value.to_bits(),
            single: true,
        })
    }

    pub fn bool_lit(&mut self, value: bool) -> ExprId {
        self.literal(Literal::Bool(value))
    }

    pub fn char_lit(&mut self, value: char) -> ExprId {
        self.literal(Literal::Char(u32::from(value)))
    }

    pub fn string_lit(&mut self, value: &str) -> ExprId {
        let text = self.interner.intern(value);
        self.literal(Literal::String(text))
    }

    pub fn nullptr(&mut self) -> ExprId {
        self.literal(Literal::Nullptr)
    }

    /// Identifier expression.
    pub fn id(&mut self, ident: &str) -> ExprId {
        let name = self.name(ident);
        self.expr(ExprKind::Id(name))
    }

    pub fn id_name(&mut self, name: NameId) -> ExprId {
        self.expr(ExprKind::Id(name))
    }

    pub fn call(&mut self, callee: ExprId, args: Vec<ExprId>) -> ExprId {
        let args = self.arena.alloc_expr_list(args);
        self.expr(ExprKind::Call { callee, args })
    }

    /// `ident(args...)`
    pub fn call_named(&mut self, ident: &str, args: Vec<ExprId>) -> ExprId {
        let callee = self.id(ident);
        self.call(callee, args)
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.expr(ExprKind::Unary { op, operand })
    }

    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        self.expr(ExprKind::Binary { op, left, right })
    }

    pub fn conditional(&mut self, cond: ExprId, then_expr: ExprId, else_expr: ExprId) -> ExprId {
        self.expr(ExprKind::Conditional {
            cond,
            then_expr,
            else_expr,
        })
    }

    pub fn member(&mut self, base: ExprId, ident: &str, arrow: bool) -> ExprId {
        let member = self.name(ident);
        self.expr(ExprKind::Member {
            base,
            member,
            arrow,
        })
    }

    pub fn index(&mut self, base: ExprId, index: ExprId) -> ExprId {
        self.expr(ExprKind::Index { base, index })
    }

    pub fn cast(&mut self, kind: CastKind, ty: TypeExprId, operand: ExprId) -> ExprId {
        self.expr(ExprKind::Cast { kind, ty, operand })
    }

    /// `T(args...)` or `T{args...}`; a single parenthesized argument is a cast.
    pub fn construct(&mut self, ty: TypeExprId, args: Vec<ExprId>, braced: bool) -> ExprId {
        if !braced && args.len() == 1 {
            return self.cast(CastKind::CStyle, ty, args[0]);
        }
        let args = self.arena.alloc_expr_list(args);
        self.expr(ExprKind::Construct { ty, args, braced })
    }

    pub fn sizeof_pack(&mut self, ident: &str) -> ExprId {
        let name = self.name(ident);
        self.expr(ExprKind::SizeofPack(name))
    }

    pub fn pack_expansion(&mut self, pattern: ExprId) -> ExprId {
        self.expr(ExprKind::PackExpansion(pattern))
    }

    pub fn braced_list(&mut self, elems: Vec<ExprId>) -> ExprId {
        let elems = self.arena.alloc_expr_list(elems);
        self.expr(ExprKind::BracedList(elems))
    }

    pub fn this(&mut self) -> ExprId {
        self.expr(ExprKind::This)
    }

    pub fn capture(&mut self, kind: CaptureKind) -> Capture {
        Capture {
            kind,
            span: self.next_span(),
        }
    }

    /// `[captures](params) -> trailing { body }`
    pub fn lambda(
        &mut self,
        captures: Vec<Capture>,
        default_capture: CaptureDefault,
        params: Vec<Param>,
        trailing_return: Option<TypeExprId>,
        body: StmtId,
    ) -> ExprId {
        let captures = self.arena.alloc_captures(captures);
        let params = self.arena.alloc_params(params);
        self.expr(ExprKind::Lambda(LambdaExpr {
            captures,
            default_capture,
            params,
            trailing_return,
            body,
            mutable: false,
        }))
    }

    // Statements

    fn stmt(&mut self, kind: StmtKind) -> StmtId {
        let span = self.next_span();
        self.arena.alloc_stmt(Stmt { kind, span })
    }

    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        self.stmt(StmtKind::Expr(expr))
    }

    pub fn decl_stmt(&mut self, decl: DeclId) -> StmtId {
        self.stmt(StmtKind::Decl(decl))
    }

    pub fn ret(&mut self, value: Option<ExprId>) -> StmtId {
        self.stmt(StmtKind::Return(value))
    }

    pub fn block(&mut self, stmts: Vec<StmtId>) -> StmtId {
        let stmts = self.arena.alloc_stmt_list(stmts);
        self.stmt(StmtKind::Compound(stmts))
    }

    pub fn if_stmt(
        &mut self,
        cond: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    ) -> StmtId {
        self.stmt(StmtKind::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    pub fn while_stmt(&mut self, cond: ExprId, body: StmtId) -> StmtId {
        self.stmt(StmtKind::While { cond, body })
    }

    pub fn for_stmt(
        &mut self,
        init: Option<StmtId>,
        cond: Option<ExprId>,
        step: Option<ExprId>,
        body: StmtId,
    ) -> StmtId {
        self.stmt(StmtKind::For {
            init,
            cond,
            step,
            body,
        })
    }

    pub fn null_stmt(&mut self) -> StmtId {
        self.stmt(StmtKind::Null)
    }

    // Declarations

    pub fn param(&mut self, ident: Option<&str>, ty: TypeExprId) -> Param {
        let name = ident.map(|ident| self.name(ident));
        Param {
            name,
            ty,
            default: None,
            span: self.next_span(),
        }
    }

    pub fn param_with_default(&mut self, ident: &str, ty: TypeExprId, default: ExprId) -> Param {
        let mut param = self.param(Some(ident), ty);
        param.default = Some(default);
        param
    }

    /// Allocate a declaration with a pre-built name.
    pub fn decl(&mut self, name: Option<NameId>, kind: DeclKind) -> DeclId {
        let span = self.next_span();
        self.arena.alloc_decl(Decl {
            name,
            kind,
            specifiers: DeclSpecifiers::empty(),
            access: Access::Public,
            span,
        })
    }

    pub fn var(&mut self, ident: &str, ty: TypeExprId, init: Option<Initializer>) -> DeclId {
        let name = self.name(ident);
        self.decl(Some(name), DeclKind::Variable { ty, init })
    }

    /// `ty ident = init;`
    pub fn var_init(&mut self, ident: &str, ty: TypeExprId, init: ExprId) -> DeclId {
        self.var(ident, ty, Some(Initializer::Copy(init)))
    }

    pub fn function_decl(&mut self, name: NameId, function: FunctionDecl) -> DeclId {
        self.decl(Some(name), DeclKind::Function(function))
    }

    /// Plain function `ret ident(params...) body`.
    pub fn func(
        &mut self,
        ident: &str,
        ret: TypeExprId,
        params: Vec<Param>,
        body: Option<StmtId>,
    ) -> DeclId {
        let name = self.name(ident);
        let params = self.arena.alloc_params(params);
        self.function_decl(
            name,
            FunctionDecl {
                ret,
                params,
                variadic: false,
                trailing_return: None,
                body,
                is_const: false,
                special: SpecialMember::None,
            },
        )
    }

    /// Constructor of the class named `ident`.
    pub fn constructor(&mut self, ident: &str, params: Vec<Param>, body: Option<StmtId>) -> DeclId {
        let ret = self.void_ty();
        let id = self.func(ident, ret, params, body);
        self.set_special(id, SpecialMember::Constructor);
        id
    }

    /// `operator target() const`
    pub fn conversion_operator(&mut self, target: TypeExprId, body: Option<StmtId>) -> DeclId {
        let id = self.func("operator conversion", target, Vec::new(), body);
        self.set_special(id, SpecialMember::ConversionOperator);
        if let DeclKind::Function(function) = &mut self.arena.decl_mut(id).kind {
            function.is_const = true;
        }
        id
    }

    pub fn class(
        &mut self,
        ident: &str,
        key: ClassKey,
        bases: Vec<TypeExprId>,
        members: Vec<DeclId>,
    ) -> DeclId {
        let name = self.name(ident);
        self.class_named(name, key, bases, members)
    }

    /// Class with a pre-built name, e.g. a partial specialization `S<T*>`.
    pub fn class_named(
        &mut self,
        name: NameId,
        key: ClassKey,
        bases: Vec<TypeExprId>,
        members: Vec<DeclId>,
    ) -> DeclId {
        let bases = self.arena.alloc_type_list(bases);
        let members = self.arena.alloc_decl_list(members);
        self.decl(
            Some(name),
            DeclKind::Class {
                key,
                bases,
                members,
                complete: true,
            },
        )
    }

    pub fn enumeration(
        &mut self,
        ident: &str,
        scoped: bool,
        enumerators: Vec<(&str, Option<ExprId>)>,
    ) -> DeclId {
        let ids: Vec<DeclId> = enumerators
            .into_iter()
            .map(|(ident, value)| {
                let name = self.name(ident);
                self.decl(Some(name), DeclKind::Enumerator { value })
            })
            .collect();
        let enumerators = self.arena.alloc_decl_list(ids);
        let name = self.name(ident);
        self.decl(
            Some(name),
            DeclKind::Enum {
                scoped,
                underlying: None,
                enumerators,
            },
        )
    }

    pub fn namespace(&mut self, ident: &str, members: Vec<DeclId>) -> DeclId {
        let members = self.arena.alloc_decl_list(members);
        let name = self.name(ident);
        self.decl(Some(name), DeclKind::Namespace { members })
    }

    pub fn typedef(&mut self, ident: &str, ty: TypeExprId) -> DeclId {
        let name = self.name(ident);
        self.decl(Some(name), DeclKind::Typedef { ty })
    }

    /// `using namespace ident;`
    pub fn using_directive(&mut self, ident: &str) -> DeclId {
        let namespace = self.name(ident);
        self.decl(None, DeclKind::UsingDirective { namespace })
    }

    /// `using target;` for a qualified `target`.
    pub fn using_decl(&mut self, target: NameId) -> DeclId {
        self.decl(None, DeclKind::UsingDeclaration { target })
    }

    /// `template<params...> decl`
    pub fn template(&mut self, params: Vec<TemplateParam>, decl: DeclId) -> DeclId {
        let params = self.arena.alloc_template_params(params);
        let name = self.arena.decl(decl).name;
        self.decl(name, DeclKind::Template { params, decl })
    }

    pub fn type_param(&mut self, ident: &str) -> TemplateParam {
        self.template_param(ident, TemplateParamKind::Type, false)
    }

    pub fn type_pack_param(&mut self, ident: &str) -> TemplateParam {
        self.template_param(ident, TemplateParamKind::Type, true)
    }

    pub fn non_type_param(&mut self, ident: &str, ty: TypeExprId) -> TemplateParam {
        self.template_param(ident, TemplateParamKind::NonType(ty), false)
    }

    pub fn template_template_param(
        &mut self,
        ident: &str,
        params: Vec<TemplateParam>,
    ) -> TemplateParam {
        let params = self.arena.alloc_template_params(params);
        self.template_param(ident, TemplateParamKind::Template(params), false)
    }

    fn template_param(&mut self, ident: &str, kind: TemplateParamKind, pack: bool) -> TemplateParam {
        let name = Some(self.name(ident));
        TemplateParam {
            name,
            kind,
            pack,
            default: None,
            span: self.next_span(),
        }
    }

    // Adjustments of already built nodes

    pub fn set_specifiers(&mut self, decl: DeclId, specifiers: DeclSpecifiers) {
        self.arena.decl_mut(decl).specifiers |= specifiers;
    }

    pub fn set_access(&mut self, decl: DeclId, access: Access) {
        self.arena.decl_mut(decl).access = access;
    }

    pub fn set_special(&mut self, decl: DeclId, special: SpecialMember) {
        if let DeclKind::Function(function) = &mut self.arena.decl_mut(decl).kind {
            function.special = special;
        }
    }

    /// Attach a trailing return type to a function.
    pub fn set_trailing_return(&mut self, decl: DeclId, trailing: TypeExprId) {
        if let DeclKind::Function(function) = &mut self.arena.decl_mut(decl).kind {
            function.trailing_return = Some(trailing);
        }
    }

    pub fn set_const_member(&mut self, decl: DeclId) {
        if let DeclKind::Function(function) = &mut self.arena.decl_mut(decl).kind {
            function.is_const = true;
        }
    }

    pub fn set_variadic(&mut self, decl: DeclId) {
        if let DeclKind::Function(function) = &mut self.arena.decl_mut(decl).kind {
            function.variadic = true;
        }
    }

    pub fn set_mutable_lambda(&mut self, lambda: ExprId) {
        if let ExprKind::Lambda(lambda) = &mut self.arena.expr_mut(lambda).kind {
            lambda.mutable = true;
        }
    }

    pub fn set_forward_declaration(&mut self, decl: DeclId) {
        if let DeclKind::Class { complete, .. } = &mut self.arena.decl_mut(decl).kind {
            *complete = false;
        }
    }

    /// Finish the unit with its top-level declarations in source order.
    pub fn finish(mut self, file: &str, decls: Vec<DeclId>) -> TranslationUnit {
        let decls = self.arena.alloc_decl_list(decls);
        TranslationUnit {
            file: self.interner.intern(file),
            arena: self.arena,
            decls,
        }
    }
}

#[cfg(test)]
mod tests;
