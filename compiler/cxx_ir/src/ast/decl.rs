use bitflags::bitflags;

use crate::{
    DeclId, DeclRange, ExprId, ExprRange, NameId, ParamRange, Span, StmtId, TemplateArg,
    TemplateParamRange, TypeExprId, TypeExprRange,
};

bitflags! {
    /// Storage, linkage and function specifiers.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct DeclSpecifiers: u16 {
        const STATIC = 1 << 0;
        const EXTERN = 1 << 1;
        const MUTABLE = 1 << 2;
        const INLINE = 1 << 3;
        const VIRTUAL = 1 << 4;
        const EXPLICIT = 1 << 5;
        const FRIEND = 1 << 6;
        const TYPEDEF = 1 << 7;
        const CONSTEXPR = 1 << 8;
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Access {
    #[default]
    Public,
    Protected,
    Private,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ClassKey {
    Class,
    Struct,
    Union,
}

/// A declaration as written.
///
/// `name` is absent for unnamed entities (anonymous classes, unnamed
/// parameters). A template-id declarator name (`pi<float>`) declares an
/// explicit or partial specialization.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Decl {
    pub name: Option<NameId>,
    pub kind: DeclKind,
    pub specifiers: DeclSpecifiers,
    pub access: Access,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum DeclKind {
    Variable {
        ty: TypeExprId,
        init: Option<Initializer>,
    },
    Function(FunctionDecl),
    Class {
        key: ClassKey,
        bases: TypeExprRange,
        members: DeclRange,
        /// False for a forward declaration.
        complete: bool,
    },
    Enum {
        scoped: bool,
        underlying: Option<TypeExprId>,
        enumerators: DeclRange,
    },
    Enumerator {
        value: Option<ExprId>,
    },
    Namespace {
        members: DeclRange,
    },
    /// `typedef` or alias declaration.
    Typedef {
        ty: TypeExprId,
    },
    Template {
        params: TemplateParamRange,
        decl: DeclId,
    },
    /// `using namespace N;`
    UsingDirective {
        namespace: NameId,
    },
    /// `using N::f;` introduces the last component of `target`; the
    /// declaration itself is unnamed.
    UsingDeclaration {
        target: NameId,
    },
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum SpecialMember {
    #[default]
    None,
    Constructor,
    /// `operator T()`; the target type is the declared return type.
    ConversionOperator,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionDecl {
    pub ret: TypeExprId,
    pub params: ParamRange,
    pub variadic: bool,
    pub trailing_return: Option<TypeExprId>,
    pub body: Option<StmtId>,
    /// `const` member function.
    pub is_const: bool,
    pub special: SpecialMember,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Param {
    pub name: Option<NameId>,
    pub ty: TypeExprId,
    pub default: Option<ExprId>,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TemplateParamKind {
    Type,
    NonType(TypeExprId),
    Template(TemplateParamRange),
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TemplateParam {
    pub name: Option<NameId>,
    pub kind: TemplateParamKind,
    pub pack: bool,
    pub default: Option<TemplateArg>,
    pub span: Span,
}

/// Initializer forms of a variable declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Initializer {
    /// `= e`
    Copy(ExprId),
    /// `(a, b)`
    Direct(ExprRange),
    /// `{a, b}`
    List(ExprRange),
    /// `= {a, b}`
    CopyList(ExprRange),
}
