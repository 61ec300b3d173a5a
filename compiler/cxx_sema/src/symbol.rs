//! Declared and synthesized entities.
//!
//! Symbols live in one session-wide table addressed by [`SymbolId`]. A
//! symbol refers back to its unit and declaration by id; nothing in here
//! owns AST nodes.

use std::sync::Arc;

use cxx_ir::{
    Access, ClassKey, DeclId, DeclSpecifiers, ExprId, Initializer, Name, NameId, SpecialMember,
    TemplateArgRange, TemplateParamKind, TypeExprId,
};
use cxx_types::{ParamRef, SymbolId};
use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::{Ctx, ScopeId, UnitId};

#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: Name,
    pub kind: SymbolKind,
    pub unit: UnitId,
    /// Scope the symbol is declared in.
    pub scope: ScopeId,
    /// Defining declaration, else the first one.
    pub decl: Option<DeclId>,
    /// Declarator names of every declaration of the entity.
    pub sites: SmallVec<[NameId; 1]>,
    pub specifiers: DeclSpecifiers,
    pub access: Access,
    /// Instance a synthesized closure belongs to.
    pub ctx: Ctx,
    /// Template parameter lists enclosing the declaration, excluding the
    /// symbol's own.
    pub template_depth: u16,
}

#[derive(Clone, Debug)]
pub enum SymbolKind {
    Namespace {
        scope: ScopeId,
    },
    Class {
        scope: ScopeId,
        key: ClassKey,
    },
    Enum {
        scope: ScopeId,
        scoped: bool,
    },
    Enumerator {
        parent: SymbolId,
        value: Option<ExprId>,
        index: u32,
    },
    Variable {
        ty: TypeExprId,
        init: Option<Initializer>,
    },
    Parameter {
        ty: TypeExprId,
        default: Option<ExprId>,
    },
    Function(FunctionInfo),
    Typedef {
        ty: TypeExprId,
    },
    TemplateParam(TemplateParamInfo),
    Template(TemplateInfo),
    /// Synthesized class type of a lambda expression.
    Closure {
        lambda: ExprId,
        call: SymbolId,
    },
    /// Call operator of a non-generic lambda.
    CallOperator {
        lambda: ExprId,
        closure: SymbolId,
    },
    InitCapture {
        lambda: ExprId,
        init: ExprId,
        by_ref: bool,
    },
}

#[derive(Copy, Clone, Debug)]
pub struct FunctionInfo {
    /// Scope holding the parameters.
    pub scope: ScopeId,
    /// Class of a member function.
    pub class: Option<SymbolId>,
    pub special: SpecialMember,
}

#[derive(Clone, Debug)]
pub struct TemplateParamInfo {
    pub param: ParamRef,
    pub kind: TemplateParamKind,
    pub default: Option<cxx_ir::TemplateArg>,
}

#[derive(Clone, Debug)]
pub enum TemplateEntity {
    Function(FunctionInfo),
    Class { scope: ScopeId, key: ClassKey },
    Variable { ty: TypeExprId, init: Option<Initializer> },
    /// Call operator of a generic lambda; its parameters are invented from
    /// the `auto` parameters.
    CallOperator { lambda: ExprId, closure: SymbolId },
}

/// Partial or explicit specialization of a primary template.
#[derive(Copy, Clone, Debug)]
pub struct SpecializationOf {
    pub primary: SymbolId,
    /// Arguments written in the declarator (`S<T*>`, `pi<float>`).
    pub args: TemplateArgRange,
}

#[derive(Clone, Debug)]
pub struct TemplateInfo {
    pub entity: TemplateEntity,
    /// Declaration inside `template<...>`.
    pub inner: Option<DeclId>,
    pub params: Arc<[TemplateParamInfo]>,
    /// Depth of the template's own parameter list.
    pub depth: u16,
    /// Scope declaring the template parameters.
    pub param_scope: Option<ScopeId>,
    pub specialization: Option<SpecializationOf>,
    /// Partial and explicit specializations of a primary template, in
    /// declaration order.
    pub specializations: Vec<SymbolId>,
}

impl Symbol {
    pub fn template_info(&self) -> Option<&TemplateInfo> {
        match &self.kind {
            SymbolKind::Template(info) => Some(info),
            _ => None,
        }
    }

    /// Functions, call operators and function templates.
    pub fn is_function_like(&self) -> bool {
        match &self.kind {
            SymbolKind::Function(_) | SymbolKind::CallOperator { .. } => true,
            SymbolKind::Template(info) => matches!(
                info.entity,
                TemplateEntity::Function(_) | TemplateEntity::CallOperator { .. }
            ),
            _ => false,
        }
    }

    pub fn is_template(&self) -> bool {
        matches!(self.kind, SymbolKind::Template(_))
    }

    pub fn is_class_template(&self) -> bool {
        matches!(
            &self.kind,
            SymbolKind::Template(TemplateInfo {
                entity: TemplateEntity::Class { .. },
                ..
            })
        )
    }

    /// Names a type: classes, enums, typedefs, type template parameters and
    /// class templates.
    pub fn is_type(&self) -> bool {
        match &self.kind {
            SymbolKind::Class { .. }
            | SymbolKind::Enum { .. }
            | SymbolKind::Typedef { .. }
            | SymbolKind::Closure { .. } => true,
            SymbolKind::TemplateParam(info) => !matches!(info.kind, TemplateParamKind::NonType(_)),
            SymbolKind::Template(info) => matches!(info.entity, TemplateEntity::Class { .. }),
            _ => false,
        }
    }

    /// Scope whose members qualified lookup searches.
    pub fn member_scope(&self) -> Option<ScopeId> {
        match &self.kind {
            SymbolKind::Namespace { scope }
            | SymbolKind::Class { scope, .. }
            | SymbolKind::Enum { scope, .. } => Some(*scope),
            SymbolKind::Template(TemplateInfo {
                entity: TemplateEntity::Class { scope, .. },
                ..
            }) => Some(*scope),
            _ => None,
        }
    }

    pub fn function_info(&self) -> Option<FunctionInfo> {
        match &self.kind {
            SymbolKind::Function(info) => Some(*info),
            SymbolKind::Template(TemplateInfo {
                entity: TemplateEntity::Function(info),
                ..
            }) => Some(*info),
            _ => None,
        }
    }

    /// Member function of a class (or class template).
    pub fn member_of(&self) -> Option<SymbolId> {
        self.function_info().and_then(|info| info.class)
    }

    pub fn is_static(&self) -> bool {
        self.specifiers.contains(DeclSpecifiers::STATIC)
    }
}

/// Session-wide symbol table.
#[derive(Default)]
pub struct SymbolTable {
    symbols: RwLock<Vec<Arc<Symbol>>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The symbol behind `id`. Panics on ids from another session.
    #[track_caller]
    pub fn get(&self, id: SymbolId) -> Arc<Symbol> {
        Arc::clone(&self.symbols.read()[id.index()])
    }

    pub fn len(&self) -> usize {
        self.symbols.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.read().is_empty()
    }

    /// Append symbols built against `base`, the table length when
    /// `build` starts. The write lock is held throughout so the ids
    /// predicted from `base` stay valid.
    pub(crate) fn extend_with<R>(&self, build: impl FnOnce(u32) -> (Vec<Symbol>, R)) -> R {
        let mut symbols = self.symbols.write();
        let base = u32::try_from(symbols.len())
            .unwrap_or_else(|_| panic!("symbol table exceeded u32::MAX entries"));
        let (built, result) = build(base);
        symbols.extend(built.into_iter().map(Arc::new));
        result
    }

    /// Append symbols whose ids are `next` onward; `build` receives `next`.
    pub(crate) fn push_group(&self, build: impl FnOnce(SymbolId) -> Vec<Symbol>) -> SymbolId {
        self.extend_with(|base| {
            let first = SymbolId::new(base);
            (build(first), first)
        })
    }
}
