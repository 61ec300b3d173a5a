//! Canonical type constructors.
//!
//! Every constructor normalizes, so structurally equal C++ types intern to
//! the same `Idx`:
//! - cv-qualifiers on references and functions are dropped
//! - cv-qualifiers on arrays move to the element type
//! - nested qualification merges
//! - references to references collapse (`T& &&` is `T&`)

use std::sync::Arc;

use cxx_diagnostic::ProblemKind;
use cxx_ir::{BuiltinType, Name};

use crate::{Cv, FunctionSig, Idx, ParamRef, SymbolId, TemplateArg, TypeData, TypePool};

impl TypePool {
    #[inline]
    pub fn builtin(&self, ty: BuiltinType) -> Idx {
        Idx::builtin(ty)
    }

    #[inline]
    pub fn problem(&self, kind: ProblemKind) -> Idx {
        Idx::problem(kind)
    }

    pub fn pointer(&self, pointee: Idx) -> Idx {
        if pointee.is_problem() {
            return pointee;
        }
        // Pointer to reference is ill-formed; point at the referee instead.
        let pointee = self.strip_ref(pointee);
        self.intern(TypeData::Pointer(pointee))
    }

    /// `T&`, collapsing references: `T& &` and `T&& &` are `T&`.
    pub fn lvalue_ref(&self, referee: Idx) -> Idx {
        if referee.is_problem() {
            return referee;
        }
        match self.get(referee) {
            TypeData::LValueRef(_) => referee,
            TypeData::RValueRef(inner) => self.intern(TypeData::LValueRef(inner)),
            _ => self.intern(TypeData::LValueRef(referee)),
        }
    }

    /// `T&&`, collapsing references: `T& &&` is `T&`, `T&& &&` is `T&&`.
    pub fn rvalue_ref(&self, referee: Idx) -> Idx {
        if referee.is_problem() {
            return referee;
        }
        match self.get(referee) {
            TypeData::LValueRef(_) | TypeData::RValueRef(_) => referee,
            _ => self.intern(TypeData::RValueRef(referee)),
        }
    }

    /// Add cv-qualifiers to `ty`.
    pub fn qualified(&self, ty: Idx, cv: Cv) -> Idx {
        if cv.is_empty() || ty.is_problem() {
            return ty;
        }
        match self.get(ty) {
            TypeData::LValueRef(_) | TypeData::RValueRef(_) | TypeData::Function(_) => ty,
            TypeData::Qualified { inner, cv: existing } => {
                let merged = existing | cv;
                if merged == existing {
                    ty
                } else {
                    self.intern(TypeData::Qualified { inner, cv: merged })
                }
            }
            TypeData::Array { elem, len } => {
                let elem = self.qualified(elem, cv);
                self.intern(TypeData::Array { elem, len })
            }
            _ => self.intern(TypeData::Qualified { inner: ty, cv }),
        }
    }

    pub fn const_of(&self, ty: Idx) -> Idx {
        self.qualified(ty, Cv::CONST)
    }

    pub fn array(&self, elem: Idx, len: Option<u64>) -> Idx {
        if elem.is_problem() {
            return elem;
        }
        self.intern(TypeData::Array { elem, len })
    }

    /// Function type. Top-level cv-qualifiers of parameters are not part of
    /// the signature and array/function parameters decay to pointers.
    pub fn function(&self, params: &[Idx], ret: Idx, variadic: bool) -> Idx {
        let params: Vec<Idx> = params.iter().map(|&p| self.adjust_param(p)).collect();
        self.intern(TypeData::Function(FunctionSig::new(params, ret, variadic)))
    }

    /// Parameter type adjustment: decay arrays and functions, drop top-level cv.
    pub fn adjust_param(&self, param: Idx) -> Idx {
        match self.get(param) {
            TypeData::Array { elem, .. } => self.pointer(elem),
            TypeData::Function(_) => self.pointer(param),
            TypeData::Qualified { inner, .. } => inner,
            _ => param,
        }
    }

    pub fn class(&self, symbol: SymbolId) -> Idx {
        self.intern(TypeData::Class(symbol))
    }

    pub fn enumeration(&self, symbol: SymbolId) -> Idx {
        self.intern(TypeData::Enum(symbol))
    }

    pub fn closure(&self, symbol: SymbolId) -> Idx {
        self.intern(TypeData::Closure(symbol))
    }

    pub fn template_param(&self, param: ParamRef) -> Idx {
        self.intern(TypeData::TemplateParam(param))
    }

    pub fn specialization(&self, template: SymbolId, args: impl Into<Arc<[TemplateArg]>>) -> Idx {
        let args = args.into();
        if let Some(problem) = self.first_problem_arg(&args) {
            return problem;
        }
        self.intern(TypeData::Specialization { template, args })
    }

    pub fn param_specialization(
        &self,
        param: ParamRef,
        args: impl Into<Arc<[TemplateArg]>>,
    ) -> Idx {
        self.intern(TypeData::ParamSpecialization {
            param,
            args: args.into(),
        })
    }

    pub fn dependent_member(&self, scope: Idx, name: Name) -> Idx {
        if scope.is_problem() {
            return scope;
        }
        self.intern(TypeData::DependentMember { scope, name })
    }

    pub fn pack_expansion(&self, pattern: Idx) -> Idx {
        self.intern(TypeData::PackExpansion(pattern))
    }

    fn first_problem_arg(&self, args: &[TemplateArg]) -> Option<Idx> {
        args.iter().find_map(|arg| match arg {
            TemplateArg::Type(ty) if ty.is_problem() => Some(*ty),
            TemplateArg::Pack(elems) => self.first_problem_arg(elems),
            _ => None,
        })
    }
}
