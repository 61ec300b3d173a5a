//! Structural queries over interned types.

use cxx_ir::BuiltinType;

use crate::{Cv, FunctionSig, Idx, SymbolId, TypeData, TypeFlags, TypePool};

impl TypePool {
    /// The referee of a reference type, or `ty` itself.
    pub fn strip_ref(&self, ty: Idx) -> Idx {
        if !self.flags(ty).contains(TypeFlags::IS_REFERENCE) {
            return ty;
        }
        match self.get(ty) {
            TypeData::LValueRef(inner) | TypeData::RValueRef(inner) => inner,
            _ => ty,
        }
    }

    /// Split top-level cv-qualifiers off `ty`.
    pub fn split_cv(&self, ty: Idx) -> (Idx, Cv) {
        if !self.flags(ty).contains(TypeFlags::IS_QUALIFIED) {
            return (ty, Cv::empty());
        }
        match self.get(ty) {
            TypeData::Qualified { inner, cv } => (inner, cv),
            _ => (ty, Cv::empty()),
        }
    }

    pub fn strip_cv(&self, ty: Idx) -> Idx {
        self.split_cv(ty).0
    }

    pub fn cv_of(&self, ty: Idx) -> Cv {
        self.split_cv(ty).1
    }

    /// Strip a reference, then top-level cv-qualifiers.
    pub fn strip_ref_cv(&self, ty: Idx) -> Idx {
        self.strip_cv(self.strip_ref(ty))
    }

    /// Array-to-pointer and function-to-pointer decay, dropping top-level cv.
    pub fn decay(&self, ty: Idx) -> Idx {
        let ty = self.strip_ref(ty);
        match self.get(ty) {
            TypeData::Array { elem, .. } => self.pointer(elem),
            TypeData::Function(_) => self.pointer(ty),
            TypeData::Qualified { inner, .. } => inner,
            _ => ty,
        }
    }

    #[inline]
    pub fn is_reference(&self, ty: Idx) -> bool {
        self.flags(ty).contains(TypeFlags::IS_REFERENCE)
    }

    pub fn is_lvalue_ref(&self, ty: Idx) -> bool {
        self.is_reference(ty) && matches!(self.get(ty), TypeData::LValueRef(_))
    }

    pub fn is_rvalue_ref(&self, ty: Idx) -> bool {
        self.is_reference(ty) && matches!(self.get(ty), TypeData::RValueRef(_))
    }

    #[inline]
    pub fn is_dependent(&self, ty: Idx) -> bool {
        self.flags(ty).is_dependent()
    }

    #[inline]
    pub fn has_problem(&self, ty: Idx) -> bool {
        self.flags(ty).has_problem()
    }

    #[inline]
    pub fn has_placeholder(&self, ty: Idx) -> bool {
        self.flags(ty).contains(TypeFlags::HAS_PLACEHOLDER)
    }

    /// The builtin type of `ty` after stripping cv-qualifiers.
    pub fn builtin_of(&self, ty: Idx) -> Option<BuiltinType> {
        self.strip_cv(ty).as_builtin()
    }

    pub fn is_arithmetic(&self, ty: Idx) -> bool {
        self.builtin_of(ty).is_some_and(BuiltinType::is_arithmetic)
    }

    pub fn is_integral(&self, ty: Idx) -> bool {
        self.builtin_of(ty).is_some_and(BuiltinType::is_integral)
    }

    pub fn is_pointer(&self, ty: Idx) -> bool {
        matches!(self.get(self.strip_cv(ty)), TypeData::Pointer(_))
    }

    /// The pointee of a (possibly cv-qualified) pointer type.
    pub fn pointee(&self, ty: Idx) -> Option<Idx> {
        match self.get(self.strip_cv(ty)) {
            TypeData::Pointer(pointee) => Some(pointee),
            _ => None,
        }
    }

    /// The signature of a function type.
    pub fn function_sig(&self, ty: Idx) -> Option<FunctionSig> {
        match self.get(ty) {
            TypeData::Function(sig) => Some(sig),
            _ => None,
        }
    }

    /// The signature of a function, function pointer or function reference.
    pub fn callable_sig(&self, ty: Idx) -> Option<FunctionSig> {
        let ty = self.strip_ref_cv(ty);
        match self.get(ty) {
            TypeData::Function(sig) => Some(sig),
            TypeData::Pointer(pointee) => self.function_sig(pointee),
            _ => None,
        }
    }

    /// Class-like symbol of a (cv-qualified) class, closure or enum type.
    pub fn type_symbol(&self, ty: Idx) -> Option<SymbolId> {
        match self.get(self.strip_cv(ty)) {
            TypeData::Class(sym) | TypeData::Closure(sym) | TypeData::Enum(sym) => Some(sym),
            _ => None,
        }
    }

    /// Class, closure or class template specialization (after cv stripping).
    pub fn is_class_like(&self, ty: Idx) -> bool {
        self.flags(self.strip_cv(ty)).contains(TypeFlags::IS_CLASS)
    }

    pub fn is_enum(&self, ty: Idx) -> bool {
        self.flags(self.strip_cv(ty)).contains(TypeFlags::IS_ENUM)
    }

    /// Scalar types can be tested in a condition without a user conversion.
    pub fn is_scalar(&self, ty: Idx) -> bool {
        let ty = self.strip_cv(ty);
        self.is_arithmetic(ty)
            || self.is_pointer(ty)
            || self.is_enum(ty)
            || ty == Idx::NULLPTR
    }
}
