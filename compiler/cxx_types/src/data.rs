//! Type data stored in the pool.
//!
//! Composite types refer to their parts by [`Idx`]. Lists are shared
//! (`Arc<[..]>`) so reading a `TypeData` out of the pool is cheap.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use cxx_diagnostic::ProblemKind;
use cxx_ir::{BuiltinType, Name};

use crate::{Idx, SymbolId};

bitflags! {
    /// cv-qualifiers.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, PartialOrd, Ord)]
    pub struct Cv: u8 {
        const CONST = 1 << 0;
        const VOLATILE = 1 << 1;
    }
}

impl Cv {
    /// True if `self` has every qualifier of `other`.
    #[inline]
    pub fn is_at_least(self, other: Cv) -> bool {
        self.contains(other)
    }
}

/// Position of a template parameter: nesting depth of its parameter list
/// and index within that list.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct ParamRef {
    pub depth: u16,
    pub index: u16,
    pub pack: bool,
    pub name: Name,
}

impl ParamRef {
    /// Depth used for the unique types synthesized by partial ordering.
    pub const SYNTHESIZED_DEPTH: u16 = u16::MAX;

    pub const fn new(depth: u16, index: u16, pack: bool, name: Name) -> Self {
        ParamRef {
            depth,
            index,
            pack,
            name,
        }
    }

    /// Same position, ignoring the spelling.
    #[inline]
    pub fn same_position(&self, other: &ParamRef) -> bool {
        self.depth == other.depth && self.index == other.index
    }

    pub const fn is_synthesized(&self) -> bool {
        self.depth == Self::SYNTHESIZED_DEPTH
    }
}

/// Function signature.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionSig {
    pub params: Arc<[Idx]>,
    pub ret: Idx,
    /// Trailing C-style ellipsis.
    pub variadic: bool,
}

impl FunctionSig {
    pub fn new(params: impl Into<Arc<[Idx]>>, ret: Idx, variadic: bool) -> Self {
        FunctionSig {
            params: params.into(),
            ret,
            variadic,
        }
    }
}

/// Compile-time constant.
///
/// Floats are stored as bits to keep values hashable.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Value {
    Int(i64),
    Float(u64),
    Bool(bool),
    /// Reference to a non-type template parameter inside a pattern.
    Param(ParamRef),
    /// Value that depends on template parameters in an unmodeled way.
    Dependent,
}

impl Value {
    pub fn float(value: f64) -> Self {
        Value::Float(value.to_bits())
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "C++ integral to floating conversion"
    )]
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(i as f64),
            Value::Float(bits) => Some(f64::from_bits(bits)),
            Value::Bool(b) => Some(if b { 1.0 } else { 0.0 }),
            Value::Param(_) | Value::Dependent => None,
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "C++ floating to integral conversion truncates"
    )]
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(i),
            Value::Float(bits) => Some(f64::from_bits(bits) as i64),
            Value::Bool(b) => Some(i64::from(b)),
            Value::Param(_) | Value::Dependent => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(b),
            Value::Int(i) => Some(i != 0),
            Value::Float(bits) => Some(f64::from_bits(bits) != 0.0),
            Value::Param(_) | Value::Dependent => None,
        }
    }

    pub fn is_dependent(self) -> bool {
        matches!(self, Value::Param(_) | Value::Dependent)
    }

    /// Convert to a value of builtin type `ty`.
    pub fn convert_to(self, ty: BuiltinType) -> Value {
        if self.is_dependent() {
            return self;
        }
        if ty == BuiltinType::Bool {
            return self.as_bool().map_or(self, Value::Bool);
        }
        if ty.is_floating() {
            return self.as_f64().map_or(self, Value::float);
        }
        if ty.is_integral() {
            return self.as_i64().map_or(self, Value::Int);
        }
        self
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Param(p) => write!(f, "<param {}:{}>", p.depth, p.index),
            Value::Dependent => write!(f, "<dependent>"),
        }
    }
}

/// A resolved template argument.
///
/// An argument list has one entry per template parameter; the entry of a
/// parameter pack is a `Pack` of zero or more arguments.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TemplateArg {
    Type(Idx),
    Value(Value),
    /// Argument of a template template parameter.
    Template(SymbolId),
    Pack(Arc<[TemplateArg]>),
}

impl TemplateArg {
    pub fn as_type(&self) -> Option<Idx> {
        match self {
            TemplateArg::Type(ty) => Some(*ty),
            _ => None,
        }
    }

    pub fn pack_len(&self) -> Option<usize> {
        match self {
            TemplateArg::Pack(elems) => Some(elems.len()),
            _ => None,
        }
    }
}

/// Interned type data.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeData {
    Builtin(BuiltinType),
    Pointer(Idx),
    LValueRef(Idx),
    RValueRef(Idx),
    /// cv-qualified type. `inner` is never itself qualified, a reference
    /// or a function.
    Qualified {
        inner: Idx,
        cv: Cv,
    },
    Array {
        elem: Idx,
        len: Option<u64>,
    },
    Function(FunctionSig),
    Class(SymbolId),
    Enum(SymbolId),
    /// Synthesized type of a lambda expression.
    Closure(SymbolId),
    TemplateParam(ParamRef),
    /// `TT<args...>` where `TT` is a template template parameter.
    ParamSpecialization {
        param: ParamRef,
        args: Arc<[TemplateArg]>,
    },
    /// Class template specialization `S<args...>`; `args` is normalized to
    /// one entry per parameter of the primary template.
    Specialization {
        template: SymbolId,
        args: Arc<[TemplateArg]>,
    },
    /// `typename Scope::name` with a dependent scope.
    DependentMember {
        scope: Idx,
        name: Name,
    },
    /// `pattern...`
    PackExpansion(Idx),
    Auto,
    DecltypeAuto,
    Dependent,
    Problem(ProblemKind),
}
