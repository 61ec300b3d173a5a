//! C/C++ type system for the semantic core.
//!
//! - [`Idx`]: 32-bit handle of an interned type; equality is handle equality
//! - [`TypePool`]: sharded, thread-safe interner that normalizes on
//!   construction (reference collapsing, cv merging, parameter adjustment)
//! - [`TypeFlags`]: presence and category flags computed once per type
//! - [`subst`]: substitution of template arguments into type patterns
//! - [`conversion`]: standard conversion sequences and their ranking

pub mod conversion;
mod data;
mod flags;
mod idx;
mod pool;
pub mod subst;
mod symbol;
mod value_category;

pub use conversion::{
    standard_conversion, ClassHierarchy, ConversionRank, ConversionSource, Cost, NoHierarchy,
    RefBinding,
};
pub use data::{Cv, FunctionSig, ParamRef, TemplateArg, TypeData, Value};
pub use flags::TypeFlags;
pub use idx::Idx;
pub use pool::{PoolError, TypeNames, TypePool};
pub use subst::{ParamBindings, SubstEnv};
pub use symbol::SymbolId;
pub use value_category::ValueCategory;

cxx_ir::static_assert_size!(SymbolId, 4);
cxx_ir::static_assert_size!(ParamRef, 12);
