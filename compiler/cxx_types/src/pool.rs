//! Sharded type pool.
//!
//! Provides O(1) interning, lookup and equality via [`Idx`]. The pool is
//! shared by every translation unit and worker thread of a session: reads of
//! interned types take a shard read lock, insertion a shard write lock.

mod construct;
mod format;
mod query;

use std::hash::{Hash, Hasher};

use cxx_diagnostic::ProblemKind;
use cxx_ir::BuiltinType;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::{Idx, TemplateArg, TypeData, TypeFlags, Value};

pub use format::TypeNames;

/// Error when interning a type fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Shard exceeded capacity.
    #[error("type pool shard {shard_idx} exceeded capacity")]
    ShardOverflow { shard_idx: usize },
}

/// Number of shards.
const NUM_SHARDS: usize = 16;

/// Per-shard storage.
struct PoolShard {
    /// Map from type data to local index for deduplication.
    map: FxHashMap<TypeData, u32>,
    /// Type data and flags, indexed by local index.
    items: Vec<(TypeData, TypeFlags)>,
}

impl PoolShard {
    fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            items: Vec::with_capacity(256),
        }
    }

    /// Create shard 0 with the pre-interned entries at the fixed indices of
    /// the `Idx` constants.
    fn with_pre_interned() -> Self {
        let mut shard = Self::new();
        let builtins = BuiltinType::ALL.iter().map(|&b| TypeData::Builtin(b));
        let placeholders = [TypeData::Auto, TypeData::DecltypeAuto].into_iter();
        let problems = ProblemKind::ALL.iter().map(|&k| TypeData::Problem(k));
        let dependent = std::iter::once(TypeData::Dependent);

        for data in builtins.chain(placeholders).chain(problems).chain(dependent) {
            let flags = TypePool::compute_leaf_flags(&data);
            #[expect(
                clippy::cast_possible_truncation,
                reason = "pre-interned count is fixed and small"
            )]
            let local = shard.items.len() as u32;
            shard.map.insert(data.clone(), local);
            shard.items.push((data, flags));
        }
        debug_assert_eq!(shard.items.len(), Idx::PRE_INTERNED as usize);

        shard
    }
}

/// Sharded, thread-safe type pool.
pub struct TypePool {
    shards: [RwLock<PoolShard>; NUM_SHARDS],
}

impl TypePool {
    pub fn new() -> Self {
        let shards = std::array::from_fn(|i| {
            if i == 0 {
                RwLock::new(PoolShard::with_pre_interned())
            } else {
                RwLock::new(PoolShard::new())
            }
        });
        Self { shards }
    }

    #[inline]
    fn shard_for(data: &TypeData) -> usize {
        let mut hasher = rustc_hash::FxHasher::default();
        data.hash(&mut hasher);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "truncation is fine for hash-based shard selection"
        )]
        let hash_usize = hasher.finish() as usize;
        hash_usize % NUM_SHARDS
    }

    /// Fixed handles for pre-interned data.
    #[inline]
    fn pre_interned(data: &TypeData) -> Option<Idx> {
        match data {
            TypeData::Builtin(b) => Some(Idx::builtin(*b)),
            TypeData::Auto => Some(Idx::AUTO),
            TypeData::DecltypeAuto => Some(Idx::DECLTYPE_AUTO),
            TypeData::Problem(kind) => Some(Idx::problem(*kind)),
            TypeData::Dependent => Some(Idx::DEPENDENT),
            _ => None,
        }
    }

    /// Try to intern raw type data.
    ///
    /// No normalization happens here; use the constructors in `construct`
    /// to build canonical types.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "shard_idx is bounded by NUM_SHARDS (16)"
    )]
    pub fn try_intern(&self, data: TypeData) -> Result<Idx, PoolError> {
        if let Some(idx) = Self::pre_interned(&data) {
            return Ok(idx);
        }

        let shard_idx = Self::shard_for(&data);
        let shard = &self.shards[shard_idx];

        // Fast path: check if already interned
        {
            let guard = shard.read();
            if let Some(&local) = guard.map.get(&data) {
                return Ok(Idx::from_shard_local(shard_idx as u32, local));
            }
        }

        // Children live in other shards; compute flags before locking.
        let flags = self.compute_flags(&data);

        let mut guard = shard.write();

        // Double-check after acquiring write lock
        if let Some(&local) = guard.map.get(&data) {
            return Ok(Idx::from_shard_local(shard_idx as u32, local));
        }

        let local = u32::try_from(guard.items.len())
            .ok()
            .filter(|&local| local <= Idx::MAX_LOCAL)
            .ok_or(PoolError::ShardOverflow { shard_idx })?;

        guard.items.push((data.clone(), flags));
        guard.map.insert(data, local);

        Ok(Idx::from_shard_local(shard_idx as u32, local))
    }

    /// Intern raw type data.
    ///
    /// # Panics
    /// Panics if a shard exceeds capacity.
    #[inline]
    pub fn intern(&self, data: TypeData) -> Idx {
        self.try_intern(data).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Data of an interned type.
    ///
    /// # Panics
    /// Panics if `idx` was not produced by this pool.
    #[track_caller]
    pub fn get(&self, idx: Idx) -> TypeData {
        let guard = self.shards[idx.shard()].read();
        guard.items[idx.local()].0.clone()
    }

    /// Pre-computed flags of an interned type.
    #[track_caller]
    pub fn flags(&self, idx: Idx) -> TypeFlags {
        let guard = self.shards[idx.shard()].read();
        guard.items[idx.local()].1
    }

    /// Number of interned types, including pre-interned ones.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.read().items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn compute_leaf_flags(data: &TypeData) -> TypeFlags {
        match data {
            TypeData::Builtin(_) => TypeFlags::IS_BUILTIN,
            TypeData::Auto | TypeData::DecltypeAuto => TypeFlags::HAS_PLACEHOLDER,
            TypeData::Dependent => TypeFlags::HAS_DEPENDENT,
            TypeData::Problem(_) => TypeFlags::HAS_PROBLEM,
            _ => TypeFlags::empty(),
        }
    }

    fn arg_flags(&self, arg: &TemplateArg) -> TypeFlags {
        match arg {
            TemplateArg::Type(ty) => self.flags(*ty).presence(),
            TemplateArg::Value(Value::Param(p)) => {
                let mut flags = TypeFlags::HAS_TEMPLATE_PARAM;
                if p.pack {
                    flags |= TypeFlags::HAS_UNEXPANDED_PACK;
                }
                flags
            }
            TemplateArg::Value(Value::Dependent) => TypeFlags::HAS_DEPENDENT,
            TemplateArg::Value(_) | TemplateArg::Template(_) => TypeFlags::empty(),
            TemplateArg::Pack(elems) => elems
                .iter()
                .fold(TypeFlags::empty(), |acc, e| acc | self.arg_flags(e)),
        }
    }

    fn compute_flags(&self, data: &TypeData) -> TypeFlags {
        match data {
            TypeData::Builtin(_)
            | TypeData::Auto
            | TypeData::DecltypeAuto
            | TypeData::Dependent
            | TypeData::Problem(_) => Self::compute_leaf_flags(data),
            TypeData::Pointer(inner) => self.flags(*inner).presence() | TypeFlags::IS_POINTER,
            TypeData::LValueRef(inner) | TypeData::RValueRef(inner) => {
                self.flags(*inner).presence() | TypeFlags::IS_REFERENCE
            }
            TypeData::Qualified { inner, .. } => {
                let inner_flags = self.flags(*inner);
                // Category of the unqualified type carries over.
                inner_flags | TypeFlags::IS_QUALIFIED
            }
            TypeData::Array { elem, .. } => self.flags(*elem).presence() | TypeFlags::IS_ARRAY,
            TypeData::Function(sig) => {
                let params = sig
                    .params
                    .iter()
                    .fold(TypeFlags::empty(), |acc, p| acc | self.flags(*p).presence());
                params | self.flags(sig.ret).presence() | TypeFlags::IS_FUNCTION
            }
            TypeData::Class(_) | TypeData::Closure(_) => TypeFlags::IS_CLASS,
            TypeData::Enum(_) => TypeFlags::IS_ENUM,
            TypeData::TemplateParam(p) => {
                let mut flags = TypeFlags::HAS_TEMPLATE_PARAM;
                if p.pack {
                    flags |= TypeFlags::HAS_UNEXPANDED_PACK;
                }
                flags
            }
            TypeData::ParamSpecialization { args, .. } => {
                args.iter()
                    .fold(TypeFlags::HAS_TEMPLATE_PARAM, |acc, a| acc | self.arg_flags(a))
                    | TypeFlags::IS_CLASS
            }
            TypeData::Specialization { args, .. } => {
                args.iter()
                    .fold(TypeFlags::empty(), |acc, a| acc | self.arg_flags(a))
                    | TypeFlags::IS_CLASS
            }
            TypeData::DependentMember { scope, .. } => {
                self.flags(*scope).presence() | TypeFlags::HAS_DEPENDENT
            }
            TypeData::PackExpansion(pattern) => {
                (self.flags(*pattern).presence() - TypeFlags::HAS_UNEXPANDED_PACK)
                    | TypeFlags::HAS_PACK_EXPANSION
            }
        }
    }
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}
