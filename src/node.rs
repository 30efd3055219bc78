use crate::type_token::{Partition, TypeTag, VecOps};
use anyhow::Result;
use std::any::Any;
use std::sync::Arc;

/// A type-erased, element-wise stage operation.
pub trait DynOp: Send + Sync {
    fn apply(&self, input: Partition) -> Result<Partition>;
}

pub(crate) type LocalFn = Arc<dyn Fn(Partition) -> Result<Partition> + Send + Sync>;
pub(crate) type MergeFn = Arc<dyn Fn(Vec<Partition>) -> Result<Partition> + Send + Sync>;
pub(crate) type ReshardFn = Arc<dyn Fn(Partition, usize) -> Result<Vec<Partition>> + Send + Sync>;

#[derive(Clone)]
pub enum Node {
    Source {
        payload: Arc<dyn Any + Send + Sync>,
        vec_ops: Arc<dyn VecOps>,
        elem_tag: TypeTag,
    },
    Stateless(Vec<Arc<dyn DynOp>>),

    /// Stable grouping barrier.
    /// - `local`: Vec<(K, V)> → Vec<(K, Vec<V>)>, keys in first-seen order
    /// - `merge`: shard-local groups, in shard order → Vec<(K, Vec<V>)>
    /// - `reshard`: split merged groups across `n` reduce shards
    GroupByKey {
        local: LocalFn,
        merge: MergeFn,
        reshard: ReshardFn,
    },
}

impl Node {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Node::Source { .. } => "source",
            Node::Stateless(_) => "stateless",
            Node::GroupByKey { .. } => "group_by_key",
        }
    }
}
