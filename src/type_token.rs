//! Type tags and type-erased vector helpers.
//!
//! The engine moves data between stages as opaque [`Partition`] buffers. Source
//! nodes carry a [`VecOps`] so the runner can measure, shard, and clone their
//! payload without knowing the element type at compile time.
//!
//! All operations return `None` when the payload is not the `Vec<T>` the
//! implementation was built for; the runner turns that into an error.

use std::any::{Any, TypeId, type_name};
use std::marker::PhantomData;
use std::sync::Arc;

/// A shard of stage data carried between nodes at runtime.
///
/// Nodes downcast it to the concrete `Vec<T>` they expect.
pub type Partition = Box<dyn Any + Send + Sync>;

/// Runtime element-type tag attached to source nodes, used in error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeTag {
    /// Stable Rust type identifier.
    pub id: TypeId,
    /// Human-readable type name (best-effort).
    pub name: &'static str,
}

impl TypeTag {
    /// Construct a tag for `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }
}

/// Type-erased helpers for a source `Vec<T>`.
pub trait VecOps: Send + Sync {
    /// Number of elements, if `data` is a `Vec<T>`.
    fn len(&self, data: &dyn Any) -> Option<usize>;

    /// Split `data` into at most `n` contiguous shards.
    ///
    /// Shards are returned in source order and each keeps the relative order of
    /// its elements; the grouping barrier relies on both.
    fn split(&self, data: &dyn Any, n: usize) -> Option<Vec<Partition>>;

    /// Clone the whole payload into a single [`Partition`].
    fn clone_any(&self, data: &dyn Any) -> Option<Partition>;
}

struct VecOpsImpl<T: Clone + Send + Sync + 'static>(PhantomData<T>);

impl<T: Clone + Send + Sync + 'static> VecOps for VecOpsImpl<T> {
    fn len(&self, data: &dyn Any) -> Option<usize> {
        data.downcast_ref::<Vec<T>>().map(Vec::len)
    }

    fn split(&self, data: &dyn Any, n: usize) -> Option<Vec<Partition>> {
        let v = data.downcast_ref::<Vec<T>>()?;
        Some(
            split_contiguous(v, n)
                .into_iter()
                .map(|c| Box::new(c) as Partition)
                .collect(),
        )
    }

    fn clone_any(&self, data: &dyn Any) -> Option<Partition> {
        data.downcast_ref::<Vec<T>>()
            .map(|v| Box::new(v.clone()) as Partition)
    }
}

/// Create a type-erased `VecOps` for `Vec<T>`.
#[must_use]
pub fn vec_ops_for<T: Clone + Send + Sync + 'static>() -> Arc<dyn VecOps> {
    Arc::new(VecOpsImpl::<T>(PhantomData))
}

/// Split a slice into at most `n` ordered, contiguous chunks of near-equal size.
pub(crate) fn split_contiguous<T: Clone>(v: &[T], n: usize) -> Vec<Vec<T>> {
    if n <= 1 || v.len() <= 1 {
        return vec![v.to_vec()];
    }
    let chunk = v.len().div_ceil(n);
    v.chunks(chunk).map(<[T]>::to_vec).collect()
}
