//! Keyed transforms: [`PCollection::key_by`] and the stable
//! [`PCollection::group_by_key`] barrier.
//!
//! Grouping is order-preserving. For every key, the values delivered downstream
//! appear in the order the upstream stage emitted them, in both sequential and
//! parallel execution. Keys come out in order of first appearance.

use crate::node::{LocalFn, MergeFn, Node, ReshardFn};
use crate::type_token::{Partition, split_contiguous};
use crate::{PCollection, RFBound};
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

impl<T: RFBound> PCollection<T> {
    /// Derive a key and produce `(K, T)`.
    pub fn key_by<K, F>(self, key_fn: F) -> PCollection<(K, T)>
    where
        K: RFBound + Eq + Hash,
        F: 'static + Send + Sync + Fn(&T) -> K,
    {
        self.map(move |t| (key_fn(t), t.clone()))
    }
}

/// Append `(key, values)` into `groups`, reusing the slot of a key already seen.
fn fold_ordered<K, V>(
    groups: &mut Vec<(K, Vec<V>)>,
    slots: &mut HashMap<K, usize>,
    key: K,
    values: impl IntoIterator<Item = V>,
) where
    K: Eq + Hash + Clone,
{
    if let Some(&slot) = slots.get(&key) {
        groups[slot].1.extend(values);
    } else {
        slots.insert(key.clone(), groups.len());
        groups.push((key, values.into_iter().collect()));
    }
}

impl<K: RFBound + Eq + Hash, V: RFBound> PCollection<(K, V)> {
    /// Transform values while keeping keys.
    pub fn map_values<O, F>(self, f: F) -> PCollection<(K, O)>
    where
        O: RFBound,
        F: 'static + Send + Sync + Fn(&V) -> O,
    {
        self.map(move |kv: &(K, V)| (kv.0.clone(), f(&kv.1)))
    }

    /// Group values by key: `(K, V)` → `(K, Vec<V>)`, stable per key.
    pub fn group_by_key(self) -> PCollection<(K, Vec<V>)> {
        let local: LocalFn = Arc::new(|p: Partition| -> Result<Partition> {
            let kv = *p
                .downcast::<Vec<(K, V)>>()
                .map_err(|_| anyhow!("group_by_key: bad shard input"))?;
            let mut groups: Vec<(K, Vec<V>)> = Vec::new();
            let mut slots: HashMap<K, usize> = HashMap::new();
            for (k, v) in kv {
                fold_ordered(&mut groups, &mut slots, k, [v]);
            }
            Ok(Box::new(groups))
        });

        // Shards arrive in source order, so folding them front to back keeps
        // each key's values in emission order.
        let merge: MergeFn = Arc::new(|parts: Vec<Partition>| -> Result<Partition> {
            let mut groups: Vec<(K, Vec<V>)> = Vec::new();
            let mut slots: HashMap<K, usize> = HashMap::new();
            for p in parts {
                let shard = *p
                    .downcast::<Vec<(K, Vec<V>)>>()
                    .map_err(|_| anyhow!("group_by_key: bad shard groups"))?;
                for (k, vs) in shard {
                    fold_ordered(&mut groups, &mut slots, k, vs);
                }
            }
            Ok(Box::new(groups))
        });

        let reshard: ReshardFn = Arc::new(|p: Partition, n: usize| -> Result<Vec<Partition>> {
            let groups = *p
                .downcast::<Vec<(K, Vec<V>)>>()
                .map_err(|_| anyhow!("group_by_key: bad merged groups"))?;
            Ok(split_contiguous(&groups, n)
                .into_iter()
                .map(|c| Box::new(c) as Partition)
                .collect())
        });

        let id = self.pipeline.insert_node(Node::GroupByKey {
            local,
            merge,
            reshard,
        });
        self.pipeline.connect(self.id, id);
        PCollection {
            pipeline: self.pipeline,
            id,
            _t: PhantomData,
        }
    }
}
