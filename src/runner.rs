//! Execution engine.
//!
//! The runner walks the graph backwards from a terminal node to its source,
//! producing a linear chain, then executes it either on the calling thread or
//! on a rayon pool:
//!
//! - adjacent stateless nodes are fused and run per shard,
//! - a `GroupByKey` is a barrier: shard-local groups are merged in shard order
//!   and the merged groups are re-sharded so the next stage (the reduce side)
//!   runs in parallel again, one shard holding many whole keys.

use crate::node::{DynOp, Node};
use crate::pipeline::{NodeId, Pipeline};
use crate::type_token::Partition;
use anyhow::{Context, Result, anyhow, bail};
use rayon::prelude::*;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecMode {
    Sequential,
    Parallel {
        threads: Option<usize>,
        partitions: Option<usize>,
    },
}

pub struct Runner {
    pub mode: ExecMode,
    pub default_partitions: usize,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            mode: ExecMode::Parallel {
                threads: None,
                partitions: None,
            },
            default_partitions: 2 * num_cpus::get().max(2),
        }
    }
}

impl Runner {
    pub fn run_collect<T: 'static + Send + Sync + Clone>(
        &self,
        p: &Pipeline,
        terminal: NodeId,
    ) -> Result<Vec<T>> {
        let chain = linearize(p, terminal)?;
        match self.mode {
            ExecMode::Sequential => exec_seq::<T>(chain),
            ExecMode::Parallel {
                threads,
                partitions,
            } => {
                let parts = partitions.unwrap_or(self.default_partitions).max(1);
                match threads {
                    Some(t) => {
                        let pool = rayon::ThreadPoolBuilder::new()
                            .num_threads(t)
                            .build()
                            .context("building rayon pool")?;
                        pool.install(|| exec_parallel::<T>(chain, parts))
                    }
                    None => exec_parallel::<T>(chain, parts),
                }
            }
        }
    }
}

/// Linear backwalk: terminal → … → source, returned source first.
fn linearize(p: &Pipeline, terminal: NodeId) -> Result<Vec<Node>> {
    let (mut nodes, edges) = p.snapshot();
    let mut chain = Vec::new();
    let mut cur = terminal;
    loop {
        let n = nodes
            .remove(&cur)
            .ok_or_else(|| anyhow!("missing node {cur}"))?;
        chain.push(n);
        match edges.iter().find(|(_, to)| *to == cur) {
            Some((from, _)) => cur = *from,
            None => break,
        }
    }
    chain.reverse();
    Ok(chain)
}

fn fuse_stateless(ops: &[Arc<dyn DynOp>], input: Partition) -> Result<Partition> {
    ops.iter().try_fold(input, |acc, op| op.apply(acc))
}

fn into_terminal<T: 'static>(parts: Vec<Partition>) -> Result<Vec<T>> {
    let mut out = Vec::<T>::new();
    for part in parts {
        let v = *part
            .downcast::<Vec<T>>()
            .map_err(|_| anyhow!("terminal type mismatch, wanted Vec<{}>", std::any::type_name::<T>()))?;
        out.extend(v);
    }
    Ok(out)
}

/// Sequential executor (single shard in-process)
fn exec_seq<T: 'static + Send + Sync + Clone>(chain: Vec<Node>) -> Result<Vec<T>> {
    let mut iter = chain.into_iter();
    let mut buf: Partition = match iter.next() {
        Some(Node::Source {
            payload,
            vec_ops,
            elem_tag,
        }) => vec_ops
            .clone_any(payload.as_ref())
            .ok_or_else(|| anyhow!("source payload is not Vec<{}>", elem_tag.name))?,
        Some(other) => bail!("plan must start with a source, found {}", other.label()),
        None => bail!("empty plan"),
    };

    for node in iter {
        buf = match node {
            Node::Stateless(ops) => fuse_stateless(&ops, buf)?,
            Node::GroupByKey { local, merge, .. } => merge(vec![local(buf)?])?,
            Node::Source { .. } => bail!("unexpected additional source in plan"),
        };
    }

    into_terminal::<T>(vec![buf])
}

/// Parallel executor (shard source → fuse stateless per shard → barriers)
fn exec_parallel<T: 'static + Send + Sync + Clone>(chain: Vec<Node>, partitions: usize) -> Result<Vec<T>> {
    let Some((head, rest)) = chain.split_first() else {
        bail!("empty plan");
    };
    let Node::Source {
        payload,
        vec_ops,
        elem_tag,
    } = head
    else {
        bail!("plan must start with a source, found {}", head.label());
    };

    let total_len = vec_ops.len(payload.as_ref()).unwrap_or(0);
    let parts = partitions.min(total_len.max(1));
    let mut shards: Vec<Partition> = vec_ops
        .split(payload.as_ref(), parts)
        .ok_or_else(|| anyhow!("source payload is not Vec<{}>", elem_tag.name))?;

    let mut i = 0usize;
    while i < rest.len() {
        match &rest[i] {
            Node::Stateless(_) => {
                let mut ops: Vec<Arc<dyn DynOp>> = Vec::new();
                while let Some(Node::Stateless(more)) = rest.get(i) {
                    ops.extend(more.iter().cloned());
                    i += 1;
                }
                // Indexed collect keeps shard order.
                shards = shards
                    .into_par_iter()
                    .map(|shard| fuse_stateless(&ops, shard))
                    .collect::<Result<Vec<_>>>()?;
            }
            Node::GroupByKey {
                local,
                merge,
                reshard,
            } => {
                let locals = shards
                    .into_par_iter()
                    .map(|shard| local(shard))
                    .collect::<Result<Vec<_>>>()?;
                shards = reshard(merge(locals)?, partitions)?;
                i += 1;
            }
            Node::Source { .. } => bail!("unexpected additional source in plan"),
        }
    }

    into_terminal::<T>(shards)
}
