use crate::node::{DynOp, Node};
use crate::pipeline::{NodeId, Pipeline};
use crate::runner::{ExecMode, Runner};
use crate::type_token::{Partition, TypeTag, vec_ops_for};
use anyhow::{Result, anyhow};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;

/// Bound shared by every element type that can flow through a stage.
pub trait RFBound: 'static + Send + Sync + Clone + Serialize + DeserializeOwned {}
impl<T> RFBound for T where T: 'static + Send + Sync + Clone + Serialize + DeserializeOwned {}

/// A lazily evaluated collection of `T` attached to a [`Pipeline`].
#[derive(Clone)]
pub struct PCollection<T> {
    pub(crate) pipeline: Pipeline,
    pub(crate) id: NodeId,
    pub(crate) _t: PhantomData<T>,
}

/// Attach an owned vector as a source stage.
pub fn from_vec<T>(p: &Pipeline, data: Vec<T>) -> PCollection<T>
where
    T: RFBound,
{
    let id = p.insert_node(Node::Source {
        payload: Arc::new(data),
        vec_ops: vec_ops_for::<T>(),
        elem_tag: TypeTag::of::<T>(),
    });
    PCollection {
        pipeline: p.clone(),
        id,
        _t: PhantomData,
    }
}

fn downcast_input<T: 'static>(input: Partition, op: &str) -> Result<Vec<T>> {
    input
        .downcast::<Vec<T>>()
        .map(|b| *b)
        .map_err(|_| anyhow!("{op}: unexpected input type, wanted Vec<{}>", std::any::type_name::<T>()))
}

struct MapOp<I, O, F>(F, PhantomData<(I, O)>);
impl<I, O, F> DynOp for MapOp<I, O, F>
where
    I: RFBound,
    O: RFBound,
    F: Send + Sync + Fn(&I) -> O + 'static,
{
    fn apply(&self, input: Partition) -> Result<Partition> {
        let v = downcast_input::<I>(input, "map")?;
        let out: Vec<O> = v.iter().map(|i| self.0(i)).collect();
        Ok(Box::new(out))
    }
}

struct FilterOp<T, P>(P, PhantomData<T>);
impl<T, P> DynOp for FilterOp<T, P>
where
    T: RFBound,
    P: Send + Sync + Fn(&T) -> bool + 'static,
{
    fn apply(&self, input: Partition) -> Result<Partition> {
        let v = downcast_input::<T>(input, "filter")?;
        Ok(Box::new(v.into_iter().filter(|t| self.0(t)).collect::<Vec<T>>()))
    }
}

struct FlatMapOp<I, O, F>(F, PhantomData<(I, O)>);
impl<I, O, F> DynOp for FlatMapOp<I, O, F>
where
    I: RFBound,
    O: RFBound,
    F: Send + Sync + Fn(&I) -> Vec<O> + 'static,
{
    fn apply(&self, input: Partition) -> Result<Partition> {
        let v = downcast_input::<I>(input, "flat_map")?;
        let out: Vec<O> = v.iter().flat_map(|i| self.0(i)).collect();
        Ok(Box::new(out))
    }
}

impl<T: RFBound> PCollection<T> {
    fn then<U>(self, op: Arc<dyn DynOp>) -> PCollection<U> {
        let id = self.pipeline.insert_node(Node::Stateless(vec![op]));
        self.pipeline.connect(self.id, id);
        PCollection {
            pipeline: self.pipeline,
            id,
            _t: PhantomData,
        }
    }

    pub fn map<O, F>(self, f: F) -> PCollection<O>
    where
        O: RFBound,
        F: 'static + Send + Sync + Fn(&T) -> O,
    {
        self.then(Arc::new(MapOp::<T, O, F>(f, PhantomData)))
    }

    pub fn filter<F>(self, pred: F) -> PCollection<T>
    where
        F: 'static + Send + Sync + Fn(&T) -> bool,
    {
        self.then(Arc::new(FilterOp::<T, F>(pred, PhantomData)))
    }

    /// Map each element to zero or more outputs. Output order follows input order.
    pub fn flat_map<O, F>(self, f: F) -> PCollection<O>
    where
        O: RFBound,
        F: 'static + Send + Sync + Fn(&T) -> Vec<O>,
    {
        self.then(Arc::new(FlatMapOp::<T, O, F>(f, PhantomData)))
    }

    /// Run the pipeline on the calling thread.
    pub fn collect_seq(self) -> Result<Vec<T>> {
        Runner {
            mode: ExecMode::Sequential,
            ..Default::default()
        }
        .run_collect::<T>(&self.pipeline, self.id)
    }

    /// Run the pipeline on a rayon pool.
    pub fn collect_par(self, threads: Option<usize>, partitions: Option<usize>) -> Result<Vec<T>> {
        Runner {
            mode: ExecMode::Parallel {
                threads,
                partitions,
            },
            ..Default::default()
        }
        .run_collect::<T>(&self.pipeline, self.id)
    }

    /// Run with an explicit [`Runner`].
    pub fn collect_with(self, runner: &Runner) -> Result<Vec<T>> {
        runner.run_collect::<T>(&self.pipeline, self.id)
    }
}
