use crate::node::Node;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Unique numeric identifier for a node in a pipeline graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(u64);

impl NodeId {
    /// Return the underlying numeric value.
    #[must_use]
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Deferred computation graph shared by every [`PCollection`](crate::PCollection)
/// built from it. Cloning is cheap and shares the graph.
#[derive(Clone, Default)]
pub struct Pipeline {
    inner: Arc<Mutex<PipelineInner>>,
}

#[derive(Default)]
pub(crate) struct PipelineInner {
    next_id: u64,
    nodes: HashMap<NodeId, Node>,
    edges: Vec<(NodeId, NodeId)>,
}

impl Pipeline {
    fn graph(&self) -> MutexGuard<'_, PipelineInner> {
        // Graph edits never leave the inner state half-written, so a poisoned
        // lock still guards a consistent graph.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn insert_node(&self, node: Node) -> NodeId {
        let mut g = self.graph();
        let id = NodeId(g.next_id);
        g.next_id += 1;
        g.nodes.insert(id, node);
        id
    }

    pub(crate) fn connect(&self, from: NodeId, to: NodeId) {
        self.graph().edges.push((from, to));
    }

    /// Clone the current nodes and edges.
    #[must_use]
    pub fn snapshot(&self) -> (HashMap<NodeId, Node>, Vec<(NodeId, NodeId)>) {
        let g = self.graph();
        (g.nodes.clone(), g.edges.clone())
    }

    /// Number of nodes inserted so far.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph().nodes.len()
    }
}
