//! Lookup of shape inference implementations by operator name.

use std::error::Error;
use std::fmt;

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::env::env_flag;
use crate::infer_shapes::{InferShapes, InferShapesError, OutputInfo};
use crate::node::NodeInfo;
use crate::ops::{FusedMatMul, MS_DOMAIN, MatMulInteger16, SparseToDenseMatMul, TransposeMatMul};

/// Shape inference implementation which can be shared across threads.
pub type DynInferShapes = dyn InferShapes + Send + Sync;

/// Error produced when shape inference fails for a named node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeError {
    /// Name of the node.
    pub node: String,
    /// Operator type of the node.
    pub op_type: String,
    pub error: InferShapesError,
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shape inference failed for {} node \"{}\": {}",
            self.op_type, self.node, self.error
        )
    }
}

impl Error for NodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

/// Outcome of shape inference for a node.
///
/// `Ok(None)` means the node's operator has no registered implementation.
pub type NodeResult = Result<Option<Vec<OutputInfo>>, NodeError>;

/// Registry of shape inference implementations, keyed by operator domain
/// and type.
///
/// New registries have no operators registered. To create a registry with
/// the contrib MatMul operators registered use
/// [`OpRegistry::with_contrib_matmul_ops`].
#[derive(Default)]
pub struct OpRegistry {
    ops: FxHashMap<String, FxHashMap<String, Box<DynInferShapes>>>,
}

impl OpRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all operators in the [`ops`](crate::ops) module
    /// registered in the `com.microsoft` domain.
    pub fn with_contrib_matmul_ops() -> Self {
        let mut reg = Self::new();
        reg.register_op(MS_DOMAIN, "FusedMatMul", FusedMatMul);
        reg.register_op(MS_DOMAIN, "TransposeMatMul", TransposeMatMul);
        reg.register_op(MS_DOMAIN, "SparseToDenseMatMul", SparseToDenseMatMul);
        reg.register_op(MS_DOMAIN, "MatMulInteger16", MatMulInteger16);
        reg
    }

    /// Register the shape inference implementation for an operator,
    /// replacing any existing registration.
    pub fn register_op<Op: InferShapes + Send + Sync + 'static>(
        &mut self,
        domain: &str,
        op_type: &str,
        op: Op,
    ) {
        self.ops
            .entry(domain.to_string())
            .or_default()
            .insert(op_type.to_string(), Box::new(op));
    }

    /// Return the implementation registered for an operator.
    pub fn get(&self, domain: &str, op_type: &str) -> Option<&DynInferShapes> {
        self.ops.get(domain)?.get(op_type).map(|op| op.as_ref())
    }

    /// Run shape inference for a single node.
    pub fn infer_node(&self, node: &NodeInfo) -> NodeResult {
        let Some(op) = self.get(node.domain(), node.op_type()) else {
            log::debug!(
                "no shape inference for {}::{} node \"{}\"",
                node.domain(),
                node.op_type(),
                node.name()
            );
            return Ok(None);
        };

        log::trace!("inferring shapes for {} node \"{}\"", node.op_type(), node.name());

        match op.infer_shapes(node) {
            Ok(outputs) => {
                if outputs.iter().any(|out| out.shape.is_none()) {
                    log::debug!(
                        "output shapes of {} node \"{}\" are not fully known",
                        node.op_type(),
                        node.name()
                    );
                }
                Ok(Some(outputs))
            }
            Err(error) => {
                let err = NodeError {
                    node: node.name().to_string(),
                    op_type: node.op_type().to_string(),
                    error,
                };
                log::debug!("{}", err);
                Err(err)
            }
        }
    }

    /// Run shape inference for a batch of independent nodes.
    ///
    /// Nodes are processed in parallel on the Rayon thread pool, unless the
    /// `RTEN_INFER_SERIAL` environment variable is set. Results are returned
    /// in the same order as `nodes`.
    pub fn infer_nodes(&self, nodes: &[NodeInfo]) -> Vec<NodeResult> {
        self.infer_nodes_impl(nodes, !env_flag("RTEN_INFER_SERIAL", false))
    }

    fn infer_nodes_impl(&self, nodes: &[NodeInfo], parallel: bool) -> Vec<NodeResult> {
        if parallel {
            nodes.par_iter().map(|node| self.infer_node(node)).collect()
        } else {
            nodes.iter().map(|node| self.infer_node(node)).collect()
        }
    }
}
