//! What `Graph::compile` hands back (`SPEC_FULL.md` §4.6 supplement): a
//! structured report rather than a bare `Result<(), EngineError>`, since a
//! successful compile still carries diagnostics (the execution order, the
//! aliasing efficiency) a caller may want without re-deriving them.

use rg_core::NodeId;

/// One node's compile-time failure, with enough identity to report without
/// holding a borrow into the graph.
#[derive(Clone, Debug)]
pub struct NodeCompileError {
    pub node: NodeId,
    pub name: String,
    pub error: rg_core::EngineError,
}

#[derive(Clone, Debug, Default)]
pub struct CompileReport {
    pub errors: Vec<NodeCompileError>,
    pub execution_order: Vec<NodeId>,
    pub aliasing_efficiency: f64,
}

impl CompileReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
