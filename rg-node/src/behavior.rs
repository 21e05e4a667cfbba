//! The four lifecycle hooks a node type implements (spec §4.3): "the
//! user-overridable points". Grounded on `graph/src/node/mod.rs`'s
//! `Node`/`NodeDesc` split in the teacher, collapsed to a single
//! object-safe trait since the core no longer needs a separate
//! description/instance split once the backend is abstracted away.

use rg_core::EngineError;

use crate::context::{
    CleanupContext, CompileContext, ExecuteContext, GraphCompileSetupContext, SetupContext,
    TaskContext,
};

pub trait NodeBehavior: std::fmt::Debug + Send {
    /// Graph-scope init; no input/output access (spec §4.3).
    fn setup(&mut self, _ctx: &mut SetupContext<'_>) {}

    /// Runs once per compile, after connections are finalized and before any
    /// node's `compile` is called (spec §4.6 step 2). Variadic and
    /// struct-unpacker nodes use this to register dynamic slots derived from
    /// whatever was connected to them; most nodes leave it as a no-op.
    fn graph_compile_setup(
        &mut self,
        _ctx: &mut GraphCompileSetupContext<'_>,
    ) -> Result<(), EngineError> {
        Ok(())
    }

    /// Resource allocation, pipeline construction; reads input slots,
    /// writes output slots; the node is registered into the cleanup stack
    /// automatically by the compiler on return (spec §4.3, §4.6 step 9).
    fn compile(&mut self, ctx: &mut CompileContext<'_>) -> Result<(), EngineError>;

    /// Per-bundle work; called `task_count` times per frame per node.
    fn execute(&mut self, ctx: &ExecuteContext<'_>, task: TaskContext<'_>);

    /// Destroys resources; the compiler guarantees at-most-once invocation
    /// even if called multiple times (spec §4.3: "guaranteed at-most-once
    /// even if invoked multiple times").
    fn cleanup(&mut self, _ctx: &mut CleanupContext<'_>) {}
}
