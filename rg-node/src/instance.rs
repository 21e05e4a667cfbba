//! Node instance — the runtime entity (spec §3, "Node type" / "Node
//! instance") carrying task-aligned input/output bundles, parameters, tags,
//! loop connections, compile/execute/cleanup state, and a per-instance
//! event subscription set.

use std::collections::{HashMap, HashSet};

use rg_core::{DeviceId, LifecycleError, LoopId, NodeHandle, NodeId, NodeTypeId, SubscriptionId};
use rg_resource::ResourceRegistry;

use crate::behavior::NodeBehavior;
use crate::bundle::Bundle;
use crate::context::{
    CleanupContext, CompileContext, ExecuteContext, GraphCompileSetupContext, SetupContext,
    TaskContext,
};
use crate::lifecycle::NodeState;
use crate::param::ParamValue;

#[derive(Debug)]
pub struct NodeInstance {
    pub id: NodeId,
    pub name: String,
    pub handle: NodeHandle,
    pub tags: HashSet<String>,
    pub type_id: NodeTypeId,
    pub device_affinity: Option<DeviceId>,
    pub state: NodeState,
    pub bundles: Vec<Bundle>,
    pub params: HashMap<String, ParamValue>,
    pub loop_refs: Vec<LoopId>,
    pub event_subscriptions: Vec<SubscriptionId>,
    pub needs_recompile: bool,
    /// Parameters explicitly supplied by the caller, as opposed to left to
    /// fall back on the node type's schema default. Used by the compiler's
    /// validate step (spec §7 `ValidationError::ParameterMissing`) to tell
    /// "required and defaulted" apart from "required and actually missing".
    pub provided_params: HashSet<String>,
    cleaned: bool,
    input_use: HashSet<usize>,
}

impl NodeInstance {
    pub fn new(
        name: impl Into<String>,
        handle: NodeHandle,
        type_id: NodeTypeId,
        params: HashMap<String, ParamValue>,
    ) -> Self {
        NodeInstance {
            id: NodeId::next(),
            name: name.into(),
            handle,
            tags: HashSet::new(),
            type_id,
            device_affinity: None,
            state: NodeState::Created,
            bundles: Vec::new(),
            params,
            loop_refs: Vec::new(),
            event_subscriptions: Vec::new(),
            needs_recompile: false,
            provided_params: HashSet::new(),
            cleaned: false,
            input_use: HashSet::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Records which parameters were explicitly supplied rather than left
    /// at their schema default. Non-breaking companion to [`Self::new`].
    pub fn with_provided_params(mut self, provided: HashSet<String>) -> Self {
        self.provided_params = provided;
        self
    }

    pub fn is_cleaned(&self) -> bool {
        self.cleaned
    }

    /// Graph->Setup prologue: "resets per-compile input-use tracking."
    pub fn run_setup(&mut self, behavior: &mut dyn NodeBehavior) -> Result<(), LifecycleError> {
        self.state = self.state.transition(NodeState::Setup, &self.name, "setup")?;
        self.input_use.clear();
        let mut ctx = SetupContext {
            node: self.id,
            params: &self.params,
        };
        behavior.setup(&mut ctx);
        Ok(())
    }

    /// spec §4.6 step 2: runs once per compile, after connections finalize
    /// and before any node's `compile`. `variadic_binding_count` is how many
    /// tentative variadic slots the connection builder registered against
    /// this node.
    pub fn run_graph_compile_setup(
        &mut self,
        behavior: &mut dyn NodeBehavior,
        variadic_binding_count: usize,
    ) -> Result<(), rg_core::EngineError> {
        let mut ctx = GraphCompileSetupContext {
            node: self.id,
            params: &self.params,
            variadic_binding_count,
        };
        behavior.graph_compile_setup(&mut ctx)
    }

    /// Allocate this node's task bundles ahead of compile, once task count
    /// is known (spec §4.3).
    pub fn allocate_bundles(&mut self, task_count: usize, input_count: usize, output_count: usize) {
        self.bundles = (0..task_count.max(1))
            .map(|_| Bundle::new(input_count, output_count))
            .collect();
    }

    pub fn run_compile(
        &mut self,
        behavior: &mut dyn NodeBehavior,
        registry: &mut ResourceRegistry,
    ) -> Result<(), rg_core::EngineError> {
        let mut ctx = CompileContext {
            node: self.id,
            registry,
            bundles: &mut self.bundles,
            params: &self.params,
            input_use: &mut self.input_use,
        };
        behavior.compile(&mut ctx)?;
        self.state = self
            .state
            .transition(NodeState::Compiled, &self.name, "compile")
            .map_err(rg_core::EngineError::from)?;
        Ok(())
    }

    /// Compiled -> Ready, "once the graph's compile pipeline finalises
    /// execution order."
    pub fn mark_ready(&mut self) -> Result<(), LifecycleError> {
        self.state = self.state.transition(NodeState::Ready, &self.name, "finalize")?;
        Ok(())
    }

    /// spec §4.3: "should_execute_this_frame = true if no loop refs are
    /// connected OR at least one connected loop ref has its flag set."
    pub fn should_execute(&self, connected_loop_flags: &[bool]) -> bool {
        self.loop_refs.is_empty() || connected_loop_flags.iter().any(|&f| f)
    }

    /// Drives one `execute` call per bundle (spec §4.3: "called `task_count`
    /// times per frame per node"), passing an explicit [`TaskContext`]
    /// instead of relying on thread-local state (spec §9 redesign note).
    pub fn run_execute(
        &mut self,
        behavior: &mut dyn NodeBehavior,
        registry: &ResourceRegistry,
        delta_time: f64,
        step_count: u64,
    ) -> Result<(), LifecycleError> {
        self.state = self.state.transition(NodeState::Executing, &self.name, "execute")?;
        let ectx = ExecuteContext {
            node: self.id,
            registry,
            delta_time,
            step_count,
        };
        for (index, bundle) in self.bundles.iter_mut().enumerate() {
            let task = TaskContext {
                task_index: index,
                bundle,
            };
            behavior.execute(&ectx, task);
        }
        self.state = self
            .state
            .transition(NodeState::Ready, &self.name, "execute_done")?;
        Ok(())
    }

    /// "guaranteed at-most-once even if invoked multiple times"; a repeat
    /// call is swallowed, not reported, by design (spec §7: LifecycleError
    /// "double cleanup (swallowed, not reported, by design)").
    pub fn run_cleanup(&mut self, behavior: &mut dyn NodeBehavior, registry: &mut ResourceRegistry) {
        if self.cleaned {
            return;
        }
        let mut ctx = CleanupContext {
            node: self.id,
            registry,
        };
        behavior.cleanup(&mut ctx);
        self.cleaned = true;
        self.state = self
            .state
            .transition(NodeState::Cleaned, &self.name, "cleanup")
            .unwrap_or(NodeState::Cleaned);
    }

    pub fn flag_needs_recompile(&mut self) {
        self.needs_recompile = true;
    }

    /// "the graph moves it back to Setup between frames" for any node with
    /// the flag set — called at the start of the next compile barrier.
    pub fn apply_deferred_recompile(&mut self) -> bool {
        if self.needs_recompile {
            self.state = self.state.force_setup();
            self.needs_recompile = false;
            self.cleaned = false;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CleanupContext, CompileContext, ExecuteContext, SetupContext, TaskContext};

    #[derive(Debug, Default)]
    struct CountingBehavior {
        setups: u32,
        compiles: u32,
        executes: u32,
        cleanups: u32,
    }

    impl NodeBehavior for CountingBehavior {
        fn setup(&mut self, _ctx: &mut SetupContext<'_>) {
            self.setups += 1;
        }
        fn compile(&mut self, _ctx: &mut CompileContext<'_>) -> Result<(), rg_core::EngineError> {
            self.compiles += 1;
            Ok(())
        }
        fn execute(&mut self, _ctx: &ExecuteContext<'_>, _task: TaskContext<'_>) {
            self.executes += 1;
        }
        fn cleanup(&mut self, _ctx: &mut CleanupContext<'_>) {
            self.cleanups += 1;
        }
    }

    #[test]
    fn full_lifecycle_happy_path() {
        let mut node = NodeInstance::new("A", NodeHandle(0), NodeTypeId(0), HashMap::new());
        let mut behavior = CountingBehavior::default();
        let mut registry = ResourceRegistry::new();

        node.run_setup(&mut behavior).unwrap();
        node.allocate_bundles(1, 0, 1);
        node.run_compile(&mut behavior, &mut registry).unwrap();
        node.mark_ready().unwrap();
        node.run_execute(&mut behavior, &registry, 0.016, 1).unwrap();
        node.run_cleanup(&mut behavior, &mut registry);
        node.run_cleanup(&mut behavior, &mut registry); // idempotent

        assert_eq!(behavior.setups, 1);
        assert_eq!(behavior.compiles, 1);
        assert_eq!(behavior.executes, 1);
        assert_eq!(behavior.cleanups, 1, "second cleanup call must be swallowed");
        assert!(node.is_cleaned());
    }

    #[test]
    fn execute_runs_once_per_bundle() {
        let mut node = NodeInstance::new("B", NodeHandle(1), NodeTypeId(0), HashMap::new());
        let mut behavior = CountingBehavior::default();
        let mut registry = ResourceRegistry::new();

        node.run_setup(&mut behavior).unwrap();
        node.allocate_bundles(4, 0, 1);
        node.run_compile(&mut behavior, &mut registry).unwrap();
        node.mark_ready().unwrap();
        node.run_execute(&mut behavior, &registry, 0.016, 1).unwrap();

        assert_eq!(behavior.executes, 4);
    }

    #[test]
    fn no_connected_loops_always_executes() {
        let node = NodeInstance::new("C", NodeHandle(2), NodeTypeId(0), HashMap::new());
        assert!(node.should_execute(&[]));
    }

    #[test]
    fn gating_is_or_of_connected_loop_flags() {
        let mut node = NodeInstance::new("D", NodeHandle(3), NodeTypeId(0), HashMap::new());
        node.loop_refs.push(rg_core::LoopId(0));
        node.loop_refs.push(rg_core::LoopId(1));
        assert!(!node.should_execute(&[false, false]));
        assert!(node.should_execute(&[false, true]));
    }

    #[test]
    fn deferred_recompile_moves_any_state_back_to_setup() {
        let mut node = NodeInstance::new("E", NodeHandle(4), NodeTypeId(0), HashMap::new());
        node.state = NodeState::Ready;
        node.flag_needs_recompile();
        assert!(node.apply_deferred_recompile());
        assert_eq!(node.state, NodeState::Setup);
        assert!(!node.apply_deferred_recompile());
    }
}
