//! The compiler proper: owns every other subsystem and drives the
//! ten-step compile pipeline, plus `execute`/`render_frame` on top of it.
//! The backend itself is abstracted away entirely — this crate resolves
//! an arbitrary node/connection set into an executable schedule without
//! ever touching a concrete device.

use std::collections::{HashMap, HashSet};

use rg_alias::{AliasingEngine, MemoryRequirements};
use rg_budget::{Budget, BudgetCategory, BudgetManager};
use rg_cleanup::CleanupStack;
use rg_connect::{
    ConnectionBuilder, Edge, FieldExtractor, RegisteredConnections, VariadicState,
};
use rg_core::{
    DeviceId, EngineError, LoopId, NodeHandle, NodeId, NodeTypeId, ResourceRef, SchemaError,
    ValidationError,
};
use rg_events::{Event, EventBus, Message};
use rg_lifetime::{LifetimeAnalyser, ResourceInfo};
use rg_loop::{CatchUpMode, LoopManager, LoopRef};
use rg_node::{
    compute_task_count, NodeBehavior, NodeInstance, NodeState, NodeType, ParamValue,
};
use rg_resource::{AllocationStrategy, ResourceRegistry};
use rg_slots::{ResourceCategory, ResourceDescriptor, ResourceTypeTag, SlotDescriptor};
use rg_topology::Topology;

use crate::config::CompilerConfig;
use crate::report::{CompileReport, NodeCompileError};

/// A node plus the boxed behavior the graph drives it through. Not
/// exposed outside the crate — callers interact with nodes only through
/// `NodeHandle`.
struct NodeSlot {
    instance: NodeInstance,
    behavior: Box<dyn NodeBehavior>,
    type_id: NodeTypeId,
}

/// Owns the topology, the resource registry, and every allocator/scheduler
/// subsystem, and orchestrates them into a single
/// `compile`/`execute`/`render_frame` API.
pub struct Graph {
    config: CompilerConfig,
    topology: Topology,
    registry: ResourceRegistry,
    budget: BudgetManager,
    alias: AliasingEngine,
    events: EventBus,
    loops: LoopManager,
    node_types: HashMap<NodeTypeId, NodeType>,
    nodes: Vec<NodeSlot>,
    builder: ConnectionBuilder,
    registered: RegisteredConnections,
    /// Per-output-slot resources produced by the most recent compile,
    /// indexed by (producing node, output slot). Rebuilt from scratch on
    /// every `compile`.
    node_outputs: HashMap<(NodeHandle, usize), Vec<ResourceRef>>,
    cleanup: Option<CleanupStack>,
    frame_index: u64,
    last_frame_time: f64,
    execution_order: Vec<NodeHandle>,
}

impl Graph {
    pub fn new(config: CompilerConfig) -> Self {
        let mut budget = BudgetManager::new();
        for (category, b) in &config.budgets {
            budget.set_budget(category.clone(), *b);
        }
        let alias = AliasingEngine::new(config.alias_threshold_bytes);
        Graph {
            config,
            topology: Topology::new(),
            registry: ResourceRegistry::new(),
            budget,
            alias,
            events: EventBus::new(),
            loops: LoopManager::new(),
            node_types: HashMap::new(),
            nodes: Vec::new(),
            builder: ConnectionBuilder::new(),
            registered: RegisteredConnections::default(),
            node_outputs: HashMap::new(),
            cleanup: None,
            frame_index: 0,
            last_frame_time: 0.0,
            execution_order: Vec::new(),
        }
    }

    // ---- registration -----------------------------------------------

    pub fn register_node_type(&mut self, node_type: NodeType) {
        self.node_types.insert(node_type.id, node_type);
    }

    /// Instantiate a node of a previously-registered type. `param_overrides`
    /// takes precedence over the type's schema defaults; every key present
    /// in it counts as "explicitly provided" for `validate`'s
    /// `ValidationError::ParameterMissing` check.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        type_id: NodeTypeId,
        behavior: Box<dyn NodeBehavior>,
        param_overrides: HashMap<String, ParamValue>,
    ) -> NodeHandle {
        let node_type = self
            .node_types
            .get(&type_id)
            .expect("node type must be registered before add_node");
        let mut params = node_type.parameters.defaults();
        let provided: HashSet<String> = param_overrides.keys().cloned().collect();
        for (k, v) in param_overrides {
            params.insert(k, v);
        }

        let handle = NodeHandle::from_index(self.nodes.len());
        let instance = NodeInstance::new(name, handle, type_id, params).with_provided_params(provided);
        self.topology.add_node(handle);
        self.nodes.push(NodeSlot {
            instance,
            behavior,
            type_id,
        });
        handle
    }

    pub fn add_tag(&mut self, node: NodeHandle, tag: impl Into<String>) {
        self.nodes[node.index()].instance.tags.insert(tag.into());
    }

    pub fn set_device_affinity(&mut self, node: NodeHandle, device: Option<DeviceId>) {
        self.nodes[node.index()].instance.device_affinity = device;
    }

    fn output_type_tag(&self, handle: NodeHandle, slot_index: usize) -> Result<ResourceTypeTag, EngineError> {
        let node = &self.nodes[handle.index()];
        let node_type = self.node_types.get(&node.type_id).expect("registered node type");
        let slot = node_type.output_slot(slot_index).ok_or_else(|| {
            SchemaError::UnregisteredType(format!(
                "output slot {} on node type `{}`",
                slot_index, node_type.name
            ))
        })?;
        match &slot.constraint {
            rg_slots::SlotTypeConstraint::Single(tag) => Ok(*tag),
            other => Err(SchemaError::IncompatibleSlot {
                node_type: node_type.name.clone(),
                slot: slot.name.clone(),
                expected: "a single concrete resource type".to_string(),
                found: format!("{:?}", other),
            }
            .into()),
        }
    }

    fn input_slot_descriptor(&self, handle: NodeHandle, slot_index: usize) -> Result<SlotDescriptor, EngineError> {
        let node = &self.nodes[handle.index()];
        let node_type = self.node_types.get(&node.type_id).expect("registered node type");
        node_type
            .input_slot(slot_index)
            .cloned()
            .ok_or_else(|| {
                SchemaError::UnregisteredType(format!(
                    "input slot {} on node type `{}`",
                    slot_index, node_type.name
                ))
                .into()
            })
    }

    /// Connection mode 1: a direct, type-checked edge.
    pub fn connect(
        &mut self,
        source: NodeHandle,
        source_slot: usize,
        target: NodeHandle,
        target_slot: usize,
        array_index: Option<usize>,
    ) -> Result<(), EngineError> {
        let tag = self.output_type_tag(source, source_slot)?;
        let descriptor = self.input_slot_descriptor(target, target_slot)?;
        self.builder
            .connect(source, source_slot, tag, target, &descriptor, array_index)?;
        Ok(())
    }

    /// Connection mode 2: one edge per array index.
    pub fn connect_to_array(
        &mut self,
        source: NodeHandle,
        source_slot: usize,
        target: NodeHandle,
        target_slot: usize,
        indices: &[usize],
    ) -> Result<(), EngineError> {
        let tag = self.output_type_tag(source, source_slot)?;
        let descriptor = self.input_slot_descriptor(target, target_slot)?;
        self.builder
            .connect_to_array(source, source_slot, tag, target, &descriptor, indices)?;
        Ok(())
    }

    /// Connection mode 3: a constant injected without an edge.
    pub fn connect_constant(
        &mut self,
        target: NodeHandle,
        target_slot: usize,
        descriptor: ResourceDescriptor,
        array_index: Option<usize>,
    ) -> Result<(), EngineError> {
        let target_descriptor = self.input_slot_descriptor(target, target_slot)?;
        self.builder
            .connect_constant(target, &target_descriptor, descriptor, array_index)?;
        Ok(())
    }

    /// Connection mode 4: struct-field extraction, resolved after the
    /// source node's compile.
    pub fn connect_field(
        &mut self,
        source: NodeHandle,
        source_slot: usize,
        target: NodeHandle,
        target_slot: usize,
        extractor: FieldExtractor,
        placeholder_descriptor: ResourceDescriptor,
        array_index: Option<usize>,
    ) -> Result<(), EngineError> {
        let target_descriptor = self.input_slot_descriptor(target, target_slot)?;
        self.builder.connect_field(
            source,
            source_slot,
            target,
            &target_descriptor,
            extractor,
            placeholder_descriptor,
            array_index,
        );
        Ok(())
    }

    /// Connection mode 5: a tentative variadic binding, validated at the
    /// destination node's compile.
    pub fn connect_variadic(
        &mut self,
        source: NodeHandle,
        source_slot: usize,
        dst: NodeHandle,
        binding: usize,
        slot_name: impl Into<String>,
    ) -> Result<(), EngineError> {
        let tag = self.output_type_tag(source, source_slot)?;
        self.builder
            .connect_variadic(source, source_slot, tag, dst, binding, slot_name);
        Ok(())
    }

    /// Field-extracting variant of [`Self::connect_variadic`].
    pub fn connect_variadic_field(
        &mut self,
        source: NodeHandle,
        source_slot: usize,
        dst: NodeHandle,
        binding: usize,
        slot_name: impl Into<String>,
        extractor: FieldExtractor,
    ) -> Result<(), EngineError> {
        let tag = self.output_type_tag(source, source_slot)?;
        self.builder
            .connect_variadic_field(source, source_slot, tag, dst, binding, slot_name, extractor);
        Ok(())
    }

    pub fn register_loop(
        &mut self,
        name: impl Into<String>,
        fixed_timestep: f64,
        catch_up_mode: CatchUpMode,
    ) -> LoopId {
        self.loops.register_loop_with_cap(
            name,
            fixed_timestep,
            catch_up_mode,
            self.config.default_max_catch_up_seconds,
        )
    }

    pub fn register_loop_with_cap(
        &mut self,
        name: impl Into<String>,
        fixed_timestep: f64,
        catch_up_mode: CatchUpMode,
        max_catch_up: f64,
    ) -> LoopId {
        self.loops
            .register_loop_with_cap(name, fixed_timestep, catch_up_mode, max_catch_up)
    }

    pub fn connect_loop(&mut self, node: NodeHandle, loop_id: LoopId) {
        self.nodes[node.index()].instance.loop_refs.push(loop_id);
    }

    pub fn loop_ref(&self, loop_id: LoopId) -> Option<LoopRef> {
        self.loops.loop_ref(loop_id)
    }

    // ---- inspection ---------------------------------------------------

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn budget(&self) -> &BudgetManager {
        &self.budget
    }

    pub fn alias_stats(&self) -> rg_alias::AliasStats {
        self.alias.stats()
    }

    pub fn node_state(&self, node: NodeHandle) -> NodeState {
        self.nodes[node.index()].instance.state
    }

    pub fn is_cleaned(&self, node: NodeHandle) -> bool {
        self.nodes[node.index()].instance.is_cleaned()
    }

    pub fn execution_order(&self) -> &[NodeHandle] {
        &self.execution_order
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    // ---- compile --------------------------------------------------------

    fn finalize_connections(&mut self) {
        let builder = std::mem::take(&mut self.builder);
        let regs = builder.register_all(&mut self.topology, &mut self.registry);
        self.registered.edges.extend(regs.edges);
        self.registered.constants.extend(regs.constants);
        self.registered.field_extractions.extend(regs.field_extractions);
        self.registered.variadic.extend(regs.variadic);
    }

    fn graph_level_error(&self, error: EngineError) -> NodeCompileError {
        NodeCompileError {
            node: NodeId::next(),
            name: "<graph>".to_string(),
            error,
        }
    }

    /// The ten-step pipeline: topo sort, per-node graph-compile setup and
    /// compile (with field extraction/variadic resolution interleaved),
    /// validate, lifetime analysis, aliasing, budget enforcement, cleanup
    /// registration, publish. Returns a report instead of a bare `Result`
    /// since even a successful compile carries diagnostics worth keeping
    /// (aliasing efficiency, final execution order).
    pub fn compile(&mut self) -> CompileReport {
        self.apply_deferred_recompiles();
        self.finalize_connections();

        let order = match self.topology.topological_sort() {
            Ok(order) => order,
            Err(e) => {
                return CompileReport {
                    errors: vec![self.graph_level_error(e.into())],
                    execution_order: Vec::new(),
                    aliasing_efficiency: 0.0,
                };
            }
        };

        let mut errors: Vec<NodeCompileError> = Vec::new();
        let mut created_by_node: HashMap<NodeHandle, Vec<ResourceRef>> = HashMap::new();
        self.node_outputs.clear();

        for &handle in &order {
            if let Err(e) = self.compile_one_node(handle, &mut created_by_node) {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            if let Err(mut e) = self.validate(&order) {
                errors.append(&mut e);
            }
        }

        if !errors.is_empty() {
            self.rollback(&order, &created_by_node);
            return CompileReport {
                errors,
                execution_order: Vec::new(),
                aliasing_efficiency: 0.0,
            };
        }

        let aliasing_efficiency = match self.run_lifetime_and_aliasing(&order, &created_by_node) {
            Ok(efficiency) => efficiency,
            Err(e) => {
                self.rollback(&order, &created_by_node);
                return CompileReport {
                    errors: vec![e],
                    execution_order: Vec::new(),
                    aliasing_efficiency: 0.0,
                };
            }
        };

        if let Err(e) = self.enforce_budget(&created_by_node) {
            self.rollback(&order, &created_by_node);
            return CompileReport {
                errors: vec![e],
                execution_order: Vec::new(),
                aliasing_efficiency: 0.0,
            };
        }

        self.register_cleanup(&order);

        for &handle in &order {
            let node = &mut self.nodes[handle.index()];
            if node.instance.state == NodeState::Compiled {
                let _ = node.instance.mark_ready();
            }
        }
        self.execution_order = order.clone();

        let names: Vec<String> = order
            .iter()
            .map(|h| self.nodes[h.index()].instance.name.clone())
            .collect();
        self.events
            .publish(Message::new(Event::RecompileCompleted { nodes: names }, None));

        CompileReport {
            errors: Vec::new(),
            execution_order: order.iter().map(|h| self.nodes[h.index()].instance.id).collect(),
            aliasing_efficiency,
        }
    }

    /// Steps 2-4 for a single node in topological order: graph-compile
    /// setup, variadic validation against its already-compiled source,
    /// bundle allocation and input binding, the node's own `compile`, and
    /// (interleaved, per step 3) resolving any field extraction whose
    /// source is this node.
    fn compile_one_node(
        &mut self,
        handle: NodeHandle,
        created_by_node: &mut HashMap<NodeHandle, Vec<ResourceRef>>,
    ) -> Result<(), NodeCompileError> {
        let type_id = self.nodes[handle.index()].type_id;
        let node_type = self.node_types.get(&type_id).expect("registered node type").clone();
        let (id, name) = {
            let node = &self.nodes[handle.index()];
            (node.instance.id, node.instance.name.clone())
        };
        let wrap = |e: EngineError| NodeCompileError {
            node: id,
            name: name.clone(),
            error: e,
        };

        if self.nodes[handle.index()].instance.state == NodeState::Created {
            let node = &mut self.nodes[handle.index()];
            node.instance
                .run_setup(node.behavior.as_mut())
                .map_err(|e| wrap(e.into()))?;
        }

        // Variadic slots whose dst is this node: source already compiled
        // by topological order, so validate now.
        let mut variadic_for_node: Vec<usize> = self
            .registered
            .variadic
            .iter()
            .enumerate()
            .filter(|(_, s)| s.dst == handle)
            .map(|(i, _)| i)
            .collect();
        variadic_for_node.sort_by_key(|&i| self.registered.variadic[i].binding);

        for &i in &variadic_for_node {
            let (source_node, source_slot) = {
                let slot = &self.registered.variadic[i];
                (slot.source.node, slot.source.slot)
            };
            let produced = self
                .node_outputs
                .get(&(source_node, source_slot))
                .and_then(|refs| refs.first())
                .and_then(|&r| self.registry.get(r))
                .map(|r| r.type_tag);
            if let Some(tag) = produced {
                self.registered.variadic[i].validate(tag);
            }
        }
        if let Some(&i) = variadic_for_node
            .iter()
            .find(|&&i| self.registered.variadic[i].state == VariadicState::Invalid)
        {
            let slot = &self.registered.variadic[i];
            return Err(wrap(
                SchemaError::IncompatibleSlot {
                    node_type: node_type.name.clone(),
                    slot: slot.slot_name.clone(),
                    expected: slot.descriptor_type.name().to_string(),
                    found: "incompatible source output".to_string(),
                }
                .into(),
            ));
        }

        {
            let node = &mut self.nodes[handle.index()];
            node.instance
                .run_graph_compile_setup(node.behavior.as_mut(), variadic_for_node.len())
                .map_err(wrap)?;
        }

        // Task count: lengths of task-level array-bound input slots.
        let mut array_slot_counts: HashMap<usize, usize> = HashMap::new();
        for edge in self.registered.edges.iter().filter(|e| e.target == handle) {
            if let Some(index) = edge.array_index {
                let entry = array_slot_counts.entry(edge.target_slot).or_insert(0);
                *entry = (*entry).max(index + 1);
            }
        }
        let task_level_lengths: Vec<usize> = array_slot_counts.values().copied().collect();
        let task_count = compute_task_count(&task_level_lengths).map_err(|detail| {
            wrap(
                ValidationError::ParameterOutOfRange {
                    node: name.clone(),
                    parameter: "task_level_inputs".to_string(),
                    detail,
                }
                .into(),
            )
        })?;

        let input_count = node_type.inputs.len() + variadic_for_node.len();
        let output_count = node_type.outputs.len();
        {
            let node = &mut self.nodes[handle.index()];
            node.instance.allocate_bundles(task_count, input_count, output_count);
        }

        self.bind_static_inputs(handle);
        self.bind_variadic_inputs(handle, &node_type, &variadic_for_node);

        let before = self.registry.len();
        let compile_result = {
            let node = &mut self.nodes[handle.index()];
            node.instance.run_compile(node.behavior.as_mut(), &mut self.registry)
        };
        let after = self.registry.len();
        if after > before {
            created_by_node
                .entry(handle)
                .or_default()
                .extend((before..after).map(|i| ResourceRef(i as u32)));
        }
        compile_result.map_err(wrap)?;

        {
            let node = &self.nodes[handle.index()];
            for slot_index in 0..node_type.outputs.len() {
                let refs: Vec<ResourceRef> = node
                    .instance
                    .bundles
                    .iter()
                    .filter_map(|b| b.outputs.get(slot_index).copied().flatten())
                    .collect();
                if !refs.is_empty() {
                    self.node_outputs.insert((handle, slot_index), refs);
                }
            }
        }
        for &i in &variadic_for_node {
            self.registered.variadic[i].mark_compiled();
        }

        self.resolve_field_extractions_from(handle);

        Ok(())
    }

    /// Bind direct/array edges and constant injections onto `handle`'s
    /// bundles. `array_index` on an edge or constant selects which
    /// *bundle* (task) receives the resource — task-level fan-out, not an
    /// in-slot sequence — since `Bundle::inputs` is a fixed-size vector
    /// indexed by static slot.
    fn bind_static_inputs(&mut self, handle: NodeHandle) {
        for i in 0..self.registered.edges.len() {
            let edge = self.registered.edges[i];
            if edge.target != handle {
                continue;
            }
            let resource = self.node_outputs.get(&(edge.source, edge.source_slot)).and_then(|refs| {
                match edge.array_index {
                    Some(idx) => refs.get(idx).copied().or_else(|| refs.first().copied()),
                    None => refs.first().copied(),
                }
            });
            if let Some(r) = resource {
                self.bind_bundle_input(handle, edge.target_slot, edge.array_index, r);
            }
        }
        for i in 0..self.registered.constants.len() {
            let constant = self.registered.constants[i];
            if constant.target != handle {
                continue;
            }
            self.bind_bundle_input(handle, constant.target_slot, constant.array_index, constant.resource);
        }
        for i in 0..self.registered.field_extractions.len() {
            let target = self.registered.field_extractions[i].target;
            if target != handle {
                continue;
            }
            let (target_slot, array_index, placeholder) = {
                let fe = &self.registered.field_extractions[i];
                (fe.target_slot, fe.array_index, fe.placeholder)
            };
            self.bind_bundle_input(handle, target_slot, array_index, placeholder);
        }
    }

    fn bind_bundle_input(&mut self, handle: NodeHandle, slot: usize, array_index: Option<usize>, resource: ResourceRef) {
        let node = &mut self.nodes[handle.index()];
        match array_index {
            Some(idx) if idx < node.instance.bundles.len() => {
                node.instance.bundles[idx].inputs[slot] = Some(resource);
            }
            _ => {
                for bundle in &mut node.instance.bundles {
                    bundle.inputs[slot] = Some(resource);
                }
            }
        }
    }

    /// Validated variadic dynamic slots bind after the schema's static
    /// inputs, at `node_type.inputs.len() + binding` — the reason
    /// `graph_compile_setup` sizes these slots ahead of `allocate_bundles`.
    /// Broadcast to every bundle: variadic bindings don't carry their own
    /// array index in this design.
    fn bind_variadic_inputs(&mut self, handle: NodeHandle, node_type: &NodeType, variadic_for_node: &[usize]) {
        for (dyn_index, &i) in variadic_for_node.iter().enumerate() {
            let (source_node, source_slot, state) = {
                let slot = &self.registered.variadic[i];
                (slot.source.node, slot.source.slot, slot.state)
            };
            if state != VariadicState::Validated {
                continue;
            }
            let resource = self
                .node_outputs
                .get(&(source_node, source_slot))
                .and_then(|refs| refs.first().copied());
            if let Some(r) = resource {
                let effective_index = node_type.inputs.len() + dyn_index;
                let node = &mut self.nodes[handle.index()];
                for bundle in &mut node.instance.bundles {
                    if effective_index < bundle.inputs.len() {
                        bundle.inputs[effective_index] = Some(r);
                    }
                }
            }
        }
    }

    /// Step 3, interleaved with step 4: once `handle` (the field
    /// extraction's source) has compiled, resolve the placeholder's
    /// descriptor in place, keeping the `ResourceRef` identity stable.
    fn resolve_field_extractions_from(&mut self, handle: NodeHandle) {
        let indices: Vec<usize> = self
            .registered
            .field_extractions
            .iter()
            .enumerate()
            .filter(|(_, fe)| fe.source == handle)
            .map(|(i, _)| i)
            .collect();
        for i in indices {
            let (source_slot, placeholder) = {
                let fe = &self.registered.field_extractions[i];
                (fe.source_slot, fe.placeholder)
            };
            let source_resource = self
                .node_outputs
                .get(&(handle, source_slot))
                .and_then(|refs| refs.first().copied());
            let Some(source_resource) = source_resource else {
                continue;
            };
            let source_descriptor = self.registry.get(source_resource).map(|r| r.descriptor.clone());
            let Some(source_descriptor) = source_descriptor else {
                continue;
            };
            let new_descriptor = self.registered.field_extractions[i].resolve(&source_descriptor);
            let new_size = new_descriptor.estimated_size();
            if let Some(res) = self.registry.get_mut(placeholder) {
                res.descriptor = new_descriptor;
                res.size = new_size;
            }
        }
    }

    /// Step 5: required-input connectivity, required parameters, device
    /// affinity consistency across every edge.
    fn validate(&self, order: &[NodeHandle]) -> Result<(), Vec<NodeCompileError>> {
        let mut errors = Vec::new();

        for &handle in order {
            let node = &self.nodes[handle.index()];
            let node_type = self.node_types.get(&node.type_id).expect("registered node type");
            let id = node.instance.id;
            let name = node.instance.name.clone();

            for slot in &node_type.inputs {
                if slot.nullable || slot.role.contains(rg_slots::SlotRole::EXECUTE_ONLY) {
                    continue;
                }
                let connected = !node.instance.bundles.is_empty()
                    && node
                        .instance
                        .bundles
                        .iter()
                        .all(|b| b.inputs.get(slot.index).copied().flatten().is_some());
                if !connected {
                    errors.push(NodeCompileError {
                        node: id,
                        name: name.clone(),
                        error: ValidationError::RequiredInputUnconnected {
                            node: name.clone(),
                            slot: slot.name.clone(),
                        }
                        .into(),
                    });
                }
            }

            for parameter in node_type.parameters.names() {
                if node_type.parameters.is_required(parameter)
                    && !node.instance.provided_params.contains(parameter)
                {
                    errors.push(NodeCompileError {
                        node: id,
                        name: name.clone(),
                        error: ValidationError::ParameterMissing {
                            node: name.clone(),
                            parameter: parameter.to_string(),
                        }
                        .into(),
                    });
                }
            }
        }

        for edge in &self.registered.edges {
            let source_affinity = self.nodes[edge.source.index()].instance.device_affinity;
            let target_affinity = self.nodes[edge.target.index()].instance.device_affinity;
            if let (Some(a), Some(b)) = (source_affinity, target_affinity) {
                if a != b {
                    let target = &self.nodes[edge.target.index()].instance;
                    let source = &self.nodes[edge.source.index()].instance;
                    errors.push(NodeCompileError {
                        node: target.id,
                        name: target.name.clone(),
                        error: ValidationError::IncompatibleDeviceAffinity {
                            from: source.name.clone(),
                            to: target.name.clone(),
                        }
                        .into(),
                    });
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Abort path: undo every node touched this compile back to `Setup`
    /// and release every resource a node's `compile` created. Constants
    /// and field-extraction placeholders (created during
    /// `finalize_connections`, not during a node's `compile`) are left in
    /// place — they are `Persistent` by design and meant to survive a
    /// failed recompile attempt.
    fn rollback(&mut self, order: &[NodeHandle], created_by_node: &HashMap<NodeHandle, Vec<ResourceRef>>) {
        for &handle in order {
            let state = self.nodes[handle.index()].instance.state;
            self.nodes[handle.index()].instance.state = state.force_setup();
        }
        for refs in created_by_node.values() {
            for &r in refs {
                self.registry.release(r);
            }
        }
        self.node_outputs.clear();
    }

    /// Steps 6-7: lifetime analysis over every resource a node's compile
    /// created this pass, then greedy same-category
    /// interval grouping, post-filtered to device-local members at or
    /// above the aliasing threshold, exercised through the real aliasing
    /// engine (mark-released / find-alias) to produce genuine stats.
    fn run_lifetime_and_aliasing(
        &mut self,
        order: &[NodeHandle],
        created_by_node: &HashMap<NodeHandle, Vec<ResourceRef>>,
    ) -> Result<f64, NodeCompileError> {
        let mut resources = Vec::new();
        for (&handle, refs) in created_by_node {
            for &r in refs {
                let output_slot = self.nodes[handle.index()]
                    .instance
                    .bundles
                    .iter()
                    .find_map(|b| b.outputs.iter().position(|o| *o == Some(r)))
                    .unwrap_or(usize::MAX);
                resources.push(ResourceInfo {
                    resource: r,
                    producer: handle,
                    output_slot,
                });
            }
        }

        let mut analyser = LifetimeAnalyser::analyze(order, resources, &self.registered.edges)
            .map_err(|e| self.graph_level_error(e.into()))?;

        let groups = {
            let registry = &self.registry;
            analyser.compute_aliasing_groups(|r| {
                registry
                    .get(r)
                    .map(|res| res.descriptor.category())
                    .unwrap_or(ResourceCategory::Opaque)
            })
        };
        let efficiency = {
            let registry = &self.registry;
            analyser.compute_aliasing_efficiency(&groups, |r| registry.get(r).map(|res| res.size).unwrap_or(0))
        };

        for (group_index, group) in groups.iter().enumerate() {
            let pool_id = group_index as u32;
            let mut qualifying: Vec<ResourceRef> = group
                .iter()
                .copied()
                .filter(|&r| {
                    self.registry
                        .get(r)
                        .map(|res| {
                            res.strategy == AllocationStrategy::DeviceLocal
                                && res.size >= self.config.alias_threshold_bytes
                        })
                        .unwrap_or(false)
                })
                .collect();
            if qualifying.len() < 2 {
                continue;
            }
            qualifying.sort_by_key(|&r| analyser.timeline(r).map(|t| t.birth_index).unwrap_or(0));
            let representative = qualifying[0];

            let mut prev: Option<ResourceRef> = None;
            for &r in &qualifying {
                if let Some(p) = prev {
                    let requirements = self.memory_requirements_of(p);
                    let device = self.registry.get(p).and_then(|res| res.device);
                    self.alias.mark_released(p, self.frame_index, requirements, device);
                }
                let requirements = self.memory_requirements_of(r);
                let device = self.registry.get(r).and_then(|res| res.device);
                if self.alias.find_alias(r, &requirements, device, 0).is_some() {
                    if let Some(res) = self.registry.get_mut(r) {
                        res.alias_group = Some(pool_id);
                    }
                    if let Some(res) = self.registry.get_mut(representative) {
                        if res.alias_group.is_none() {
                            res.alias_group = Some(pool_id);
                        }
                    }
                }
                prev = Some(r);
            }
        }

        Ok(efficiency)
    }

    fn memory_requirements_of(&self, r: ResourceRef) -> MemoryRequirements {
        let res = self.registry.get(r);
        let size = res.map(|res| res.size).unwrap_or(0);
        let memory_type_bits = match res.map(|res| res.strategy) {
            Some(AllocationStrategy::DeviceLocal) => 0b01,
            Some(AllocationStrategy::HostVisible) => 0b10,
            None => 0,
        };
        MemoryRequirements {
            size,
            alignment: 256,
            memory_type_bits,
        }
    }

    /// Step 8: accounted per pool (once, at the pool's peak member size)
    /// rather than per individual aliased resource, so
    /// aliasing savings are reflected in what actually counts against the
    /// budget.
    fn enforce_budget(&mut self, created_by_node: &HashMap<NodeHandle, Vec<ResourceRef>>) -> Result<(), NodeCompileError> {
        let mut accounted_pools: HashSet<u32> = HashSet::new();
        for (&handle, refs) in created_by_node {
            for &r in refs {
                let (strategy, size, alias_group) = match self.registry.get(r) {
                    Some(res) => (res.strategy, res.size, res.alias_group),
                    None => continue,
                };
                let category = match strategy {
                    AllocationStrategy::DeviceLocal => BudgetCategory::DeviceMemory,
                    AllocationStrategy::HostVisible => BudgetCategory::HostMemory,
                };
                let bytes = match alias_group {
                    Some(pool) => {
                        if !accounted_pools.insert(pool) {
                            continue;
                        }
                        self.registry
                            .iter()
                            .filter(|res| res.alias_group == Some(pool))
                            .map(|res| res.size)
                            .max()
                            .unwrap_or(size)
                    }
                    None => size,
                };
                if let Err(e) = self.budget.try_allocate(&category, bytes) {
                    let node = &self.nodes[handle.index()];
                    return Err(NodeCompileError {
                        node: node.instance.id,
                        name: node.instance.name.clone(),
                        error: e.into(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Step 9: a node's cleanup dependencies are the producer nodes of
    /// every compile-time input it actually bound (direct edges, field
    /// extractions, variadic sources).
    fn register_cleanup(&mut self, order: &[NodeHandle]) {
        let mut stack = CleanupStack::new(order.to_vec());
        for &handle in order {
            let node = &self.nodes[handle.index()];
            let node_type = self.node_types.get(&node.type_id).expect("registered node type");
            let mut depends_on: HashSet<NodeHandle> = HashSet::new();
            for edge in self.registered.edges.iter().filter(|e| e.target == handle) {
                depends_on.insert(edge.source);
            }
            for fe in self.registered.field_extractions.iter().filter(|f| f.target == handle) {
                depends_on.insert(fe.source);
            }
            for slot in self.registered.variadic.iter().filter(|s| s.dst == handle) {
                depends_on.insert(slot.source.node);
            }
            stack.register_node(
                handle,
                node.instance.name.clone(),
                node_type.name.clone(),
                node.instance.tags.iter().cloned(),
                depends_on,
            );
        }
        self.cleanup = Some(stack);
    }

    // ---- execute / render_frame ------------------------------------------

    /// Runs every Ready node once per connected bundle, in execution
    /// order, gated by the OR of its connected loops' execute flags. A
    /// node with no connected loop always executes.
    pub fn execute(&mut self) {
        let order = self.execution_order.clone();
        for handle in order {
            let flags: Vec<bool> = {
                let node = &self.nodes[handle.index()];
                node.instance
                    .loop_refs
                    .iter()
                    .map(|id| self.loops.loop_ref(*id).map(|r| r.should_execute_this_frame()).unwrap_or(true))
                    .collect()
            };
            let (delta, steps) = {
                let node = &self.nodes[handle.index()];
                // spec §4.3: "delta_time and step_count are read from the first active
                // loop ref" — active, not merely connected; flags[i] corresponds
                // positionally to loop_refs[i].
                let active_id = node
                    .instance
                    .loop_refs
                    .iter()
                    .zip(flags.iter())
                    .find(|(_, &active)| active)
                    .map(|(&id, _)| id);
                match active_id {
                    Some(id) => self
                        .loops
                        .loop_ref(id)
                        .map(|r| (r.delta_time(), r.step_count()))
                        .unwrap_or((self.last_frame_time, 1)),
                    None => (self.last_frame_time, 1),
                }
            };

            let registry = &self.registry;
            let node = &mut self.nodes[handle.index()];
            if node.instance.state != NodeState::Ready {
                continue;
            }
            if !node.instance.should_execute(&flags) {
                continue;
            }
            let _ = node.instance.run_execute(node.behavior.as_mut(), registry, delta, steps);
        }
    }

    /// Applies any deferred recompiles flagged since the last frame (spec
    /// §4.3: "the graph moves it back to Setup between frames"), recompiles
    /// if anything changed (or this is the first frame), advances every
    /// registered loop, and executes. Deferred recompile requests made
    /// during this frame's execute only take effect at the *next*
    /// `render_frame` call, never mid-frame.
    pub fn render_frame(&mut self, frame_time: f64) -> CompileReport {
        let any_recompile = self.apply_deferred_recompiles();

        let report = if any_recompile || self.execution_order.is_empty() {
            self.compile()
        } else {
            CompileReport {
                errors: Vec::new(),
                execution_order: self
                    .execution_order
                    .iter()
                    .map(|h| self.nodes[h.index()].instance.id)
                    .collect(),
                aliasing_efficiency: 0.0,
            }
        };

        self.frame_index += 1;
        self.last_frame_time = frame_time;
        self.loops.update(self.frame_index, frame_time);
        self.execute();
        report
    }

    /// Moves every flagged node back to `Setup` (spec §4.3: "the graph
    /// moves it back to Setup between frames"). Called at the start of
    /// both `compile` (so a recompile flagged via `publish`/
    /// `request_recompile` takes effect even outside `render_frame`) and
    /// `render_frame` (where it additionally decides whether a recompile
    /// is needed at all). Returns whether anything was flagged.
    fn apply_deferred_recompiles(&mut self) -> bool {
        let mut any = false;
        for node in &mut self.nodes {
            if node.instance.apply_deferred_recompile() {
                any = true;
            }
        }
        any
    }

    /// Flags `handles` for recompile at the start of the next
    /// `render_frame` and publishes a `RecompileRequested` event.
    pub fn request_recompile(&mut self, handles: &[NodeHandle], reason: impl Into<String>) {
        let names: Vec<String> = handles
            .iter()
            .map(|h| self.nodes[h.index()].instance.name.clone())
            .collect();
        for &h in handles {
            self.nodes[h.index()].instance.flag_needs_recompile();
        }
        self.events
            .publish(Message::new(Event::RecompileRequested { nodes: names, reason: reason.into() }, None));
    }

    /// Forward `event` onto the internal bus and apply the compiler's own
    /// tag-based deferred-recompile reactions (spec §4.12's resize/reload
    /// examples): a window resize or swapchain invalidation flags every
    /// `"swapchain"`-tagged node; a shader reload flags every
    /// `"pipeline"`-tagged node.
    pub fn publish(&mut self, event: Event, sender: Option<NodeId>) {
        match &event {
            Event::WindowResized { .. } | Event::SwapchainInvalidated => {
                self.flag_recompile_by_tag("swapchain");
            }
            Event::ShaderReloaded { .. } => {
                self.flag_recompile_by_tag("pipeline");
            }
            _ => {}
        }
        self.events.publish(Message::new(event, sender));
    }

    fn flag_recompile_by_tag(&mut self, tag: &str) {
        for node in &mut self.nodes {
            if node.instance.tags.contains(tag) {
                node.instance.flag_needs_recompile();
            }
        }
    }

    // ---- cleanup (spec §4.10) ------------------------------------------

    fn run_cleanup_for(&mut self, handles: Vec<NodeHandle>) -> Vec<String> {
        let mut names = Vec::new();
        for handle in handles {
            let id = self.nodes[handle.index()].instance.id;
            let name = self.nodes[handle.index()].instance.name.clone();
            {
                let registry = &mut self.registry;
                let node = &mut self.nodes[handle.index()];
                node.instance.run_cleanup(node.behavior.as_mut(), registry);
            }
            self.events.unsubscribe_node(id);
            names.push(name);
        }
        if !names.is_empty() {
            self.events
                .publish(Message::new(Event::CleanupCompleted { cleaned: names.clone() }, None));
        }
        names
    }

    pub fn cleanup_subgraph(&mut self, root: NodeHandle) -> Vec<String> {
        let handles = match self.cleanup.as_mut() {
            Some(stack) => stack.cleanup_subgraph(root),
            None => return Vec::new(),
        };
        self.run_cleanup_for(handles)
    }

    pub fn cleanup_by_tag(&mut self, tag: &str) -> Vec<String> {
        let handles = match self.cleanup.as_mut() {
            Some(stack) => stack.cleanup_by_tag(tag),
            None => return Vec::new(),
        };
        self.run_cleanup_for(handles)
    }

    pub fn cleanup_by_type(&mut self, type_name: &str) -> Vec<String> {
        let handles = match self.cleanup.as_mut() {
            Some(stack) => stack.cleanup_by_type(type_name),
            None => return Vec::new(),
        };
        self.run_cleanup_for(handles)
    }

    pub fn cleanup_all(&mut self) -> Vec<String> {
        let handles = match self.cleanup.as_mut() {
            Some(stack) => stack.cleanup_all(),
            None => return Vec::new(),
        };
        self.run_cleanup_for(handles)
    }

    pub fn get_cleanup_scope(&self, root: NodeHandle) -> Vec<String> {
        self.cleanup
            .as_ref()
            .map(|s| s.get_cleanup_scope(root))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rg_budget::Budget;
    use rg_node::{CleanupContext, CompileContext, ExecuteContext, ParameterBundle, TaskContext};
    use rg_slots::{BufferDescriptor, BufferUsage, SlotArity, SlotRole};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn buffer_slot(name: &str, index: usize) -> SlotDescriptor {
        SlotDescriptor::new(name, index, ResourceTypeTag::Buffer)
    }

    #[derive(Debug)]
    struct ProducerBehavior {
        size: u64,
    }

    impl NodeBehavior for ProducerBehavior {
        fn compile(&mut self, ctx: &mut CompileContext<'_>) -> Result<(), EngineError> {
            let resource = ctx.registry.create(
                ResourceDescriptor::Buffer(BufferDescriptor {
                    size: self.size,
                    usage: BufferUsage::STORAGE,
                }),
                ctx.node,
                rg_core::LifetimeScope::Transient,
                AllocationStrategy::DeviceLocal,
                None,
            );
            for bundle in ctx.bundles.iter_mut() {
                bundle.outputs[0] = Some(resource);
            }
            Ok(())
        }
        fn execute(&mut self, _ctx: &ExecuteContext<'_>, _task: TaskContext<'_>) {}
    }

    #[derive(Debug)]
    struct PassThroughBehavior {
        size: u64,
    }

    impl NodeBehavior for PassThroughBehavior {
        fn compile(&mut self, ctx: &mut CompileContext<'_>) -> Result<(), EngineError> {
            ctx.mark_input_used(0);
            let resource = ctx.registry.create(
                ResourceDescriptor::Buffer(BufferDescriptor {
                    size: self.size,
                    usage: BufferUsage::STORAGE,
                }),
                ctx.node,
                rg_core::LifetimeScope::Transient,
                AllocationStrategy::DeviceLocal,
                None,
            );
            for bundle in ctx.bundles.iter_mut() {
                bundle.outputs[0] = Some(resource);
            }
            Ok(())
        }
        fn execute(&mut self, _ctx: &ExecuteContext<'_>, _task: TaskContext<'_>) {}
    }

    #[derive(Debug, Default)]
    struct SinkBehavior {
        executes: Arc<AtomicUsize>,
    }

    impl NodeBehavior for SinkBehavior {
        fn compile(&mut self, ctx: &mut CompileContext<'_>) -> Result<(), EngineError> {
            ctx.mark_input_used(0);
            Ok(())
        }
        fn execute(&mut self, _ctx: &ExecuteContext<'_>, _task: TaskContext<'_>) {
            self.executes.fetch_add(1, Ordering::Relaxed);
        }
        fn cleanup(&mut self, _ctx: &mut CleanupContext<'_>) {}
    }

    fn register_chain_types(graph: &mut Graph) -> (NodeTypeId, NodeTypeId, NodeTypeId) {
        let producer = NodeTypeId(0);
        let middle = NodeTypeId(1);
        let sink = NodeTypeId(2);
        graph.register_node_type(NodeType::new(producer, "Producer").with_output(buffer_slot("out", 0)));
        graph.register_node_type(
            NodeType::new(middle, "Middle")
                .with_input(buffer_slot("in", 0))
                .with_output(buffer_slot("out", 0)),
        );
        graph.register_node_type(NodeType::new(sink, "Sink").with_input(buffer_slot("in", 0)));
        (producer, middle, sink)
    }

    #[test]
    fn linear_chain_compiles_and_executes_in_order() {
        let mut graph = Graph::new(CompilerConfig::default());
        let (producer_ty, middle_ty, sink_ty) = register_chain_types(&mut graph);

        let a = graph.add_node("A", producer_ty, Box::new(ProducerBehavior { size: 4096 }), HashMap::new());
        let b = graph.add_node("B", middle_ty, Box::new(PassThroughBehavior { size: 4096 }), HashMap::new());
        let executes = Arc::new(AtomicUsize::new(0));
        let c = graph.add_node(
            "C",
            sink_ty,
            Box::new(SinkBehavior { executes: executes.clone() }),
            HashMap::new(),
        );

        graph.connect(a, 0, b, 0, None).unwrap();
        graph.connect(b, 0, c, 0, None).unwrap();

        let report = graph.compile();
        assert!(report.is_success(), "{:?}", report.errors);
        assert_eq!(graph.registry().len(), 2);
        assert_eq!(graph.execution_order().len(), 3);

        graph.execute();
        assert_eq!(executes.load(Ordering::Relaxed), 1);

        let cleaned = graph.cleanup_all();
        assert_eq!(cleaned, vec!["C", "B", "A"]);
    }

    #[test]
    fn missing_required_input_is_a_validation_error() {
        let mut graph = Graph::new(CompilerConfig::default());
        let (_producer_ty, middle_ty, _sink_ty) = register_chain_types(&mut graph);
        graph.add_node("B", middle_ty, Box::new(PassThroughBehavior { size: 128 }), HashMap::new());

        let report = graph.compile();
        assert!(!report.is_success());
        assert!(matches!(
            report.errors[0].error,
            EngineError::Validation(ValidationError::RequiredInputUnconnected { .. })
        ));
    }

    #[test]
    fn missing_required_parameter_is_a_validation_error() {
        let mut graph = Graph::new(CompilerConfig::default());
        let ty = NodeTypeId(10);
        graph.register_node_type(
            NodeType::new(ty, "Configured").with_parameters(
                ParameterBundle::new().with_parameter("sample_count", ParamValue::Int(1), true),
            ),
        );
        graph.add_node(
            "D",
            ty,
            Box::new(SinkBehavior::default()),
            HashMap::new(),
        );

        let report = graph.compile();
        assert!(!report.is_success());
        assert!(report.errors.iter().any(|e| matches!(
            e.error,
            EngineError::Validation(ValidationError::ParameterMissing { .. })
        )));
    }

    #[test]
    fn providing_the_required_parameter_compiles_cleanly() {
        let mut graph = Graph::new(CompilerConfig::default());
        let ty = NodeTypeId(10);
        graph.register_node_type(
            NodeType::new(ty, "Configured").with_parameters(
                ParameterBundle::new().with_parameter("sample_count", ParamValue::Int(1), true),
            ),
        );
        let mut overrides = HashMap::new();
        overrides.insert("sample_count".to_string(), ParamValue::Int(4));
        graph.add_node("D", ty, Box::new(SinkBehavior::default()), overrides);

        let report = graph.compile();
        assert!(report.is_success(), "{:?}", report.errors);
    }

    #[test]
    fn budget_strict_overflow_aborts_with_no_partial_state() {
        let mut config = CompilerConfig::default();
        config.budgets.insert(
            BudgetCategory::DeviceMemory,
            Budget {
                max_bytes: 1 << 30,
                warning_threshold: 1 << 29,
                strict: true,
            },
        );
        let mut graph = Graph::new(config);
        let producer_ty = NodeTypeId(0);
        graph.register_node_type(NodeType::new(producer_ty, "Producer").with_output(buffer_slot("out", 0)));
        let size = (1 << 30) + (1 << 29); // 1.5 GiB
        graph.add_node("A", producer_ty, Box::new(ProducerBehavior { size }), HashMap::new());

        let report = graph.compile();
        assert!(!report.is_success());
        match &report.errors[0].error {
            EngineError::Budget(e) => {
                assert_eq!(e.requested, size);
                assert_eq!(e.available, 1 << 30);
            }
            other => panic!("expected a budget error, got {:?}", other),
        }
        assert!(graph.registry().iter().all(|r| !r.valid), "partial allocation must be rolled back");
    }

    #[test]
    fn cleanup_by_tag_tears_down_only_the_tagged_subgraph() {
        let mut graph = Graph::new(CompilerConfig::default());
        let light_ty = NodeTypeId(0);
        let shadow_ty = NodeTypeId(1);
        let combine_ty = NodeTypeId(2);
        let pass_ty = NodeTypeId(3);
        graph.register_node_type(NodeType::new(light_ty, "Light").with_output(buffer_slot("out", 0)));
        graph.register_node_type(
            NodeType::new(shadow_ty, "Shadow")
                .with_input(buffer_slot("in", 0))
                .with_output(buffer_slot("out", 0)),
        );
        graph.register_node_type(
            NodeType::new(combine_ty, "Combine")
                .with_input(buffer_slot("a", 0))
                .with_input(buffer_slot("b", 1))
                .with_output(buffer_slot("out", 0)),
        );
        graph.register_node_type(NodeType::new(pass_ty, "MainPass").with_input(buffer_slot("in", 0)));

        let light = graph.add_node("Light", light_ty, Box::new(ProducerBehavior { size: 64 }), HashMap::new());
        let s1 = graph.add_node("S1", shadow_ty, Box::new(PassThroughBehavior { size: 64 }), HashMap::new());
        let s2 = graph.add_node("S2", shadow_ty, Box::new(PassThroughBehavior { size: 64 }), HashMap::new());
        let s3 = graph.add_node(
            "S3",
            combine_ty,
            Box::new(PassThroughBehavior { size: 64 }),
            HashMap::new(),
        );
        let main_pass = graph.add_node(
            "MainPass",
            pass_ty,
            Box::new(SinkBehavior::default()),
            HashMap::new(),
        );
        graph.add_tag(s1, "shadows");
        graph.add_tag(s2, "shadows");
        graph.add_tag(s3, "shadows");

        graph.connect(light, 0, s1, 0, None).unwrap();
        graph.connect(light, 0, s2, 0, None).unwrap();
        graph.connect(s1, 0, s3, 0, None).unwrap();
        graph.connect(s2, 0, s3, 1, None).unwrap();
        graph.connect(light, 0, main_pass, 0, None).unwrap();

        let report = graph.compile();
        assert!(report.is_success(), "{:?}", report.errors);

        let mut cleaned = graph.cleanup_by_tag("shadows");
        cleaned.sort();
        assert_eq!(cleaned, vec!["S1", "S2", "S3"]);
        assert!(!graph.is_cleaned(light), "Light still has MainPass as a live dependent");
        assert!(!graph.is_cleaned(main_pass), "MainPass is untagged and untouched");
    }

    #[test]
    fn loop_gated_node_only_executes_when_its_loop_fires() {
        let mut graph = Graph::new(CompilerConfig::default());
        let ty = NodeTypeId(0);
        graph.register_node_type(NodeType::new(ty, "Gated"));
        let executes = Arc::new(AtomicUsize::new(0));
        let node = graph.add_node(
            "Gated",
            ty,
            Box::new(SinkBehavior { executes: executes.clone() }),
            HashMap::new(),
        );
        let loop_id = graph.register_loop("physics", 1.0 / 60.0, CatchUpMode::FireAndForget);
        graph.connect_loop(node, loop_id);

        // First frame: a tiny delta that doesn't fill the accumulator.
        graph.render_frame(0.0001);
        assert_eq!(executes.load(Ordering::Relaxed), 0);

        // Enough time accumulates to fire the loop.
        graph.render_frame(1.0);
        assert_eq!(executes.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn window_resize_flags_swapchain_tagged_nodes_for_recompile() {
        let mut graph = Graph::new(CompilerConfig::default());
        let ty = NodeTypeId(0);
        graph.register_node_type(NodeType::new(ty, "Swapchain"));
        let node = graph.add_node("Swapchain", ty, Box::new(SinkBehavior::default()), HashMap::new());
        graph.add_tag(node, "swapchain");

        let first = graph.compile();
        assert!(first.is_success());
        let _ = graph.node_state(node);
        graph.cleanup_all(); // pretend a frame ran and tore things down... then recompile:

        graph.publish(Event::WindowResized { width: 1920, height: 1080 }, None);
        let second = graph.compile();
        assert!(second.is_success(), "{:?}", second.errors);
        assert_eq!(graph.node_state(node), NodeState::Ready);
    }

    #[test]
    fn variadic_binding_validates_against_the_sources_produced_type() {
        let mut graph = Graph::new(CompilerConfig::default());
        let producer_ty = NodeTypeId(0);
        let gather_ty = NodeTypeId(1);
        graph.register_node_type(NodeType::new(producer_ty, "Producer").with_output(buffer_slot("out", 0)));
        graph.register_node_type(NodeType::new(gather_ty, "Gather"));

        let p = graph.add_node("P", producer_ty, Box::new(ProducerBehavior { size: 64 }), HashMap::new());
        let g = graph.add_node("G", gather_ty, Box::new(SinkBehavior::default()), HashMap::new());
        graph.connect_variadic(p, 0, g, 0, "gathered").unwrap();

        let report = graph.compile();
        assert!(report.is_success(), "{:?}", report.errors);
    }

    #[test]
    fn empty_graph_compiles_to_an_empty_execution_order() {
        let mut graph = Graph::new(CompilerConfig::default());
        let report = graph.compile();
        assert!(report.is_success());
        assert!(report.execution_order.is_empty());
    }
}
