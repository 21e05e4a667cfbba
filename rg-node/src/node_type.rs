//! Node type — the immutable blueprint (spec §3, "Node type"): "schemas,
//! parameters, capability requirements."

use rg_core::NodeTypeId;
use rg_slots::SlotDescriptor;

use crate::param::ParameterBundle;

bitflags::bitflags! {
    /// Required device capabilities (spec §3: "required device
    /// capabilities").
    pub struct CapabilitySet: u32 {
        const GRAPHICS = 0b0001;
        const COMPUTE = 0b0010;
        const TRANSFER = 0b0100;
        const RAY_TRACING = 0b1000;
    }
}

bitflags::bitflags! {
    /// Node feature profile (spec §3: "a node-feature profile").
    pub struct NodeFeatureProfile: u32 {
        const ASYNC_COMPUTE = 0b0001;
        const MULTIVIEW = 0b0010;
        const VARIABLE_RATE_SHADING = 0b0100;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineKind {
    Graphics,
    Compute,
    RayTracing,
    Transfer,
    None,
}

/// "an instancing policy (supports-instancing, max-instances)".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstancingPolicy {
    pub supports_instancing: bool,
    pub max_instances: Option<u32>,
}

impl Default for InstancingPolicy {
    fn default() -> Self {
        InstancingPolicy {
            supports_instancing: false,
            max_instances: None,
        }
    }
}

/// "optional workload metrics".
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorkloadMetrics {
    pub estimated_cost: f32,
    pub estimated_memory: u64,
}

#[derive(Clone, Debug)]
pub struct NodeType {
    pub id: NodeTypeId,
    pub name: String,
    pub inputs: Vec<SlotDescriptor>,
    pub outputs: Vec<SlotDescriptor>,
    pub parameters: ParameterBundle,
    pub required_capabilities: CapabilitySet,
    pub pipeline_kind: PipelineKind,
    pub feature_profile: NodeFeatureProfile,
    pub instancing: InstancingPolicy,
    pub workload_metrics: Option<WorkloadMetrics>,
}

impl NodeType {
    pub fn new(id: NodeTypeId, name: impl Into<String>) -> Self {
        NodeType {
            id,
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            parameters: ParameterBundle::new(),
            required_capabilities: CapabilitySet::empty(),
            pipeline_kind: PipelineKind::None,
            feature_profile: NodeFeatureProfile::empty(),
            instancing: InstancingPolicy::default(),
            workload_metrics: None,
        }
    }

    pub fn with_input(mut self, slot: SlotDescriptor) -> Self {
        self.inputs.push(slot);
        self
    }

    pub fn with_output(mut self, slot: SlotDescriptor) -> Self {
        self.outputs.push(slot);
        self
    }

    pub fn with_parameters(mut self, parameters: ParameterBundle) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_capabilities(mut self, caps: CapabilitySet) -> Self {
        self.required_capabilities = caps;
        self
    }

    pub fn with_pipeline_kind(mut self, kind: PipelineKind) -> Self {
        self.pipeline_kind = kind;
        self
    }

    pub fn input_slot(&self, index: usize) -> Option<&SlotDescriptor> {
        self.inputs.get(index)
    }

    pub fn output_slot(&self, index: usize) -> Option<&SlotDescriptor> {
        self.outputs.get(index)
    }
}
