//! Node type blueprints, node instances, and the node lifecycle state
//! machine (spec §3, §4.3).

mod behavior;
mod bundle;
mod context;
mod instance;
mod lifecycle;
mod node_type;
mod param;

pub use behavior::NodeBehavior;
pub use bundle::{compute_task_count, Bundle};
pub use context::{
    CleanupContext, CompileContext, ExecuteContext, GraphCompileSetupContext, SetupContext,
    TaskContext,
};
pub use instance::NodeInstance;
pub use lifecycle::NodeState;
pub use node_type::{
    CapabilitySet, InstancingPolicy, NodeFeatureProfile, NodeType, PipelineKind, WorkloadMetrics,
};
pub use param::{ParamValue, ParameterBundle, ParameterSlot};
